use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use signals::config::Config;
use signals::{
    AggregationEngine, DirectorySource, OfferAnalyzer, RawPosting, RecommendationEngine,
    SectorRegistry, UserProfile,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting signals v{}", env!("CARGO_PKG_VERSION"));

    // Sector configurations
    let source = DirectorySource::new(config.sectors_dir.clone());
    let registry = Arc::new(SectorRegistry::new(Arc::new(source)));
    let outcomes = registry
        .load_all()
        .await
        .with_context(|| format!("Failed to list sectors in {}", config.sectors_dir.display()))?;
    let loaded = outcomes.iter().filter(|o| o.result.is_ok()).count();
    info!("{loaded} of {} sectors loaded", outcomes.len());

    // Analysis
    let postings: Vec<RawPosting> = match &config.postings_path {
        Some(path) => read_json(path).await?,
        None => {
            warn!("POSTINGS_PATH not set; no postings to analyze");
            Vec::new()
        }
    };
    let analyzer = Arc::new(
        OfferAnalyzer::new(Arc::clone(&registry)).with_workers(config.analysis_workers),
    );
    let report = analyzer.analyze_batch(postings).await;

    // Aggregation
    let aggregation = AggregationEngine::new(Arc::clone(&registry), config.aggregation_settings());
    aggregation.merge_all(&report.results);

    let sector_ids = registry.sector_ids();
    let market = aggregation.market_snapshot(&sector_ids)?;
    print_json(&json!({
        "batch_id": report.batch_id,
        "analyzed": report.results.len(),
        "failures": report.failures,
        "sectors": market.sectors,
    }))?;

    // Recommendations
    if let Some(path) = &config.profile_path {
        let profile: UserProfile = read_json(path).await?;
        let recommender = RecommendationEngine::new(config.recommendation_settings());
        let recommendations = recommender
            .recommend(&profile, &market, config.max_recommendations)
            .context("Failed to compute recommendations")?;
        let coverage = market
            .sector(&profile.primary_sector_id)
            .map(|snapshot| recommender.coverage(&profile, snapshot));

        info!("{} recommendations computed", recommendations.len());
        print_json(&json!({
            "recommendations": recommendations,
            "coverage": coverage,
        }))?;
    }

    Ok(())
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
