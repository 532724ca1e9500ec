mod emerging;
pub mod models;
pub mod recommender;
mod skill_gap;
pub mod transition;

pub use models::{
    Recommendation, RecommendationKind, RecommendationSettings, SkillCoverage, SkillDemand,
};
pub use recommender::{RecommendationEngine, DEFAULT_MAX_RESULTS};
