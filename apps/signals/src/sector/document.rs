//! Sector documents: the serialized form of a sector configuration, as authored
//! by the configuration owner. Nothing here is validated; see `sector::config`.

use serde::{Deserialize, Serialize};

use crate::models::analysis::Category;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorDocument {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub confidence_threshold: f64,
    #[serde(default)]
    pub min_keyword_frequency: u32,
    #[serde(default)]
    pub keywords: Vec<KeywordEntry>,
    #[serde(default)]
    pub seniority_rules: Vec<SeniorityRuleEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordEntry {
    pub keyword: String,
    pub category: Category,
    #[serde(default)]
    pub matchers: Vec<MatcherSpec>,
    pub base_confidence: f64,
}

/// `{"literal": "python"}` or `{"regex": "py(thon)?3"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatcherSpec {
    Literal(String),
    Regex(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeniorityRuleEntry {
    pub label: String,
    #[serde(default)]
    pub indicators: Vec<String>,
    pub weight: f64,
}
