use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Label used when no seniority rule wins outright.
pub const UNSPECIFIED_SENIORITY: &str = "unspecified";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Language,
    Framework,
    Tool,
    Skill,
    Domain,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Language => "language",
            Category::Framework => "framework",
            Category::Tool => "tool",
            Category::Skill => "skill",
            Category::Domain => "domain",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A posting as handed over by the ingestion side: plain text, HTML already stripped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPosting {
    pub offer_id: String,
    pub sector_id: String,
    pub text: String,
}

/// One occurrence of a keyword in a posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordMatch {
    pub keyword: String,
    pub category: Category,
    pub confidence: f64, // 0.0 – 1.0
    /// Character offset (not byte offset) of the match start.
    pub position: usize,
    pub context_snippet: String,
}

/// Heuristic side signals pulled from the posting body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostingSignals {
    pub required_experience_years: Option<u32>,
    pub salary_mentions: Vec<String>,
    pub category_summary: BTreeMap<Category, Vec<String>>,
    pub top_category: Option<Category>,
}

/// Structured output for one posting. Handed to storage and aggregation as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub offer_id: String,
    pub sector_id: String,
    /// Sorted by confidence desc, then position asc, then keyword asc.
    pub keywords: Vec<KeywordMatch>,
    pub seniority: String,
    pub signals: PostingSignals,
    pub analyzed_at: DateTime<Utc>,
}

impl AnalysisResult {
    /// Match count per distinct keyword, in keyword order.
    pub fn keyword_counts(&self) -> BTreeMap<&str, (Category, u64)> {
        let mut counts: BTreeMap<&str, (Category, u64)> = BTreeMap::new();
        for m in &self.keywords {
            counts
                .entry(m.keyword.as_str())
                .or_insert((m.category, 0))
                .1 += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_match(keyword: &str, position: usize) -> KeywordMatch {
        KeywordMatch {
            keyword: keyword.to_string(),
            category: Category::Language,
            confidence: 0.9,
            position,
            context_snippet: String::new(),
        }
    }

    #[test]
    fn test_category_serde_snake_case() {
        let json = serde_json::to_string(&Category::Framework).unwrap();
        assert_eq!(json, r#""framework""#);
        let parsed: Category = serde_json::from_str(r#""domain""#).unwrap();
        assert_eq!(parsed, Category::Domain);
    }

    #[test]
    fn test_keyword_counts_groups_occurrences() {
        let result = AnalysisResult {
            offer_id: "o-1".to_string(),
            sector_id: "tech".to_string(),
            keywords: vec![
                make_match("Python", 3),
                make_match("Rust", 10),
                make_match("Python", 20),
            ],
            seniority: UNSPECIFIED_SENIORITY.to_string(),
            signals: PostingSignals::default(),
            analyzed_at: Utc::now(),
        };
        let counts = result.keyword_counts();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts["Python"].1, 2);
        assert_eq!(counts["Rust"].1, 1);
    }
}
