//! Posting signals: experience requirement, salary mentions, and a per-category
//! summary of the extracted keywords. Heuristic and English/French only.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::models::analysis::{Category, KeywordMatch, PostingSignals};

/// "5 years of experience", "3+ yrs experience", "2 ans d'expérience".
static EXPERIENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(\d{1,2})\s*\+?\s*(?:years?|yrs?|ans?|années?)\s+(?:of\s+|d['’]\s*|de\s+)?(?:professional\s+|relevant\s+)?(?:experience|expérience)",
    )
    .expect("experience pattern is valid")
});

/// Currency-anchored amounts only: "$120,000", "€50k", "55k€", "60 000 euros".
static SALARY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)[$€£]\s?\d{1,3}(?:[,\s]\d{3})*(?:\.\d+)?\s?k?\b|\b\d{1,3}(?:[,.\s]\d{3})*\s?(?:k\s?)?(?:€|\$|£|euros?\b|eur\b|usd\b)",
    )
    .expect("salary pattern is valid")
});

pub fn compute_signals(text: &str, keywords: &[KeywordMatch]) -> PostingSignals {
    let category_summary = summarize_categories(keywords);
    let top_category = top_category(&category_summary);

    PostingSignals {
        required_experience_years: required_experience_years(text),
        salary_mentions: salary_mentions(text),
        category_summary,
        top_category,
    }
}

/// First explicit experience requirement, in years.
pub fn required_experience_years(text: &str) -> Option<u32> {
    EXPERIENCE_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Distinct salary strings in order of appearance.
pub fn salary_mentions(text: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    SALARY_RE
        .find_iter(text)
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

fn summarize_categories(keywords: &[KeywordMatch]) -> BTreeMap<Category, Vec<String>> {
    let mut grouped: BTreeMap<Category, BTreeSet<&str>> = BTreeMap::new();
    for m in keywords {
        grouped.entry(m.category).or_default().insert(m.keyword.as_str());
    }
    grouped
        .into_iter()
        .map(|(cat, kws)| (cat, kws.into_iter().map(String::from).collect()))
        .collect()
}

/// Category with the most distinct keywords; ties go to the earlier category.
fn top_category(summary: &BTreeMap<Category, Vec<String>>) -> Option<Category> {
    let mut best: Option<(Category, usize)> = None;
    for (cat, kws) in summary {
        if best.map_or(true, |(_, n)| kws.len() > n) {
            best = Some((*cat, kws.len()));
        }
    }
    best.map(|(cat, _)| cat)
}
