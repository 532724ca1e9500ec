//! Compiled, validated sector configuration.
//!
//! A `SectorConfig` is built once from a `SectorDocument` and never mutated; a
//! reload compiles a fresh one and swaps it in whole. Every matcher is compiled
//! here so a broken sector fails at load time instead of matching nothing.

use std::collections::HashSet;

use regex::{Regex, RegexBuilder};

use crate::errors::EngineError;
use crate::models::analysis::Category;
use crate::sector::document::{KeywordEntry, MatcherSpec, SectorDocument, SeniorityRuleEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatcherKind {
    Literal,
    Regex,
}

/// A single compiled, case-insensitive matcher.
#[derive(Debug, Clone)]
pub struct Matcher {
    pub kind: MatcherKind,
    pub source: String,
    pub regex: Regex,
}

#[derive(Debug, Clone)]
pub struct KeywordPattern {
    pub keyword: String,
    pub category: Category,
    pub matchers: Vec<Matcher>,
    pub base_confidence: f64,
}

#[derive(Debug, Clone)]
pub struct IndicatorPhrase {
    pub phrase: String,
    pub regex: Regex,
}

#[derive(Debug, Clone)]
pub struct SeniorityRule {
    pub label: String,
    pub indicators: Vec<IndicatorPhrase>,
    pub weight: f64,
}

#[derive(Debug, Clone)]
pub struct SectorConfig {
    pub id: String,
    pub name: String,
    pub keyword_patterns: Vec<KeywordPattern>,
    pub seniority_rules: Vec<SeniorityRule>,
    pub confidence_threshold: f64,
    pub min_keyword_frequency: u32,
}

impl SectorConfig {
    /// Validates a document and compiles all of its matchers.
    pub fn compile(doc: SectorDocument) -> Result<Self, EngineError> {
        let id = doc.id.trim().to_string();
        if id.is_empty() {
            return Err(EngineError::config("<unnamed>", "sector id is empty"));
        }

        let threshold = doc.confidence_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(EngineError::config(
                &id,
                format!("confidence_threshold {threshold} is outside [0, 1]"),
            ));
        }

        let mut seen = HashSet::new();
        let mut keyword_patterns = Vec::with_capacity(doc.keywords.len());
        for entry in doc.keywords {
            let pattern = compile_keyword(&id, threshold, entry)?;
            if !seen.insert(pattern.keyword.to_lowercase()) {
                return Err(EngineError::config(
                    &id,
                    format!("duplicate keyword '{}'", pattern.keyword),
                ));
            }
            keyword_patterns.push(pattern);
        }

        let seniority_rules = doc
            .seniority_rules
            .into_iter()
            .map(|rule| compile_seniority_rule(&id, rule))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SectorConfig {
            name: doc.name.unwrap_or_else(|| id.clone()),
            id,
            keyword_patterns,
            seniority_rules,
            confidence_threshold: threshold,
            min_keyword_frequency: doc.min_keyword_frequency,
        })
    }

    /// Case-insensitive lookup, folded with `to_lowercase` like the duplicate check.
    pub fn pattern(&self, keyword: &str) -> Option<&KeywordPattern> {
        let wanted = keyword.trim().to_lowercase();
        self.keyword_patterns
            .iter()
            .find(|p| p.keyword.to_lowercase() == wanted)
    }
}

fn compile_keyword(
    sector_id: &str,
    threshold: f64,
    entry: KeywordEntry,
) -> Result<KeywordPattern, EngineError> {
    let keyword = entry.keyword.trim().to_string();
    if keyword.is_empty() {
        return Err(EngineError::config(sector_id, "keyword name is empty"));
    }
    if entry.matchers.is_empty() {
        return Err(EngineError::config(
            sector_id,
            format!("keyword '{keyword}' declares no matchers"),
        ));
    }
    let base = entry.base_confidence;
    if !(0.0..=1.0).contains(&base) {
        return Err(EngineError::config(
            sector_id,
            format!("keyword '{keyword}' has base_confidence {base} outside [0, 1]"),
        ));
    }
    // Position/isolation weights never lift a match above ~1.1x base, and an
    // isolated early match must be reportable.
    if base < threshold {
        return Err(EngineError::config(
            sector_id,
            format!(
                "keyword '{keyword}' has base_confidence {base} below the sector threshold {threshold}"
            ),
        ));
    }

    let mut matchers = Vec::with_capacity(entry.matchers.len() + 1);
    for spec in &entry.matchers {
        matchers.push(compile_matcher(sector_id, &keyword, spec)?);
    }

    // The canonical name is always matchable as a literal.
    let folded = keyword.to_lowercase();
    let has_canonical = matchers
        .iter()
        .any(|m| m.kind == MatcherKind::Literal && m.source.to_lowercase() == folded);
    if !has_canonical {
        matchers.push(compile_matcher(
            sector_id,
            &keyword,
            &MatcherSpec::Literal(keyword.clone()),
        )?);
    }

    Ok(KeywordPattern {
        keyword,
        category: entry.category,
        matchers,
        base_confidence: base,
    })
}

fn compile_matcher(
    sector_id: &str,
    keyword: &str,
    spec: &MatcherSpec,
) -> Result<Matcher, EngineError> {
    let (kind, source, pattern) = match spec {
        MatcherSpec::Literal(lit) => {
            let lit = lit.trim();
            (MatcherKind::Literal, lit.to_string(), regex::escape(lit))
        }
        MatcherSpec::Regex(re) => (MatcherKind::Regex, re.clone(), re.clone()),
    };

    if source.is_empty() {
        return Err(EngineError::config(
            sector_id,
            format!("keyword '{keyword}' has an empty matcher"),
        ));
    }

    let regex = build_case_insensitive(&pattern).map_err(|e| {
        EngineError::config(
            sector_id,
            format!("keyword '{keyword}' has an invalid matcher '{source}': {e}"),
        )
    })?;

    if regex.is_match("") {
        return Err(EngineError::config(
            sector_id,
            format!("keyword '{keyword}' matcher '{source}' matches the empty string"),
        ));
    }

    Ok(Matcher {
        kind,
        source,
        regex,
    })
}

fn compile_seniority_rule(
    sector_id: &str,
    rule: SeniorityRuleEntry,
) -> Result<SeniorityRule, EngineError> {
    let label = rule.label.trim().to_string();
    if label.is_empty() {
        return Err(EngineError::config(sector_id, "seniority rule has an empty label"));
    }
    if !rule.weight.is_finite() || rule.weight < 0.0 {
        return Err(EngineError::config(
            sector_id,
            format!("seniority rule '{label}' has invalid weight {}", rule.weight),
        ));
    }
    if rule.indicators.is_empty() {
        return Err(EngineError::config(
            sector_id,
            format!("seniority rule '{label}' has no indicator phrases"),
        ));
    }

    let mut indicators = Vec::with_capacity(rule.indicators.len());
    for phrase in rule.indicators {
        let phrase = phrase.trim().to_string();
        if phrase.is_empty() {
            return Err(EngineError::config(
                sector_id,
                format!("seniority rule '{label}' has an empty indicator phrase"),
            ));
        }
        let regex = build_case_insensitive(&regex::escape(&phrase)).map_err(|e| {
            EngineError::config(sector_id, format!("indicator '{phrase}' failed to compile: {e}"))
        })?;
        indicators.push(IndicatorPhrase { phrase, regex });
    }

    Ok(SeniorityRule {
        label,
        indicators,
        weight: rule.weight,
    })
}

fn build_case_insensitive(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_entry(keyword: &str, matchers: Vec<MatcherSpec>, base: f64) -> KeywordEntry {
        KeywordEntry {
            keyword: keyword.to_string(),
            category: Category::Language,
            matchers,
            base_confidence: base,
        }
    }

    fn make_doc(keywords: Vec<KeywordEntry>) -> SectorDocument {
        SectorDocument {
            id: "tech".to_string(),
            name: Some("Technology".to_string()),
            confidence_threshold: 0.5,
            min_keyword_frequency: 1,
            keywords,
            seniority_rules: vec![SeniorityRuleEntry {
                label: "senior".to_string(),
                indicators: vec!["senior".to_string(), "lead".to_string()],
                weight: 1.0,
            }],
        }
    }

    fn lit(s: &str) -> MatcherSpec {
        MatcherSpec::Literal(s.to_string())
    }

    fn expect_config_error(doc: SectorDocument, needle: &str) {
        match SectorConfig::compile(doc) {
            Err(EngineError::Config { reason, .. }) => assert!(
                reason.contains(needle),
                "expected reason containing '{needle}', got '{reason}'"
            ),
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_document_compiles() {
        let doc = make_doc(vec![
            make_entry("Python", vec![lit("python")], 0.9),
            make_entry("Go", vec![MatcherSpec::Regex(r"golang|go\d".to_string())], 0.7),
        ]);
        let config = SectorConfig::compile(doc).unwrap();
        assert_eq!(config.id, "tech");
        assert_eq!(config.name, "Technology");
        assert_eq!(config.keyword_patterns.len(), 2);
        assert_eq!(config.seniority_rules[0].indicators.len(), 2);
    }

    #[test]
    fn test_duplicate_keyword_is_config_error() {
        let doc = make_doc(vec![
            make_entry("Python", vec![lit("python")], 0.9),
            make_entry("python", vec![lit("py")], 0.9),
        ]);
        expect_config_error(doc, "duplicate keyword");
    }

    #[test]
    fn test_threshold_out_of_range_is_config_error() {
        let mut doc = make_doc(vec![]);
        doc.confidence_threshold = 1.5;
        expect_config_error(doc, "confidence_threshold");
    }

    #[test]
    fn test_nan_threshold_is_config_error() {
        let mut doc = make_doc(vec![]);
        doc.confidence_threshold = f64::NAN;
        expect_config_error(doc, "confidence_threshold");
    }

    #[test]
    fn test_empty_matcher_list_is_config_error() {
        let doc = make_doc(vec![make_entry("Python", vec![], 0.9)]);
        expect_config_error(doc, "no matchers");
    }

    #[test]
    fn test_invalid_regex_is_config_error() {
        let doc = make_doc(vec![make_entry(
            "Python",
            vec![MatcherSpec::Regex("py(thon".to_string())],
            0.9,
        )]);
        expect_config_error(doc, "invalid matcher");
    }

    #[test]
    fn test_empty_matching_regex_is_config_error() {
        let doc = make_doc(vec![make_entry(
            "Python",
            vec![MatcherSpec::Regex("x*".to_string())],
            0.9,
        )]);
        expect_config_error(doc, "empty string");
    }

    #[test]
    fn test_base_confidence_below_threshold_is_config_error() {
        let doc = make_doc(vec![make_entry("Python", vec![lit("python")], 0.3)]);
        expect_config_error(doc, "below the sector threshold");
    }

    #[test]
    fn test_negative_seniority_weight_is_config_error() {
        let mut doc = make_doc(vec![]);
        doc.seniority_rules[0].weight = -1.0;
        expect_config_error(doc, "invalid weight");
    }

    #[test]
    fn test_canonical_keyword_added_as_implicit_matcher() {
        let doc = make_doc(vec![make_entry("Kubernetes", vec![lit("k8s")], 0.8)]);
        let config = SectorConfig::compile(doc).unwrap();
        let pattern = config.pattern("kubernetes").unwrap();
        assert_eq!(pattern.matchers.len(), 2);
        assert!(pattern.matchers.iter().any(|m| m.source == "Kubernetes"));
    }

    #[test]
    fn test_canonical_literal_not_duplicated() {
        let doc = make_doc(vec![make_entry("Python", vec![lit("python")], 0.9)]);
        let config = SectorConfig::compile(doc).unwrap();
        assert_eq!(config.keyword_patterns[0].matchers.len(), 1);
    }

    #[test]
    fn test_non_ascii_keyword_folds_case() {
        let doc = make_doc(vec![make_entry("Développement", vec![lit("DÉVELOPPEMENT")], 0.8)]);
        let config = SectorConfig::compile(doc).unwrap();
        let pattern = config.pattern("développement").unwrap();
        assert_eq!(pattern.keyword, "Développement");
        assert_eq!(pattern.matchers.len(), 1);
        assert!(config.pattern("DÉVELOPPEMENT").is_some());
    }

    #[test]
    fn test_non_ascii_duplicate_keyword_is_config_error() {
        let doc = make_doc(vec![
            make_entry("Développement", vec![lit("dev")], 0.8),
            make_entry("DÉVELOPPEMENT", vec![lit("développement")], 0.8),
        ]);
        expect_config_error(doc, "duplicate keyword");
    }

    #[test]
    fn test_literal_matchers_are_escaped() {
        let doc = make_doc(vec![make_entry("C++", vec![lit("c++")], 0.9)]);
        let config = SectorConfig::compile(doc).unwrap();
        let regex = &config.keyword_patterns[0].matchers[0].regex;
        assert!(regex.is_match("Modern C++ required"));
        assert!(!regex.is_match("cc"));
    }
}
