//! Keyword Extractor: scans posting text against a sector's compiled keyword table.
//!
//! Algorithm:
//! 1. Collect every case-insensitive occurrence of every matcher of every keyword
//! 2. Score: base_confidence × position_weight × isolation_weight, clamped to [0, 1]
//! 3. Drop candidates under the sector threshold
//! 4. Resolve overlaps among the survivors: word-bounded spans first, then longest
//!    span (then earlier start, then declaration order); any span touching an
//!    accepted span is dropped
//! 5. Sort: confidence desc, position asc, keyword asc
//!
//! Each surviving occurrence is reported separately; counting is the caller's job.

use std::collections::BTreeMap;

use crate::analysis::text::{context_snippet, is_word_bounded, CharOffsets};
use crate::models::analysis::KeywordMatch;
use crate::sector::SectorConfig;

/// Tunable weights for match scoring.
#[derive(Debug, Clone)]
pub struct ExtractionSettings {
    /// Leading share of the text (by characters) treated as title/summary.
    pub lead_fraction: f64,
    /// Multiplier for matches starting inside the lead.
    pub lead_boost: f64,
    /// Multiplier for matches embedded in a longer word.
    pub embedded_penalty: f64,
    pub context_radius: usize,
    pub max_snippet_chars: usize,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            lead_fraction: 0.2,
            lead_boost: 1.1,
            embedded_penalty: 0.05,
            context_radius: 40,
            max_snippet_chars: 160,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeywordExtractor {
    settings: ExtractionSettings,
}

/// A scored matcher hit before overlap resolution. `start`/`end` are bytes,
/// `position` is in characters.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    pattern_idx: usize,
    start: usize,
    end: usize,
    char_len: usize,
    position: usize,
    bounded: bool,
    confidence: f64,
}

impl KeywordExtractor {
    pub fn new(settings: ExtractionSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ExtractionSettings {
        &self.settings
    }

    pub fn extract(&self, text: &str, config: &SectorConfig) -> Vec<KeywordMatch> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let offsets = CharOffsets::new(text);
        let total_chars = offsets.char_len();
        let candidates: Vec<Candidate> = collect_candidates(text, config, &offsets)
            .into_iter()
            .map(|mut c| {
                let base = config.keyword_patterns[c.pattern_idx].base_confidence;
                c.confidence = self.score(base, c.position, total_chars, c.bounded);
                c
            })
            .filter(|c| c.confidence >= config.confidence_threshold)
            .collect();

        let mut matches: Vec<KeywordMatch> = resolve_overlaps(candidates)
            .into_iter()
            .map(|c| {
                let pattern = &config.keyword_patterns[c.pattern_idx];
                KeywordMatch {
                    keyword: pattern.keyword.clone(),
                    category: pattern.category,
                    confidence: c.confidence,
                    position: c.position,
                    context_snippet: context_snippet(
                        text,
                        c.start,
                        c.end,
                        self.settings.context_radius,
                        self.settings.max_snippet_chars,
                    ),
                }
            })
            .collect();

        matches.sort_by(|a, b| {
            b.confidence
                .total_cmp(&a.confidence)
                .then(a.position.cmp(&b.position))
                .then_with(|| a.keyword.cmp(&b.keyword))
        });
        matches
    }

    fn score(&self, base: f64, position: usize, total_chars: usize, bounded: bool) -> f64 {
        let position_weight = if (position as f64) < total_chars as f64 * self.settings.lead_fraction
        {
            self.settings.lead_boost
        } else {
            1.0
        };
        let isolation_weight = if bounded {
            1.0
        } else {
            self.settings.embedded_penalty
        };
        (base * position_weight * isolation_weight).clamp(0.0, 1.0)
    }
}

fn collect_candidates(text: &str, config: &SectorConfig, offsets: &CharOffsets) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    for (pattern_idx, pattern) in config.keyword_patterns.iter().enumerate() {
        for matcher in &pattern.matchers {
            for m in matcher.regex.find_iter(text) {
                if m.is_empty() {
                    continue;
                }
                let position = offsets.char_offset(m.start());
                candidates.push(Candidate {
                    pattern_idx,
                    start: m.start(),
                    end: m.end(),
                    char_len: offsets.char_offset(m.end()) - position,
                    position,
                    bounded: is_word_bounded(text, m.start(), m.end()),
                    confidence: 0.0,
                });
            }
        }
    }
    candidates
}

/// Greedy selection of non-overlapping spans: bounded before embedded, then longest first.
fn resolve_overlaps(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort_by(|a, b| {
        b.bounded
            .cmp(&a.bounded)
            .then(b.char_len.cmp(&a.char_len))
            .then(a.start.cmp(&b.start))
            .then(a.pattern_idx.cmp(&b.pattern_idx))
    });

    // start -> end of accepted spans; disjoint, so only the nearest span
    // starting before `end` can overlap.
    let mut taken: BTreeMap<usize, usize> = BTreeMap::new();
    let mut accepted = Vec::new();
    for c in candidates {
        let overlaps = taken
            .range(..c.end)
            .next_back()
            .is_some_and(|(_, &end)| end > c.start);
        if overlaps {
            continue;
        }
        taken.insert(c.start, c.end);
        accepted.push(c);
    }
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::analysis::Category;
    use crate::sector::document::{KeywordEntry, MatcherSpec, SectorDocument};

    fn make_config(threshold: f64, keywords: Vec<(&str, Category, Vec<MatcherSpec>, f64)>) -> SectorConfig {
        let doc = SectorDocument {
            id: "tech".to_string(),
            name: None,
            confidence_threshold: threshold,
            min_keyword_frequency: 0,
            keywords: keywords
                .into_iter()
                .map(|(keyword, category, matchers, base)| KeywordEntry {
                    keyword: keyword.to_string(),
                    category,
                    matchers,
                    base_confidence: base,
                })
                .collect(),
            seniority_rules: vec![],
        };
        SectorConfig::compile(doc).unwrap()
    }

    fn lit(s: &str) -> Vec<MatcherSpec> {
        vec![MatcherSpec::Literal(s.to_string())]
    }

    fn python_config() -> SectorConfig {
        make_config(0.5, vec![("Python", Category::Language, lit("python"), 0.9)])
    }

    #[test]
    fn test_empty_text_returns_empty() {
        let extractor = KeywordExtractor::default();
        assert!(extractor.extract("", &python_config()).is_empty());
        assert!(extractor.extract("   \n\t ", &python_config()).is_empty());
    }

    #[test]
    fn test_two_python_mentions_are_two_matches() {
        let extractor = KeywordExtractor::default();
        let matches = extractor.extract(
            "We need a Python developer with Python experience",
            &python_config(),
        );
        assert_eq!(matches.len(), 2);
        assert!(matches.iter().all(|m| m.keyword == "Python"));
        assert!(matches.iter().all(|m| m.confidence >= 0.5));
        assert_eq!(matches[0].position, 10);
        assert_eq!(matches[1].position, 32);
    }

    #[test]
    fn test_case_insensitive_match() {
        let extractor = KeywordExtractor::default();
        let matches = extractor.extract("PYTHON and python and PyThOn", &python_config());
        assert_eq!(matches.len(), 3);
    }

    #[test]
    fn test_lead_matches_are_boosted() {
        let extractor = KeywordExtractor::default();
        let text = format!("Python engineer. {}Python.", "filler text ".repeat(20));
        let matches = extractor.extract(&text, &python_config());
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].position, 0);
        assert!((matches[0].confidence - 0.99).abs() < 1e-9);
        assert!((matches[1].confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_embedded_match_is_penalized_below_threshold() {
        let extractor = KeywordExtractor::default();
        let config = make_config(0.5, vec![("Java", Category::Language, lit("java"), 0.9)]);
        let matches = extractor.extract("Strong JavaScript skills wanted", &config);
        assert!(matches.is_empty(), "embedded 'java' must not survive: {matches:?}");
    }

    #[test]
    fn test_embedded_match_survives_zero_threshold_with_low_confidence() {
        let extractor = KeywordExtractor::default();
        let config = make_config(0.0, vec![("Java", Category::Language, lit("java"), 0.9)]);
        let text = format!("{}JavaScript", "x ".repeat(40));
        let matches = extractor.extract(&text, &config);
        assert_eq!(matches.len(), 1);
        assert!(matches[0].confidence < 0.1);
    }

    #[test]
    fn test_longer_keyword_wins_overlap() {
        let extractor = KeywordExtractor::default();
        let config = make_config(
            0.5,
            vec![
                ("Java", Category::Language, lit("java"), 0.9),
                ("JavaScript", Category::Language, lit("javascript"), 0.9),
            ],
        );
        let matches = extractor.extract("JavaScript and Java", &config);
        assert_eq!(matches.len(), 2);
        let keywords: Vec<&str> = matches.iter().map(|m| m.keyword.as_str()).collect();
        assert!(keywords.contains(&"JavaScript"));
        assert!(keywords.contains(&"Java"));
        let java = matches.iter().find(|m| m.keyword == "Java").unwrap();
        assert_eq!(java.position, 15);
    }

    #[test]
    fn test_multi_word_keyword_suppresses_contained_keyword() {
        let extractor = KeywordExtractor::default();
        let config = make_config(
            0.5,
            vec![
                ("Learning", Category::Skill, lit("learning"), 0.6),
                ("Machine Learning", Category::Skill, lit("machine learning"), 0.9),
            ],
        );
        let matches = extractor.extract("Experience with machine learning pipelines", &config);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].keyword, "Machine Learning");
    }

    #[test]
    fn test_embedded_longer_match_does_not_hide_bounded_keyword() {
        let extractor = KeywordExtractor::default();
        let config = make_config(
            0.5,
            vec![
                ("Learning", Category::Skill, lit("learning"), 0.8),
                ("Machine Learning", Category::Skill, lit("machine learning"), 0.9),
            ],
        );
        let text = "Strong AImachine learning background";
        let matches = extractor.extract(text, &config);
        assert_eq!(matches.len(), 1, "{matches:?}");
        assert_eq!(matches[0].keyword, "Learning");
        assert_eq!(matches[0].position, 17);
    }

    #[test]
    fn test_bounded_keyword_wins_over_embedded_at_zero_threshold() {
        let extractor = KeywordExtractor::default();
        let config = make_config(
            0.0,
            vec![
                ("Learning", Category::Skill, lit("learning"), 0.8),
                ("Machine Learning", Category::Skill, lit("machine learning"), 0.9),
            ],
        );
        let matches = extractor.extract("Strong AImachine learning background", &config);
        assert_eq!(matches.len(), 1, "{matches:?}");
        assert_eq!(matches[0].keyword, "Learning");
        assert!(matches[0].confidence >= 0.8);
    }

    #[test]
    fn test_regex_matcher() {
        let extractor = KeywordExtractor::default();
        let config = make_config(
            0.5,
            vec![(
                "Go",
                Category::Language,
                vec![MatcherSpec::Regex(r"golang|go\s+\d\.\d+".to_string())],
                0.8,
            )],
        );
        let matches = extractor.extract("Backend in Golang (Go 1.22)", &config);
        assert_eq!(matches.len(), 2);
        assert!(matches.iter().all(|m| m.keyword == "Go"));
    }

    #[test]
    fn test_sorted_by_confidence_then_position() {
        let extractor = KeywordExtractor::default();
        let config = make_config(
            0.5,
            vec![
                ("Docker", Category::Tool, lit("docker"), 0.7),
                ("Rust", Category::Language, lit("rust"), 0.95),
            ],
        );
        let text = format!("{}Docker, Rust, Docker", "lorem ipsum ".repeat(10));
        let matches = extractor.extract(&text, &config);
        let order: Vec<(&str, usize)> = matches
            .iter()
            .map(|m| (m.keyword.as_str(), m.position))
            .collect();
        assert_eq!(order[0].0, "Rust");
        assert_eq!(order[1].0, "Docker");
        assert_eq!(order[2].0, "Docker");
        assert!(order[1].1 < order[2].1);
    }

    #[test]
    fn test_extract_is_idempotent() {
        let extractor = KeywordExtractor::default();
        let config = make_config(
            0.5,
            vec![
                ("Docker", Category::Tool, lit("docker"), 0.7),
                ("Python", Category::Language, lit("python"), 0.9),
            ],
        );
        let text = "Python, Docker and more Python. Docker compose a plus.";
        let first = extractor.extract(text, &config);
        let second = extractor.extract(text, &config);
        assert_eq!(first, second);
    }

    #[test]
    fn test_word_bounded_keyword_always_found() {
        let extractor = KeywordExtractor::default();
        let config = make_config(
            0.6,
            vec![("Kubernetes", Category::Tool, lit("k8s"), 0.6)],
        );
        let text = "Ops team running workloads on kubernetes at scale";
        let matches = extractor.extract(text, &config);
        assert_eq!(matches.len(), 1);
        assert!(matches[0].confidence >= config.confidence_threshold);
    }

    #[test]
    fn test_positions_are_character_offsets() {
        let extractor = KeywordExtractor::default();
        let text = "Développeur expérimenté — Python";
        let matches = extractor.extract(text, &python_config());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].position, text.chars().count() - "Python".len());
    }

    #[test]
    fn test_snippet_contains_match() {
        let extractor = KeywordExtractor::default();
        let matches = extractor.extract(
            "We need a Python developer with Python experience",
            &python_config(),
        );
        assert!(matches[0].context_snippet.contains("Python"));
        assert!(matches[0].context_snippet.chars().count() <= 160);
    }
}
