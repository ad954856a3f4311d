//! # Fuzzy Food Matcher
//!
//! This module scores candidate menu entries against a normalized query and
//! decides whether the best one is confident enough to auto-resolve.
//!
//! ## Scoring
//!
//! Each candidate name is scored by a weighted average of token-set overlap
//! (Jaccard, weight 0.6) and normalized edit-distance similarity
//! (weight 0.4). Token overlap is weighted higher because menu names share
//! many tokens but differ in size/variant words. Scores are pure functions
//! of the two strings; identical inputs always produce identical scores and
//! ordering.
//!
//! ## Outcome policy
//!
//! - top score >= high threshold with a clear margin over the runner-up:
//!   confident single match
//! - several candidates within the margin of the top score (typically the
//!   same item in different sizes): ambiguous cluster, size-ordered for
//!   presentation (small -> regular -> large)
//! - top score below the low threshold: candidate set is discarded and the
//!   pipeline escalates to the next data source

use crate::config::ResolverConfig;
use crate::food_model::{FoodRecord, MatchCandidate};
use crate::normalizer::{clean_text, tokenize};
use std::collections::HashSet;

/// Levenshtein distance between two strings, by character
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let len_a = a_chars.len();
    let len_b = b_chars.len();

    let mut matrix = vec![vec![0usize; len_b + 1]; len_a + 1];

    #[allow(clippy::needless_range_loop)]
    for i in 0..=len_a {
        matrix[i][0] = i;
    }
    for j in 0..=len_b {
        matrix[0][j] = j;
    }

    for i in 1..=len_a {
        for j in 1..=len_b {
            let cost = if a_chars[i - 1] == b_chars[j - 1] { 0 } else { 1 };
            matrix[i][j] = (matrix[i - 1][j] + 1)
                .min(matrix[i][j - 1] + 1)
                .min(matrix[i - 1][j - 1] + cost);
        }
    }

    matrix[len_a][len_b]
}

/// Edit-distance similarity normalized to [0, 1]
pub fn edit_similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / longest as f64
}

/// Jaccard overlap between two token sets
pub fn token_overlap(a: &[String], b: &[String]) -> f64 {
    let set_a: HashSet<&str> = a.iter().map(String::as_str).collect();
    let set_b: HashSet<&str> = b.iter().map(String::as_str).collect();
    let union = set_a.union(&set_b).count();
    if union == 0 {
        return 1.0;
    }
    set_a.intersection(&set_b).count() as f64 / union as f64
}

/// Score one candidate name against the query text
///
/// Returns the combined score and the query tokens that also appear in the
/// candidate name (the matched-field explanation).
pub fn score_candidate(
    query_text: &str,
    candidate_name: &str,
    config: &ResolverConfig,
) -> (f64, Vec<String>) {
    let query_clean = clean_text(query_text);
    let name_clean = clean_text(candidate_name);
    let query_tokens = tokenize(&query_clean);
    let name_tokens = tokenize(&name_clean);

    let overlap = token_overlap(&query_tokens, &name_tokens);
    let edit = edit_similarity(&query_clean, &name_clean);
    let score = config.token_weight * overlap + config.edit_weight * edit;

    let name_set: HashSet<&str> = name_tokens.iter().map(String::as_str).collect();
    let mut matched = Vec::new();
    for token in query_tokens {
        if name_set.contains(token.as_str()) && !matched.contains(&token) {
            matched.push(token);
        }
    }

    (score, matched)
}

/// Score and rank a candidate set, descending by score
///
/// Ties break on name so ranking is deterministic for identical inputs.
pub fn rank(query_text: &str, records: Vec<FoodRecord>, config: &ResolverConfig) -> Vec<MatchCandidate> {
    let mut candidates: Vec<MatchCandidate> = records
        .into_iter()
        .map(|record| {
            let (score, matched_tokens) = score_candidate(query_text, &record.name, config);
            MatchCandidate {
                record,
                score,
                matched_tokens,
            }
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.record.name.cmp(&b.record.name))
    });
    candidates
}

/// What the matcher concluded from a ranked candidate set
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    /// Single candidate above the high threshold with a clear margin
    Confident(MatchCandidate),
    /// Plausible candidates within the margin of the top score, ordered for
    /// presentation
    Ambiguous(Vec<MatchCandidate>),
    /// Best score is under the low threshold; try the next data source
    BelowThreshold,
}

/// Apply the confidence thresholds to a ranked candidate list
pub fn evaluate(ranked: &[MatchCandidate], config: &ResolverConfig) -> MatchOutcome {
    let Some(top) = ranked.first() else {
        return MatchOutcome::BelowThreshold;
    };
    if top.score < config.low_confidence {
        log::debug!(
            "Top candidate '{}' scored {:.3}, below the low-confidence threshold",
            top.record.name,
            top.score
        );
        return MatchOutcome::BelowThreshold;
    }

    let cluster: Vec<MatchCandidate> = ranked
        .iter()
        .filter(|c| top.score - c.score <= config.ambiguity_margin)
        .cloned()
        .collect();

    if top.score >= config.high_confidence && cluster.len() == 1 {
        log::debug!(
            "Confident match '{}' at {:.3}",
            top.record.name,
            top.score
        );
        return MatchOutcome::Confident(top.clone());
    }

    MatchOutcome::Ambiguous(order_cluster(cluster))
}

// Size words recognized in variant labels and item names.
const SIZE_RANKS: &[(&str, u8)] = &[
    ("mini", 0),
    ("small", 0),
    ("regular", 1),
    ("medium", 1),
    ("large", 2),
    ("big", 2),
    ("mega", 3),
    ("jumbo", 3),
    ("grande", 3),
    ("xl", 3),
];

/// Canonical size position (small -> regular -> large) of a record
fn size_rank(record: &FoodRecord) -> u8 {
    let label = record
        .variant
        .clone()
        .unwrap_or_else(|| record.name.clone());
    for token in tokenize(&clean_text(&label)) {
        for (word, rank) in SIZE_RANKS {
            if token == *word {
                return *rank;
            }
        }
    }
    1
}

/// The candidate name with size words removed
fn base_name(record: &FoodRecord) -> String {
    tokenize(&clean_text(&record.name))
        .into_iter()
        .filter(|token| SIZE_RANKS.iter().all(|(word, _)| token != word))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Order an ambiguity cluster for deterministic presentation
///
/// A cluster of size variants of the same base item is shown in canonical
/// size order; otherwise the score ordering from ranking stands.
fn order_cluster(mut cluster: Vec<MatchCandidate>) -> Vec<MatchCandidate> {
    if cluster.len() > 1 {
        let base = base_name(&cluster[0].record);
        if cluster.iter().all(|c| base_name(&c.record) == base) {
            cluster.sort_by(|a, b| {
                size_rank(&a.record)
                    .cmp(&size_rank(&b.record))
                    .then_with(|| a.record.name.cmp(&b.record.name))
            });
        }
    }
    cluster
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::food_model::Source;

    fn record(name: &str) -> FoodRecord {
        FoodRecord::new(name, 500.0, 20.0, 15.0, 60.0, Source::Local)
    }

    #[test]
    fn test_levenshtein_basics() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("egg", "egg"), 0);
        assert_eq!(levenshtein("mtsuya", "matsuya"), 1);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
    }

    #[test]
    fn test_edit_similarity_range() {
        assert_eq!(edit_similarity("", ""), 1.0);
        assert_eq!(edit_similarity("egg", "egg"), 1.0);
        let sim = edit_similarity("mtsuya", "matsuya");
        assert!((sim - (1.0 - 1.0 / 7.0)).abs() < 1e-9);
    }

    #[test]
    fn test_token_overlap() {
        let a = vec!["beef".to_string(), "bowl".to_string()];
        let b = vec!["beef".to_string(), "bowl".to_string(), "large".to_string()];
        assert!((token_overlap(&a, &b) - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(token_overlap(&a, &a), 1.0);
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let config = ResolverConfig::default();
        let (s1, m1) = score_candidate("matsuya beef bowl", "Matsuya Beef Bowl (regular)", &config);
        let (s2, m2) = score_candidate("matsuya beef bowl", "Matsuya Beef Bowl (regular)", &config);
        assert_eq!(s1, s2);
        assert_eq!(m1, m2);
    }

    #[test]
    fn test_exact_match_scores_one() {
        let config = ResolverConfig::default();
        let (score, matched) =
            score_candidate("matsuya beef bowl regular", "Matsuya Beef Bowl (regular)", &config);
        assert!((score - 1.0).abs() < 1e-9);
        assert_eq!(matched, vec!["matsuya", "beef", "bowl", "regular"]);
    }

    #[test]
    fn test_plural_query_still_overlaps() {
        let config = ResolverConfig::default();
        let (score, _) = score_candidate("eggs", "egg", &config);
        assert!(score >= config.high_confidence, "score was {score}");
    }

    #[test]
    fn test_confident_outcome() {
        let config = ResolverConfig::default();
        let ranked = rank(
            "matsuya beef bowl regular",
            vec![
                record("Matsuya Beef Bowl (regular)"),
                record("Matsuya Beef Bowl (large)"),
                record("Matsuya Pork Bowl (regular)"),
            ],
            &config,
        );
        match evaluate(&ranked, &config) {
            MatchOutcome::Confident(top) => {
                assert_eq!(top.record.name, "Matsuya Beef Bowl (regular)");
            }
            other => panic!("expected Confident, got {other:?}"),
        }
    }

    #[test]
    fn test_size_cluster_is_ambiguous_and_size_ordered() {
        let config = ResolverConfig::default();
        let ranked = rank(
            "sukiya beef bowl",
            vec![
                record("Sukiya Beef Bowl (large)"),
                record("Sukiya Beef Bowl (small)"),
                record("Sukiya Beef Bowl (regular)"),
            ],
            &config,
        );
        match evaluate(&ranked, &config) {
            MatchOutcome::Ambiguous(cluster) => {
                let names: Vec<&str> = cluster.iter().map(|c| c.record.name.as_str()).collect();
                assert_eq!(
                    names,
                    vec![
                        "Sukiya Beef Bowl (small)",
                        "Sukiya Beef Bowl (regular)",
                        "Sukiya Beef Bowl (large)",
                    ]
                );
            }
            other => panic!("expected Ambiguous, got {other:?}"),
        }
    }

    #[test]
    fn test_unrelated_candidates_fall_below_threshold() {
        let config = ResolverConfig::default();
        let ranked = rank(
            "homemade lentil curry",
            vec![record("Big Mac"), record("Sukiya Beef Bowl (regular)")],
            &config,
        );
        assert_eq!(evaluate(&ranked, &config), MatchOutcome::BelowThreshold);
    }

    #[test]
    fn test_empty_candidate_set() {
        let config = ResolverConfig::default();
        assert_eq!(evaluate(&[], &config), MatchOutcome::BelowThreshold);
    }
}
