//! # Chain/Brand Matcher
//!
//! This module detects known restaurant-chain names in a normalized query
//! and narrows the menu-search scope to that chain. Detection is fuzzy
//! (case-insensitive, tolerant of single-character edits like "mtsuya" for
//! "Matsuya") with a per-chain threshold. The matched substring is NOT
//! removed from the query: menu-item names include the chain name, so
//! downstream matching still wants it. Only the scope is narrowed.

use crate::config::DEFAULT_CHAIN_MATCH_THRESHOLD;
use crate::fuzzy_matcher::edit_similarity;

/// One known chain: its canonical name, the database scope it maps to, and
/// common misspellings used as additional fuzzy targets
#[derive(Debug, Clone)]
pub struct ChainEntry {
    /// Canonical lower-case chain name
    pub name: String,
    /// Database scope identifier for this chain's menu
    pub scope: String,
    /// Alternate spellings matched with the same threshold
    pub aliases: Vec<String>,
    /// Minimum similarity for this chain to match
    pub threshold: f64,
}

impl ChainEntry {
    pub fn new(name: &str, scope: &str, aliases: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            scope: scope.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            threshold: DEFAULT_CHAIN_MATCH_THRESHOLD,
        }
    }
}

/// A detected chain mention
#[derive(Debug, Clone, PartialEq)]
pub struct ChainMatch {
    /// Canonical chain name
    pub chain: String,
    /// Scope identifier for the local lookup
    pub scope: String,
    /// Similarity of the best-matching token
    pub score: f64,
}

/// The static chain-name table
///
/// Passed explicitly into the resolver rather than held in global state, so
/// callers can supply their own chains and thresholds.
#[derive(Debug, Clone)]
pub struct ChainTable {
    entries: Vec<ChainEntry>,
}

impl ChainTable {
    pub fn new(entries: Vec<ChainEntry>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Detect a chain mention anywhere in normalized query text
    ///
    /// Compares every token (and adjacent token pair, for multi-word chain
    /// names) against each chain name and its aliases. The best match at or
    /// above its chain's threshold wins; ties keep the earlier entry, so
    /// detection is deterministic.
    pub fn detect(&self, normalized: &str) -> Option<ChainMatch> {
        let tokens: Vec<&str> = normalized.split_whitespace().collect();
        let mut windows: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
        for pair in tokens.windows(2) {
            windows.push(pair.join(" "));
        }

        let mut best: Option<ChainMatch> = None;
        for entry in &self.entries {
            let mut targets = vec![entry.name.as_str()];
            targets.extend(entry.aliases.iter().map(String::as_str));

            for window in &windows {
                for target in &targets {
                    let score = edit_similarity(window, target);
                    if score >= entry.threshold
                        && best.as_ref().is_none_or(|b| score > b.score)
                    {
                        best = Some(ChainMatch {
                            chain: entry.name.clone(),
                            scope: entry.scope.clone(),
                            score,
                        });
                    }
                }
            }
        }

        if let Some(found) = &best {
            log::debug!(
                "Chain detected: {} (scope {}, score {:.3})",
                found.chain,
                found.scope,
                found.score
            );
        }
        best
    }
}

impl Default for ChainTable {
    fn default() -> Self {
        Self::new(vec![
            ChainEntry::new("matsuya", "matsuya", &["matuya", "mastuya"]),
            ChainEntry::new("sukiya", "sukiya", &["sukia"]),
            ChainEntry::new("yoshinoya", "yoshinoya", &["yoshinoa"]),
            ChainEntry::new("mcdonalds", "mcdonalds", &["mcdonald", "macdonalds", "mcd"]),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::normalize;

    fn detect(raw: &str) -> Option<ChainMatch> {
        let query = normalize(raw).unwrap();
        ChainTable::default().detect(&query.normalized)
    }

    #[test]
    fn test_exact_chain_name() {
        let found = detect("Matsuya Beef Bowl regular").unwrap();
        assert_eq!(found.chain, "matsuya");
        assert_eq!(found.scope, "matsuya");
        assert_eq!(found.score, 1.0);
    }

    #[test]
    fn test_single_edit_tolerated() {
        let found = detect("mtsuya beef bowl").unwrap();
        assert_eq!(found.chain, "matsuya");
        assert!(found.score >= 0.8);
    }

    #[test]
    fn test_case_insensitive() {
        let found = detect("SUKIYA beef bowl").unwrap();
        assert_eq!(found.chain, "sukiya");
    }

    #[test]
    fn test_unrelated_chain_not_matched() {
        // "mtsuya" is close to matsuya but far from every other chain
        let found = detect("mtsuya beef bowl").unwrap();
        assert_ne!(found.chain, "sukiya");
        assert!(detect("2 eggs and toast").is_none());
        assert!(detect("homemade beef stew").is_none());
    }

    #[test]
    fn test_chain_mention_mid_query() {
        let found = detect("large fries from mcdonalds").unwrap();
        assert_eq!(found.scope, "mcdonalds");
    }
}
