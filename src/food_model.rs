//! # Food Record Data Model
//!
//! This module defines the data structures flowing through the resolution
//! pipeline: nutrition records, match candidates with their similarity
//! scores, and the three-way resolution outcome.
//!
//! ## Core Concepts
//!
//! - **FoodRecord**: a named nutrition entry (calories plus macros in grams)
//!   with a provenance tag
//! - **MatchCandidate**: a record proposed as a match, with a score in
//!   [0, 1] and the tokens that matched
//! - **ResolutionResult**: the outcome of a resolution call: resolved,
//!   ambiguous (ranked choices for the caller), or unresolved
//!
//! Provenance is a tagged enum rather than a trait hierarchy: records from
//! different sources differ only in where they came from, not in behavior.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a nutrition record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Source {
    /// Matched against the local menu database
    #[serde(rename = "local")]
    Local,
    /// Matched against the OpenFoodFacts online database
    #[serde(rename = "openfoodfacts")]
    OpenFoodFacts,
    /// Synthesized by the local language model
    #[serde(rename = "ai-estimate")]
    AiEstimate,
    /// Stated explicitly by the user as a manual override
    #[serde(rename = "manual")]
    Manual,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Source::Local => "local",
            Source::OpenFoodFacts => "openfoodfacts",
            Source::AiEstimate => "ai-estimate",
            Source::Manual => "manual",
        };
        write!(f, "{tag}")
    }
}

/// A structured nutrition record suitable for logging
///
/// Calories are kcal; protein, fat and carbs are grams. All four are
/// non-negative. Records are never mutated after creation: scaling by a
/// quantity produces a new record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodRecord {
    /// Display name of the food (e.g., "Matsuya Beef Bowl (regular)")
    pub name: String,
    /// Energy in kcal
    pub calories: f64,
    /// Protein in grams
    pub protein: f64,
    /// Fat in grams
    pub fat: f64,
    /// Carbohydrates in grams
    pub carbs: f64,
    /// Provenance of this record
    pub source: Source,
    /// Restaurant chain this item belongs to, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain: Option<String>,
    /// Size or variant label (e.g., "regular", "large")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
}

impl FoodRecord {
    /// Create a new record with the given macros and provenance
    pub fn new(name: &str, calories: f64, protein: f64, fat: f64, carbs: f64, source: Source) -> Self {
        Self {
            name: name.to_string(),
            calories,
            protein,
            fat,
            carbs,
            source,
            chain: None,
            variant: None,
        }
    }

    /// Tag this record with a chain name
    pub fn with_chain(mut self, chain: &str) -> Self {
        self.chain = Some(chain.to_string());
        self
    }

    /// Tag this record with a size/variant label
    pub fn with_variant(mut self, variant: &str) -> Self {
        self.variant = Some(variant.to_string());
        self
    }

    /// Calories derived from the macros alone (4/9/4 rule)
    ///
    /// Manual entries state calories directly; consumers can compare the
    /// stated value against this derived one for display.
    pub fn macro_calories(&self) -> f64 {
        4.0 * self.protein + 9.0 * self.fat + 4.0 * self.carbs
    }
}

impl fmt::Display for FoodRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {:.0} kcal (P {:.1}g / F {:.1}g / C {:.1}g) [{}]",
            self.name, self.calories, self.protein, self.fat, self.carbs, self.source
        )
    }
}

/// A candidate menu entry proposed as a match for a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    /// The candidate record
    pub record: FoodRecord,
    /// Combined similarity score in [0, 1]
    pub score: f64,
    /// Query tokens that also appear in the candidate name
    pub matched_tokens: Vec<String>,
}

/// Why a resolution request ended without a record
#[derive(Debug, Clone, PartialEq)]
pub enum UnresolvedReason {
    /// No data source produced a candidate above the low-confidence threshold
    /// and no estimate was attempted or available
    NoMatch,
    /// The query stated some macros explicitly but not all four; missing
    /// fields are never guessed or zero-filled
    IncompleteOverride(Vec<&'static str>),
    /// The model returned unparsable output twice
    EstimationFailed,
    /// The local model process could not be reached
    ModelUnavailable,
    /// The estimation call exceeded its deadline
    Timeout,
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnresolvedReason::NoMatch => write!(f, "no confident match in any data source"),
            UnresolvedReason::IncompleteOverride(missing) => {
                write!(f, "manual entry is missing: {}", missing.join(", "))
            }
            UnresolvedReason::EstimationFailed => {
                write!(f, "the model returned unparsable output twice")
            }
            UnresolvedReason::ModelUnavailable => write!(f, "the local model is unavailable"),
            UnresolvedReason::Timeout => write!(f, "the estimation call timed out"),
        }
    }
}

/// Outcome of a resolution call
///
/// Ambiguity is not an error: the candidate list is ordered for
/// presentation and the caller re-invokes resolution with a selected index.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionResult {
    /// A single confident record
    Resolved(FoodRecord),
    /// Multiple plausible candidates, ranked descending by score
    Ambiguous(Vec<MatchCandidate>),
    /// No record could be produced; carries the last failure reason
    Unresolved(UnresolvedReason),
}

impl ResolutionResult {
    /// True if this result carries a single resolved record
    pub fn is_resolved(&self) -> bool {
        matches!(self, ResolutionResult::Resolved(_))
    }

    /// The resolved record, if any
    pub fn record(&self) -> Option<&FoodRecord> {
        match self {
            ResolutionResult::Resolved(record) => Some(record),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macro_calories() {
        let record = FoodRecord::new("test", 450.0, 30.0, 15.0, 40.0, Source::Manual);
        // 4*30 + 9*15 + 4*40 = 415
        assert_eq!(record.macro_calories(), 415.0);
    }

    #[test]
    fn test_source_serialization_tags() {
        let json = serde_json::to_string(&Source::AiEstimate).unwrap();
        assert_eq!(json, "\"ai-estimate\"");
        let json = serde_json::to_string(&Source::OpenFoodFacts).unwrap();
        assert_eq!(json, "\"openfoodfacts\"");
    }

    #[test]
    fn test_record_roundtrip() {
        let record = FoodRecord::new("beef bowl", 700.0, 23.0, 25.0, 95.0, Source::Local)
            .with_chain("matsuya")
            .with_variant("regular");
        let json = serde_json::to_string(&record).unwrap();
        let back: FoodRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }

    #[test]
    fn test_display_includes_source() {
        let record = FoodRecord::new("egg", 70.0, 6.0, 5.0, 0.6, Source::Local);
        let text = format!("{record}");
        assert!(text.contains("egg"));
        assert!(text.contains("[local]"));
    }
}
