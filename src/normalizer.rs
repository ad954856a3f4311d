//! # Query Normalizer
//!
//! This module turns raw free-text food descriptions into a [`FoodQuery`]:
//! case-folded, punctuation-stripped text plus an extracted quantity
//! multiplier and optional unit.
//!
//! ## Features
//!
//! - Lower-casing and punctuation stripping (digits and decimal points
//!   survive so "1.5 bowls" and "450 calories" stay intact)
//! - Quantity extraction for `<number><optional unit>` expressions
//!   ("2 eggs", "1.5 bowls rice", "2x cheeseburger")
//! - Numbers that tag macro values ("450 calories", "30g protein") are
//!   never mistaken for quantity multipliers
//! - Shared tokenization helpers used by the fuzzy and chain matchers

use crate::errors::ResolveError;
use regex::Regex;
use std::sync::LazyLock;

/// Matches a bare quantity number: "2", "1.5"
static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:\.\d+)?$").expect("number pattern should be valid"));

/// Matches a multiplier-suffixed quantity: "2x", "1.5x"
static MULTIPLIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)?)x$").expect("multiplier pattern should be valid"));

/// Strips everything except letters, digits, whitespace and decimal points
static STRIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}\s.]").expect("strip pattern should be valid"));

/// Keywords that tag a macro value; a number followed by one of these is a
/// manual-override statement, not a quantity multiplier
const MACRO_KEYWORDS: &[&str] = &[
    "kcal", "calories", "calorie", "cals", "cal", "protein", "prot", "fat", "carbs", "carb", "g",
    "gram", "grams",
];

/// Serving words recognized as quantity units
const QUANTITY_UNITS: &[&str] = &[
    "serving", "servings", "bowl", "bowls", "cup", "cups", "piece", "pieces", "pcs", "plate",
    "plates", "slice", "slices", "can", "cans", "bottle", "bottles", "portion", "portions",
];

/// A normalized food query, immutable once created
#[derive(Debug, Clone, PartialEq)]
pub struct FoodQuery {
    /// The text as the user typed it
    pub raw: String,
    /// Cleaned text with the quantity expression removed
    pub normalized: String,
    /// Extracted quantity multiplier, 1.0 when none was found
    pub quantity: f64,
    /// Extracted serving unit, if the quantity carried one
    pub unit: Option<String>,
}

/// Lower-case a string and strip punctuation, keeping digits and decimal
/// points so quantity and macro expressions survive
pub fn clean_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = STRIP_RE.replace_all(&lowered, " ");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split cleaned text into comparison tokens
///
/// Tokens are trimmed of stray dots and reduced to a crude singular form
/// ("eggs" -> "egg") so plural queries still overlap with menu names.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|token| token.trim_matches('.'))
        .filter(|token| !token.is_empty())
        .map(singularize)
        .collect()
}

fn singularize(token: &str) -> String {
    if token.len() > 3 && token.ends_with('s') && !token.ends_with("ss") {
        token[..token.len() - 1].to_string()
    } else {
        token.to_string()
    }
}

/// Normalize raw input text into a [`FoodQuery`]
///
/// # Errors
///
/// Returns `ResolveError::InvalidInput` if the text is empty or whitespace.
pub fn normalize(raw: &str) -> Result<FoodQuery, ResolveError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ResolveError::InvalidInput(
            "food description is empty".to_string(),
        ));
    }

    let cleaned = clean_text(trimmed);
    let tokens: Vec<&str> = cleaned.split_whitespace().collect();

    let mut quantity = 1.0;
    let mut unit = None;
    let mut consumed: Option<(usize, bool)> = None; // (index, unit token follows)

    for (i, token) in tokens.iter().enumerate() {
        if let Some(caps) = MULTIPLIER_RE.captures(token) {
            if let Ok(value) = caps[1].parse::<f64>() {
                quantity = value;
                consumed = Some((i, false));
                break;
            }
        }
        if NUMBER_RE.is_match(token) {
            // A number tagging a macro value is not a quantity, whether the
            // keyword follows ("450 calories") or precedes ("calories 450").
            let next = tokens.get(i + 1).copied();
            let prev = i.checked_sub(1).map(|p| tokens[p]);
            if next.is_some_and(|t| MACRO_KEYWORDS.contains(&t))
                || prev.is_some_and(|t| MACRO_KEYWORDS.contains(&t))
            {
                continue;
            }
            if let Ok(value) = token.parse::<f64>() {
                quantity = value;
                if let Some(next) = next {
                    if QUANTITY_UNITS.contains(&next) {
                        unit = Some(next.to_string());
                        consumed = Some((i, true));
                        break;
                    }
                }
                consumed = Some((i, false));
                break;
            }
        }
    }

    let normalized = match consumed {
        Some((index, with_unit)) => {
            let rest: Vec<&str> = tokens
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != index && (!with_unit || *i != index + 1))
                .map(|(_, t)| *t)
                .collect();
            if rest.is_empty() {
                // "1.5 bowls" with no food word left: fall back to the unit
                // word, or the cleaned text, so matching has something to chew on.
                unit.clone().unwrap_or_else(|| cleaned.clone())
            } else {
                rest.join(" ")
            }
        }
        None => cleaned.clone(),
    };

    Ok(FoodQuery {
        raw: raw.to_string(),
        normalized,
        quantity,
        unit,
    })
}
