//! # Manual Macro Override Detector
//!
//! This module recognizes queries that state their nutrition outright
//! ("450 calories, 30g protein, 15g fat, 40g carbs") and short-circuits the
//! rest of the pipeline. Values are tagged by keywords in either order
//! ("450 kcal" or "calories 450"), with the shorthand suffixes people
//! actually type ("32 kcal, 1.5p, 0.5f, 5c").
//!
//! A statement with all four values becomes a resolved record with
//! source=manual. A statement with only some values makes the whole request
//! unresolved: missing fields are reported, never guessed or zero-filled.
//! Text with no tagged values is not an override and flows on to matching,
//! as is a lone tagged value other than calories ("eggs and 1 protein
//! shake" describes food, it does not state macros).

use crate::food_model::{FoodRecord, Source};
use regex::Regex;
use std::sync::LazyLock;

/// Splits glued value/tag tokens: "30g" -> "30 g", "1.5p" -> "1.5 p"
static GLUED_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d+(?:\.\d+)?)(kcal|calories|calorie|cals|cal|g|p|f|c)\b")
        .expect("glued tag pattern should be valid")
});

/// Leading words that are filler, not part of the entry name
const STOPWORDS: &[&str] = &[
    "i", "had", "a", "an", "the", "some", "my", "ate", "and", "with", "of", "just",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Calories,
    Protein,
    Fat,
    Carbs,
}

impl Field {
    const ALL: [Field; 4] = [Field::Calories, Field::Protein, Field::Fat, Field::Carbs];

    fn name(self) -> &'static str {
        match self {
            Field::Calories => "calories",
            Field::Protein => "protein",
            Field::Fat => "fat",
            Field::Carbs => "carbs",
        }
    }

    /// The field a keyword token tags, if any
    fn for_keyword(token: &str) -> Option<Field> {
        match token {
            "kcal" | "calories" | "calorie" | "cals" | "cal" => Some(Field::Calories),
            "protein" | "prot" | "p" => Some(Field::Protein),
            "fat" | "f" => Some(Field::Fat),
            "carbs" | "carb" | "c" => Some(Field::Carbs),
            _ => None,
        }
    }
}

/// Outcome of scanning normalized text for a manual macro statement
#[derive(Debug, Clone, PartialEq)]
pub enum OverrideScan {
    /// No tagged macro values; the text is a food description
    NotOverride,
    /// All four values stated; the pipeline is bypassed
    Complete(FoodRecord),
    /// Some values stated but not all; names the missing fields
    Incomplete(Vec<&'static str>),
}

fn parse_number(token: &str) -> Option<f64> {
    if token.chars().all(|c| c.is_ascii_digit() || c == '.') {
        token.parse().ok()
    } else {
        None
    }
}

/// Scan normalized query text for an explicit macro statement
///
/// Walks the token stream once. At each keyword token the value is taken
/// from the preceding number ("450 kcal", "30 g protein") if it has not
/// already been claimed by another field, otherwise from the following
/// number ("calories 450"). Single-letter tags only bind value-first, so a
/// stray "c" never swallows an unrelated number.
pub fn scan(normalized: &str) -> OverrideScan {
    let split = GLUED_TAG_RE.replace_all(normalized, "$1 $2");
    let tokens: Vec<&str> = split.split_whitespace().collect();

    let mut values: [Option<f64>; 4] = [None; 4];
    let mut claimed = vec![false; tokens.len()];
    let mut first_match = tokens.len();

    for (i, token) in tokens.iter().enumerate() {
        let Some(field) = Field::for_keyword(token) else {
            continue;
        };
        if token == &"g" || values[field as usize].is_some() {
            continue;
        }

        // Value-first: "450 kcal", "30 g protein"
        let mut value_index = None;
        if i >= 1 && !claimed[i - 1] {
            if parse_number(tokens[i - 1]).is_some() {
                value_index = Some(i - 1);
            } else if tokens[i - 1] == "g" && i >= 2 && !claimed[i - 2] {
                if parse_number(tokens[i - 2]).is_some() {
                    value_index = Some(i - 2);
                }
            }
        }
        // Keyword-first: "calories 450" (full-word tags only)
        if value_index.is_none() && token.len() > 1 {
            if let Some(next) = tokens.get(i + 1) {
                if !claimed[i + 1] && parse_number(next).is_some() {
                    value_index = Some(i + 1);
                }
            }
        }

        if let Some(vi) = value_index {
            if let Some(value) = parse_number(tokens[vi]) {
                values[field as usize] = Some(value);
                claimed[vi] = true;
                claimed[i] = true;
                first_match = first_match.min(vi.min(i));
            }
        }
    }

    let found = values.iter().filter(|v| v.is_some()).count();
    let has_calories = values[Field::Calories as usize].is_some();
    // A single tagged non-calorie value is more likely a stray count in a
    // compound description than a macro statement.
    if found == 0 || (found == 1 && !has_calories) {
        return OverrideScan::NotOverride;
    }

    if found < 4 {
        let missing: Vec<&'static str> = Field::ALL
            .iter()
            .filter(|f| values[**f as usize].is_none())
            .map(|f| f.name())
            .collect();
        log::debug!("Partial macro override, missing: {}", missing.join(", "));
        return OverrideScan::Incomplete(missing);
    }

    let name = entry_name(&tokens, first_match);
    let record = FoodRecord::new(
        &name,
        values[Field::Calories as usize].unwrap_or_default(),
        values[Field::Protein as usize].unwrap_or_default(),
        values[Field::Fat as usize].unwrap_or_default(),
        values[Field::Carbs as usize].unwrap_or_default(),
        Source::Manual,
    );
    log::info!(
        "Manual override: '{}' {} kcal, {}p/{}f/{}c",
        record.name,
        record.calories,
        record.protein,
        record.fat,
        record.carbs
    );
    OverrideScan::Complete(record)
}

/// The entry name is whatever meaningful words precede the first tagged value
fn entry_name(tokens: &[&str], first_match: usize) -> String {
    let name: Vec<&str> = tokens[..first_match]
        .iter()
        .filter(|token| !STOPWORDS.contains(*token))
        .filter(|token| parse_number(token).is_none())
        .copied()
        .collect();
    if name.is_empty() {
        "manual entry".to_string()
    } else {
        name.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::normalize;

    fn scan_raw(raw: &str) -> OverrideScan {
        scan(&normalize(raw).unwrap().normalized)
    }

    fn expect_complete(result: OverrideScan) -> FoodRecord {
        match result {
            OverrideScan::Complete(record) => record,
            other => panic!("expected Complete, got {other:?}"),
        }
    }

    #[test]
    fn test_complete_statement() {
        let record = expect_complete(scan_raw("450 calories, 30g protein, 15g fat, 40g carbs"));
        assert_eq!(record.calories, 450.0);
        assert_eq!(record.protein, 30.0);
        assert_eq!(record.fat, 15.0);
        assert_eq!(record.carbs, 40.0);
        assert_eq!(record.source, Source::Manual);
    }

    #[test]
    fn test_shorthand_suffixes() {
        let record = expect_complete(scan_raw("Suntory Boss Coffee, 32 kcal, 1.5p, 0.5f, 5c"));
        assert_eq!(record.name, "suntory boss coffee");
        assert_eq!(record.calories, 32.0);
        assert_eq!(record.protein, 1.5);
        assert_eq!(record.fat, 0.5);
        assert_eq!(record.carbs, 5.0);
    }

    #[test]
    fn test_keyword_first_order_independent() {
        let record = expect_complete(scan_raw("protein 30 carbs 40 fat 15 calories 450"));
        assert_eq!(record.calories, 450.0);
        assert_eq!(record.protein, 30.0);
        assert_eq!(record.fat, 15.0);
        assert_eq!(record.carbs, 40.0);
    }

    #[test]
    fn test_mixed_styles_do_not_steal_values() {
        // "450" belongs to calories, not to the protein tag that follows it
        let record = expect_complete(scan_raw("calories 450 protein 30 fat 15 carbs 40"));
        assert_eq!(record.calories, 450.0);
        assert_eq!(record.protein, 30.0);
    }

    #[test]
    fn test_partial_statement_reports_missing() {
        let result = scan_raw("450 calories, 30g protein");
        match result {
            OverrideScan::Incomplete(missing) => assert_eq!(missing, vec!["fat", "carbs"]),
            other => panic!("expected Incomplete, got {other:?}"),
        }
    }

    #[test]
    fn test_compound_description_is_not_override() {
        // The "1" before "protein" is a count, not a protein value
        assert_eq!(
            scan_raw("2 eggs and 1 protein shake"),
            OverrideScan::NotOverride
        );
    }

    #[test]
    fn test_lone_calories_value_reports_missing_macros() {
        match scan_raw("banana 100 kcal") {
            OverrideScan::Incomplete(missing) => {
                assert_eq!(missing, vec!["protein", "fat", "carbs"]);
            }
            other => panic!("expected Incomplete, got {other:?}"),
        }
    }

    #[test]
    fn test_plain_food_is_not_override() {
        assert_eq!(scan_raw("2 eggs"), OverrideScan::NotOverride);
        assert_eq!(scan_raw("matsuya beef bowl"), OverrideScan::NotOverride);
        // Keyword without a value does not count as a statement
        assert_eq!(scan_raw("protein shake"), OverrideScan::NotOverride);
        assert_eq!(scan_raw("100g chicken breast"), OverrideScan::NotOverride);
    }

    #[test]
    fn test_default_name() {
        let record = expect_complete(scan_raw("450 kcal 30p 15f 40c"));
        assert_eq!(record.name, "manual entry");
    }
}
