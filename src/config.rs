//! # Resolver Configuration Module
//!
//! This module defines the configuration passed explicitly into every
//! resolution call: confidence thresholds, fuzzy-score weights, the
//! estimation timeout and the prompt templates for the AI fallback.
//! Thresholds are process-wide policy, not per-query state, so they live
//! in one struct with documented defaults rather than in global statics.

// Constants for resolution thresholds
pub const DEFAULT_CHAIN_MATCH_THRESHOLD: f64 = 0.8;
pub const DEFAULT_HIGH_CONFIDENCE: f64 = 0.85;
pub const DEFAULT_AMBIGUITY_MARGIN: f64 = 0.1;
pub const DEFAULT_LOW_CONFIDENCE: f64 = 0.5;
pub const DEFAULT_ESTIMATE_TIMEOUT_SECS: u64 = 8;

// Fuzzy-score weights. Token overlap is weighted higher than edit distance
// because menu names share many tokens but differ in size/variant words.
pub const DEFAULT_TOKEN_WEIGHT: f64 = 0.6;
pub const DEFAULT_EDIT_WEIGHT: f64 = 0.4;

/// Prompt templates for the AI estimation fallback
///
/// `{food}` is substituted with the food description. The retry template is
/// the stricter reformulation used after one malformed model response.
#[derive(Debug, Clone)]
pub struct EstimationPrompts {
    /// First-attempt prompt
    pub initial: String,
    /// Second-attempt (stricter) prompt
    pub retry: String,
}

impl Default for EstimationPrompts {
    fn default() -> Self {
        Self {
            initial: "You are a nutrition estimator. Estimate the nutrition of the \
                      food described below. Reply with exactly one line in the form \
                      'calories: <number>, protein: <number>, fat: <number>, carbs: <number>' \
                      using kcal for calories and grams for the macros. \
                      Do not write anything else.\n\nFood: {food}"
                .to_string(),
            retry: "Reply with ONLY this single line, numbers only, no units, no \
                    explanation, no extra words:\n\
                    calories: <number>, protein: <number>, fat: <number>, carbs: <number>\n\n\
                    Fill in the numbers for this food: {food}"
                .to_string(),
        }
    }
}

impl EstimationPrompts {
    /// Render a template for the given food description
    pub fn render(template: &str, food: &str) -> String {
        template.replace("{food}", food)
    }
}

/// Configuration for a resolution pipeline
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Minimum similarity for a chain name to narrow the search scope
    pub chain_match_threshold: f64,
    /// Minimum top score to auto-resolve without asking the user
    pub high_confidence: f64,
    /// Minimum lead over the runner-up required to auto-resolve; candidates
    /// within this margin of the top score form an ambiguity cluster
    pub ambiguity_margin: f64,
    /// Below this score a candidate set is discarded and the pipeline
    /// escalates to the next data source
    pub low_confidence: f64,
    /// Weight of token-set overlap in the combined fuzzy score
    pub token_weight: f64,
    /// Weight of normalized edit-distance similarity in the combined score
    pub edit_weight: f64,
    /// Deadline for a single language-model call in seconds
    pub estimate_timeout_secs: u64,
    /// Prompt templates for the AI estimation fallback
    pub prompts: EstimationPrompts,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            chain_match_threshold: DEFAULT_CHAIN_MATCH_THRESHOLD,
            high_confidence: DEFAULT_HIGH_CONFIDENCE,
            ambiguity_margin: DEFAULT_AMBIGUITY_MARGIN,
            low_confidence: DEFAULT_LOW_CONFIDENCE,
            token_weight: DEFAULT_TOKEN_WEIGHT,
            edit_weight: DEFAULT_EDIT_WEIGHT,
            estimate_timeout_secs: DEFAULT_ESTIMATE_TIMEOUT_SECS,
            prompts: EstimationPrompts::default(),
        }
    }
}
