//! # AI Estimation Fallback
//!
//! Last resort when no database match is confident: the food description is
//! sent to a local language model with a prompt demanding a single
//! fixed-format line, and the response is parsed with a strict grammar.
//!
//! The retry behavior is a bounded two-step state machine: one attempt with
//! the initial prompt, one attempt with a stricter reformulation, then
//! `EstimationFailed`. Zero values are never fabricated from a response
//! that did not parse. This is the only pipeline stage allowed to block on
//! an external process, so every call runs under the configured timeout.

use crate::config::{EstimationPrompts, ResolverConfig};
use crate::errors::EstimateError;
use crate::food_model::{FoodRecord, Source, UnresolvedReason};
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

/// A local language model that answers free-form prompts
#[allow(async_fn_in_trait)]
pub trait MacroEstimator {
    /// Send a prompt and return the raw model response
    async fn estimate(&self, prompt: &str) -> Result<String, EstimateError>;
}

/// The only response shape accepted from the model:
/// `calories: <n>, protein: <n>, fat: <n>, carbs: <n>` on one line
static ESTIMATE_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*calories\s*:\s*(\d+(?:\.\d+)?)\s*,\s*protein\s*:\s*(\d+(?:\.\d+)?)\s*,\s*fat\s*:\s*(\d+(?:\.\d+)?)\s*,\s*carbs\s*:\s*(\d+(?:\.\d+)?)\s*$",
    )
    .expect("estimate line pattern should be valid")
});

/// Parse a model response against the strict single-line grammar
///
/// Lines are checked whole; chatter around a well-formed line is tolerated,
/// chatter inside it is not.
pub fn parse_estimate(response: &str) -> Option<(f64, f64, f64, f64)> {
    let lowered = response.to_lowercase();
    for line in lowered.lines() {
        if let Some(caps) = ESTIMATE_LINE_RE.captures(line) {
            let calories = caps[1].parse().ok()?;
            let protein = caps[2].parse().ok()?;
            let fat = caps[3].parse().ok()?;
            let carbs = caps[4].parse().ok()?;
            return Some((calories, protein, fat, carbs));
        }
    }
    None
}

/// Estimate macros for a food description via the language model
///
/// # Errors
///
/// Returns the reason the estimate could not be produced:
/// `ModelUnavailable` and `Timeout` pass straight through;
/// `EstimationFailed` means both attempts returned unparsable output.
pub async fn estimate_macros<E: MacroEstimator>(
    engine: &E,
    description: &str,
    config: &ResolverConfig,
) -> Result<FoodRecord, UnresolvedReason> {
    let attempts = [&config.prompts.initial, &config.prompts.retry];
    let deadline = Duration::from_secs(config.estimate_timeout_secs);

    for (attempt, template) in attempts.iter().enumerate() {
        let prompt = EstimationPrompts::render(template, description);
        log::info!(
            "Estimating '{description}' (attempt {} of {})",
            attempt + 1,
            attempts.len()
        );

        let response = match tokio::time::timeout(deadline, engine.estimate(&prompt)).await {
            Err(_) => {
                log::warn!(
                    "Estimation timed out after {}s",
                    config.estimate_timeout_secs
                );
                return Err(UnresolvedReason::Timeout);
            }
            Ok(Err(EstimateError::Timeout(secs))) => {
                log::warn!("Model reported a timeout after {secs}s");
                return Err(UnresolvedReason::Timeout);
            }
            Ok(Err(EstimateError::ModelUnavailable(msg))) => {
                log::warn!("Model unavailable: {msg}");
                return Err(UnresolvedReason::ModelUnavailable);
            }
            Ok(Ok(text)) => text,
        };

        match parse_estimate(&response) {
            Some((calories, protein, fat, carbs)) => {
                return Ok(FoodRecord::new(
                    description,
                    calories,
                    protein,
                    fat,
                    carbs,
                    Source::AiEstimate,
                ));
            }
            None => {
                log::warn!(
                    "Unparsable model response on attempt {}: {:?}",
                    attempt + 1,
                    response.chars().take(120).collect::<String>()
                );
            }
        }
    }

    Err(UnresolvedReason::EstimationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Scripted model for tests: pops one canned response per call
    struct ScriptedModel {
        responses: Mutex<Vec<Result<String, EstimateError>>>,
        calls: Mutex<u32>,
    }

    impl ScriptedModel {
        fn new(responses: Vec<Result<String, EstimateError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                calls: Mutex::new(0),
            }
        }

        fn call_count(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    impl MacroEstimator for ScriptedModel {
        async fn estimate(&self, _prompt: &str) -> Result<String, EstimateError> {
            *self.calls.lock().unwrap() += 1;
            self.responses
                .lock()
                .unwrap()
                .remove(0)
        }
    }

    const GOOD_LINE: &str = "calories: 220, protein: 12, fat: 9, carbs: 24";

    #[test]
    fn test_parse_valid_line() {
        assert_eq!(
            parse_estimate(GOOD_LINE),
            Some((220.0, 12.0, 9.0, 24.0))
        );
        // Case-insensitive, surrounding chatter on other lines tolerated
        assert_eq!(
            parse_estimate("Sure!\nCalories: 100, Protein: 5, Fat: 3, Carbs: 10\nEnjoy!"),
            Some((100.0, 5.0, 3.0, 10.0))
        );
    }

    #[test]
    fn test_parse_rejects_malformed_lines() {
        assert_eq!(parse_estimate("about 220 calories I think"), None);
        assert_eq!(parse_estimate("calories: 220, protein: 12"), None);
        assert_eq!(
            parse_estimate("calories: roughly 220, protein: 12, fat: 9, carbs: 24"),
            None
        );
        assert_eq!(parse_estimate(""), None);
    }

    #[tokio::test]
    async fn test_first_attempt_success() {
        let model = ScriptedModel::new(vec![Ok(GOOD_LINE.to_string())]);
        let config = ResolverConfig::default();
        let record = estimate_macros(&model, "onigiri", &config).await.unwrap();
        assert_eq!(record.name, "onigiri");
        assert_eq!(record.calories, 220.0);
        assert_eq!(record.source, Source::AiEstimate);
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn test_retry_once_then_success() {
        let model = ScriptedModel::new(vec![
            Ok("here is your nutrition info!".to_string()),
            Ok(GOOD_LINE.to_string()),
        ]);
        let config = ResolverConfig::default();
        let record = estimate_macros(&model, "onigiri", &config).await.unwrap();
        assert_eq!(record.calories, 220.0);
        assert_eq!(model.call_count(), 2);
    }

    #[tokio::test]
    async fn test_two_failures_is_terminal() {
        let model = ScriptedModel::new(vec![
            Ok("garbage".to_string()),
            Ok("more garbage".to_string()),
        ]);
        let config = ResolverConfig::default();
        let result = estimate_macros(&model, "onigiri", &config).await;
        assert_eq!(result, Err(UnresolvedReason::EstimationFailed));
        // Exactly two calls: the bound is one retry, never a loop
        assert_eq!(model.call_count(), 2);
    }

    #[tokio::test]
    async fn test_model_unavailable_no_retry() {
        let model = ScriptedModel::new(vec![Err(EstimateError::ModelUnavailable(
            "connection refused".to_string(),
        ))]);
        let config = ResolverConfig::default();
        let result = estimate_macros(&model, "onigiri", &config).await;
        assert_eq!(result, Err(UnresolvedReason::ModelUnavailable));
        assert_eq!(model.call_count(), 1);
    }

    /// Model that never answers; the timeout must cut it off
    struct StalledModel;

    impl MacroEstimator for StalledModel {
        async fn estimate(&self, _prompt: &str) -> Result<String, EstimateError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(String::new())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_surfaces_as_reason() {
        let config = ResolverConfig::default();
        let result = estimate_macros(&StalledModel, "onigiri", &config).await;
        assert_eq!(result, Err(UnresolvedReason::Timeout));
    }
}
