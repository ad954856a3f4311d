//! # Resolution Error Types
//!
//! This module defines the error types used throughout the resolution pipeline.
//! Hard errors (`ResolveError`) abort a resolution call before any matching
//! happens; collaborator errors (`LookupError`, `EstimateError`) are soft and
//! degrade the pipeline to its next fallback stage instead of aborting it.

/// Hard errors that reject a resolution request outright
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveError {
    /// Empty input text, non-positive quantity, or an out-of-range
    /// candidate selection
    InvalidInput(String),
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveError::InvalidInput(msg) => write!(f, "Invalid input: {msg}"),
        }
    }
}

impl std::error::Error for ResolveError {}

/// Errors from the external (online) food lookup
///
/// Treated as non-fatal by the pipeline: a failed external lookup behaves
/// like an empty result and the pipeline moves on to AI estimation.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupError {
    /// Transport or HTTP-level failure reaching the online database
    Network(String),
}

impl std::fmt::Display for LookupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupError::Network(msg) => write!(f, "Network error: {msg}"),
        }
    }
}

impl std::error::Error for LookupError {}

/// Errors from the language-model estimation call
#[derive(Debug, Clone, PartialEq)]
pub enum EstimateError {
    /// The local model process could not be reached
    ModelUnavailable(String),
    /// The estimation call exceeded its configured deadline
    Timeout(u64),
}

impl std::fmt::Display for EstimateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EstimateError::ModelUnavailable(msg) => write!(f, "Model unavailable: {msg}"),
            EstimateError::Timeout(secs) => write!(f, "Estimation timed out after {secs}s"),
        }
    }
}

impl std::error::Error for EstimateError {}

impl From<anyhow::Error> for EstimateError {
    fn from(err: anyhow::Error) -> Self {
        EstimateError::ModelUnavailable(err.to_string())
    }
}
