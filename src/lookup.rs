//! # Lookup Capabilities
//!
//! The contracts the resolver needs from its data-source collaborators.
//! An empty candidate list is a valid "no match" result, not an error; only
//! the external lookup can fail, and the pipeline treats that failure as an
//! empty result.

use crate::errors::LookupError;
use crate::food_model::FoodRecord;

/// Offline structured food lookup (the local menu database)
pub trait LocalLookup {
    /// Retrieve candidate records for the query text, optionally restricted
    /// to one chain's menu scope
    fn lookup_local(&self, scope: Option<&str>, text: &str) -> Vec<FoodRecord>;

    /// Store a record resolved from another source so repeat queries hit
    /// the local table; implementations without writable storage ignore it
    fn cache_record(&self, _record: &FoodRecord) {}
}

/// Online food lookup (an external database such as OpenFoodFacts)
#[allow(async_fn_in_trait)]
pub trait ExternalLookup {
    /// Search the external database for the query text
    async fn lookup_external(&self, text: &str) -> Result<Vec<FoodRecord>, LookupError>;
}
