//! # Resolution Orchestrator
//!
//! Sequences the pipeline stages in fixed order (normalize, manual
//! override, chain detection, local match, external match, AI estimation),
//! short-circuiting on the first resolved or ambiguous result. The
//! orchestrator owns no matching logic of its own; it is the single place
//! the confidence thresholds live, passed in as configuration.
//!
//! Each call operates on its own query and candidate state, so concurrent
//! resolutions only share the collaborators themselves.

use crate::chain_matcher::ChainTable;
use crate::config::ResolverConfig;
use crate::errors::ResolveError;
use crate::estimator::{estimate_macros, MacroEstimator};
use crate::food_model::{FoodRecord, MatchCandidate, ResolutionResult, UnresolvedReason};
use crate::fuzzy_matcher::{self, MatchOutcome};
use crate::lookup::{ExternalLookup, LocalLookup};
use crate::manual_override::{self, OverrideScan};
use crate::normalizer::{normalize, FoodQuery};
use crate::quantity::scale_record;

/// The resolution pipeline, generic over its three collaborators
pub struct Resolver<L, X, E> {
    config: ResolverConfig,
    chains: ChainTable,
    local: L,
    external: X,
    estimator: E,
}

impl<L, X, E> Resolver<L, X, E>
where
    L: LocalLookup,
    X: ExternalLookup,
    E: MacroEstimator,
{
    pub fn new(config: ResolverConfig, chains: ChainTable, local: L, external: X, estimator: E) -> Self {
        Self {
            config,
            chains,
            local,
            external,
            estimator,
        }
    }

    /// Build a resolver with default thresholds and the default chain table
    pub fn with_defaults(local: L, external: X, estimator: E) -> Self {
        Self::new(
            ResolverConfig::default(),
            ChainTable::default(),
            local,
            external,
            estimator,
        )
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn local(&self) -> &L {
        &self.local
    }

    pub fn external(&self) -> &X {
        &self.external
    }

    pub fn estimator(&self) -> &E {
        &self.estimator
    }

    /// Resolve a raw food description into a nutrition record
    ///
    /// # Errors
    ///
    /// Only hard input errors are returned as `Err`; "no match found" is
    /// always an `Ok(Unresolved)` value, and ambiguity is an `Ok(Ambiguous)`
    /// value carrying ranked candidates for the caller.
    pub async fn resolve(&self, raw_text: &str) -> Result<ResolutionResult, ResolveError> {
        let query = normalize(raw_text)?;
        self.resolve_query(&query).await
    }

    /// Resolve an already-normalized query
    pub async fn resolve_query(&self, query: &FoodQuery) -> Result<ResolutionResult, ResolveError> {
        log::info!("Resolving '{}' (quantity {})", query.normalized, query.quantity);

        // Explicit macro statements bypass every lookup.
        match manual_override::scan(&query.normalized) {
            OverrideScan::Complete(record) => return Ok(ResolutionResult::Resolved(record)),
            OverrideScan::Incomplete(missing) => {
                return Ok(ResolutionResult::Unresolved(
                    UnresolvedReason::IncompleteOverride(missing),
                ));
            }
            OverrideScan::NotOverride => {}
        }

        let chain = self.chains.detect(&query.normalized);
        let scope = chain.as_ref().map(|c| c.scope.as_str());

        let local_records = self.local.lookup_local(scope, &query.normalized);
        log::debug!("Local lookup returned {} candidates", local_records.len());
        let ranked = fuzzy_matcher::rank(&query.normalized, local_records, &self.config);
        match fuzzy_matcher::evaluate(&ranked, &self.config) {
            MatchOutcome::Confident(top) => {
                let record = scale_record(&top.record, query.quantity)?;
                return Ok(ResolutionResult::Resolved(record));
            }
            MatchOutcome::Ambiguous(cluster) => return Ok(ResolutionResult::Ambiguous(cluster)),
            MatchOutcome::BelowThreshold => {}
        }

        // Escalate to the external database. This is a fallback to a
        // different data source, not a retry; its failure behaves like an
        // empty result.
        let external_records = match self.external.lookup_external(&query.normalized).await {
            Ok(records) => records,
            Err(err) => {
                log::warn!("External lookup failed, continuing without it: {err}");
                Vec::new()
            }
        };
        log::debug!("External lookup returned {} candidates", external_records.len());
        let ranked = fuzzy_matcher::rank(&query.normalized, external_records, &self.config);
        match fuzzy_matcher::evaluate(&ranked, &self.config) {
            MatchOutcome::Confident(top) => {
                // Write the unscaled hit back so the next query for this
                // food resolves offline.
                self.local.cache_record(&top.record);
                let record = scale_record(&top.record, query.quantity)?;
                return Ok(ResolutionResult::Resolved(record));
            }
            MatchOutcome::Ambiguous(cluster) => return Ok(ResolutionResult::Ambiguous(cluster)),
            MatchOutcome::BelowThreshold => {}
        }

        // AI fallback gets the full description, quantity words included, so
        // its estimate is already for the stated amount; no scaling here.
        match estimate_macros(&self.estimator, query.raw.trim(), &self.config).await {
            Ok(record) => {
                self.local.cache_record(&record);
                Ok(ResolutionResult::Resolved(record))
            }
            Err(reason) => Ok(ResolutionResult::Unresolved(reason)),
        }
    }

    /// Re-invoke resolution with a candidate the caller picked from an
    /// ambiguous result; the query's quantity multiplier applies as usual
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::InvalidInput` if the index is out of range or
    /// the query quantity is non-positive.
    pub fn select(
        &self,
        candidates: &[MatchCandidate],
        index: usize,
        query: &FoodQuery,
    ) -> Result<FoodRecord, ResolveError> {
        let candidate = candidates.get(index).ok_or_else(|| {
            ResolveError::InvalidInput(format!(
                "selection {index} is out of range for {} candidates",
                candidates.len()
            ))
        })?;
        scale_record(&candidate.record, query.quantity)
    }
}
