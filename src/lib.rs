//! # Foodlog
//!
//! Turns a free-text food description ("Matsuya Beef Bowl regular",
//! "2 eggs", "450 calories, 30g protein, 15g fat, 40g carbs") into a
//! structured nutrition record suitable for logging.
//!
//! The resolution pipeline runs in a fixed order: normalize the text,
//! detect an explicit macro statement (manual override), detect a known
//! restaurant chain to narrow the search scope, fuzzy-match against the
//! local menu database and then OpenFoodFacts, scale by the stated
//! quantity, and finally fall back to a local language-model estimate.
//! Ambiguity is a first-class result: callers get a ranked candidate list
//! and re-invoke resolution with a selection.

pub mod chain_matcher;
pub mod config;
pub mod errors;
pub mod estimator;
pub mod food_model;
pub mod fuzzy_matcher;
pub mod lookup;
pub mod manual_override;
pub mod menu_db;
pub mod normalizer;
pub mod off_client;
pub mod ollama_client;
pub mod quantity;
pub mod resolver;
pub mod tracker;
