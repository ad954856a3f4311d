//! # Local Menu Database
//!
//! JSON-file-backed food table keyed by lower-cased name, with chain
//! scoping for restaurant menus. A missing file starts empty and a corrupt
//! file is logged and replaced rather than crashing the app; every
//! addition is saved straight back to disk.
//!
//! This is the offline lookup collaborator: the resolver only sees it
//! through the [`LocalLookup`] trait.

use crate::food_model::FoodRecord;
use crate::lookup::LocalLookup;
use crate::normalizer::{clean_text, tokenize};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// The local food database
#[derive(Debug)]
pub struct MenuDb {
    path: Option<PathBuf>,
    foods: HashMap<String, FoodRecord>,
}

impl MenuDb {
    /// Open (or create) a database file
    ///
    /// A missing file yields an empty database; a corrupt file is warned
    /// about and replaced on the next save.
    pub fn open(path: &Path) -> Self {
        let foods = match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(foods) => foods,
                Err(err) => {
                    log::warn!(
                        "Database file {} is corrupt ({err}), starting fresh",
                        path.display()
                    );
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };
        log::info!("Loaded {} foods from {}", foods.len(), path.display());
        Self {
            path: Some(path.to_path_buf()),
            foods,
        }
    }

    /// An unsaved in-memory database, mainly for tests
    pub fn in_memory() -> Self {
        Self {
            path: None,
            foods: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.foods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.foods.is_empty()
    }

    /// Case-insensitive exact lookup by name
    pub fn get_food(&self, name: &str) -> Option<&FoodRecord> {
        self.foods.get(&name.to_lowercase())
    }

    /// Add or update a food entry and persist the database
    pub fn add_food(&mut self, record: FoodRecord) -> Result<()> {
        let key = record.name.to_lowercase();
        log::debug!("Adding '{key}' to the menu database");
        self.foods.insert(key, record);
        self.save()
    }

    fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        let contents = serde_json::to_string_pretty(&self.foods)?;
        std::fs::write(path, contents).with_context(|| format!("saving {}", path.display()))?;
        Ok(())
    }
}

impl LocalLookup for MenuDb {
    /// Candidate retrieval for the fuzzy matcher
    ///
    /// A chain scope restricts candidates to that chain's menu. Unscoped
    /// lookups prefilter on shared tokens so the matcher is not handed the
    /// whole table. Results are name-sorted for deterministic scoring input.
    fn lookup_local(&self, scope: Option<&str>, text: &str) -> Vec<FoodRecord> {
        let query_tokens = tokenize(&clean_text(text));
        let mut records: Vec<FoodRecord> = self
            .foods
            .values()
            .filter(|record| match scope {
                Some(scope) => record.chain.as_deref() == Some(scope),
                None => {
                    let name_tokens = tokenize(&clean_text(&record.name));
                    name_tokens.iter().any(|t| query_tokens.contains(t))
                }
            })
            .cloned()
            .collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));
        records
    }
}

/// Shared handle for when the resolver and the rest of the app use the same
/// database; resolved external and AI records are written back through it so
/// repeat queries resolve offline
impl LocalLookup for Arc<Mutex<MenuDb>> {
    fn lookup_local(&self, scope: Option<&str>, text: &str) -> Vec<FoodRecord> {
        match self.lock() {
            Ok(db) => db.lookup_local(scope, text),
            Err(err) => {
                log::error!("Menu database lock poisoned: {err}");
                Vec::new()
            }
        }
    }

    fn cache_record(&self, record: &FoodRecord) {
        let Ok(mut db) = self.lock() else {
            log::error!("Menu database lock poisoned, '{}' not cached", record.name);
            return;
        };
        if let Err(err) = db.add_food(record.clone()) {
            log::warn!("Could not cache '{}': {err}", record.name);
        }
    }
}
