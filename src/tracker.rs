//! # Daily Tracker
//!
//! Accumulates resolved records into running daily totals with an automatic
//! reset when the date changes. Sits downstream of the resolution pipeline
//! and never re-enters it; persistence of the log is someone else's job.

use crate::food_model::FoodRecord;
use chrono::{Local, NaiveDate};
use serde::Serialize;

/// Running macro totals for one day
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DailyTotals {
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
}

/// A day's totals and the records behind them
#[derive(Debug, Clone, Serialize)]
pub struct DaySummary {
    pub date: String,
    pub totals: DailyTotals,
    pub entries: Vec<FoodRecord>,
}

/// Tracks what was eaten today
#[derive(Debug)]
pub struct DailyTracker {
    today: NaiveDate,
    totals: DailyTotals,
    log: Vec<FoodRecord>,
}

impl DailyTracker {
    pub fn new() -> Self {
        Self {
            today: Local::now().date_naive(),
            totals: DailyTotals::default(),
            log: Vec::new(),
        }
    }

    fn check_for_reset(&mut self) {
        let now = Local::now().date_naive();
        if now != self.today {
            log::info!("New day, resetting tracker for {now}");
            self.today = now;
            self.totals = DailyTotals::default();
            self.log.clear();
        }
    }

    /// Add a resolved record to today's log and totals
    pub fn log_record(&mut self, record: FoodRecord) {
        self.check_for_reset();
        self.totals.calories += record.calories;
        self.totals.protein += record.protein;
        self.totals.fat += record.fat;
        self.totals.carbs += record.carbs;
        log::info!(
            "Logged '{}' ({:.0} kcal), daily total {:.0} kcal",
            record.name,
            record.calories,
            self.totals.calories
        );
        self.log.push(record);
    }

    pub fn totals(&self) -> &DailyTotals {
        &self.totals
    }

    pub fn summary(&mut self) -> DaySummary {
        self.check_for_reset();
        DaySummary {
            date: self.today.to_string(),
            totals: self.totals.clone(),
            entries: self.log.clone(),
        }
    }
}

impl Default for DailyTracker {
    fn default() -> Self {
        Self::new()
    }
}
