//! # Quantity Resolver
//!
//! This module applies a query's quantity multiplier to a matched record.
//! Scaling is pure: it produces a new record with all four macro fields
//! multiplied, leaving the source record untouched. The name is annotated
//! with the multiplier ("2x Eggs") so the log reads naturally.

use crate::errors::ResolveError;
use crate::food_model::FoodRecord;

/// Scale a record's macros by a quantity multiplier
///
/// A multiplier of exactly 1.0 returns an unannotated copy. Dividing the
/// scaled macros back by the multiplier recovers the base record within
/// floating tolerance.
///
/// # Errors
///
/// Returns `ResolveError::InvalidInput` if the multiplier is zero or
/// negative.
pub fn scale_record(record: &FoodRecord, quantity: f64) -> Result<FoodRecord, ResolveError> {
    if quantity <= 0.0 {
        return Err(ResolveError::InvalidInput(format!(
            "quantity multiplier must be positive, got {quantity}"
        )));
    }

    let mut scaled = record.clone();
    if quantity != 1.0 {
        scaled.name = format!("{}x {}", format_quantity(quantity), record.name);
        scaled.calories = record.calories * quantity;
        scaled.protein = record.protein * quantity;
        scaled.fat = record.fat * quantity;
        scaled.carbs = record.carbs * quantity;
        log::debug!(
            "Scaled '{}' by {quantity}: {:.0} kcal",
            record.name,
            scaled.calories
        );
    }
    Ok(scaled)
}

/// Render a multiplier without a trailing ".0" for whole numbers
fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 {
        format!("{}", quantity as i64)
    } else {
        format!("{quantity}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::food_model::Source;

    fn egg() -> FoodRecord {
        FoodRecord::new("Eggs", 70.0, 6.0, 5.0, 0.6, Source::Local)
    }

    #[test]
    fn test_scaling_multiplies_all_macros() {
        let scaled = scale_record(&egg(), 2.0).unwrap();
        assert_eq!(scaled.name, "2x Eggs");
        assert_eq!(scaled.calories, 140.0);
        assert_eq!(scaled.protein, 12.0);
        assert_eq!(scaled.fat, 10.0);
        assert!((scaled.carbs - 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_unit_quantity_is_identity() {
        let scaled = scale_record(&egg(), 1.0).unwrap();
        assert_eq!(scaled, egg());
    }

    #[test]
    fn test_fractional_quantity() {
        let scaled = scale_record(&egg(), 1.5).unwrap();
        assert_eq!(scaled.name, "1.5x Eggs");
        assert_eq!(scaled.calories, 105.0);
    }

    #[test]
    fn test_round_trip_recovers_base() {
        let base = egg();
        let scaled = scale_record(&base, 3.0).unwrap();
        assert!((scaled.calories / 3.0 - base.calories).abs() < 1e-9);
        assert!((scaled.protein / 3.0 - base.protein).abs() < 1e-9);
    }

    #[test]
    fn test_non_positive_quantity_rejected() {
        assert!(matches!(
            scale_record(&egg(), 0.0),
            Err(ResolveError::InvalidInput(_))
        ));
        assert!(matches!(
            scale_record(&egg(), -2.0),
            Err(ResolveError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_source_record_not_mutated() {
        let base = egg();
        let _ = scale_record(&base, 4.0).unwrap();
        assert_eq!(base.calories, 70.0);
    }
}
