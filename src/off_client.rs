//! # OpenFoodFacts Client
//!
//! Online lookup collaborator backed by the OpenFoodFacts text-search API.
//! OFF reports nutriments per 100g (sometimes per serving as `_value`
//! fields); entries without a usable calorie figure are skipped. Any
//! transport or HTTP failure surfaces as a `NetworkError`, which the
//! pipeline treats as an empty result.

use crate::errors::LookupError;
use crate::food_model::{FoodRecord, Source};
use crate::lookup::ExternalLookup;
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://world.openfoodfacts.org";
// OFF requires clients to identify themselves.
const USER_AGENT: &str = "foodlog/0.1";
const PAGE_SIZE: u32 = 5;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    products: Vec<OffProduct>,
}

#[derive(Debug, Deserialize)]
struct OffProduct {
    #[serde(default)]
    product_name: Option<String>,
    #[serde(default)]
    nutriments: Nutriments,
}

#[derive(Debug, Default, Deserialize)]
struct Nutriments {
    #[serde(rename = "energy-kcal_value")]
    energy_kcal_value: Option<f64>,
    #[serde(rename = "energy-kcal_100g")]
    energy_kcal_100g: Option<f64>,
    proteins_value: Option<f64>,
    proteins_100g: Option<f64>,
    fat_value: Option<f64>,
    fat_100g: Option<f64>,
    carbohydrates_value: Option<f64>,
    carbohydrates_100g: Option<f64>,
}

/// OpenFoodFacts search client
#[derive(Debug, Clone)]
pub struct OffClient {
    http: reqwest::Client,
    base_url: String,
}

impl OffClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the client at a different server, e.g. a test stub
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for OffClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ExternalLookup for OffClient {
    async fn lookup_external(&self, text: &str) -> Result<Vec<FoodRecord>, LookupError> {
        let url = format!("{}/cgi/search.pl", self.base_url);
        log::debug!("Searching OpenFoodFacts for '{text}'");

        let response = self
            .http
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .query(&[
                ("search_terms", text),
                ("search_simple", "1"),
                ("action", "process"),
                ("json", "1"),
                ("page_size", &PAGE_SIZE.to_string()),
            ])
            .send()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))?
            .error_for_status()
            .map_err(|e| LookupError::Network(e.to_string()))?;

        let search: SearchResponse = response
            .json()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))?;

        let records: Vec<FoodRecord> = search
            .products
            .into_iter()
            .filter_map(|product| {
                let n = &product.nutriments;
                // A product without calories is useless for logging.
                let calories = n.energy_kcal_value.or(n.energy_kcal_100g)?;
                let name = product
                    .product_name
                    .filter(|name| !name.trim().is_empty())
                    .unwrap_or_else(|| text.to_string());
                Some(FoodRecord::new(
                    &name,
                    calories,
                    n.proteins_value.or(n.proteins_100g).unwrap_or(0.0),
                    n.fat_value.or(n.fat_100g).unwrap_or(0.0),
                    n.carbohydrates_value.or(n.carbohydrates_100g).unwrap_or(0.0),
                    Source::OpenFoodFacts,
                ))
            })
            .collect();

        log::debug!("OpenFoodFacts returned {} usable products", records.len());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nutriments_prefer_value_over_per_100g() {
        let json = r#"{
            "products": [{
                "product_name": "Boss Coffee",
                "nutriments": {
                    "energy-kcal_value": 32.0,
                    "energy-kcal_100g": 16.0,
                    "proteins_100g": 1.5,
                    "fat_100g": 0.5,
                    "carbohydrates_100g": 5.0
                }
            }]
        }"#;
        let search: SearchResponse = serde_json::from_str(json).unwrap();
        let product = &search.products[0];
        assert_eq!(product.nutriments.energy_kcal_value, Some(32.0));
        assert_eq!(product.nutriments.proteins_value, None);
        assert_eq!(product.nutriments.proteins_100g, Some(1.5));
    }

    #[test]
    fn test_missing_fields_deserialize_to_defaults() {
        let json = r#"{"products": [{"product_name": "Mystery Snack"}]}"#;
        let search: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(search.products[0].nutriments.energy_kcal_100g, None);

        let empty: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.products.is_empty());
    }
}
