//! Add-on Model

use super::common::{LocalizedText, PrepStation};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Priced extra that can be attached to an order line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddOn {
    pub id: String,
    pub name: LocalizedText,
    pub price: f64,
    /// Stations this add-on applies to
    #[serde(default = "default_stations")]
    pub stations: Vec<PrepStation>,
    #[serde(default = "default_true")]
    pub is_optional: bool,
    #[serde(default = "default_true")]
    pub available: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

pub(crate) fn default_stations() -> Vec<PrepStation> {
    vec![PrepStation::Kitchen, PrepStation::Juicebar]
}

fn default_true() -> bool {
    true
}

/// Create add-on payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddOnCreate {
    #[validate(nested)]
    pub name: LocalizedText,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,
    #[validate(length(min = 1, message = "At least one station must be selected"))]
    #[serde(default = "default_stations")]
    pub stations: Vec<PrepStation>,
    pub is_optional: Option<bool>,
}

/// Update add-on payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct AddOnUpdate {
    #[validate(nested)]
    pub name: Option<LocalizedText>,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: Option<f64>,
    #[validate(length(min = 1, message = "At least one station must be selected"))]
    pub stations: Option<Vec<PrepStation>>,
    pub is_optional: Option<bool>,
    pub available: Option<bool>,
}
