//! Category Model

use super::common::{LocalizedText, PrepStation};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Menu category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: LocalizedText,
    /// Default station for items in this category
    #[serde(default)]
    pub prep_station: PrepStation,
    #[serde(default = "default_true")]
    pub requires_preparation: bool,
    #[serde(default)]
    pub auto_deduct_stock: bool,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub created_by: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

fn default_true() -> bool {
    true
}

/// Create category payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CategoryCreate {
    #[validate(nested)]
    pub name: LocalizedText,
    pub prep_station: Option<PrepStation>,
    pub requires_preparation: Option<bool>,
    pub auto_deduct_stock: Option<bool>,
}

/// Update category payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CategoryUpdate {
    #[validate(nested)]
    pub name: Option<LocalizedText>,
    pub prep_station: Option<PrepStation>,
    pub requires_preparation: Option<bool>,
    pub auto_deduct_stock: Option<bool>,
    pub active: Option<bool>,
}
