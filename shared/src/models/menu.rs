//! Menu Item Model

use super::common::{LocalizedText, PrepStation};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Stock counting unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockUnit {
    #[default]
    Pieces,
    Bottles,
    Cans,
    Liters,
    Servings,
    Plates,
}

/// Optional per-item stock counter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockTracking {
    pub enabled: bool,
    pub current_stock: i64,
    pub min_stock: i64,
    #[serde(default)]
    pub unit: StockUnit,
    #[serde(default = "default_true")]
    pub deduct_on_order: bool,
}

impl Default for StockTracking {
    fn default() -> Self {
        Self {
            enabled: false,
            current_stock: 0,
            min_stock: 10,
            unit: StockUnit::Pieces,
            deduct_on_order: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Dine-in / takeaway prices
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct MenuPricing {
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub dine_in: f64,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub takeaway: f64,
}

/// Menu item entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub name: LocalizedText,
    #[serde(default)]
    pub description: LocalizedText,
    pub category_id: String,
    pub pricing: MenuPricing,
    pub prep_station: PrepStation,
    /// Minutes
    #[serde(default = "default_prep_time")]
    pub prep_time: u32,
    #[serde(default = "default_true")]
    pub requires_preparation: bool,
    #[serde(default)]
    pub stock_tracking: StockTracking,
    /// Allowed add-on IDs
    #[serde(default)]
    pub add_ons: Vec<String>,
    /// Effective availability (derived, see `manually_disabled`)
    pub available: bool,
    /// Manual availability override set by staff
    #[serde(default)]
    pub manually_disabled: bool,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_public_id: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

fn default_prep_time() -> u32 {
    15
}

impl MenuItem {
    pub fn is_tracked(&self) -> bool {
        self.stock_tracking.enabled
    }

    /// Tracked stock at or below zero
    pub fn is_out_of_stock(&self) -> bool {
        self.is_tracked() && self.stock_tracking.current_stock <= 0
    }

    /// `0 < current_stock <= min_stock` on a tracked item
    pub fn is_low_stock(&self) -> bool {
        self.is_tracked()
            && self.stock_tracking.current_stock > 0
            && self.stock_tracking.current_stock <= self.stock_tracking.min_stock
    }

    /// Recompute `available` after any stock or override change
    ///
    /// Empty tracked stock always wins; otherwise the manual override decides.
    pub fn refresh_availability(&mut self) {
        self.available = !self.is_out_of_stock() && !self.manually_disabled;
    }

    /// Manual availability toggle
    ///
    /// Returns `false` (and changes nothing) when turning an item on while its
    /// tracked stock is empty.
    pub fn set_manual_availability(&mut self, available: bool) -> bool {
        if available && self.is_out_of_stock() {
            return false;
        }
        self.manually_disabled = !available;
        self.refresh_availability();
        true
    }

    /// Price per unit for the given order type
    pub fn unit_price(&self, order_type: super::order::OrderType) -> f64 {
        match order_type {
            super::order::OrderType::DineIn => self.pricing.dine_in,
            super::order::OrderType::Takeaway => self.pricing.takeaway,
        }
    }
}

/// Create menu item payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MenuItemCreate {
    #[validate(nested)]
    pub name: LocalizedText,
    #[serde(default)]
    pub description: Option<LocalizedText>,
    #[validate(length(min = 1, message = "Category is required"))]
    pub category_id: String,
    #[validate(nested)]
    pub pricing: MenuPricing,
    pub prep_station: PrepStation,
    pub prep_time: Option<u32>,
    pub requires_preparation: Option<bool>,
    pub stock_tracking: Option<StockTracking>,
    #[serde(default)]
    pub add_ons: Vec<String>,
    pub image_url: Option<String>,
    pub image_public_id: Option<String>,
}

/// Update menu item payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct MenuItemUpdate {
    #[validate(nested)]
    pub name: Option<LocalizedText>,
    pub description: Option<LocalizedText>,
    pub category_id: Option<String>,
    #[validate(nested)]
    pub pricing: Option<MenuPricing>,
    pub prep_station: Option<PrepStation>,
    pub prep_time: Option<u32>,
    pub requires_preparation: Option<bool>,
    pub stock_tracking: Option<StockTracking>,
    pub add_ons: Option<Vec<String>>,
    pub available: Option<bool>,
    pub image_url: Option<String>,
    pub image_public_id: Option<String>,
}

/// Menu list filters (owner)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuItemFilter {
    pub category: Option<String>,
    pub prep_station: Option<PrepStation>,
    pub available: Option<bool>,
}

// ========== Stock ==========

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockAction {
    Add,
    Remove,
    Set,
}

/// Stock adjustment payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StockUpdate {
    pub action: StockAction,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: i64,
}

/// Availability toggle payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityUpdate {
    pub available: bool,
}

/// One line of a batch stock deduction
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StockDeductLine {
    pub item_id: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StockDeductRequest {
    #[validate(length(min = 1, message = "Items are required"), nested)]
    pub items: Vec<StockDeductLine>,
}

/// Result of one stock change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockChange {
    pub item_id: String,
    pub name: LocalizedText,
    pub previous_stock: i64,
    pub new_stock: i64,
    /// Quantity removed (0 for add/set)
    #[serde(default)]
    pub deducted: i64,
    pub available: bool,
}

/// Low-stock signal (0 < stock <= min_stock)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LowStockAlert {
    pub item_id: String,
    pub item_name: LocalizedText,
    pub current_stock: i64,
    pub min_stock: i64,
    pub unit: StockUnit,
}

/// Batch deduction result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockDeductResult {
    pub updated_items: Vec<StockChange>,
    pub low_stock_alerts: Vec<LowStockAlert>,
}
