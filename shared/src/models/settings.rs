//! Restaurant Settings Model

use serde::{Deserialize, Serialize};
use validator::Validate;

pub const MIN_GRACE_WINDOW_MINUTES: u32 = 1;
pub const MAX_GRACE_WINDOW_MINUTES: u32 = 5;
pub const DEFAULT_GRACE_WINDOW_MINUTES: u32 = 3;

/// Typed confirmation required to wipe analytics
pub const RESET_ANALYTICS_CONFIRMATION: &str = "DELETE ALL DATA";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    #[default]
    Am,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Auto,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TakeawayPolicy {
    #[default]
    #[serde(rename = "same-as-dinein")]
    SameAsDineIn,
    PercentageDiscount,
    CustomPerItem,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TakeawayPricing {
    pub policy: TakeawayPolicy,
    pub discount_percentage: f64,
}

/// Singleton settings record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantSettings {
    pub language: Language,
    pub theme: Theme,
    pub grace_window_minutes: u32,
    pub takeaway_pricing: TakeawayPricing,
    #[serde(default)]
    pub updated_by: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl RestaurantSettings {
    pub fn with_defaults(now: i64) -> Self {
        Self {
            language: Language::default(),
            theme: Theme::default(),
            grace_window_minutes: DEFAULT_GRACE_WINDOW_MINUTES,
            takeaway_pricing: TakeawayPricing::default(),
            updated_by: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppearanceUpdate {
    pub language: Option<Language>,
    pub theme: Option<Theme>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderManagementUpdate {
    #[validate(range(
        min = 1,
        max = 5,
        message = "Grace window must be between 1 and 5 minutes"
    ))]
    pub grace_window_minutes: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TakeawayPricingUpdate {
    pub policy: TakeawayPolicy,
    #[validate(range(
        min = 0.0,
        max = 100.0,
        message = "Discount percentage must be between 0 and 100"
    ))]
    pub discount_percentage: Option<f64>,
    #[serde(default)]
    pub apply_to_existing: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetAnalyticsRequest {
    pub pin: String,
    pub confirmation: String,
}

/// Clear a station display (owner PIN re-entry)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearDisplayRequest {
    pub station: super::PrepStation,
    pub pin: String,
}
