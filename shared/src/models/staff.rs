//! Staff Model

use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// Staff role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Waitress,
    Kitchen,
    Juicebar,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Owner, Role::Waitress, Role::Kitchen, Role::Juicebar];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Waitress => "waitress",
            Self::Kitchen => "kitchen",
            Self::Juicebar => "juicebar",
        }
    }

    /// Station served by this role, if it is a station role
    pub fn station(&self) -> Option<super::PrepStation> {
        match self {
            Self::Kitchen => Some(super::PrepStation::Kitchen),
            Self::Juicebar => Some(super::PrepStation::Juicebar),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Staff profile (without PIN hash)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffProfile {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub role: Role,
    pub active: bool,
    pub last_login: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Per-waitress performance summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaffPerformance {
    pub total_orders: u64,
    pub completed_orders: u64,
    pub cancelled_orders: u64,
    pub total_revenue: f64,
    pub average_order_value: f64,
}

/// Staff list/detail entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffWithPerformance {
    #[serde(flatten)]
    pub staff: StaffProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<StaffPerformance>,
}

/// Staff list filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaffFilter {
    pub role: Option<Role>,
    pub active: Option<bool>,
}

/// Create staff payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StaffCreate {
    #[validate(length(min = 2, max = 100, message = "Full name must be 2-100 characters"))]
    pub full_name: String,
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,
    #[validate(custom(function = "validate_pin"))]
    pub pin: String,
    pub role: Role,
}

/// Update staff payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct StaffUpdate {
    #[validate(length(min = 2, max = 100, message = "Full name must be 2-100 characters"))]
    pub full_name: Option<String>,
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: Option<String>,
    pub role: Option<Role>,
    pub active: Option<bool>,
}

/// Reset PIN payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PinReset {
    #[validate(custom(function = "validate_pin"))]
    pub new_pin: String,
}

// ========== Auth ==========

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(custom(function = "validate_pin"))]
    pub pin: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: StaffProfile,
}

/// PIN re-entry for destructive owner actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinConfirmation {
    pub pin: String,
}

/// PIN must be exactly 4 ASCII digits
pub fn validate_pin(pin: &str) -> Result<(), validator::ValidationError> {
    if is_valid_pin(pin) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("pin")
            .with_message("PIN must be exactly 4 digits".into()))
    }
}

pub fn is_valid_pin(pin: &str) -> bool {
    pin.len() == 4 && pin.bytes().all(|b| b.is_ascii_digit())
}
