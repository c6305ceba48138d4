//! Cancellation Log Model

use super::order::{CancellationPhase, WastedItem};
use serde::{Deserialize, Serialize};

/// One record per cancelled order
///
/// Immutable except for the review fields set by an owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancellationLog {
    pub id: String,
    pub order_id: String,
    pub order_number: String,
    pub cancelled_by: String,
    pub cancelled_by_name: String,
    pub phase: CancellationPhase,
    pub reason: String,
    #[serde(default)]
    pub details: String,
    pub items_lost: Vec<WastedItem>,
    pub waste_cost: f64,
    pub requires_review: bool,
    #[serde(default)]
    pub reviewed_by: Option<String>,
    #[serde(default)]
    pub reviewed_at: Option<i64>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CancellationFilter {
    pub requires_review: Option<bool>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CancellationsByPhase {
    pub grace_window: u64,
    pub confirmed: u64,
    pub in_progress: u64,
    pub ready: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CancellationSummary {
    pub total: u64,
    pub requires_review: u64,
    pub total_waste_cost: f64,
    pub by_phase: CancellationsByPhase,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancellationReport {
    pub summary: CancellationSummary,
    pub logs: Vec<CancellationLog>,
}
