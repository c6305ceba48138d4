//! Order Model
//!
//! Order 是聚合根：OrderItem 只存在于所属 Order 内部，
//! 通过 `line_id` 定位，没有独立生命周期。

use super::common::{LocalizedText, PrepStation};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

// ============================================================================
// Enums
// ============================================================================

/// 订单类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderType {
    /// 堂食
    #[default]
    DineIn,
    /// 外带
    Takeaway,
}

/// 订单整体状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    InProgress,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Non-terminal statuses
    pub const ACTIVE: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::InProgress,
        OrderStatus::Ready,
    ];

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::InProgress => "in-progress",
            Self::Ready => "ready",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单品制作状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemStatus {
    #[default]
    Pending,
    InProgress,
    Ready,
}

impl ItemStatus {
    pub fn as_order_status(&self) -> OrderStatus {
        match self {
            Self::Pending => OrderStatus::Pending,
            Self::InProgress => OrderStatus::InProgress,
            Self::Ready => OrderStatus::Ready,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid,
}

/// 取消阶段（决定损耗比例）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancellationPhase {
    /// 宽限期内 - 无损耗
    GraceWindow,
    /// 已确认 - 50%
    Confirmed,
    /// 制作中 - 80%
    InProgress,
    /// 已完成待取 - 100%
    Ready,
}

impl CancellationPhase {
    pub const ALL: [CancellationPhase; 4] = [
        CancellationPhase::GraceWindow,
        CancellationPhase::Confirmed,
        CancellationPhase::InProgress,
        CancellationPhase::Ready,
    ];

    /// Share of the grand total written off as waste, in percent
    pub fn waste_percent(&self) -> u32 {
        match self {
            Self::GraceWindow => 0,
            Self::Confirmed => 50,
            Self::InProgress => 80,
            Self::Ready => 100,
        }
    }

    pub fn requires_review(&self) -> bool {
        !matches!(self, Self::GraceWindow)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GraceWindow => "grace_window",
            Self::Confirmed => "confirmed",
            Self::InProgress => "in_progress",
            Self::Ready => "ready",
        }
    }
}

// ============================================================================
// Aggregate
// ============================================================================

/// Add-on snapshot on an order line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedAddOn {
    pub add_on_id: String,
    pub name: LocalizedText,
    pub price: f64,
}

/// Order line (embedded in Order)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Stable sub-identifier within the order
    pub line_id: String,
    /// Menu item reference
    pub item_id: String,
    pub name: LocalizedText,
    #[serde(default)]
    pub variant: String,
    pub quantity: u32,
    pub price_per_unit: f64,
    #[serde(default)]
    pub add_ons: Vec<SelectedAddOn>,
    #[serde(default)]
    pub special_notes: String,
    pub subtotal: f64,
    /// Station snapshot of the menu item at order time
    pub prep_station: PrepStation,
    #[serde(default)]
    pub auto_complete: bool,
    #[serde(default)]
    pub skip_kitchen: bool,
    #[serde(default)]
    pub status: ItemStatus,
}

impl OrderItem {
    /// Routed to the given station's display
    pub fn is_for_station(&self, station: PrepStation) -> bool {
        self.prep_station == station && !self.skip_kitchen
    }
}

/// Wasted item snapshot on cancellation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WastedItem {
    pub item_id: String,
    pub item_name: String,
    pub quantity: u32,
    pub cost: f64,
}

/// Cancellation metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancellationInfo {
    pub cancelled_at: i64,
    pub cancelled_by: String,
    pub phase: CancellationPhase,
    pub reason: String,
    #[serde(default)]
    pub details: String,
    pub waste_cost: f64,
    pub wasted_items: Vec<WastedItem>,
}

/// Order aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    /// ORD-YYYYMMDD-NNNN
    pub order_number: String,
    pub order_type: OrderType,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: String,
    pub waitress_id: String,
    pub waitress_name: String,
    pub items: Vec<OrderItem>,
    pub subtotal: f64,
    pub grand_total: f64,
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    pub grace_window_ends_at: i64,
    #[serde(default)]
    pub completed_at: Option<i64>,
    #[serde(default)]
    pub cancellation: Option<CancellationInfo>,
    /// Incremented on every mutation
    #[serde(default)]
    pub version: u64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    /// Grace window check against a wall-clock instant
    pub fn is_within_grace_window(&self, now: i64) -> bool {
        now < self.grace_window_ends_at
    }

    /// Copy of this order restricted to the lines routed to `station`
    pub fn for_station(&self, station: PrepStation) -> Option<Order> {
        let items: Vec<OrderItem> = self
            .items
            .iter()
            .filter(|i| i.is_for_station(station))
            .cloned()
            .collect();
        if items.is_empty() {
            return None;
        }
        Some(Order {
            items,
            ..self.clone()
        })
    }

    pub fn has_station_items(&self, station: PrepStation) -> bool {
        self.items.iter().any(|i| i.is_for_station(station))
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Order line as submitted by a waitress
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderLineInput {
    #[validate(length(min = 1, message = "Item ID is required"))]
    pub item_id: String,
    #[validate(range(min = 1, max = 999, message = "Quantity must be between 1 and 999"))]
    pub quantity: u32,
    #[serde(default)]
    #[validate(length(max = 100, message = "Variant is too long"))]
    pub variant: String,
    /// Add-on IDs
    #[serde(default)]
    pub add_ons: Vec<String>,
    #[serde(default)]
    #[validate(length(max = 500, message = "Special notes are too long"))]
    pub special_notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateOrderRequest {
    pub order_type: OrderType,
    #[serde(default)]
    #[validate(length(max = 100, message = "Customer name is too long"))]
    pub customer_name: String,
    #[serde(default)]
    #[validate(length(max = 30, message = "Customer phone is too long"))]
    pub customer_phone: String,
    #[validate(length(min = 1, message = "Order must contain at least one item"), nested)]
    pub items: Vec<OrderLineInput>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct EditOrderRequest {
    #[validate(length(min = 1, message = "Order must contain at least one item"), nested)]
    pub items: Option<Vec<OrderLineInput>>,
    #[validate(length(max = 100, message = "Customer name is too long"))]
    pub customer_name: Option<String>,
    #[validate(length(max = 30, message = "Customer phone is too long"))]
    pub customer_phone: Option<String>,
    /// Optimistic concurrency guard
    pub expected_version: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: ItemStatus,
    /// Target a single line; absent means bulk override
    pub line_id: Option<String>,
    pub expected_version: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CancelOrderRequest {
    #[validate(length(min = 1, max = 200, message = "Cancellation reason is required"))]
    pub reason: String,
    #[serde(default)]
    #[validate(length(max = 500, message = "Details are too long"))]
    pub details: Option<String>,
    pub expected_version: Option<u64>,
}

/// Owner order listing filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    /// Inclusive, YYYY-MM-DD (business timezone)
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub waitress_id: Option<String>,
}

// ============================================================================
// Responses
// ============================================================================

/// CreateOrder result: persisted order plus stock side effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreated {
    pub order: Order,
    pub stock_deductions: Vec<super::menu::StockChange>,
    pub low_stock_alerts: Vec<super::menu::LowStockAlert>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCancelled {
    pub order: Order,
    pub requires_review: bool,
    pub waste_cost: f64,
}
