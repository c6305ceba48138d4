//! Event payloads

use serde::{Deserialize, Serialize};

use crate::models::{
    CancellationPhase, Order, OrderItem, OrderStatus, PaymentMethod, PrepStation,
    Role,
};

// ========== Client commands ==========

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinRoomPayload {
    pub role: Role,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRoomPayload {
    pub room: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAcknowledgedPayload {
    pub order_id: String,
    pub order_number: String,
    pub station: PrepStation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadcastMessagePayload {
    pub message: String,
}

// ========== Server events ==========

/// `new-order` / `order-updated` / `sync-data`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPayload {
    pub order: Order,
}

/// `new-order-alert` (owner)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrderAlert {
    pub order_id: String,
    pub order_number: String,
    pub waitress_name: String,
    pub total: f64,
    pub item_count: usize,
}

/// `order-created-success` (originating waitress)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCreatedAck {
    pub order_id: String,
    pub order_number: String,
}

/// `order-status-update` (owning waitress)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub order_id: String,
    pub order_number: String,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
}

/// `order-cancelled` (stations)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCancelledNotice {
    pub order_id: String,
    pub order_number: String,
}

/// `cancellation-requires-review` (owner)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancellationReviewAlert {
    pub order_id: String,
    pub order_number: String,
    pub waitress_name: String,
    pub phase: CancellationPhase,
    pub waste_cost: f64,
    pub reason: String,
}

/// `order-completed` (owner)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCompletedNotice {
    pub order_id: String,
    pub order_number: String,
    pub waitress_name: String,
    pub total: f64,
    pub payment_method: PaymentMethod,
}

/// `order-acknowledgement` (everyone)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAcknowledgement {
    pub order_id: String,
    pub order_number: String,
    pub station: PrepStation,
    pub acknowledged_at: i64,
}

/// `menu-updated`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuUpdated {
    /// created / updated / deleted / availability-changed / stock-updated /
    /// bulk-price-update / category-* / addon-*
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<serde_json::Value>,
}

/// `staff-created` (owner)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffCreatedNotice {
    pub staff_id: String,
    pub full_name: String,
    pub role: Role,
}

/// `account-updated` / `account-deactivated` (affected user)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountNotice {
    pub message: String,
    pub active: bool,
}

/// `clear-display` / `new-day-started` / `system-message`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

/// `joined-room`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinedRoom {
    pub rooms: Vec<String>,
    pub user_id: String,
}

/// `sync-data` / `current-orders-response`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrdersSnapshot {
    pub orders: Vec<Order>,
}

/// `error` (session-level failures)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorNotice {
    pub message: String,
}
