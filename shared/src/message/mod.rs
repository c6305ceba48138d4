//! 实时消息类型定义
//!
//! pos-server 与前端（waitress / kitchen / juicebar / owner 终端）之间
//! 通过 WebSocket 交换的消息。所有消息都是 JSON:
//!
//! ```text
//! { "event": "new-order", "data": { ... }, "timestamp": 1736150400000 }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod payload;
pub use payload::*;

use crate::models::Role;

/// 服务端推送事件名
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventName {
    // 订单
    NewOrder,
    NewOrderAlert,
    OrderCreatedSuccess,
    OrderUpdated,
    OrderStatusUpdate,
    OrderCancelled,
    CancellationRequiresReview,
    OrderCompleted,
    OrderAcknowledgement,
    // 菜单 / 库存
    MenuUpdated,
    LowStockAlert,
    // 设置
    SettingsUpdated,
    ClearDisplay,
    NewDayStarted,
    // 员工
    StaffCreated,
    AccountUpdated,
    AccountDeactivated,
    // 会话
    JoinedRoom,
    SyncData,
    CurrentOrdersResponse,
    Pong,
    SystemMessage,
    Error,
}

impl EventName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewOrder => "new-order",
            Self::NewOrderAlert => "new-order-alert",
            Self::OrderCreatedSuccess => "order-created-success",
            Self::OrderUpdated => "order-updated",
            Self::OrderStatusUpdate => "order-status-update",
            Self::OrderCancelled => "order-cancelled",
            Self::CancellationRequiresReview => "cancellation-requires-review",
            Self::OrderCompleted => "order-completed",
            Self::OrderAcknowledgement => "order-acknowledgement",
            Self::MenuUpdated => "menu-updated",
            Self::LowStockAlert => "low-stock-alert",
            Self::SettingsUpdated => "settings-updated",
            Self::ClearDisplay => "clear-display",
            Self::NewDayStarted => "new-day-started",
            Self::StaffCreated => "staff-created",
            Self::AccountUpdated => "account-updated",
            Self::AccountDeactivated => "account-deactivated",
            Self::JoinedRoom => "joined-room",
            Self::SyncData => "sync-data",
            Self::CurrentOrdersResponse => "current-orders-response",
            Self::Pong => "pong",
            Self::SystemMessage => "system-message",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 推送目标房间
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Room {
    /// 角色房间 (kitchen / juicebar / waitress / owner)
    Role(Role),
    /// 个人房间 user-{id}
    User(String),
}

impl Room {
    pub fn kitchen() -> Self {
        Self::Role(Role::Kitchen)
    }

    pub fn juicebar() -> Self {
        Self::Role(Role::Juicebar)
    }

    pub fn owner() -> Self {
        Self::Role(Role::Owner)
    }

    pub fn user(id: impl Into<String>) -> Self {
        Self::User(id.into())
    }

    /// Parse a wire room name (`kitchen`, `user-<id>`)
    pub fn parse(name: &str) -> Option<Self> {
        if let Some(id) = name.strip_prefix("user-") {
            return (!id.is_empty()).then(|| Self::User(id.to_string()));
        }
        Role::ALL
            .iter()
            .find(|r| r.as_str() == name)
            .map(|r| Self::Role(*r))
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Role(role) => f.write_str(role.as_str()),
            Self::User(id) => write!(f, "user-{}", id),
        }
    }
}

/// 推送事件信封
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealtimeEvent {
    pub event: EventName,
    pub data: serde_json::Value,
    /// UTC milliseconds
    pub timestamp: i64,
}

impl RealtimeEvent {
    pub fn new<T: Serialize>(event: EventName, data: &T) -> Self {
        Self {
            event,
            data: serde_json::to_value(data).unwrap_or(serde_json::Value::Null),
            timestamp: crate::util::now_millis(),
        }
    }

    /// Decode the payload into a typed struct
    pub fn parse_data<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.clone())
    }
}

/// 客户端 → 服务端命令
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientCommand {
    JoinRoom(JoinRoomPayload),
    LeaveRoom(LeaveRoomPayload),
    RequestSync,
    RequestCurrentOrders,
    Ping,
    OrderAcknowledged(OrderAcknowledgedPayload),
    BroadcastMessage(BroadcastMessagePayload),
}
