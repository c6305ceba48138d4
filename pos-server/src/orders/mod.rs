//! Order Lifecycle Module
//!
//! 订单从创建到支付/取消的完整生命周期：
//!
//! - **aggregate**: 纯规则 (总价、整体状态、取消阶段、损耗)
//! - **manager**: OrdersManager 命令处理 + 实时推送
//! - **money**: Decimal 精确金额计算与找零
//! - **storage**: redb 持久化 (订单、订单号、支付、取消日志)
//!
//! # Architecture
//!
//! ```text
//! HTTP handler → OrdersManager → OrderStorage (redb, one write txn)
//!                     │
//!                     ├─→ MenuLedger (stock)
//!                     ├─→ SalesAccumulator (daily analytics)
//!                     └─→ BroadcastPort (rooms)
//! ```

pub mod aggregate;
pub mod manager;
pub mod money;
pub mod storage;

pub use manager::{ManagerError, ManagerResult, OrderQuery, OrdersManager};
pub use storage::OrderStorage;
