//! Order aggregate rules
//!
//! 纯函数：总价、整体状态推导、取消阶段与损耗。不接触存储。

use shared::models::{
    CancellationPhase, ItemStatus, Order, OrderItem, OrderStatus, WastedItem,
};

use super::money;

/// `(subtotal, grand_total)` of a set of lines
///
/// 没有税和服务费，grand_total 恒等于各行小计之和。
pub fn totals(items: &[OrderItem]) -> (f64, f64) {
    let subtotal = money::sum(items.iter().map(|i| i.subtotal));
    (subtotal, subtotal)
}

/// 根据各行状态推导订单整体状态
///
/// 优先级 (第一条命中即返回):
/// 1. 全部 ready → ready
/// 2. 任一 in-progress → in-progress
/// 3. 全部 pending → 宽限期内 pending，否则 confirmed
/// 4. 其余 (ready 与 pending 混合) → in-progress：已有行出餐，制作已开始
///
/// 没有行时保持原状态。
pub fn recompute_status(order: &Order, now: i64) -> OrderStatus {
    let items = &order.items;
    if items.is_empty() {
        return order.status;
    }
    if items.iter().all(|i| i.status == ItemStatus::Ready) {
        return OrderStatus::Ready;
    }
    if items.iter().any(|i| i.status == ItemStatus::InProgress) {
        return OrderStatus::InProgress;
    }
    if items.iter().all(|i| i.status == ItemStatus::Pending) {
        return if order.is_within_grace_window(now) {
            OrderStatus::Pending
        } else {
            OrderStatus::Confirmed
        };
    }
    OrderStatus::InProgress
}

/// Why an order cannot be cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseRejection {
    /// completed / cancelled
    Terminal(OrderStatus),
    /// 状态无法映射到任何取消阶段
    Unmapped(OrderStatus),
}

/// 取消阶段判定 (第一条命中即返回)
///
/// 1. 宽限期内 → grace_window
/// 2. confirmed → confirmed (50%)
/// 3. in-progress → in_progress (80%)
/// 4. ready → ready (100%)
///
/// 只看存储的状态：宽限期过后仍是 pending (没有任何站点更新触发重算)
/// 无法映射到阶段，返回 `Unmapped`。
pub fn cancellation_phase(order: &Order, now: i64) -> Result<CancellationPhase, PhaseRejection> {
    if order.status.is_terminal() {
        return Err(PhaseRejection::Terminal(order.status));
    }
    if order.is_within_grace_window(now) {
        return Ok(CancellationPhase::GraceWindow);
    }
    match order.status {
        OrderStatus::Confirmed => Ok(CancellationPhase::Confirmed),
        OrderStatus::InProgress => Ok(CancellationPhase::InProgress),
        OrderStatus::Ready => Ok(CancellationPhase::Ready),
        other => Err(PhaseRejection::Unmapped(other)),
    }
}

/// Waste charged for cancelling in a phase
pub fn waste_cost(grand_total: f64, phase: CancellationPhase) -> f64 {
    money::percent_of(grand_total, phase.waste_percent())
}

/// Snapshot of every line as wasted (cost = line subtotal)
pub fn wasted_items(order: &Order) -> Vec<WastedItem> {
    order
        .items
        .iter()
        .map(|item| WastedItem {
            item_id: item.item_id.clone(),
            item_name: item.name.en.clone(),
            quantity: item.quantity,
            cost: item.subtotal,
        })
        .collect()
}
