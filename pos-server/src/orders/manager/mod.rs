//! OrdersManager - order lifecycle engine
//!
//! This module handles:
//! - Order creation (catalog resolution, pricing, stock deduction, numbering)
//! - Edits inside the grace window
//! - Station status updates and aggregate status
//! - Phase-based cancellation with waste accounting
//! - Payment settlement and change calculation
//! - Real-time fan-out (via [`BroadcastPort`])
//!
//! # Command Flow
//!
//! ```text
//! create_order(actor, req)
//!     ├─ 1. Resolve menu items + add-ons (reject before any side effect)
//!     ├─ 2. Read settings (grace window)
//!     ├─ 3. Deduct stock per line (best-effort, independent transactions)
//!     ├─ 4. Allocate order number + insert order (one write transaction)
//!     └─ 5. Broadcast: stations / owner / waitress
//!
//! edit / status / cancel / pay
//!     ├─ 1. Pre-read + fast checks (no side effects)
//!     ├─ 2. OrderStorage::mutate (re-check inside the write transaction, version+1)
//!     ├─ 3. Daily analytics, pay only (best-effort)
//!     └─ 4. Broadcast
//! ```

mod error;
pub use error::*;

use std::collections::HashSet;
use std::sync::Arc;

use chrono_tz::Tz;
use redb::WriteTransaction;
use shared::message::{
    CancellationReviewAlert, EventName, NewOrderAlert, OrderCancelledNotice, OrderCompletedNotice,
    OrderCreatedAck, OrderPayload, OrderStatusUpdate, Room,
};
use shared::models::{
    CancelOrderRequest, CancellationInfo, CancellationLog, ChangeInfo,
    CreateOrderRequest, EditOrderRequest, ItemStatus, LowStockAlert, MenuItem, Order, OrderCancelled,
    OrderCreated, OrderItem, OrderLineInput, OrderStatus, OrderType, Payment, PaymentMethod,
    PaymentReceipt, PaymentStatus, PrepStation, ProcessPaymentRequest, Role, SelectedAddOn,
    StockChange, UpdateOrderStatusRequest,
};
use shared::util::{MILLIS_PER_MINUTE, new_id, now_millis};

use super::aggregate::{self, PhaseRejection};
use super::money;
use super::storage::OrderStorage;
use crate::analytics::SalesAccumulator;
use crate::auth::CurrentUser;
use crate::db::DbService;
use crate::db::repository::{AddOnRepository, MenuItemRepository, SettingsRepository};
use crate::message::{BroadcastPort, emit};
use crate::services::MenuLedger;
use crate::utils::time::business_date;

/// Reason recorded when an owner clears a station display
pub const DISPLAY_CLEARED_REASON: &str = "display cleared";

/// Owner listing query (already resolved to millis)
#[derive(Debug, Clone, Default)]
pub struct OrderQuery {
    pub status: Option<OrderStatus>,
    pub waitress_id: Option<String>,
    /// `start <= created_at < end`
    pub created_between: Option<(i64, i64)>,
}

/// Cancellation inputs shared by CancelOrder and ClearStationDisplay
struct CancelContext<'a> {
    actor: &'a CurrentUser,
    reason: &'a str,
    details: &'a str,
    now: i64,
}

/// OrdersManager for order lifecycle commands
#[derive(Clone)]
pub struct OrdersManager {
    storage: OrderStorage,
    menu: MenuItemRepository,
    add_ons: AddOnRepository,
    settings: SettingsRepository,
    ledger: MenuLedger,
    analytics: SalesAccumulator,
    bus: Arc<dyn BroadcastPort>,
    /// 业务时区
    tz: Tz,
}

impl std::fmt::Debug for OrdersManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrdersManager")
            .field("storage", &"<OrderStorage>")
            .field("bus", &self.bus)
            .field("tz", &self.tz)
            .finish()
    }
}

impl OrdersManager {
    pub fn new(db: DbService, bus: Arc<dyn BroadcastPort>, tz: Tz) -> Self {
        Self {
            storage: OrderStorage::new(db.clone()),
            menu: MenuItemRepository::new(db.clone()),
            add_ons: AddOnRepository::new(db.clone()),
            settings: SettingsRepository::new(db.clone()),
            ledger: MenuLedger::new(db.clone()),
            analytics: SalesAccumulator::new(db, tz),
            bus,
            tz,
        }
    }

    pub fn storage(&self) -> &OrderStorage {
        &self.storage
    }

    fn bus(&self) -> &dyn BroadcastPort {
        self.bus.as_ref()
    }

    fn grace_window_millis(&self) -> ManagerResult<i64> {
        let settings = self.settings.get_or_create()?;
        Ok(i64::from(settings.grace_window_minutes) * MILLIS_PER_MINUTE)
    }

    // ========== Line resolution ==========

    /// Resolve submitted lines against the catalog and price them
    ///
    /// 所有菜品和加料先全部解析，任何缺失或不可用都在副作用之前返回。
    fn build_lines(
        &self,
        order_type: OrderType,
        inputs: &[OrderLineInput],
    ) -> ManagerResult<Vec<OrderItem>> {
        if inputs.is_empty() {
            return Err(ManagerError::Validation(
                "Order must contain at least one item".to_string(),
            ));
        }
        if let Some(bad) = inputs.iter().find(|l| l.quantity == 0) {
            return Err(ManagerError::Validation(format!(
                "Quantity must be at least 1 for item {}",
                bad.item_id
            )));
        }

        let item_ids = unique(inputs.iter().map(|l| l.item_id.clone()));
        let menu_items = self.menu.find_by_ids(&item_ids)?;

        let missing: Vec<String> = item_ids
            .iter()
            .filter(|id| !menu_items.contains_key(*id))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(ManagerError::ItemsNotFound(missing));
        }

        let unavailable = unique(
            item_ids
                .iter()
                .filter_map(|id| menu_items.get(id))
                .filter(|m| !m.available)
                .map(|m| m.name.en.clone()),
        );
        if !unavailable.is_empty() {
            return Err(ManagerError::ItemsUnavailable(unavailable));
        }

        let add_on_ids = unique(inputs.iter().flat_map(|l| l.add_ons.iter().cloned()));
        let add_ons = self.add_ons.find_by_ids(&add_on_ids)?;
        if let Some(unknown) = add_on_ids.iter().find(|id| !add_ons.contains_key(*id)) {
            return Err(ManagerError::Validation(format!("Unknown add-on: {}", unknown)));
        }
        if let Some(off) = add_ons.values().find(|a| !a.available) {
            return Err(ManagerError::Validation(format!(
                "Add-on '{}' is unavailable",
                off.name.en
            )));
        }

        let mut lines = Vec::with_capacity(inputs.len());
        for input in inputs {
            let Some(menu_item) = menu_items.get(&input.item_id) else {
                continue;
            };
            let selected: Vec<SelectedAddOn> = input
                .add_ons
                .iter()
                .filter_map(|id| add_ons.get(id))
                .map(|a| SelectedAddOn {
                    add_on_id: a.id.clone(),
                    name: a.name.clone(),
                    price: a.price,
                })
                .collect();
            lines.push(price_line(menu_item, order_type, input, selected));
        }
        Ok(lines)
    }

    // ========== CreateOrder ==========

    pub fn create_order(
        &self,
        actor: &CurrentUser,
        req: CreateOrderRequest,
    ) -> ManagerResult<OrderCreated> {
        let items = self.build_lines(req.order_type, &req.items)?;
        let grace = self.grace_window_millis()?;

        // 逐行扣减库存；单行失败不回滚已扣减的行
        let mut stock_deductions: Vec<StockChange> = Vec::new();
        let mut low_stock_alerts: Vec<LowStockAlert> = Vec::new();
        for line in &req.items {
            match self.ledger.deduct_for_order(&line.item_id, line.quantity) {
                Ok(Some((change, alert))) => {
                    stock_deductions.push(change);
                    low_stock_alerts.extend(alert);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(item_id = %line.item_id, error = %e, "Stock deduction failed, continuing");
                }
            }
        }

        let now = now_millis();
        let (subtotal, grand_total) = aggregate::totals(&items);
        let order = self
            .storage
            .create(business_date(now, self.tz), |order_number| Order {
                id: new_id(),
                order_number,
                order_type: req.order_type,
                customer_name: req.customer_name.trim().to_string(),
                customer_phone: req.customer_phone.trim().to_string(),
                waitress_id: actor.id.clone(),
                waitress_name: actor.full_name.clone(),
                items,
                subtotal,
                grand_total,
                status: OrderStatus::Pending,
                payment_status: PaymentStatus::Unpaid,
                grace_window_ends_at: now + grace,
                completed_at: None,
                cancellation: None,
                version: 0,
                created_at: now,
                updated_at: now,
            })?;

        tracing::info!(
            order_number = %order.order_number,
            waitress = %actor.username,
            items = order.items.len(),
            total = order.grand_total,
            "Order created"
        );

        // ========== Broadcast ==========
        emit::order_to_stations(self.bus(), EventName::NewOrder, &order);
        emit::to_room(
            self.bus(),
            &Room::owner(),
            EventName::NewOrderAlert,
            &NewOrderAlert {
                order_id: order.id.clone(),
                order_number: order.order_number.clone(),
                waitress_name: order.waitress_name.clone(),
                total: order.grand_total,
                item_count: order.items.len(),
            },
        );
        for alert in &low_stock_alerts {
            emit::to_room(self.bus(), &Room::owner(), EventName::LowStockAlert, alert);
        }
        emit::to_room(
            self.bus(),
            &Room::user(&actor.id),
            EventName::OrderCreatedSuccess,
            &OrderCreatedAck {
                order_id: order.id.clone(),
                order_number: order.order_number.clone(),
            },
        );

        Ok(OrderCreated {
            order,
            stock_deductions,
            low_stock_alerts,
        })
    }

    // ========== EditOrder ==========

    /// Replace lines and/or customer fields inside the grace window
    ///
    /// 编辑不会重新扣减或归还库存。宽限期从编辑时刻重新计算。
    pub fn edit_order(
        &self,
        order_id: &str,
        actor: &CurrentUser,
        req: EditOrderRequest,
    ) -> ManagerResult<Order> {
        let current = self.get(order_id)?;
        check_editable(&current, actor, now_millis())?;

        let lines = match &req.items {
            Some(inputs) => Some(self.build_lines(current.order_type, inputs)?),
            None => None,
        };
        let grace = self.grace_window_millis()?;

        let (order, ()) = self
            .storage
            .mutate(order_id, req.expected_version, |_, order| {
                let now = now_millis();
                check_editable(order, actor, now)?;

                if let Some(items) = lines {
                    let (subtotal, grand_total) = aggregate::totals(&items);
                    order.items = items;
                    order.subtotal = subtotal;
                    order.grand_total = grand_total;
                }
                if let Some(name) = &req.customer_name {
                    order.customer_name = name.trim().to_string();
                }
                if let Some(phone) = &req.customer_phone {
                    order.customer_phone = phone.trim().to_string();
                }
                order.grace_window_ends_at = now + grace;
                Ok(())
            })?;

        tracing::info!(order_number = %order.order_number, waitress = %actor.username, "Order edited");

        emit::to_stations(
            self.bus(),
            EventName::OrderUpdated,
            &OrderPayload {
                order: order.clone(),
            },
        );
        Ok(order)
    }

    // ========== UpdateOrderStatus ==========

    /// Station status update
    ///
    /// - `line_id` 指定时只改该行，然后重算整体状态
    /// - 未指定时批量覆盖：所有需制作的行和订单状态直接设为目标状态
    pub fn update_status(
        &self,
        order_id: &str,
        actor: &CurrentUser,
        req: UpdateOrderStatusRequest,
    ) -> ManagerResult<Order> {
        let (order, ()) = self
            .storage
            .mutate(order_id, req.expected_version, |_, order| {
                if order.status.is_terminal() {
                    return Err(ManagerError::OrderTerminal(order.status));
                }
                match &req.line_id {
                    Some(line_id) => {
                        let line = order
                            .items
                            .iter_mut()
                            .find(|i| &i.line_id == line_id)
                            .ok_or_else(|| ManagerError::ItemNotFound(line_id.clone()))?;
                        line.status = req.status;
                        order.status = aggregate::recompute_status(order, now_millis());
                    }
                    None => {
                        for item in order.items.iter_mut().filter(|i| !i.auto_complete) {
                            item.status = req.status;
                        }
                        order.status = req.status.as_order_status();
                    }
                }
                Ok(())
            })?;

        tracing::info!(
            order_number = %order.order_number,
            status = %order.status,
            by = %actor.username,
            "Order status updated"
        );

        emit::to_room(
            self.bus(),
            &Room::user(&order.waitress_id),
            EventName::OrderStatusUpdate,
            &OrderStatusUpdate {
                order_id: order.id.clone(),
                order_number: order.order_number.clone(),
                status: order.status,
                items: order.items.clone(),
            },
        );
        Ok(order)
    }

    // ========== CancelOrder ==========

    pub fn cancel_order(
        &self,
        order_id: &str,
        actor: &CurrentUser,
        req: CancelOrderRequest,
    ) -> ManagerResult<OrderCancelled> {
        let reason = req.reason.trim();
        if reason.is_empty() {
            return Err(ManagerError::Validation(
                "Cancellation reason is required".to_string(),
            ));
        }
        let details = req.details.as_deref().unwrap_or("").trim();

        let (order, log) = self
            .storage
            .mutate(order_id, req.expected_version, |txn, order| {
                if order.waitress_id != actor.id {
                    return Err(ManagerError::NotOwner);
                }
                let ctx = CancelContext {
                    actor,
                    reason,
                    details,
                    now: now_millis(),
                };
                apply_cancellation(txn, order, &ctx)
            })?;

        self.after_cancellation(&order, &log);
        Ok(OrderCancelled {
            requires_review: log.requires_review,
            waste_cost: log.waste_cost,
            order,
        })
    }

    /// Log and broadcast a committed cancellation
    fn after_cancellation(&self, order: &Order, log: &CancellationLog) {
        tracing::info!(
            order_number = %order.order_number,
            phase = log.phase.as_str(),
            waste_cost = log.waste_cost,
            by = %log.cancelled_by_name,
            "Order cancelled"
        );

        emit::to_stations(
            self.bus(),
            EventName::OrderCancelled,
            &OrderCancelledNotice {
                order_id: order.id.clone(),
                order_number: order.order_number.clone(),
            },
        );
        if log.requires_review {
            emit::to_room(
                self.bus(),
                &Room::owner(),
                EventName::CancellationRequiresReview,
                &CancellationReviewAlert {
                    order_id: order.id.clone(),
                    order_number: order.order_number.clone(),
                    waitress_name: order.waitress_name.clone(),
                    phase: log.phase,
                    waste_cost: log.waste_cost,
                    reason: log.reason.clone(),
                },
            );
        }
    }

    // ========== ClearStationDisplay ==========

    /// Cancel every pending / confirmed / in-progress order routed to a station
    ///
    /// ready 的订单留给取餐。调用方负责校验店主 PIN。
    pub fn clear_station(&self, station: PrepStation, actor: &CurrentUser) -> ManagerResult<usize> {
        let targets = self.storage.find(|o| is_clearable(o) && o.has_station_items(station))?;

        let mut cleared = 0usize;
        for target in targets {
            let result = self.storage.mutate(&target.id, None, |txn, order| {
                if !is_clearable(order) {
                    return Err(ManagerError::OrderTerminal(order.status));
                }
                let ctx = CancelContext {
                    actor,
                    reason: DISPLAY_CLEARED_REASON,
                    details: "",
                    now: now_millis(),
                };
                apply_cancellation(txn, order, &ctx)
            });
            match result {
                Ok((order, log)) => {
                    self.after_cancellation(&order, &log);
                    cleared += 1;
                }
                Err(e) => {
                    tracing::warn!(order_number = %target.order_number, error = %e, "Skipping order while clearing display");
                }
            }
        }

        tracing::info!(station = %station, cleared, by = %actor.username, "Station display cleared");

        if let Some(room) = emit::station_room(station) {
            emit::to_room(
                self.bus(),
                &room,
                EventName::ClearDisplay,
                &shared::message::Notice {
                    message: format!("{} display cleared", station),
                    from: Some(actor.full_name.clone()),
                },
            );
        }
        Ok(cleared)
    }

    // ========== ProcessPayment ==========

    pub fn process_payment(
        &self,
        actor: &CurrentUser,
        req: ProcessPaymentRequest,
    ) -> ManagerResult<PaymentReceipt> {
        let current = self.get(&req.order_id)?;
        if current.waitress_id != actor.id {
            return Err(ManagerError::NotOwner);
        }
        if current.status == OrderStatus::Completed {
            return self.completed_receipt(current);
        }
        if current.status != OrderStatus::Ready {
            return Err(ManagerError::InvalidStatusForPayment(current.status));
        }

        let settlement = settle(&req, current.grand_total)?;

        let result = self.storage.mutate(&req.order_id, None, |txn, order| {
            if order.status == OrderStatus::Completed {
                return Err(ManagerError::OrderTerminal(OrderStatus::Completed));
            }
            if order.status != OrderStatus::Ready {
                return Err(ManagerError::InvalidStatusForPayment(order.status));
            }

            let now = now_millis();
            let payment = Payment {
                id: new_id(),
                order_id: order.id.clone(),
                order_number: order.order_number.clone(),
                payment_method: req.payment_method,
                total_amount: order.grand_total,
                amount_received: settlement.amount_received,
                change_due: settlement.change_due,
                split_payments: req.split_payments.clone(),
                waitress_id: order.waitress_id.clone(),
                transaction_id: req
                    .transaction_id
                    .as_ref()
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty()),
                created_at: now,
            };
            OrderStorage::insert_payment(txn, &payment)?;

            order.status = OrderStatus::Completed;
            order.payment_status = PaymentStatus::Paid;
            order.completed_at = Some(now);
            Ok(payment)
        });

        let (order, payment) = match result {
            Ok(done) => done,
            // 并发支付：另一请求已完成，按幂等返回已有记录
            Err(ManagerError::OrderTerminal(OrderStatus::Completed)) => {
                return self.completed_receipt(self.get(&req.order_id)?);
            }
            Err(e) => return Err(e),
        };

        tracing::info!(
            order_number = %order.order_number,
            method = payment.payment_method.as_str(),
            total = payment.total_amount,
            change = payment.change_due,
            "Payment processed"
        );

        self.analytics.record_payment(&order, &payment);

        emit::to_room(
            self.bus(),
            &Room::owner(),
            EventName::OrderCompleted,
            &OrderCompletedNotice {
                order_id: order.id.clone(),
                order_number: order.order_number.clone(),
                waitress_name: order.waitress_name.clone(),
                total: order.grand_total,
                payment_method: payment.payment_method,
            },
        );

        Ok(PaymentReceipt {
            change: change_info(&payment),
            payment,
            order,
        })
    }

    /// Receipt for an order that was already paid
    fn completed_receipt(&self, order: Order) -> ManagerResult<PaymentReceipt> {
        let payment = self
            .storage
            .payment_for_order(&order.id)?
            .ok_or(ManagerError::InvalidStatusForPayment(order.status))?;
        tracing::debug!(order_number = %order.order_number, "Order already paid, returning stored payment");
        Ok(PaymentReceipt {
            change: change_info(&payment),
            payment,
            order,
        })
    }

    // ========== Reads ==========

    fn get(&self, order_id: &str) -> ManagerResult<Order> {
        self.storage
            .get(order_id)?
            .ok_or_else(|| ManagerError::OrderNotFound(order_id.to_string()))
    }

    /// Single order; a waitress may only read her own orders
    pub fn get_order(&self, order_id: &str, actor: &CurrentUser) -> ManagerResult<Order> {
        let order = self.get(order_id)?;
        check_visible(&order, actor)?;
        Ok(order)
    }

    /// Lookup by receipt number (`ORD-YYYYMMDD-NNNN`), same scoping as [`Self::get_order`]
    pub fn get_order_by_number(
        &self,
        order_number: &str,
        actor: &CurrentUser,
    ) -> ManagerResult<Order> {
        let order = self
            .storage
            .get_by_number(order_number)?
            .ok_or_else(|| ManagerError::OrderNotFound(order_number.to_string()))?;
        check_visible(&order, actor)?;
        Ok(order)
    }

    /// Waitress's non-terminal orders, newest first
    pub fn my_active_orders(&self, waitress_id: &str) -> ManagerResult<Vec<Order>> {
        let mut orders = self
            .storage
            .find(|o| o.waitress_id == waitress_id && !o.status.is_terminal())?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// Non-terminal orders reduced to a station's lines, oldest first
    pub fn station_orders(&self, station: PrepStation) -> ManagerResult<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .storage
            .find(|o| !o.status.is_terminal())?
            .iter()
            .filter_map(|o| o.for_station(station))
            .collect();
        orders.sort_by_key(|o| o.created_at);
        Ok(orders)
    }

    /// Owner listing, newest first
    pub fn all_orders(&self, query: &OrderQuery) -> ManagerResult<Vec<Order>> {
        let mut orders = self.storage.find(|o| {
            query.status.is_none_or(|s| o.status == s)
                && query
                    .waitress_id
                    .as_ref()
                    .is_none_or(|w| &o.waitress_id == w)
                && query
                    .created_between
                    .is_none_or(|(start, end)| o.created_at >= start && o.created_at < end)
        })?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// Orders a connected client should see after (re)connecting
    pub fn sync_orders(&self, actor: &CurrentUser) -> ManagerResult<Vec<Order>> {
        match actor.role {
            Role::Waitress => self.my_active_orders(&actor.id),
            Role::Kitchen => self.station_orders(PrepStation::Kitchen),
            Role::Juicebar => self.station_orders(PrepStation::Juicebar),
            Role::Owner => self.all_orders(&OrderQuery::default()).map(|orders| {
                orders
                    .into_iter()
                    .filter(|o| !o.status.is_terminal())
                    .collect()
            }),
        }
    }
}

// ========== Helpers ==========

/// Order-preserving dedupe
fn unique(values: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

/// Price one line from its menu item snapshot
fn price_line(
    menu_item: &MenuItem,
    order_type: OrderType,
    input: &OrderLineInput,
    add_ons: Vec<SelectedAddOn>,
) -> OrderItem {
    let price_per_unit = menu_item.unit_price(order_type);
    let add_on_prices: Vec<f64> = add_ons.iter().map(|a| a.price).collect();
    let auto_complete = !menu_item.requires_preparation;
    OrderItem {
        line_id: new_id(),
        item_id: menu_item.id.clone(),
        name: menu_item.name.clone(),
        variant: input.variant.trim().to_string(),
        quantity: input.quantity,
        price_per_unit,
        subtotal: money::line_subtotal(price_per_unit, input.quantity, &add_on_prices),
        add_ons,
        special_notes: input.special_notes.trim().to_string(),
        prep_station: menu_item.prep_station,
        auto_complete,
        skip_kitchen: auto_complete,
        status: if auto_complete {
            ItemStatus::Ready
        } else {
            ItemStatus::Pending
        },
    }
}

fn check_visible(order: &Order, actor: &CurrentUser) -> ManagerResult<()> {
    if actor.role == Role::Waitress && order.waitress_id != actor.id {
        return Err(ManagerError::NotOwner);
    }
    Ok(())
}

/// Owner, non-terminal and inside the grace window
fn check_editable(order: &Order, actor: &CurrentUser, now: i64) -> ManagerResult<()> {
    if order.waitress_id != actor.id {
        return Err(ManagerError::NotOwner);
    }
    if order.status.is_terminal() {
        return Err(ManagerError::OrderTerminal(order.status));
    }
    if !order.is_within_grace_window(now) {
        return Err(ManagerError::GraceWindowExpired(order.order_number.clone()));
    }
    Ok(())
}

fn is_clearable(order: &Order) -> bool {
    matches!(
        order.status,
        OrderStatus::Pending | OrderStatus::Confirmed | OrderStatus::InProgress
    )
}

/// Mark an order cancelled and write its log inside the open transaction
fn apply_cancellation(
    txn: &WriteTransaction,
    order: &mut Order,
    ctx: &CancelContext<'_>,
) -> ManagerResult<CancellationLog> {
    let phase = aggregate::cancellation_phase(order, ctx.now).map_err(|r| match r {
        PhaseRejection::Terminal(s) => ManagerError::OrderTerminal(s),
        PhaseRejection::Unmapped(s) => ManagerError::InvalidCancellationState(s),
    })?;
    let waste_cost = aggregate::waste_cost(order.grand_total, phase);
    let wasted_items = aggregate::wasted_items(order);
    let requires_review = phase.requires_review();

    let log = CancellationLog {
        id: new_id(),
        order_id: order.id.clone(),
        order_number: order.order_number.clone(),
        cancelled_by: ctx.actor.id.clone(),
        cancelled_by_name: ctx.actor.full_name.clone(),
        phase,
        reason: ctx.reason.to_string(),
        details: ctx.details.to_string(),
        items_lost: wasted_items.clone(),
        waste_cost,
        requires_review,
        reviewed_by: None,
        reviewed_at: None,
        created_at: ctx.now,
    };
    OrderStorage::insert_cancellation_log(txn, &log)?;

    order.status = OrderStatus::Cancelled;
    order.cancellation = Some(CancellationInfo {
        cancelled_at: ctx.now,
        cancelled_by: ctx.actor.id.clone(),
        phase,
        reason: ctx.reason.to_string(),
        details: ctx.details.to_string(),
        waste_cost,
        wasted_items,
    });
    Ok(log)
}

/// Amounts settled by a payment request
#[derive(Debug, Clone, Copy, PartialEq)]
struct Settlement {
    amount_received: f64,
    change_due: f64,
}

/// Validate tender amounts against the order total
fn settle(req: &ProcessPaymentRequest, grand_total: f64) -> ManagerResult<Settlement> {
    if req.payment_method == PaymentMethod::Split {
        if req.split_payments.is_empty() {
            return Err(ManagerError::Validation(
                "Split payment requires at least one part".to_string(),
            ));
        }
        for part in &req.split_payments {
            money::require_amount(part.amount, "split amount").map_err(ManagerError::Validation)?;
        }
        let actual = money::sum(req.split_payments.iter().map(|p| p.amount));
        if !money::money_eq(actual, grand_total) {
            return Err(ManagerError::SplitMismatch {
                expected: grand_total,
                actual,
            });
        }
        return Ok(Settlement {
            amount_received: actual,
            change_due: 0.0,
        });
    }

    let paid = req.amount_received.unwrap_or(grand_total);
    money::require_amount(paid, "amount_received").map_err(ManagerError::Validation)?;

    if req.payment_method == PaymentMethod::Cash {
        if !money::is_payment_sufficient(paid, grand_total) {
            return Err(ManagerError::InsufficientPayment {
                required: grand_total,
                received: paid,
            });
        }
        return Ok(Settlement {
            amount_received: paid,
            change_due: money::to_f64(money::to_decimal(paid) - money::to_decimal(grand_total)),
        });
    }

    Ok(Settlement {
        amount_received: paid,
        change_due: 0.0,
    })
}

/// Change breakdown for cash overpayment
fn change_info(payment: &Payment) -> Option<ChangeInfo> {
    (payment.payment_method == PaymentMethod::Cash && payment.change_due > 0.0).then(|| {
        ChangeInfo {
            amount: payment.change_due,
            breakdown: money::change_breakdown(payment.change_due),
        }
    })
}

#[cfg(test)]
mod tests;
