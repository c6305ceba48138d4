//! Report Service
//!
//! 报表按需从订单、支付和取消日志实时计算；`DailyAnalytics` 只作为当天的
//! 累计快照附在 today 报表里。

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use chrono_tz::Tz;
use rust_decimal::Decimal;
use shared::models::{
    CancellationFilter, CancellationLog, CancellationPhase, CancellationReport,
    CancellationSummary, CancellationTotals, DailyAnalytics, DailyPaymentSummary, DailyPayments,
    DaySales, ItemSales, Order, OrderStatus, PaymentMethodTotals, PeriodAnalytics, PeriodSummary,
    StaffPerformance, TodayAnalytics, TodaySummary, WaitressPerformance, WaitressSales,
    WaitressSummary,
};

use super::accumulator::apply_payment_methods;
use crate::db::DbService;
use crate::db::repository::AnalyticsRepository;
use crate::orders::{ManagerResult, OrderStorage, money};
use crate::utils::AppResult;
use crate::utils::time::{business_date, date_key, day_end_millis, day_start_millis, parse_date};

/// Number of items in a top-items list
pub const TOP_ITEMS_LIMIT: usize = 10;

/// `total / count`, 0 when there is nothing to divide
fn average(total: f64, count: u64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    money::to_f64(money::to_decimal(total) / Decimal::from(count))
}

/// `part / whole` as a percentage with two decimals
fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    money::to_f64(Decimal::from(part) * Decimal::from(100) / Decimal::from(whole))
}

/// Completed orders' revenue
fn revenue(orders: &[&Order]) -> f64 {
    money::sum(
        orders
            .iter()
            .filter(|o| o.status == OrderStatus::Completed)
            .map(|o| o.grand_total),
    )
}

fn count_status(orders: &[&Order], status: OrderStatus) -> u64 {
    orders.iter().filter(|o| o.status == status).count() as u64
}

/// Top items by revenue over completed orders
pub fn top_items(orders: &[&Order], limit: usize) -> Vec<ItemSales> {
    let mut by_item: HashMap<&str, ItemSales> = HashMap::new();
    for order in orders.iter().filter(|o| o.status == OrderStatus::Completed) {
        for item in &order.items {
            let entry = by_item.entry(item.item_id.as_str()).or_insert_with(|| ItemSales {
                item_id: item.item_id.clone(),
                item_name: item.name.clone(),
                quantity_sold: 0,
                revenue: 0.0,
            });
            entry.quantity_sold += u64::from(item.quantity);
            entry.revenue = money::sum([entry.revenue, item.subtotal]);
        }
    }
    let mut items: Vec<ItemSales> = by_item.into_values().collect();
    items.sort_by(|a, b| {
        b.revenue
            .total_cmp(&a.revenue)
            .then_with(|| b.quantity_sold.cmp(&a.quantity_sold))
            .then_with(|| a.item_id.cmp(&b.item_id))
    });
    items.truncate(limit);
    items
}

/// Per-waitress orders / revenue / cancellations, highest revenue first
pub fn sales_by_waitress(orders: &[&Order]) -> Vec<WaitressSales> {
    let mut by_waitress: BTreeMap<&str, WaitressSales> = BTreeMap::new();
    for order in orders {
        let entry = by_waitress
            .entry(order.waitress_id.as_str())
            .or_insert_with(|| WaitressSales {
                waitress_id: order.waitress_id.clone(),
                waitress_name: order.waitress_name.clone(),
                orders: 0,
                revenue: 0.0,
                cancellations: 0,
            });
        match order.status {
            OrderStatus::Completed => {
                entry.orders += 1;
                entry.revenue = money::sum([entry.revenue, order.grand_total]);
            }
            OrderStatus::Cancelled => entry.cancellations += 1,
            _ => {}
        }
    }
    let mut sales: Vec<WaitressSales> = by_waitress.into_values().collect();
    sales.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    sales
}

/// Count + waste per cancellation phase
pub fn summarize_cancellations(logs: &[CancellationLog]) -> CancellationSummary {
    let mut summary = CancellationSummary {
        total: logs.len() as u64,
        requires_review: logs.iter().filter(|l| l.requires_review).count() as u64,
        total_waste_cost: money::sum(logs.iter().map(|l| l.waste_cost)),
        ..Default::default()
    };
    for log in logs {
        let bucket = match log.phase {
            CancellationPhase::GraceWindow => &mut summary.by_phase.grace_window,
            CancellationPhase::Confirmed => &mut summary.by_phase.confirmed,
            CancellationPhase::InProgress => &mut summary.by_phase.in_progress,
            CancellationPhase::Ready => &mut summary.by_phase.ready,
        };
        *bucket += 1;
    }
    summary
}

/// Read-only reporting over orders, payments and cancellation logs
#[derive(Clone, Debug)]
pub struct ReportService {
    orders: OrderStorage,
    analytics: AnalyticsRepository,
    tz: Tz,
}

impl ReportService {
    pub fn new(db: DbService, tz: Tz) -> Self {
        Self {
            orders: OrderStorage::new(db.clone()),
            analytics: AnalyticsRepository::new(db),
            tz,
        }
    }

    fn bounds(&self, start: NaiveDate, end: NaiveDate) -> (i64, i64) {
        (day_start_millis(start, self.tz), day_end_millis(end, self.tz))
    }

    fn orders_between(&self, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<Order>> {
        let (from, to) = self.bounds(start, end);
        Ok(self
            .orders
            .find(|o| o.created_at >= from && o.created_at < to)?)
    }

    // ========== Today ==========

    pub fn today(&self, date: NaiveDate) -> AppResult<TodayAnalytics> {
        let orders = self.orders_between(date, date)?;
        let refs: Vec<&Order> = orders.iter().collect();

        let completed = count_status(&refs, OrderStatus::Completed);
        let total_revenue = revenue(&refs);
        let summary = TodaySummary {
            total_orders: refs.len() as u64,
            completed_orders: completed,
            cancelled_orders: count_status(&refs, OrderStatus::Cancelled),
            active_orders: refs.iter().filter(|o| !o.status.is_terminal()).count() as u64,
            total_revenue,
            average_order_value: average(total_revenue, completed),
        };

        let key = date_key(date);
        let mut analytics = self
            .analytics
            .get(&key)?
            .unwrap_or_else(|| DailyAnalytics::empty(key.clone()));

        // 快照只由支付写入；下单数、取消数和损耗从订单与取消日志补齐
        let (from, to) = self.bounds(date, date);
        let logs = self
            .orders
            .cancellation_logs(|l| l.created_at >= from && l.created_at < to)?;
        analytics.total_orders = summary.total_orders;
        analytics.cancelled_orders = summary.cancelled_orders;
        analytics.total_waste_cost = money::sum(logs.iter().map(|l| l.waste_cost));
        for derived in sales_by_waitress(&refs) {
            match analytics
                .sales_by_waitress
                .iter_mut()
                .find(|w| w.waitress_id == derived.waitress_id)
            {
                Some(entry) => entry.cancellations = derived.cancellations,
                None if derived.cancellations > 0 => analytics.sales_by_waitress.push(WaitressSales {
                    orders: 0,
                    revenue: 0.0,
                    ..derived
                }),
                None => {}
            }
        }

        Ok(TodayAnalytics {
            date: key,
            summary,
            analytics,
        })
    }

    // ========== Period ==========

    pub fn period(&self, start: NaiveDate, end: NaiveDate) -> AppResult<PeriodAnalytics> {
        let orders = self.orders_between(start, end)?;
        let refs: Vec<&Order> = orders.iter().collect();
        let (from, to) = self.bounds(start, end);

        let mut payment_methods = PaymentMethodTotals::default();
        for payment in self.orders.payments_between(from, to)? {
            apply_payment_methods(&mut payment_methods, &payment);
        }

        let logs = self
            .orders
            .cancellation_logs(|l| l.created_at >= from && l.created_at < to)?;
        let cancellations = CancellationTotals {
            count: logs.len() as u64,
            total_waste_cost: money::sum(logs.iter().map(|l| l.waste_cost)),
        };

        let completed = count_status(&refs, OrderStatus::Completed);
        let total_revenue = revenue(&refs);
        let summary = PeriodSummary {
            total_orders: refs.len() as u64,
            completed_orders: completed,
            cancelled_orders: count_status(&refs, OrderStatus::Cancelled),
            total_revenue,
            average_order_value: average(total_revenue, completed),
            total_waste_cost: cancellations.total_waste_cost,
        };

        Ok(PeriodAnalytics {
            start_date: date_key(start),
            end_date: date_key(end),
            summary,
            payment_methods,
            sales_by_waitress: sales_by_waitress(&refs),
            top_items: top_items(&refs, TOP_ITEMS_LIMIT),
            cancellations,
        })
    }

    // ========== Waitress ==========

    pub fn waitress_performance(
        &self,
        waitress_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<WaitressPerformance> {
        let orders = self.orders_between(start, end)?;
        let refs: Vec<&Order> = orders.iter().filter(|o| o.waitress_id == waitress_id).collect();

        let total = refs.len() as u64;
        let completed = count_status(&refs, OrderStatus::Completed);
        let cancelled = count_status(&refs, OrderStatus::Cancelled);
        let total_revenue = revenue(&refs);

        let mut by_day: BTreeMap<String, DaySales> = BTreeMap::new();
        for order in &refs {
            let day = date_key(business_date(order.created_at, self.tz));
            let entry = by_day.entry(day.clone()).or_insert_with(|| DaySales {
                date: day,
                orders: 0,
                revenue: 0.0,
            });
            entry.orders += 1;
            if order.status == OrderStatus::Completed {
                entry.revenue = money::sum([entry.revenue, order.grand_total]);
            }
        }

        Ok(WaitressPerformance {
            waitress_id: waitress_id.to_string(),
            summary: WaitressSummary {
                total_orders: total,
                completed_orders: completed,
                cancelled_orders: cancelled,
                total_revenue,
                average_order_value: average(total_revenue, completed),
                cancellation_rate: percentage(cancelled, total),
            },
            orders_by_day: by_day.into_values().collect(),
        })
    }

    /// All-time performance for every waitress (staff listing)
    pub fn staff_performance(&self) -> AppResult<HashMap<String, StaffPerformance>> {
        let orders = self.orders.find(|_| true)?;
        let mut out: HashMap<String, StaffPerformance> = HashMap::new();
        for order in &orders {
            let entry = out.entry(order.waitress_id.clone()).or_default();
            entry.total_orders += 1;
            match order.status {
                OrderStatus::Completed => {
                    entry.completed_orders += 1;
                    entry.total_revenue = money::sum([entry.total_revenue, order.grand_total]);
                }
                OrderStatus::Cancelled => entry.cancelled_orders += 1,
                _ => {}
            }
        }
        for perf in out.values_mut() {
            perf.average_order_value = average(perf.total_revenue, perf.completed_orders);
        }
        Ok(out)
    }

    // ========== Payments ==========

    pub fn daily_payments(&self, date: NaiveDate) -> AppResult<DailyPayments> {
        let (from, to) = self.bounds(date, date);
        let payments = self.orders.payments_between(from, to)?;

        let mut methods = PaymentMethodTotals::default();
        for payment in &payments {
            apply_payment_methods(&mut methods, payment);
        }

        Ok(DailyPayments {
            date: date_key(date),
            summary: DailyPaymentSummary {
                total: money::sum(payments.iter().map(|p| p.total_amount)),
                count: payments.len() as u64,
                cash: methods.cash,
                card: methods.card,
                mobile_money: methods.mobile_money,
            },
            payments,
        })
    }

    // ========== Cancellations ==========

    pub fn cancellations(&self, filter: &CancellationFilter) -> AppResult<CancellationReport> {
        let start = filter.start_date.as_deref().map(parse_date).transpose()?;
        let end = filter.end_date.as_deref().map(parse_date).transpose()?;
        let from = start.map(|d| day_start_millis(d, self.tz));
        let to = end.map(|d| day_end_millis(d, self.tz));

        let logs = self.orders.cancellation_logs(|log| {
            filter.requires_review.is_none_or(|r| log.requires_review == r)
                && from.is_none_or(|f| log.created_at >= f)
                && to.is_none_or(|t| log.created_at < t)
        })?;

        Ok(CancellationReport {
            summary: summarize_cancellations(&logs),
            logs,
        })
    }

    pub fn review_cancellation(
        &self,
        log_id: &str,
        reviewer_id: &str,
    ) -> ManagerResult<CancellationLog> {
        let log = self.orders.review_cancellation(log_id, reviewer_id)?;
        tracing::info!(order_number = %log.order_number, reviewer = %reviewer_id, "Cancellation reviewed");
        Ok(log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{
        ItemStatus, LocalizedText, OrderItem, OrderType, Payment,
        PaymentMethod, PaymentStatus, PrepStation, SplitPayment, TenderMethod, WastedItem,
    };

    const DAY: i64 = 1_736_121_600_000; // 2025-01-06 00:00 UTC

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()
    }

    fn item(id: &str, qty: u32, subtotal: f64) -> OrderItem {
        OrderItem {
            line_id: format!("line-{}", id),
            item_id: id.to_string(),
            name: LocalizedText::new(id, id),
            variant: String::new(),
            quantity: qty,
            price_per_unit: subtotal / f64::from(qty),
            add_ons: vec![],
            special_notes: String::new(),
            subtotal,
            prep_station: PrepStation::Kitchen,
            auto_complete: false,
            skip_kitchen: false,
            status: ItemStatus::Ready,
        }
    }

    fn order(id: &str, waitress: &str, status: OrderStatus, items: Vec<OrderItem>, at: i64) -> Order {
        let total = money::sum(items.iter().map(|i| i.subtotal));
        Order {
            id: id.to_string(),
            order_number: format!("ORD-20250106-{}", id),
            order_type: OrderType::DineIn,
            customer_name: String::new(),
            customer_phone: String::new(),
            waitress_id: waitress.to_string(),
            waitress_name: waitress.to_uppercase(),
            items,
            subtotal: total,
            grand_total: total,
            status,
            payment_status: if status == OrderStatus::Completed {
                PaymentStatus::Paid
            } else {
                PaymentStatus::Unpaid
            },
            grace_window_ends_at: at,
            completed_at: None,
            cancellation: None,
            version: 0,
            created_at: at,
            updated_at: at,
        }
    }

    fn seed(storage: &OrderStorage, order: Order) {
        let business_day = date();
        let seeded = order.clone();
        storage
            .create(business_day, move |number| Order {
                order_number: number,
                ..seeded
            })
            .unwrap();
    }

    #[test]
    fn test_top_items_by_revenue() {
        let a = order("1", "w1", OrderStatus::Completed, vec![item("tibs", 2, 10.0), item("tea", 5, 5.0)], DAY);
        let b = order("2", "w1", OrderStatus::Completed, vec![item("juice", 1, 12.0)], DAY);
        let c = order("3", "w1", OrderStatus::Cancelled, vec![item("tea", 50, 50.0)], DAY);
        let refs = vec![&a, &b, &c];

        let top = top_items(&refs, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].item_id, "juice");
        assert_eq!(top[1].item_id, "tibs");
    }

    #[test]
    fn test_sales_by_waitress_counts_cancellations() {
        let a = order("1", "w1", OrderStatus::Completed, vec![item("tibs", 1, 10.0)], DAY);
        let b = order("2", "w1", OrderStatus::Cancelled, vec![item("tibs", 1, 10.0)], DAY);
        let c = order("3", "w2", OrderStatus::Completed, vec![item("tibs", 2, 20.0)], DAY);
        let sales = sales_by_waitress(&[&a, &b, &c]);
        assert_eq!(sales[0].waitress_id, "w2");
        assert_eq!(sales[1].orders, 1);
        assert_eq!(sales[1].cancellations, 1);
    }

    #[test]
    fn test_summarize_cancellations() {
        let log = |phase, waste: f64, review| CancellationLog {
            id: uuid::Uuid::new_v4().to_string(),
            order_id: "o".to_string(),
            order_number: "n".to_string(),
            cancelled_by: "w1".to_string(),
            cancelled_by_name: "W1".to_string(),
            phase,
            reason: "r".to_string(),
            details: String::new(),
            items_lost: vec![],
            waste_cost: waste,
            requires_review: review,
            reviewed_by: None,
            reviewed_at: None,
            created_at: DAY,
        };
        let summary = summarize_cancellations(&[
            log(CancellationPhase::GraceWindow, 0.0, false),
            log(CancellationPhase::Confirmed, 10.0, true),
            log(CancellationPhase::Ready, 20.0, true),
        ]);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.requires_review, 2);
        assert_eq!(summary.total_waste_cost, 30.0);
        assert_eq!(summary.by_phase.confirmed, 1);
        assert_eq!(summary.by_phase.in_progress, 0);
    }

    #[test]
    fn test_period_and_waitress_reports() {
        let db = DbService::open_in_memory().unwrap();
        let reports = ReportService::new(db.clone(), chrono_tz::UTC);
        let storage = OrderStorage::new(db);

        seed(&storage, order("a", "w1", OrderStatus::Completed, vec![item("tibs", 1, 10.0)], DAY + 1_000));
        seed(&storage, order("b", "w1", OrderStatus::Cancelled, vec![item("tibs", 1, 20.0)], DAY + 2_000));
        seed(&storage, order("c", "w1", OrderStatus::Completed, vec![item("tea", 1, 5.0)], DAY + 86_400_000));
        // 区间外
        seed(&storage, order("d", "w2", OrderStatus::Completed, vec![item("tibs", 1, 99.0)], DAY - 1));

        let next_day = date().succ_opt().unwrap();
        let period = reports.period(date(), next_day).unwrap();
        assert_eq!(period.summary.total_orders, 3);
        assert_eq!(period.summary.completed_orders, 2);
        assert_eq!(period.summary.total_revenue, 15.0);
        assert_eq!(period.summary.average_order_value, 7.5);
        assert_eq!(period.sales_by_waitress.len(), 1);

        let perf = reports.waitress_performance("w1", date(), next_day).unwrap();
        assert_eq!(perf.summary.total_orders, 3);
        assert_eq!(perf.summary.cancellation_rate, 33.33);
        assert_eq!(perf.orders_by_day.len(), 2);
        assert_eq!(perf.orders_by_day[0].date, "2025-01-06");
        assert_eq!(perf.orders_by_day[0].orders, 2);
        assert_eq!(perf.orders_by_day[0].revenue, 10.0);

        let today = reports.today(date()).unwrap();
        assert_eq!(today.summary.total_orders, 2);
        assert_eq!(today.summary.cancelled_orders, 1);
        assert_eq!(today.analytics.date, "2025-01-06");
        assert_eq!(today.analytics.total_orders, 2);
        assert_eq!(today.analytics.cancelled_orders, 1);
        assert_eq!(today.analytics.sales_by_waitress[0].cancellations, 1);

        let staff = reports.staff_performance().unwrap();
        assert_eq!(staff["w1"].total_orders, 3);
        assert_eq!(staff["w2"].total_revenue, 99.0);
    }

    #[test]
    fn test_daily_payments_split_distribution() {
        let db = DbService::open_in_memory().unwrap();
        let reports = ReportService::new(db.clone(), chrono_tz::UTC);

        let payment = |id: &str, method, total: f64, splits: Vec<SplitPayment>, at: i64| Payment {
            id: id.to_string(),
            order_id: format!("order-{}", id),
            order_number: format!("ORD-{}", id),
            payment_method: method,
            total_amount: total,
            amount_received: total,
            change_due: 0.0,
            split_payments: splits,
            waitress_id: "w1".to_string(),
            transaction_id: None,
            created_at: at,
        };
        let txn = db.begin_write().unwrap();
        OrderStorage::insert_payment(&txn, &payment("1", PaymentMethod::Cash, 11.0, vec![], DAY + 10)).unwrap();
        OrderStorage::insert_payment(
            &txn,
            &payment(
                "2",
                PaymentMethod::Split,
                9.0,
                vec![
                    SplitPayment { method: TenderMethod::Card, amount: 4.0 },
                    SplitPayment { method: TenderMethod::Cash, amount: 5.0 },
                ],
                DAY + 20,
            ),
        )
        .unwrap();
        OrderStorage::insert_payment(&txn, &payment("3", PaymentMethod::Card, 50.0, vec![], DAY - 10)).unwrap();
        txn.commit().unwrap();

        let daily = reports.daily_payments(date()).unwrap();
        assert_eq!(daily.payments.len(), 2);
        assert_eq!(daily.summary.count, 2);
        assert_eq!(daily.summary.total, 20.0);
        assert_eq!(daily.summary.cash, 16.0);
        assert_eq!(daily.summary.card, 4.0);
    }

    #[test]
    fn test_cancellation_report_filters() {
        let db = DbService::open_in_memory().unwrap();
        let reports = ReportService::new(db.clone(), chrono_tz::UTC);

        let txn = db.begin_write().unwrap();
        for (id, review) in [("1", true), ("2", false)] {
            OrderStorage::insert_cancellation_log(
                &txn,
                &CancellationLog {
                    id: id.to_string(),
                    order_id: format!("o{}", id),
                    order_number: format!("n{}", id),
                    cancelled_by: "w1".to_string(),
                    cancelled_by_name: "W1".to_string(),
                    phase: if review {
                        CancellationPhase::Confirmed
                    } else {
                        CancellationPhase::GraceWindow
                    },
                    reason: "r".to_string(),
                    details: String::new(),
                    items_lost: vec![WastedItem {
                        item_id: "tibs".to_string(),
                        item_name: "Tibs".to_string(),
                        quantity: 1,
                        cost: 20.0,
                    }],
                    waste_cost: if review { 10.0 } else { 0.0 },
                    requires_review: review,
                    reviewed_by: None,
                    reviewed_at: None,
                    created_at: DAY,
                },
            )
            .unwrap();
        }
        txn.commit().unwrap();

        let all = reports.cancellations(&CancellationFilter::default()).unwrap();
        assert_eq!(all.summary.total, 2);

        let pending = reports
            .cancellations(&CancellationFilter {
                requires_review: Some(true),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(pending.logs.len(), 1);
        assert_eq!(pending.summary.total_waste_cost, 10.0);

        let later = reports
            .cancellations(&CancellationFilter {
                start_date: Some("2025-01-07".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert!(later.logs.is_empty());

        let reviewed = reports.review_cancellation("1", "owner-1").unwrap();
        assert!(!reviewed.requires_review);
    }
}
