//! Daily analytics accumulator
//!
//! 支付完成时增量更新当天的 `DailyAnalytics` 记录 (不存在则创建)。
//! 只有支付路径写入；下单数和取消统计由报表从订单推导。
//! best-effort：失败只记日志，不影响主流程。

use chrono_tz::Tz;
use shared::models::{
    DailyAnalytics, HourlySales, ItemSales, Order, Payment, PaymentMethod, PaymentMethodTotals,
    TenderMethod, WaitressSales,
};

use crate::db::DbService;
use crate::db::repository::AnalyticsRepository;
use crate::orders::money;
use crate::utils::time::{business_date, business_hour, date_key};

/// Credit an amount to a tender bucket
fn credit(totals: &mut PaymentMethodTotals, method: TenderMethod, amount: f64) {
    let bucket = match method {
        TenderMethod::Cash => &mut totals.cash,
        TenderMethod::Card => &mut totals.card,
        TenderMethod::MobileMoney => &mut totals.mobile_money,
    };
    *bucket = money::sum([*bucket, amount]);
}

/// Split a payment into its tender buckets
pub fn apply_payment_methods(totals: &mut PaymentMethodTotals, payment: &Payment) {
    match payment.payment_method {
        PaymentMethod::Cash => credit(totals, TenderMethod::Cash, payment.total_amount),
        PaymentMethod::Card => credit(totals, TenderMethod::Card, payment.total_amount),
        PaymentMethod::MobileMoney => {
            credit(totals, TenderMethod::MobileMoney, payment.total_amount)
        }
        PaymentMethod::Split => {
            for split in &payment.split_payments {
                credit(totals, split.method, split.amount);
            }
        }
    }
}

fn waitress_entry<'a>(record: &'a mut DailyAnalytics, order: &Order) -> &'a mut WaitressSales {
    let index = match record
        .sales_by_waitress
        .iter()
        .position(|w| w.waitress_id == order.waitress_id)
    {
        Some(index) => index,
        None => {
            record.sales_by_waitress.push(WaitressSales {
                waitress_id: order.waitress_id.clone(),
                waitress_name: order.waitress_name.clone(),
                orders: 0,
                revenue: 0.0,
                cancellations: 0,
            });
            record.sales_by_waitress.len() - 1
        }
    };
    &mut record.sales_by_waitress[index]
}

/// Fold a completed payment into a daily record
pub fn apply_payment(record: &mut DailyAnalytics, order: &Order, payment: &Payment, hour: u32) {
    record.completed_orders += 1;
    record.total_revenue = money::sum([record.total_revenue, order.grand_total]);
    apply_payment_methods(&mut record.payment_methods, payment);

    let waitress = waitress_entry(record, order);
    waitress.orders += 1;
    waitress.revenue = money::sum([waitress.revenue, order.grand_total]);

    match record.sales_by_hour.iter_mut().find(|h| h.hour == hour) {
        Some(slot) => {
            slot.orders += 1;
            slot.revenue = money::sum([slot.revenue, order.grand_total]);
        }
        None => {
            record.sales_by_hour.push(HourlySales {
                hour,
                orders: 1,
                revenue: order.grand_total,
            });
            record.sales_by_hour.sort_by_key(|h| h.hour);
        }
    }

    for item in &order.items {
        match record.top_items.iter_mut().find(|i| i.item_id == item.item_id) {
            Some(stats) => {
                stats.quantity_sold += u64::from(item.quantity);
                stats.revenue = money::sum([stats.revenue, item.subtotal]);
            }
            None => record.top_items.push(ItemSales {
                item_id: item.item_id.clone(),
                item_name: item.name.clone(),
                quantity_sold: u64::from(item.quantity),
                revenue: item.subtotal,
            }),
        }
    }
}

/// Incremental writer for the business day's rollup
#[derive(Clone, Debug)]
pub struct SalesAccumulator {
    repo: AnalyticsRepository,
    tz: Tz,
}

impl SalesAccumulator {
    pub fn new(db: DbService, tz: Tz) -> Self {
        Self {
            repo: AnalyticsRepository::new(db),
            tz,
        }
    }

    fn day_of(&self, millis: i64) -> String {
        date_key(business_date(millis, self.tz))
    }

    /// 支付日计入营收；小时分桶按下单时间
    pub fn record_payment(&self, order: &Order, payment: &Payment) {
        let date = self.day_of(payment.created_at);
        let hour = business_hour(order.created_at, self.tz);
        if let Err(e) = self
            .repo
            .accumulate(&date, |record| apply_payment(record, order, payment, hour))
        {
            tracing::error!(order_number = %order.order_number, error = %e, "Failed to record payment in daily analytics");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{
        ItemStatus, LocalizedText, OrderItem, OrderStatus, OrderType, PaymentStatus,
        PrepStation, SplitPayment,
    };

    fn order(waitress: &str, lines: &[(&str, u32, f64)]) -> Order {
        let items: Vec<OrderItem> = lines
            .iter()
            .map(|(id, qty, subtotal)| OrderItem {
                line_id: format!("line-{}", id),
                item_id: id.to_string(),
                name: LocalizedText::new(*id, *id),
                variant: String::new(),
                quantity: *qty,
                price_per_unit: subtotal / f64::from(*qty),
                add_ons: vec![],
                special_notes: String::new(),
                subtotal: *subtotal,
                prep_station: PrepStation::Kitchen,
                auto_complete: false,
                skip_kitchen: false,
                status: ItemStatus::Ready,
            })
            .collect();
        let total = items.iter().map(|i| i.subtotal).sum();
        Order {
            id: format!("order-{}", waitress),
            order_number: "ORD-20250106-0001".to_string(),
            order_type: OrderType::DineIn,
            customer_name: String::new(),
            customer_phone: String::new(),
            waitress_id: waitress.to_string(),
            waitress_name: waitress.to_uppercase(),
            items,
            subtotal: total,
            grand_total: total,
            status: OrderStatus::Completed,
            payment_status: PaymentStatus::Paid,
            grace_window_ends_at: 0,
            completed_at: None,
            cancellation: None,
            version: 0,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn payment(order: &Order, method: PaymentMethod, splits: Vec<SplitPayment>) -> Payment {
        Payment {
            id: "p1".to_string(),
            order_id: order.id.clone(),
            order_number: order.order_number.clone(),
            payment_method: method,
            total_amount: order.grand_total,
            amount_received: order.grand_total,
            change_due: 0.0,
            split_payments: splits,
            waitress_id: order.waitress_id.clone(),
            transaction_id: None,
            created_at: 0,
        }
    }

    #[test]
    fn test_payment_rollups() {
        let mut record = DailyAnalytics::empty("2025-01-06");
        let first = order("w1", &[("tibs", 2, 10.0), ("juice", 1, 3.5)]);
        let second = order("w1", &[("tibs", 1, 5.0)]);

        apply_payment(&mut record, &first, &payment(&first, PaymentMethod::Cash, vec![]), 12);
        apply_payment(&mut record, &second, &payment(&second, PaymentMethod::Card, vec![]), 12);

        assert_eq!(record.completed_orders, 2);
        assert_eq!(record.total_revenue, 18.5);
        assert_eq!(record.payment_methods.cash, 13.5);
        assert_eq!(record.payment_methods.card, 5.0);
        assert_eq!(record.sales_by_waitress.len(), 1);
        assert_eq!(record.sales_by_waitress[0].orders, 2);
        assert_eq!(record.sales_by_hour, vec![HourlySales { hour: 12, orders: 2, revenue: 18.5 }]);

        let tibs = record.top_items.iter().find(|i| i.item_id == "tibs").unwrap();
        assert_eq!(tibs.quantity_sold, 3);
        assert_eq!(tibs.revenue, 15.0);
    }

    #[test]
    fn test_split_payment_buckets() {
        let mut totals = PaymentMethodTotals::default();
        let o = order("w1", &[("tibs", 1, 11.0)]);
        let p = payment(
            &o,
            PaymentMethod::Split,
            vec![
                SplitPayment { method: TenderMethod::Cash, amount: 6.0 },
                SplitPayment { method: TenderMethod::MobileMoney, amount: 5.0 },
            ],
        );
        apply_payment_methods(&mut totals, &p);
        assert_eq!(totals.cash, 6.0);
        assert_eq!(totals.mobile_money, 5.0);
        assert_eq!(totals.card, 0.0);
    }

    #[test]
    fn test_accumulator_creates_record() {
        let db = DbService::open_in_memory().unwrap();
        let acc = SalesAccumulator::new(db.clone(), chrono_tz::UTC);
        let o = order("w1", &[("tibs", 1, 7.0)]);
        acc.record_payment(&o, &payment(&o, PaymentMethod::Cash, vec![]));

        let record = AnalyticsRepository::new(db).get("1970-01-01").unwrap().unwrap();
        assert_eq!(record.total_orders, 0);
        assert_eq!(record.cancelled_orders, 0);
        assert_eq!(record.completed_orders, 1);
        assert_eq!(record.total_revenue, 7.0);
    }
}
