//! redb-based storage for orders, payments and cancellation logs
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `orders` | order id | `Order` | 订单聚合 (含内嵌行) |
//! | `orders_by_number` | order number | order id | 订单号唯一索引 |
//! | `payments` | payment id | `Payment` | 支付记录 |
//! | `payments_by_order` | order id | payment id | 一单一付 |
//! | `cancellation_logs` | log id | `CancellationLog` | 取消审计 |
//! | `sequence_counter` | `order_seq:YYYYMMDD` | `u64` | 每日订单序号 |
//!
//! 订单号分配与订单写入在同一个写事务内完成；redb 写事务串行化，
//! 并发下单不会拿到重复序号。

use chrono::NaiveDate;
use redb::{ReadableTable, WriteTransaction};
use shared::models::{CancellationLog, Order, Payment};
use shared::util::now_millis;

use super::manager::{ManagerError, ManagerResult};
use crate::db::{DbService, StorageResult, get_json, put_json, scan_json, tables};
use crate::utils::time::compact_date;

/// Order number prefix
const ORDER_NUMBER_PREFIX: &str = "ORD";

/// `ORD-YYYYMMDD-NNNN`
pub fn format_order_number(date: NaiveDate, sequence: u64) -> String {
    format!("{}-{}-{:04}", ORDER_NUMBER_PREFIX, compact_date(date), sequence)
}

fn sequence_key(date: NaiveDate) -> String {
    format!("order_seq:{}", compact_date(date))
}

/// Allocate the next free order number for a business date
///
/// 计数器 +1；如果号码已被占用 (计数器被重置过) 继续递增直到空闲。
fn allocate_order_number(txn: &WriteTransaction, date: NaiveDate) -> StorageResult<String> {
    let key = sequence_key(date);
    let mut counters = txn.open_table(tables::SEQUENCE)?;
    let index = txn.open_table(tables::ORDERS_BY_NUMBER)?;

    let mut sequence = counters.get(key.as_str())?.map(|g| g.value()).unwrap_or(0);
    let number = loop {
        sequence += 1;
        let candidate = format_order_number(date, sequence);
        if index.get(candidate.as_str())?.is_none() {
            break candidate;
        }
        tracing::warn!(order_number = %candidate, "Order number already taken, skipping");
    };
    counters.insert(key.as_str(), sequence)?;
    Ok(number)
}

/// Order storage backed by the shared redb database
#[derive(Clone, Debug)]
pub struct OrderStorage {
    db: DbService,
}

impl OrderStorage {
    pub fn new(db: DbService) -> Self {
        Self { db }
    }

    // ========== Orders ==========

    /// Allocate an order number and insert the order built from it, atomically
    pub fn create(
        &self,
        business_date: NaiveDate,
        build: impl FnOnce(String) -> Order,
    ) -> StorageResult<Order> {
        let txn = self.db.begin_write()?;
        let order = {
            let order_number = allocate_order_number(&txn, business_date)?;
            let order = build(order_number);
            let mut orders = txn.open_table(tables::ORDERS)?;
            let mut index = txn.open_table(tables::ORDERS_BY_NUMBER)?;
            put_json(&mut orders, &order.id, &order)?;
            index.insert(order.order_number.as_str(), order.id.as_str())?;
            order
        };
        txn.commit()?;
        Ok(order)
    }

    pub fn get(&self, id: &str) -> StorageResult<Option<Order>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(tables::ORDERS)?;
        get_json(&table, id)
    }

    pub fn get_by_number(&self, order_number: &str) -> StorageResult<Option<Order>> {
        let txn = self.db.begin_read()?;
        let index = txn.open_table(tables::ORDERS_BY_NUMBER)?;
        let Some(id) = index.get(order_number)?.map(|g| g.value().to_string()) else {
            return Ok(None);
        };
        let table = txn.open_table(tables::ORDERS)?;
        get_json(&table, &id)
    }

    /// Orders matching a predicate (unordered)
    pub fn find(&self, predicate: impl Fn(&Order) -> bool) -> StorageResult<Vec<Order>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(tables::ORDERS)?;
        Ok(scan_json::<Order, _>(&table)?
            .into_iter()
            .filter(|o| predicate(o))
            .collect())
    }

    /// 读-改-写一个订单
    ///
    /// 在单个写事务内: 加载 → 版本检查 → `f` → version+1 → 写回。
    /// `f` 可以通过 `txn` 在同一事务中写其他表 (支付、取消日志)；
    /// `f` 返回错误时整个事务放弃，订单保持原样。
    pub fn mutate<T>(
        &self,
        id: &str,
        expected_version: Option<u64>,
        f: impl FnOnce(&WriteTransaction, &mut Order) -> ManagerResult<T>,
    ) -> ManagerResult<(Order, T)> {
        let txn = self.db.begin_write()?;
        let result = {
            let mut table = txn.open_table(tables::ORDERS)?;
            let mut order: Order = get_json(&table, id)?
                .ok_or_else(|| ManagerError::OrderNotFound(id.to_string()))?;

            if let Some(expected) = expected_version
                && expected != order.version
            {
                return Err(ManagerError::VersionConflict {
                    expected,
                    actual: order.version,
                });
            }

            let out = f(&txn, &mut order)?;
            order.version += 1;
            order.updated_at = now_millis();
            put_json(&mut table, id, &order)?;
            (order, out)
        };
        txn.commit()?;
        Ok(result)
    }

    // ========== Payments ==========

    /// Insert a payment and its order index inside an open transaction
    pub fn insert_payment(txn: &WriteTransaction, payment: &Payment) -> StorageResult<()> {
        let mut payments = txn.open_table(tables::PAYMENTS)?;
        let mut index = txn.open_table(tables::PAYMENTS_BY_ORDER)?;
        put_json(&mut payments, &payment.id, payment)?;
        index.insert(payment.order_id.as_str(), payment.id.as_str())?;
        Ok(())
    }

    pub fn payment_for_order(&self, order_id: &str) -> StorageResult<Option<Payment>> {
        let txn = self.db.begin_read()?;
        let index = txn.open_table(tables::PAYMENTS_BY_ORDER)?;
        let Some(payment_id) = index.get(order_id)?.map(|g| g.value().to_string()) else {
            return Ok(None);
        };
        let table = txn.open_table(tables::PAYMENTS)?;
        get_json(&table, &payment_id)
    }

    /// Payments with `start <= created_at < end`, oldest first
    pub fn payments_between(&self, start: i64, end: i64) -> StorageResult<Vec<Payment>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(tables::PAYMENTS)?;
        let mut payments: Vec<Payment> = scan_json::<Payment, _>(&table)?
            .into_iter()
            .filter(|p| p.created_at >= start && p.created_at < end)
            .collect();
        payments.sort_by_key(|p| p.created_at);
        Ok(payments)
    }

    // ========== Cancellation logs ==========

    pub fn insert_cancellation_log(
        txn: &WriteTransaction,
        log: &CancellationLog,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(tables::CANCELLATION_LOGS)?;
        put_json(&mut table, &log.id, log)
    }

    /// Logs matching a predicate, newest first
    pub fn cancellation_logs(
        &self,
        predicate: impl Fn(&CancellationLog) -> bool,
    ) -> StorageResult<Vec<CancellationLog>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(tables::CANCELLATION_LOGS)?;
        let mut logs: Vec<CancellationLog> = scan_json::<CancellationLog, _>(&table)?
            .into_iter()
            .filter(|l| predicate(l))
            .collect();
        logs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(logs)
    }

    /// 审核取消记录 (日志唯一允许的修改)
    pub fn review_cancellation(
        &self,
        log_id: &str,
        reviewer_id: &str,
    ) -> ManagerResult<CancellationLog> {
        let txn = self.db.begin_write()?;
        let log = {
            let mut table = txn.open_table(tables::CANCELLATION_LOGS)?;
            let mut log: CancellationLog = get_json(&table, log_id)?
                .ok_or_else(|| ManagerError::CancellationLogNotFound(log_id.to_string()))?;
            if log.reviewed_at.is_some() {
                return Err(ManagerError::AlreadyReviewed(log_id.to_string()));
            }
            log.reviewed_by = Some(reviewer_id.to_string());
            log.reviewed_at = Some(now_millis());
            log.requires_review = false;
            put_json(&mut table, log_id, &log)?;
            log
        };
        txn.commit()?;
        Ok(log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{OrderStatus, OrderType, PaymentStatus};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()
    }

    fn blank_order(number: String) -> Order {
        Order {
            id: uuid::Uuid::new_v4().to_string(),
            order_number: number,
            order_type: OrderType::DineIn,
            customer_name: String::new(),
            customer_phone: String::new(),
            waitress_id: "w1".to_string(),
            waitress_name: "Hana".to_string(),
            items: vec![],
            subtotal: 0.0,
            grand_total: 0.0,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            grace_window_ends_at: 0,
            completed_at: None,
            cancellation: None,
            version: 0,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_order_numbers_per_day() {
        let storage = OrderStorage::new(DbService::open_in_memory().unwrap());
        let a = storage.create(date(), blank_order).unwrap();
        let b = storage.create(date(), blank_order).unwrap();
        let next_day = storage
            .create(date().succ_opt().unwrap(), blank_order)
            .unwrap();

        assert_eq!(a.order_number, "ORD-20250106-0001");
        assert_eq!(b.order_number, "ORD-20250106-0002");
        assert_eq!(next_day.order_number, "ORD-20250107-0001");

        let found = storage.get_by_number("ORD-20250106-0002").unwrap().unwrap();
        assert_eq!(found.id, b.id);
    }

    #[test]
    fn test_concurrent_numbers_are_unique() {
        let storage = OrderStorage::new(DbService::open_in_memory().unwrap());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let storage = storage.clone();
                std::thread::spawn(move || {
                    (0..10)
                        .map(|_| storage.create(date(), blank_order).unwrap().order_number)
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut numbers: Vec<String> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        numbers.sort();
        numbers.dedup();
        assert_eq!(numbers.len(), 80);
        assert_eq!(numbers.last().unwrap(), "ORD-20250106-0080");
    }

    #[test]
    fn test_mutate_bumps_version_and_checks_it() {
        let storage = OrderStorage::new(DbService::open_in_memory().unwrap());
        let order = storage.create(date(), blank_order).unwrap();

        let (updated, _) = storage
            .mutate(&order.id, Some(0), |_, o| {
                o.customer_name = "Abebe".to_string();
                Ok(())
            })
            .unwrap();
        assert_eq!(updated.version, 1);

        let stale = storage.mutate(&order.id, Some(0), |_, o| {
            o.customer_name = "Lost update".to_string();
            Ok(())
        });
        assert!(matches!(
            stale,
            Err(ManagerError::VersionConflict { expected: 0, actual: 1 })
        ));
        assert_eq!(storage.get(&order.id).unwrap().unwrap().customer_name, "Abebe");
    }

    #[test]
    fn test_failed_mutation_leaves_order_untouched() {
        let storage = OrderStorage::new(DbService::open_in_memory().unwrap());
        let order = storage.create(date(), blank_order).unwrap();

        let result: ManagerResult<(Order, ())> = storage.mutate(&order.id, None, |_, o| {
            o.status = OrderStatus::Cancelled;
            Err(ManagerError::NotOwner)
        });
        assert!(matches!(result, Err(ManagerError::NotOwner)));
        let stored = storage.get(&order.id).unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Pending);
        assert_eq!(stored.version, 0);
    }

    #[test]
    fn test_missing_order() {
        let storage = OrderStorage::new(DbService::open_in_memory().unwrap());
        let result = storage.mutate("nope", None, |_, _| Ok(()));
        assert!(matches!(result, Err(ManagerError::OrderNotFound(_))));
    }
}
