//! Database Module
//!
//! 单文件 redb 数据库 (`work_dir/database/pos.redb`)，所有实体以 JSON 存储。
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `staff` | staff id | `StaffRecord` | 员工 (含 PIN 哈希) |
//! | `staff_by_username` | username | staff id | 用户名唯一索引 |
//! | `categories` | id | `Category` | 分类 |
//! | `add_ons` | id | `AddOn` | 加料 |
//! | `menu_items` | id | `MenuItem` | 菜品 + 库存 |
//! | `settings` | `"settings"` | `RestaurantSettings` | 单例设置 |
//! | `daily_analytics` | `YYYY-MM-DD` | `DailyAnalytics` | 日统计 |
//! | `orders` | order id | `Order` | 订单聚合 |
//! | `orders_by_number` | order number | order id | 订单号唯一索引 |
//! | `payments` | payment id | `Payment` | 支付记录 |
//! | `payments_by_order` | order id | payment id | 一单一付 |
//! | `cancellation_logs` | log id | `CancellationLog` | 取消审计 |
//! | `sequence_counter` | `order_seq:YYYYMMDD` | `u64` | 每日订单序号 |
//!
//! # Durability
//!
//! redb 写事务串行化，所有读-改-写 (库存扣减、序号分配、订单变更、统计累加)
//! 都在单个写事务内完成，天然原子。

pub mod repository;
pub mod tables;

use redb::{Database, ReadTransaction, ReadableDatabase, ReadableTable, Table, WriteTransaction};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for shared::AppError {
    fn from(err: StorageError) -> Self {
        tracing::error!(error = %err, "Storage error occurred");
        let code = if err.to_string().to_lowercase().contains("corrupt") {
            shared::ErrorCode::StorageCorrupted
        } else {
            shared::ErrorCode::DatabaseError
        };
        shared::AppError::with_message(code, err.to_string())
    }
}

/// Database service, owns the shared redb handle
#[derive(Clone)]
pub struct DbService {
    db: Arc<Database>,
}

impl std::fmt::Debug for DbService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbService").field("db", &"<redb>").finish()
    }
}

impl DbService {
    /// Open or create the database at the given path
    ///
    /// redb uses `Durability::Immediate` by default: commits are persistent
    /// as soon as `commit()` returns.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        tables::create_all(&db)?;
        tracing::info!("Database opened (redb)");
        Ok(Self { db: Arc::new(db) })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        tables::create_all(&db)?;
        Ok(Self { db: Arc::new(db) })
    }

    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    pub fn begin_read(&self) -> StorageResult<ReadTransaction> {
        Ok(self.db.begin_read()?)
    }

    /// Cheap liveness probe (health endpoint)
    pub fn ping(&self) -> bool {
        self.db
            .begin_read()
            .map(|txn| txn.open_table(tables::SETTINGS).is_ok())
            .unwrap_or(false)
    }
}

// ========== JSON helpers ==========

/// Read and decode one JSON value
pub(crate) fn get_json<T, R>(table: &R, key: &str) -> StorageResult<Option<T>>
where
    T: DeserializeOwned,
    R: ReadableTable<&'static str, &'static [u8]>,
{
    match table.get(key)? {
        Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
        None => Ok(None),
    }
}

/// Encode and insert one JSON value
pub(crate) fn put_json<T: Serialize>(
    table: &mut Table<'_, &'static str, &'static [u8]>,
    key: &str,
    value: &T,
) -> StorageResult<()> {
    let bytes = serde_json::to_vec(value)?;
    table.insert(key, bytes.as_slice())?;
    Ok(())
}

/// Decode every value of a table
pub(crate) fn scan_json<T, R>(table: &R) -> StorageResult<Vec<T>>
where
    T: DeserializeOwned,
    R: ReadableTable<&'static str, &'static [u8]>,
{
    let mut out = Vec::new();
    for entry in table.iter()? {
        let (_key, value) = entry?;
        out.push(serde_json::from_slice(value.value())?);
    }
    Ok(out)
}
