//! Repository Module
//!
//! 同步 CRUD 封装，每个操作一个 redb 事务。
//! 跨实体的读-改-写 (库存、订单) 不走这里，见 `services::ledger` 与 `orders::storage`。

// Auth
pub mod staff;

// Catalog
pub mod add_on;
pub mod category;
pub mod menu_item;

// System
pub mod analytics;
pub mod settings;

// Re-exports
pub use add_on::AddOnRepository;
pub use analytics::AnalyticsRepository;
pub use category::CategoryRepository;
pub use menu_item::MenuItemRepository;
pub use settings::SettingsRepository;
pub use staff::{StaffRecord, StaffRepository};

use shared::{AppError, ErrorCode};
use thiserror::Error;

use super::{DbService, StorageError};

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {1}")]
    NotFound(ErrorCode, String),

    #[error("Duplicate: {1}")]
    Duplicate(ErrorCode, String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Business rule refused the write (carries the wire code)
    #[error("{1}")]
    Rejected(ErrorCode, String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

macro_rules! impl_from_storage {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for RepoError {
                fn from(err: $ty) -> Self {
                    RepoError::Storage(StorageError::from(err))
                }
            }
        )*
    };
}

impl_from_storage!(
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
    serde_json::Error,
);

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(code, msg)
            | RepoError::Duplicate(code, msg)
            | RepoError::Rejected(code, msg) => AppError::with_message(code, msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Storage(e) => e.into(),
        }
    }
}

/// Base repository with database reference
#[derive(Clone, Debug)]
pub struct BaseRepository {
    db: DbService,
}

impl BaseRepository {
    pub fn new(db: DbService) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DbService {
        &self.db
    }
}

/// Trim and require a non-empty value
pub(crate) fn required(field: &str, value: &str) -> RepoResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RepoError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}
