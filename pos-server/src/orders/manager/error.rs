use crate::db::StorageError;
use crate::db::repository::RepoError;
use shared::models::OrderStatus;
use shared::{AppError, ErrorCode};
use thiserror::Error;

/// Manager errors
///
/// 状态冲突类错误都在任何写入之前返回。
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Menu items not found: {}", .0.join(", "))]
    ItemsNotFound(Vec<String>),

    #[error("Menu items unavailable: {}", .0.join(", "))]
    ItemsUnavailable(Vec<String>),

    #[error("You can only modify your own orders")]
    NotOwner,

    #[error("Grace window has expired for order {0}")]
    GraceWindowExpired(String),

    #[error("Item not found in order: {0}")]
    ItemNotFound(String),

    #[error("Order is already {0}")]
    OrderTerminal(OrderStatus),

    #[error("Order in status '{0}' cannot be cancelled")]
    InvalidCancellationState(OrderStatus),

    #[error("Order must be ready before payment (current status: {0})")]
    InvalidStatusForPayment(OrderStatus),

    #[error("Split payments total {actual:.2} does not match order total {expected:.2}")]
    SplitMismatch { expected: f64, actual: f64 },

    #[error("Insufficient payment: received {received:.2}, required {required:.2}")]
    InsufficientPayment { required: f64, received: f64 },

    #[error("Order was modified (expected version {expected}, current {actual})")]
    VersionConflict { expected: u64, actual: u64 },

    #[error("Cancellation log not found: {0}")]
    CancellationLogNotFound(String),

    #[error("Cancellation {0} has already been reviewed")]
    AlreadyReviewed(String),

    #[error("{0}")]
    Validation(String),

    /// Catalog lookup failed (menu items, add-ons, settings)
    #[error(transparent)]
    Catalog(#[from] RepoError),
}

macro_rules! impl_from_storage {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ManagerError {
                fn from(err: $ty) -> Self {
                    ManagerError::Storage(StorageError::from(err))
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

impl From<ManagerError> for AppError {
    fn from(err: ManagerError) -> Self {
        let message = err.to_string();
        match err {
            ManagerError::Storage(e) => e.into(),
            ManagerError::Catalog(e) => e.into(),
            ManagerError::OrderNotFound(_) => AppError::with_message(ErrorCode::OrderNotFound, message),
            ManagerError::ItemsNotFound(ids) => {
                AppError::with_message(ErrorCode::ItemsNotFound, message)
                    .with_detail("item_ids", ids)
            }
            ManagerError::ItemsUnavailable(names) => {
                AppError::with_message(ErrorCode::ItemsUnavailable, message)
                    .with_detail("items", names)
            }
            ManagerError::NotOwner => AppError::with_message(ErrorCode::NotOrderOwner, message),
            ManagerError::GraceWindowExpired(_) => {
                AppError::with_message(ErrorCode::GraceWindowExpired, message)
            }
            ManagerError::ItemNotFound(_) => {
                AppError::with_message(ErrorCode::OrderItemNotFound, message)
            }
            ManagerError::OrderTerminal(_) => AppError::with_message(ErrorCode::OrderTerminal, message),
            ManagerError::InvalidCancellationState(_) => {
                AppError::with_message(ErrorCode::InvalidCancellationState, message)
            }
            ManagerError::InvalidStatusForPayment(_) => {
                AppError::with_message(ErrorCode::OrderNotReadyForPayment, message)
            }
            ManagerError::SplitMismatch { .. } => {
                AppError::with_message(ErrorCode::SplitMismatch, message)
            }
            ManagerError::InsufficientPayment { .. } => {
                AppError::with_message(ErrorCode::PaymentInsufficientAmount, message)
            }
            ManagerError::VersionConflict { .. } => {
                AppError::with_message(ErrorCode::OrderVersionConflict, message)
            }
            ManagerError::CancellationLogNotFound(_) => {
                AppError::with_message(ErrorCode::CancellationLogNotFound, message)
            }
            ManagerError::AlreadyReviewed(_) => {
                AppError::with_message(ErrorCode::CancellationAlreadyReviewed, message)
            }
            ManagerError::Validation(msg) => AppError::validation(msg),
        }
    }
}

pub type ManagerResult<T> = Result<T, ManagerError>;
