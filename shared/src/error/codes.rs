//! Unified error codes for the POS backend
//!
//! Error codes are shared by pos-server and the front-end clients.
//! They are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Settings errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Menu errors (items, categories, add-ons, stock, images)
//! - 7xxx: Report errors
//! - 8xxx: Staff errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,
    /// State precondition violated
    StateConflict = 9,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/PIN)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is deactivated
    AccountDisabled = 1005,
    /// PIN re-entry did not match
    PinMismatch = 1006,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Specific role required
    RoleRequired = 2002,
    /// Acting waitress does not own the order
    NotOrderOwner = 2003,

    // ==================== 3xxx: Settings ====================
    /// Destructive action confirmation text mismatch
    ConfirmationMismatch = 3001,
    /// Grace window must be 1-5 minutes
    GraceWindowOutOfRange = 3002,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order item not found
    OrderItemNotFound = 4002,
    /// One or more menu items do not exist
    ItemsNotFound = 4003,
    /// One or more menu items are unavailable
    ItemsUnavailable = 4004,
    /// Grace window has expired
    GraceWindowExpired = 4005,
    /// Order is completed or cancelled
    OrderTerminal = 4006,
    /// Order status cannot be cancelled
    InvalidCancellationState = 4007,
    /// Order is empty
    OrderEmpty = 4008,
    /// Order was modified concurrently
    OrderVersionConflict = 4009,

    // ==================== 5xxx: Payment ====================
    /// Payment processing failed
    PaymentFailed = 5001,
    /// Insufficient payment amount
    PaymentInsufficientAmount = 5002,
    /// Invalid payment method
    PaymentInvalidMethod = 5003,
    /// Split amounts do not match the order total
    SplitMismatch = 5004,
    /// Order is not ready for payment
    OrderNotReadyForPayment = 5005,
    /// Payment not found
    PaymentNotFound = 5006,

    // ==================== 6xxx: Menu ====================
    /// Menu item not found
    MenuItemNotFound = 6001,
    /// Menu item has invalid price
    MenuItemInvalidPrice = 6002,
    /// Menu item is out of stock
    ProductOutOfStock = 6003,
    /// Stock tracking is not enabled for this item
    StockTrackingDisabled = 6004,
    /// Category not found
    CategoryNotFound = 6101,
    /// Category still has menu items
    CategoryHasItems = 6102,
    /// Add-on not found
    AddOnNotFound = 6201,
    /// Add-on is referenced by menu items
    AddOnInUse = 6202,
    /// Image not found
    ImageNotFound = 6301,
    /// Image exceeds the size limit
    ImageTooLarge = 6302,
    /// Image format is not supported
    ImageFormatUnsupported = 6303,

    // ==================== 7xxx: Reports ====================
    /// Cancellation log not found
    CancellationLogNotFound = 7001,
    /// Cancellation already reviewed
    CancellationAlreadyReviewed = 7002,
    /// Invalid date range
    InvalidDateRange = 7003,

    // ==================== 8xxx: Staff ====================
    /// Staff member not found
    StaffNotFound = 8001,
    /// Username already exists
    StaffUsernameExists = 8002,
    /// Cannot deactivate own account
    StaffCannotDeactivateSelf = 8003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Timeout error
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// Notification delivery failed
    BroadcastFailed = 9101,
    /// Blob store failure
    ImageStoreFailed = 9201,
    /// Storage is corrupted
    StorageCorrupted = 9403,
}

impl ErrorCode {
    /// Get the numeric value of this error code
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the default message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",
            ErrorCode::StateConflict => "Operation conflicts with current state",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid username or PIN",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::AccountDisabled => "Account is deactivated",
            ErrorCode::PinMismatch => "Invalid PIN",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RoleRequired => "Specific role is required",
            ErrorCode::NotOrderOwner => "You can only modify your own orders",

            // Settings
            ErrorCode::ConfirmationMismatch => "Confirmation text does not match",
            ErrorCode::GraceWindowOutOfRange => "Grace window must be between 1 and 5 minutes",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderItemNotFound => "Order item not found",
            ErrorCode::ItemsNotFound => "Some menu items were not found",
            ErrorCode::ItemsUnavailable => "Some menu items are unavailable",
            ErrorCode::GraceWindowExpired => "Grace window has expired",
            ErrorCode::OrderTerminal => "Order is already completed or cancelled",
            ErrorCode::InvalidCancellationState => "Order cannot be cancelled in its current state",
            ErrorCode::OrderEmpty => "Order must contain at least one item",
            ErrorCode::OrderVersionConflict => "Order was modified by another request",

            // Payment
            ErrorCode::PaymentFailed => "Payment processing failed",
            ErrorCode::PaymentInsufficientAmount => "Insufficient payment amount",
            ErrorCode::PaymentInvalidMethod => "Invalid payment method",
            ErrorCode::SplitMismatch => "Split payment total does not match order total",
            ErrorCode::OrderNotReadyForPayment => "Order is not ready for payment",
            ErrorCode::PaymentNotFound => "Payment not found",

            // Menu
            ErrorCode::MenuItemNotFound => "Menu item not found",
            ErrorCode::MenuItemInvalidPrice => "Menu item has invalid price",
            ErrorCode::ProductOutOfStock => "Menu item is out of stock",
            ErrorCode::StockTrackingDisabled => "Stock tracking is not enabled for this item",
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::CategoryHasItems => "Category still has menu items",
            ErrorCode::AddOnNotFound => "Add-on not found",
            ErrorCode::AddOnInUse => "Add-on is used by menu items",
            ErrorCode::ImageNotFound => "Image not found",
            ErrorCode::ImageTooLarge => "Image exceeds the size limit",
            ErrorCode::ImageFormatUnsupported => "Image format is not supported",

            // Reports
            ErrorCode::CancellationLogNotFound => "Cancellation log not found",
            ErrorCode::CancellationAlreadyReviewed => "Cancellation has already been reviewed",
            ErrorCode::InvalidDateRange => "Invalid date range",

            // Staff
            ErrorCode::StaffNotFound => "Staff member not found",
            ErrorCode::StaffUsernameExists => "Username already exists",
            ErrorCode::StaffCannotDeactivateSelf => "Cannot deactivate your own account",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::BroadcastFailed => "Notification delivery failed",
            ErrorCode::ImageStoreFailed => "Image storage failed",
            ErrorCode::StorageCorrupted => "Storage is corrupted",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),
            9 => Ok(ErrorCode::StateConflict),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1005 => Ok(ErrorCode::AccountDisabled),
            1006 => Ok(ErrorCode::PinMismatch),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::RoleRequired),
            2003 => Ok(ErrorCode::NotOrderOwner),

            // Settings
            3001 => Ok(ErrorCode::ConfirmationMismatch),
            3002 => Ok(ErrorCode::GraceWindowOutOfRange),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderItemNotFound),
            4003 => Ok(ErrorCode::ItemsNotFound),
            4004 => Ok(ErrorCode::ItemsUnavailable),
            4005 => Ok(ErrorCode::GraceWindowExpired),
            4006 => Ok(ErrorCode::OrderTerminal),
            4007 => Ok(ErrorCode::InvalidCancellationState),
            4008 => Ok(ErrorCode::OrderEmpty),
            4009 => Ok(ErrorCode::OrderVersionConflict),

            // Payment
            5001 => Ok(ErrorCode::PaymentFailed),
            5002 => Ok(ErrorCode::PaymentInsufficientAmount),
            5003 => Ok(ErrorCode::PaymentInvalidMethod),
            5004 => Ok(ErrorCode::SplitMismatch),
            5005 => Ok(ErrorCode::OrderNotReadyForPayment),
            5006 => Ok(ErrorCode::PaymentNotFound),

            // Menu
            6001 => Ok(ErrorCode::MenuItemNotFound),
            6002 => Ok(ErrorCode::MenuItemInvalidPrice),
            6003 => Ok(ErrorCode::ProductOutOfStock),
            6004 => Ok(ErrorCode::StockTrackingDisabled),
            6101 => Ok(ErrorCode::CategoryNotFound),
            6102 => Ok(ErrorCode::CategoryHasItems),
            6201 => Ok(ErrorCode::AddOnNotFound),
            6202 => Ok(ErrorCode::AddOnInUse),
            6301 => Ok(ErrorCode::ImageNotFound),
            6302 => Ok(ErrorCode::ImageTooLarge),
            6303 => Ok(ErrorCode::ImageFormatUnsupported),

            // Reports
            7001 => Ok(ErrorCode::CancellationLogNotFound),
            7002 => Ok(ErrorCode::CancellationAlreadyReviewed),
            7003 => Ok(ErrorCode::InvalidDateRange),

            // Staff
            8001 => Ok(ErrorCode::StaffNotFound),
            8002 => Ok(ErrorCode::StaffUsernameExists),
            8003 => Ok(ErrorCode::StaffCannotDeactivateSelf),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),
            9101 => Ok(ErrorCode::BroadcastFailed),
            9201 => Ok(ErrorCode::ImageStoreFailed),
            9403 => Ok(ErrorCode::StorageCorrupted),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
