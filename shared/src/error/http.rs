//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::OrderNotFound
            | Self::OrderItemNotFound
            | Self::PaymentNotFound
            | Self::MenuItemNotFound
            | Self::CategoryNotFound
            | Self::AddOnNotFound
            | Self::ImageNotFound
            | Self::CancellationLogNotFound
            | Self::StaffNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict (state preconditions)
            Self::AlreadyExists
            | Self::StateConflict
            | Self::GraceWindowExpired
            | Self::OrderTerminal
            | Self::InvalidCancellationState
            | Self::OrderVersionConflict
            | Self::OrderNotReadyForPayment
            | Self::SplitMismatch
            | Self::CategoryHasItems
            | Self::AddOnInUse
            | Self::CancellationAlreadyReviewed
            | Self::StaffUsernameExists => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::AccountDisabled => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied
            | Self::RoleRequired
            | Self::NotOrderOwner
            | Self::PinMismatch
            | Self::StaffCannotDeactivateSelf => StatusCode::FORBIDDEN,

            // 402 Payment Required
            Self::PaymentInsufficientAmount => StatusCode::PAYMENT_REQUIRED,

            // 413 Payload Too Large
            Self::ImageTooLarge => StatusCode::PAYLOAD_TOO_LARGE,

            // 503 Service Unavailable
            Self::TimeoutError => StatusCode::SERVICE_UNAVAILABLE,

            // 502 Bad Gateway (external collaborators)
            Self::ImageStoreFailed | Self::BroadcastFailed => StatusCode::BAD_GATEWAY,

            // 500 Internal Server Error
            Self::Unknown
            | Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::StorageCorrupted => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (validation and business input errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
