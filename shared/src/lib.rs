//! Shared types for the restaurant POS
//!
//! Types used by pos-server and its clients: the unified error system,
//! domain models and the real-time event envelope.

pub mod error;
pub mod message;
pub mod models;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use message::{ClientCommand, EventName, RealtimeEvent, Room};
