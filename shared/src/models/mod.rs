//! Data models
//!
//! Shared between pos-server and front-end clients (via API).
//! All IDs are UUID strings, all timestamps are UTC milliseconds.

pub mod add_on;
pub mod analytics;
pub mod cancellation;
pub mod category;
pub mod common;
pub mod menu;
pub mod order;
pub mod payment;
pub mod settings;
pub mod staff;

// Re-exports
pub use add_on::*;
pub use analytics::*;
pub use cancellation::*;
pub use category::*;
pub use common::*;
pub use menu::*;
pub use order::*;
pub use payment::*;
pub use settings::*;
pub use staff::*;
