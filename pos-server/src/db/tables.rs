//! redb table definitions
//!
//! Entity tables hold JSON-serialized values keyed by id; index tables map a
//! unique secondary key to the owning id.

use redb::{Database, TableDefinition};

use super::StorageResult;

pub const STAFF: TableDefinition<&str, &[u8]> = TableDefinition::new("staff");
pub const STAFF_BY_USERNAME: TableDefinition<&str, &str> =
    TableDefinition::new("staff_by_username");

pub const CATEGORIES: TableDefinition<&str, &[u8]> = TableDefinition::new("categories");
pub const ADD_ONS: TableDefinition<&str, &[u8]> = TableDefinition::new("add_ons");
pub const MENU_ITEMS: TableDefinition<&str, &[u8]> = TableDefinition::new("menu_items");

pub const SETTINGS: TableDefinition<&str, &[u8]> = TableDefinition::new("settings");
pub const DAILY_ANALYTICS: TableDefinition<&str, &[u8]> = TableDefinition::new("daily_analytics");

pub const ORDERS: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");
pub const ORDERS_BY_NUMBER: TableDefinition<&str, &str> = TableDefinition::new("orders_by_number");
pub const PAYMENTS: TableDefinition<&str, &[u8]> = TableDefinition::new("payments");
pub const PAYMENTS_BY_ORDER: TableDefinition<&str, &str> =
    TableDefinition::new("payments_by_order");
pub const CANCELLATION_LOGS: TableDefinition<&str, &[u8]> =
    TableDefinition::new("cancellation_logs");

/// Counters: key = `order_seq:YYYYMMDD`, value = last allocated sequence
pub const SEQUENCE: TableDefinition<&str, u64> = TableDefinition::new("sequence_counter");

/// Fixed key of the settings singleton
pub const SETTINGS_KEY: &str = "settings";

/// Create all tables if they don't exist
pub(super) fn create_all(db: &Database) -> StorageResult<()> {
    let txn = db.begin_write()?;
    {
        let _ = txn.open_table(STAFF)?;
        let _ = txn.open_table(STAFF_BY_USERNAME)?;
        let _ = txn.open_table(CATEGORIES)?;
        let _ = txn.open_table(ADD_ONS)?;
        let _ = txn.open_table(MENU_ITEMS)?;
        let _ = txn.open_table(SETTINGS)?;
        let _ = txn.open_table(DAILY_ANALYTICS)?;
        let _ = txn.open_table(ORDERS)?;
        let _ = txn.open_table(ORDERS_BY_NUMBER)?;
        let _ = txn.open_table(PAYMENTS)?;
        let _ = txn.open_table(PAYMENTS_BY_ORDER)?;
        let _ = txn.open_table(CANCELLATION_LOGS)?;
        let _ = txn.open_table(SEQUENCE)?;
    }
    txn.commit()?;
    Ok(())
}
