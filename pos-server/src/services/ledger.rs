//! Menu/Stock Ledger
//!
//! 所有库存变化 (下单扣减、批量扣减、手动调整) 都经过这里，
//! 每次变化都在同一个写事务内完成 读取 → 修改 → 可用性重算 → 写回。
//!
//! 可用性规则见 [`MenuItem::refresh_availability`]：库存跟踪开启且库存 <= 0
//! 时不可用；否则由手动开关决定。

use redb::Table;
use shared::ErrorCode;
use shared::models::{
    LowStockAlert, MenuItem, StockAction, StockChange, StockDeductLine, StockDeductResult,
    StockUpdate,
};
use shared::util::now_millis;

use crate::db::repository::menu_item::menu_item_not_found;
use crate::db::repository::{RepoError, RepoResult};
use crate::db::{DbService, StorageResult, get_json, put_json, tables};

type MenuTable<'txn> = Table<'txn, &'static str, &'static [u8]>;

/// Low-stock signal for an item, if it is in the `0 < stock <= min` band
pub fn low_stock_alert(item: &MenuItem) -> Option<LowStockAlert> {
    item.is_low_stock().then(|| LowStockAlert {
        item_id: item.id.clone(),
        item_name: item.name.clone(),
        current_stock: item.stock_tracking.current_stock,
        min_stock: item.stock_tracking.min_stock,
        unit: item.stock_tracking.unit,
    })
}

/// Decrement inside an open transaction, floored at zero
///
/// Returns `None` when the item does not exist or is not tracked.
fn deduct_in(
    table: &mut MenuTable<'_>,
    item_id: &str,
    quantity: i64,
) -> StorageResult<Option<(MenuItem, StockChange)>> {
    let Some(mut item) = get_json::<MenuItem, _>(&*table, item_id)? else {
        return Ok(None);
    };
    if !item.is_tracked() {
        return Ok(None);
    }

    let previous = item.stock_tracking.current_stock;
    let new_stock = (previous - quantity.max(0)).max(0);
    item.stock_tracking.current_stock = new_stock;
    item.refresh_availability();
    item.updated_at = now_millis();
    put_json(table, item_id, &item)?;

    let change = StockChange {
        item_id: item.id.clone(),
        name: item.name.clone(),
        previous_stock: previous,
        new_stock,
        deducted: previous - new_stock,
        available: item.available,
    };
    Ok(Some((item, change)))
}

#[derive(Clone, Debug)]
pub struct MenuLedger {
    db: DbService,
}

impl MenuLedger {
    pub fn new(db: DbService) -> Self {
        Self { db }
    }

    /// Order-time deduction for one line
    ///
    /// Only items with tracking enabled and `deduct_on_order` are touched;
    /// everything else returns `Ok(None)`.
    pub fn deduct_for_order(
        &self,
        item_id: &str,
        quantity: u32,
    ) -> RepoResult<Option<(StockChange, Option<LowStockAlert>)>> {
        let txn = self.db.begin_write()?;
        let result = {
            let mut table = txn.open_table(tables::MENU_ITEMS)?;
            let deduct = match get_json::<MenuItem, _>(&table, item_id)? {
                Some(item) => item.is_tracked() && item.stock_tracking.deduct_on_order,
                None => false,
            };
            if deduct {
                deduct_in(&mut table, item_id, i64::from(quantity))?
            } else {
                None
            }
        };
        txn.commit()?;

        Ok(result.map(|(item, change)| {
            if !item.available {
                tracing::info!(item_id = %item.id, name = %item.name.en, "Item sold out");
            }
            (change, low_stock_alert(&item))
        }))
    }

    /// Batch deduction (`POST /api/menu-items/stock/deduct`)
    ///
    /// Missing or untracked items are skipped; all present lines commit together.
    pub fn deduct_batch(&self, lines: &[StockDeductLine]) -> RepoResult<StockDeductResult> {
        let txn = self.db.begin_write()?;
        let mut result = StockDeductResult::default();
        {
            let mut table = txn.open_table(tables::MENU_ITEMS)?;
            for line in lines {
                match deduct_in(&mut table, &line.item_id, line.quantity)? {
                    Some((item, change)) => {
                        if let Some(alert) = low_stock_alert(&item) {
                            result.low_stock_alerts.push(alert);
                        }
                        result.updated_items.push(change);
                    }
                    None => {
                        tracing::debug!(item_id = %line.item_id, "Skipping untracked or missing item");
                    }
                }
            }
        }
        txn.commit()?;
        Ok(result)
    }

    /// Owner stock adjustment (add / remove / set)
    pub fn adjust_stock(
        &self,
        item_id: &str,
        update: &StockUpdate,
    ) -> RepoResult<(MenuItem, StockChange)> {
        if update.quantity < 0 {
            return Err(RepoError::Validation(
                "Quantity cannot be negative".to_string(),
            ));
        }

        let txn = self.db.begin_write()?;
        let result = {
            let mut table = txn.open_table(tables::MENU_ITEMS)?;
            let mut item: MenuItem =
                get_json(&table, item_id)?.ok_or_else(|| menu_item_not_found(item_id))?;
            if !item.is_tracked() {
                return Err(RepoError::Rejected(
                    ErrorCode::StockTrackingDisabled,
                    format!("Stock tracking is not enabled for '{}'", item.name.en),
                ));
            }

            let previous = item.stock_tracking.current_stock;
            let new_stock = match update.action {
                StockAction::Add => previous.saturating_add(update.quantity),
                StockAction::Remove => (previous - update.quantity).max(0),
                StockAction::Set => update.quantity,
            };
            item.stock_tracking.current_stock = new_stock;
            item.refresh_availability();
            item.updated_at = now_millis();
            put_json(&mut table, item_id, &item)?;

            let change = StockChange {
                item_id: item.id.clone(),
                name: item.name.clone(),
                previous_stock: previous,
                new_stock,
                deducted: (previous - new_stock).max(0),
                available: item.available,
            };
            (item, change)
        };
        txn.commit()?;
        tracing::info!(
            item_id = %item_id,
            action = ?update.action,
            previous = result.1.previous_stock,
            new_stock = result.1.new_stock,
            "Stock adjusted"
        );
        Ok(result)
    }

    /// Manual availability toggle
    ///
    /// Turning an item on while its tracked stock is empty is refused.
    pub fn set_availability(&self, item_id: &str, available: bool) -> RepoResult<MenuItem> {
        let txn = self.db.begin_write()?;
        let item = {
            let mut table = txn.open_table(tables::MENU_ITEMS)?;
            let mut item: MenuItem =
                get_json(&table, item_id)?.ok_or_else(|| menu_item_not_found(item_id))?;
            if !item.set_manual_availability(available) {
                return Err(RepoError::Rejected(
                    ErrorCode::ProductOutOfStock,
                    format!(
                        "Cannot make '{}' available: tracked stock is empty",
                        item.name.en
                    ),
                ));
            }
            item.updated_at = now_millis();
            put_json(&mut table, item_id, &item)?;
            item
        };
        txn.commit()?;
        Ok(item)
    }
}
