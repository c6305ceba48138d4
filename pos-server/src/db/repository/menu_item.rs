//! Menu Item Repository
//!
//! CRUD over `menu_items`. Stock counters are changed through
//! [`crate::services::MenuLedger`]; this repository only touches stock when
//! an owner replaces the whole stock-tracking block.

use std::collections::HashMap;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::{DbService, get_json, put_json, scan_json, tables};
use crate::orders::money;
use shared::ErrorCode;
use shared::models::{
    Category, MenuItem, MenuItemCreate, MenuItemFilter, MenuItemUpdate, TakeawayPolicy,
    TakeawayPricing,
};
use shared::util::{new_id, now_millis};

pub(crate) fn menu_item_not_found(id: &str) -> RepoError {
    RepoError::NotFound(
        ErrorCode::MenuItemNotFound,
        format!("Menu item {} not found", id),
    )
}

fn out_of_stock(item: &MenuItem) -> RepoError {
    RepoError::Rejected(
        ErrorCode::ProductOutOfStock,
        format!(
            "Cannot make '{}' available: tracked stock is empty",
            item.name.en
        ),
    )
}

/// Takeaway price under a policy; `None` leaves the stored price alone
pub fn takeaway_price(pricing: &TakeawayPricing, dine_in: f64) -> Option<f64> {
    match pricing.policy {
        TakeawayPolicy::SameAsDineIn => Some(dine_in),
        TakeawayPolicy::PercentageDiscount => Some(money::apply_discount(
            dine_in,
            pricing.discount_percentage,
        )),
        TakeawayPolicy::CustomPerItem => None,
    }
}

#[derive(Clone, Debug)]
pub struct MenuItemRepository {
    base: BaseRepository,
}

impl MenuItemRepository {
    pub fn new(db: DbService) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Owner listing with optional filters, ordered by category then name
    pub fn find_all(&self, filter: &MenuItemFilter) -> RepoResult<Vec<MenuItem>> {
        let txn = self.base.db().begin_read()?;
        let table = txn.open_table(tables::MENU_ITEMS)?;
        let mut items: Vec<MenuItem> = scan_json(&table)?;
        items.retain(|m| {
            filter.category.as_ref().is_none_or(|c| &m.category_id == c)
                && filter.prep_station.is_none_or(|s| m.prep_station == s)
                && filter.available.is_none_or(|a| m.available == a)
        });
        items.sort_by(|a, b| {
            a.category_id
                .cmp(&b.category_id)
                .then_with(|| a.name.en.cmp(&b.name.en))
        });
        Ok(items)
    }

    /// Items currently orderable
    pub fn find_active(&self) -> RepoResult<Vec<MenuItem>> {
        self.find_all(&MenuItemFilter {
            available: Some(true),
            ..Default::default()
        })
    }

    pub fn find_by_id(&self, id: &str) -> RepoResult<Option<MenuItem>> {
        let txn = self.base.db().begin_read()?;
        let table = txn.open_table(tables::MENU_ITEMS)?;
        Ok(get_json(&table, id)?)
    }

    /// Lookup by id set; missing ids are absent from the map
    pub fn find_by_ids(&self, ids: &[String]) -> RepoResult<HashMap<String, MenuItem>> {
        let txn = self.base.db().begin_read()?;
        let table = txn.open_table(tables::MENU_ITEMS)?;
        let mut found = HashMap::with_capacity(ids.len());
        for id in ids {
            if found.contains_key(id) {
                continue;
            }
            if let Some(item) = get_json::<MenuItem, _>(&table, id)? {
                found.insert(id.clone(), item);
            }
        }
        Ok(found)
    }

    /// Create a menu item (category must exist)
    pub fn create(&self, data: MenuItemCreate, created_by: Option<String>) -> RepoResult<MenuItem> {
        let now = now_millis();
        let mut item = MenuItem {
            id: new_id(),
            name: data.name,
            description: data.description.unwrap_or_default(),
            category_id: data.category_id,
            pricing: data.pricing,
            prep_station: data.prep_station,
            prep_time: data.prep_time.unwrap_or(15),
            requires_preparation: data.requires_preparation.unwrap_or(true),
            stock_tracking: data.stock_tracking.unwrap_or_default(),
            add_ons: data.add_ons,
            available: true,
            manually_disabled: false,
            image_url: data.image_url,
            image_public_id: data.image_public_id,
            created_by,
            created_at: now,
            updated_at: now,
        };
        item.stock_tracking.current_stock = item.stock_tracking.current_stock.max(0);
        item.refresh_availability();

        let txn = self.base.db().begin_write()?;
        {
            let categories = txn.open_table(tables::CATEGORIES)?;
            if get_json::<Category, _>(&categories, &item.category_id)?.is_none() {
                return Err(RepoError::NotFound(
                    ErrorCode::CategoryNotFound,
                    format!("Category {} not found", item.category_id),
                ));
            }
            let mut table = txn.open_table(tables::MENU_ITEMS)?;
            put_json(&mut table, &item.id, &item)?;
        }
        txn.commit()?;
        Ok(item)
    }

    pub fn update(&self, id: &str, data: MenuItemUpdate) -> RepoResult<MenuItem> {
        let txn = self.base.db().begin_write()?;
        let item = {
            if let Some(category_id) = data.category_id.as_deref() {
                let categories = txn.open_table(tables::CATEGORIES)?;
                if get_json::<Category, _>(&categories, category_id)?.is_none() {
                    return Err(RepoError::NotFound(
                        ErrorCode::CategoryNotFound,
                        format!("Category {} not found", category_id),
                    ));
                }
            }

            let mut table = txn.open_table(tables::MENU_ITEMS)?;
            let mut item: MenuItem = get_json(&table, id)?.ok_or_else(|| menu_item_not_found(id))?;

            if let Some(name) = data.name {
                item.name = name;
            }
            if let Some(description) = data.description {
                item.description = description;
            }
            if let Some(category_id) = data.category_id {
                item.category_id = category_id;
            }
            if let Some(pricing) = data.pricing {
                item.pricing = pricing;
            }
            if let Some(station) = data.prep_station {
                item.prep_station = station;
            }
            if let Some(prep_time) = data.prep_time {
                item.prep_time = prep_time;
            }
            if let Some(v) = data.requires_preparation {
                item.requires_preparation = v;
            }
            if let Some(mut tracking) = data.stock_tracking {
                tracking.current_stock = tracking.current_stock.max(0);
                item.stock_tracking = tracking;
            }
            if let Some(add_ons) = data.add_ons {
                item.add_ons = add_ons;
            }
            if data.image_url.is_some() {
                item.image_url = data.image_url;
            }
            if data.image_public_id.is_some() {
                item.image_public_id = data.image_public_id;
            }

            match data.available {
                Some(available) => {
                    if !item.set_manual_availability(available) {
                        return Err(out_of_stock(&item));
                    }
                }
                None => item.refresh_availability(),
            }

            item.updated_at = now_millis();
            put_json(&mut table, id, &item)?;
            item
        };
        txn.commit()?;
        Ok(item)
    }

    /// Delete and return the removed item (caller cleans up its image)
    pub fn delete(&self, id: &str) -> RepoResult<MenuItem> {
        let txn = self.base.db().begin_write()?;
        let item = {
            let mut table = txn.open_table(tables::MENU_ITEMS)?;
            let item: MenuItem = get_json(&table, id)?.ok_or_else(|| menu_item_not_found(id))?;
            table.remove(id)?;
            item
        };
        txn.commit()?;
        Ok(item)
    }

    /// Rewrite takeaway prices of every item under a pricing policy
    ///
    /// Returns the number of items whose price changed.
    pub fn apply_takeaway_pricing(&self, pricing: &TakeawayPricing) -> RepoResult<usize> {
        if pricing.policy == TakeawayPolicy::CustomPerItem {
            return Ok(0);
        }
        let txn = self.base.db().begin_write()?;
        let changed = {
            let mut table = txn.open_table(tables::MENU_ITEMS)?;
            let items: Vec<MenuItem> = scan_json(&table)?;
            let now = now_millis();
            let mut changed = 0;
            for mut item in items {
                let Some(price) = takeaway_price(pricing, item.pricing.dine_in) else {
                    continue;
                };
                if (item.pricing.takeaway - price).abs() < f64::EPSILON {
                    continue;
                }
                item.pricing.takeaway = price;
                item.updated_at = now;
                put_json(&mut table, &item.id, &item)?;
                changed += 1;
            }
            changed
        };
        txn.commit()?;
        tracing::info!(changed, policy = ?pricing.policy, "Takeaway prices updated");
        Ok(changed)
    }
}
