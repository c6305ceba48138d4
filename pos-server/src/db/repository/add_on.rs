//! Add-on Repository

use std::collections::HashMap;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::{DbService, get_json, put_json, scan_json, tables};
use shared::ErrorCode;
use shared::models::{AddOn, AddOnCreate, AddOnUpdate, MenuItem};
use shared::util::{new_id, now_millis};

fn add_on_not_found(id: &str) -> RepoError {
    RepoError::NotFound(ErrorCode::AddOnNotFound, format!("Add-on {} not found", id))
}

#[derive(Clone, Debug)]
pub struct AddOnRepository {
    base: BaseRepository,
}

impl AddOnRepository {
    pub fn new(db: DbService) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub fn find_all(&self) -> RepoResult<Vec<AddOn>> {
        let txn = self.base.db().begin_read()?;
        let table = txn.open_table(tables::ADD_ONS)?;
        let mut add_ons: Vec<AddOn> = scan_json(&table)?;
        add_ons.sort_by(|a, b| a.name.en.cmp(&b.name.en));
        Ok(add_ons)
    }

    pub fn find_by_id(&self, id: &str) -> RepoResult<Option<AddOn>> {
        let txn = self.base.db().begin_read()?;
        let table = txn.open_table(tables::ADD_ONS)?;
        Ok(get_json(&table, id)?)
    }

    /// Resolve a set of ids; missing ids are simply absent from the map
    pub fn find_by_ids(&self, ids: &[String]) -> RepoResult<HashMap<String, AddOn>> {
        let txn = self.base.db().begin_read()?;
        let table = txn.open_table(tables::ADD_ONS)?;
        let mut found = HashMap::with_capacity(ids.len());
        for id in ids {
            if found.contains_key(id) {
                continue;
            }
            if let Some(add_on) = get_json::<AddOn, _>(&table, id)? {
                found.insert(id.clone(), add_on);
            }
        }
        Ok(found)
    }

    pub fn create(&self, data: AddOnCreate) -> RepoResult<AddOn> {
        let now = now_millis();
        let add_on = AddOn {
            id: new_id(),
            name: data.name,
            price: data.price,
            stations: data.stations,
            is_optional: data.is_optional.unwrap_or(true),
            available: true,
            created_at: now,
            updated_at: now,
        };

        let txn = self.base.db().begin_write()?;
        {
            let mut table = txn.open_table(tables::ADD_ONS)?;
            put_json(&mut table, &add_on.id, &add_on)?;
        }
        txn.commit()?;
        Ok(add_on)
    }

    pub fn update(&self, id: &str, data: AddOnUpdate) -> RepoResult<AddOn> {
        let txn = self.base.db().begin_write()?;
        let add_on = {
            let mut table = txn.open_table(tables::ADD_ONS)?;
            let mut add_on: AddOn = get_json(&table, id)?.ok_or_else(|| add_on_not_found(id))?;
            if let Some(name) = data.name {
                add_on.name = name;
            }
            if let Some(price) = data.price {
                add_on.price = price;
            }
            if let Some(stations) = data.stations {
                add_on.stations = stations;
            }
            if let Some(v) = data.is_optional {
                add_on.is_optional = v;
            }
            if let Some(v) = data.available {
                add_on.available = v;
            }
            add_on.updated_at = now_millis();
            put_json(&mut table, id, &add_on)?;
            add_on
        };
        txn.commit()?;
        Ok(add_on)
    }

    /// Delete an add-on (blocked while listed on any menu item)
    pub fn delete(&self, id: &str) -> RepoResult<AddOn> {
        let txn = self.base.db().begin_write()?;
        let add_on = {
            let items = txn.open_table(tables::MENU_ITEMS)?;
            let menu_items: Vec<MenuItem> = scan_json(&items)?;
            let in_use = menu_items
                .iter()
                .filter(|m| m.add_ons.iter().any(|a| a == id))
                .count();
            if in_use > 0 {
                return Err(RepoError::Rejected(
                    ErrorCode::AddOnInUse,
                    format!("Cannot delete add-on used by {} menu items", in_use),
                ));
            }

            let mut table = txn.open_table(tables::ADD_ONS)?;
            let add_on: AddOn = get_json(&table, id)?.ok_or_else(|| add_on_not_found(id))?;
            table.remove(id)?;
            add_on
        };
        txn.commit()?;
        Ok(add_on)
    }
}
