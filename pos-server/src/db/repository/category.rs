//! Category Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::{DbService, get_json, put_json, scan_json, tables};
use shared::ErrorCode;
use shared::models::{Category, CategoryCreate, CategoryUpdate, MenuItem};
use shared::util::{new_id, now_millis};

fn category_not_found(id: &str) -> RepoError {
    RepoError::NotFound(
        ErrorCode::CategoryNotFound,
        format!("Category {} not found", id),
    )
}

#[derive(Clone, Debug)]
pub struct CategoryRepository {
    base: BaseRepository,
}

impl CategoryRepository {
    pub fn new(db: DbService) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All categories ordered by English name
    pub fn find_all(&self, active_only: bool) -> RepoResult<Vec<Category>> {
        let txn = self.base.db().begin_read()?;
        let table = txn.open_table(tables::CATEGORIES)?;
        let mut categories: Vec<Category> = scan_json(&table)?;
        if active_only {
            categories.retain(|c| c.active);
        }
        categories.sort_by(|a, b| a.name.en.cmp(&b.name.en));
        Ok(categories)
    }

    pub fn find_by_id(&self, id: &str) -> RepoResult<Option<Category>> {
        let txn = self.base.db().begin_read()?;
        let table = txn.open_table(tables::CATEGORIES)?;
        Ok(get_json(&table, id)?)
    }

    pub fn create(&self, data: CategoryCreate, created_by: Option<String>) -> RepoResult<Category> {
        let now = now_millis();
        let category = Category {
            id: new_id(),
            name: data.name,
            prep_station: data.prep_station.unwrap_or_default(),
            requires_preparation: data.requires_preparation.unwrap_or(true),
            auto_deduct_stock: data.auto_deduct_stock.unwrap_or(false),
            active: true,
            created_by,
            created_at: now,
            updated_at: now,
        };

        let txn = self.base.db().begin_write()?;
        {
            let mut table = txn.open_table(tables::CATEGORIES)?;
            put_json(&mut table, &category.id, &category)?;
        }
        txn.commit()?;
        Ok(category)
    }

    pub fn update(&self, id: &str, data: CategoryUpdate) -> RepoResult<Category> {
        let txn = self.base.db().begin_write()?;
        let category = {
            let mut table = txn.open_table(tables::CATEGORIES)?;
            let mut category: Category =
                get_json(&table, id)?.ok_or_else(|| category_not_found(id))?;
            if let Some(name) = data.name {
                category.name = name;
            }
            if let Some(station) = data.prep_station {
                category.prep_station = station;
            }
            if let Some(v) = data.requires_preparation {
                category.requires_preparation = v;
            }
            if let Some(v) = data.auto_deduct_stock {
                category.auto_deduct_stock = v;
            }
            if let Some(v) = data.active {
                category.active = v;
            }
            category.updated_at = now_millis();
            put_json(&mut table, id, &category)?;
            category
        };
        txn.commit()?;
        Ok(category)
    }

    /// Delete a category
    ///
    /// Blocked while any menu item still references it; the check and the
    /// delete share one write transaction.
    pub fn delete(&self, id: &str) -> RepoResult<Category> {
        let txn = self.base.db().begin_write()?;
        let category = {
            let items = txn.open_table(tables::MENU_ITEMS)?;
            let menu_items: Vec<MenuItem> = scan_json(&items)?;
            let in_use = menu_items.iter().filter(|m| m.category_id == id).count();
            if in_use > 0 {
                return Err(RepoError::Rejected(
                    ErrorCode::CategoryHasItems,
                    format!("Cannot delete category with {} menu items", in_use),
                ));
            }

            let mut table = txn.open_table(tables::CATEGORIES)?;
            let category: Category = get_json(&table, id)?.ok_or_else(|| category_not_found(id))?;
            table.remove(id)?;
            category
        };
        txn.commit()?;
        Ok(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::MenuItemRepository;
    use shared::models::{LocalizedText, MenuItemCreate, MenuPricing, PrepStation};

    fn category_create(en: &str) -> CategoryCreate {
        CategoryCreate {
            name: LocalizedText::new(en, "ምድብ"),
            prep_station: Some(PrepStation::Kitchen),
            requires_preparation: None,
            auto_deduct_stock: None,
        }
    }

    #[test]
    fn test_create_sorted_listing() {
        let repo = CategoryRepository::new(DbService::open_in_memory().unwrap());
        repo.create(category_create("Soups"), None).unwrap();
        repo.create(category_create("Breakfast"), None).unwrap();
        let names: Vec<String> = repo
            .find_all(false)
            .unwrap()
            .into_iter()
            .map(|c| c.name.en)
            .collect();
        assert_eq!(names, vec!["Breakfast", "Soups"]);
    }

    #[test]
    fn test_delete_blocked_while_referenced() {
        let db = DbService::open_in_memory().unwrap();
        let categories = CategoryRepository::new(db.clone());
        let menu = MenuItemRepository::new(db);
        let category = categories.create(category_create("Drinks"), None).unwrap();
        let item = menu
            .create(
                MenuItemCreate {
                    name: LocalizedText::new("Tea", "ሻይ"),
                    description: None,
                    category_id: category.id.clone(),
                    pricing: MenuPricing {
                        dine_in: 10.0,
                        takeaway: 10.0,
                    },
                    prep_station: PrepStation::None,
                    prep_time: None,
                    requires_preparation: Some(false),
                    stock_tracking: None,
                    add_ons: vec![],
                    image_url: None,
                    image_public_id: None,
                },
                None,
            )
            .unwrap();

        let err = categories.delete(&category.id).unwrap_err();
        assert!(matches!(err, RepoError::Rejected(ErrorCode::CategoryHasItems, _)));

        menu.delete(&item.id).unwrap();
        categories.delete(&category.id).unwrap();
        assert!(categories.find_by_id(&category.id).unwrap().is_none());
    }
}
