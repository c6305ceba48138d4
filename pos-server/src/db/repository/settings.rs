//! Settings Repository (singleton)

use super::{BaseRepository, RepoResult};
use crate::db::tables::{self, SETTINGS_KEY};
use crate::db::{DbService, get_json, put_json};
use shared::models::RestaurantSettings;
use shared::util::now_millis;

#[derive(Clone, Debug)]
pub struct SettingsRepository {
    base: BaseRepository,
}

impl SettingsRepository {
    pub fn new(db: DbService) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Read the settings record, creating defaults on first access
    ///
    /// Read and insert share one write transaction, so concurrent first reads
    /// still produce a single record.
    pub fn get_or_create(&self) -> RepoResult<RestaurantSettings> {
        if let Some(settings) = self.get()? {
            return Ok(settings);
        }
        let txn = self.base.db().begin_write()?;
        let settings = {
            let mut table = txn.open_table(tables::SETTINGS)?;
            match get_json::<RestaurantSettings, _>(&table, SETTINGS_KEY)? {
                Some(existing) => existing,
                None => {
                    let defaults = RestaurantSettings::with_defaults(now_millis());
                    put_json(&mut table, SETTINGS_KEY, &defaults)?;
                    tracing::info!("Default restaurant settings created");
                    defaults
                }
            }
        };
        txn.commit()?;
        Ok(settings)
    }

    fn get(&self) -> RepoResult<Option<RestaurantSettings>> {
        let txn = self.base.db().begin_read()?;
        let table = txn.open_table(tables::SETTINGS)?;
        Ok(get_json(&table, SETTINGS_KEY)?)
    }

    /// Apply a mutation to the singleton
    pub fn update(
        &self,
        updated_by: &str,
        f: impl FnOnce(&mut RestaurantSettings),
    ) -> RepoResult<RestaurantSettings> {
        let txn = self.base.db().begin_write()?;
        let settings = {
            let mut table = txn.open_table(tables::SETTINGS)?;
            let now = now_millis();
            let mut settings = get_json::<RestaurantSettings, _>(&table, SETTINGS_KEY)?
                .unwrap_or_else(|| RestaurantSettings::with_defaults(now));
            f(&mut settings);
            settings.updated_by = Some(updated_by.to_string());
            settings.updated_at = now;
            put_json(&mut table, SETTINGS_KEY, &settings)?;
            settings
        };
        txn.commit()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::Theme;

    #[test]
    fn test_get_or_create_is_idempotent() {
        let repo = SettingsRepository::new(DbService::open_in_memory().unwrap());
        let first = repo.get_or_create().unwrap();
        let second = repo.get_or_create().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.grace_window_minutes, 3);
    }

    #[test]
    fn test_update() {
        let repo = SettingsRepository::new(DbService::open_in_memory().unwrap());
        let updated = repo
            .update("owner-1", |s| {
                s.theme = Theme::Dark;
                s.grace_window_minutes = 5;
            })
            .unwrap();
        assert_eq!(updated.theme, Theme::Dark);
        assert_eq!(updated.updated_by.as_deref(), Some("owner-1"));
        assert_eq!(repo.get_or_create().unwrap().grace_window_minutes, 5);
    }
}
