//! Daily Analytics Repository

use super::{BaseRepository, RepoResult};
use crate::db::{DbService, get_json, put_json, tables};
use redb::ReadableTable;
use shared::models::DailyAnalytics;
use shared::util::now_millis;

#[derive(Clone, Debug)]
pub struct AnalyticsRepository {
    base: BaseRepository,
}

impl AnalyticsRepository {
    pub fn new(db: DbService) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Record of one business day (`YYYY-MM-DD`)
    pub fn get(&self, date: &str) -> RepoResult<Option<DailyAnalytics>> {
        let txn = self.base.db().begin_read()?;
        let table = txn.open_table(tables::DAILY_ANALYTICS)?;
        Ok(get_json(&table, date)?)
    }

    /// Records between two dates, both inclusive, in date order
    pub fn range(&self, start: &str, end: &str) -> RepoResult<Vec<DailyAnalytics>> {
        let txn = self.base.db().begin_read()?;
        let table = txn.open_table(tables::DAILY_ANALYTICS)?;
        let mut out = Vec::new();
        for entry in table.range(start..=end)? {
            let (_key, value) = entry?;
            out.push(serde_json::from_slice(value.value())?);
        }
        Ok(out)
    }

    /// Create-if-absent then mutate, in one write transaction
    pub fn accumulate(
        &self,
        date: &str,
        f: impl FnOnce(&mut DailyAnalytics),
    ) -> RepoResult<DailyAnalytics> {
        let txn = self.base.db().begin_write()?;
        let record = {
            let mut table = txn.open_table(tables::DAILY_ANALYTICS)?;
            let mut record = get_json::<DailyAnalytics, _>(&table, date)?
                .unwrap_or_else(|| DailyAnalytics::empty(date));
            f(&mut record);
            record.updated_at = now_millis();
            put_json(&mut table, date, &record)?;
            record
        };
        txn.commit()?;
        Ok(record)
    }

    /// Wipe every record, returning how many were removed
    pub fn delete_all(&self) -> RepoResult<u64> {
        let txn = self.base.db().begin_write()?;
        let removed = {
            let mut table = txn.open_table(tables::DAILY_ANALYTICS)?;
            let mut keys = Vec::new();
            for entry in table.iter()? {
                let (key, _) = entry?;
                keys.push(key.value().to_string());
            }
            for key in &keys {
                table.remove(key.as_str())?;
            }
            keys.len() as u64
        };
        txn.commit()?;
        Ok(removed)
    }
}
