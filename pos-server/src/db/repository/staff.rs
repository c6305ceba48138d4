//! Staff Repository

use super::{BaseRepository, RepoError, RepoResult, required};
use crate::auth::pin;
use crate::db::{DbService, get_json, put_json, scan_json, tables};
use redb::{ReadableTable, ReadableTableMetadata};
use serde::{Deserialize, Serialize};
use shared::ErrorCode;
use shared::models::{Role, StaffCreate, StaffFilter, StaffProfile, StaffUpdate};
use shared::util::{new_id, now_millis};

/// Stored staff row: profile plus argon2 PIN hash
///
/// The hash never leaves this module through the API; handlers only see
/// [`StaffProfile`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffRecord {
    #[serde(flatten)]
    pub profile: StaffProfile,
    pub pin_hash: String,
}

impl StaffRecord {
    pub fn verify_pin(&self, candidate: &str) -> bool {
        pin::verify_pin(candidate, &self.pin_hash)
    }
}

fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

fn staff_not_found(id: &str) -> RepoError {
    RepoError::NotFound(ErrorCode::StaffNotFound, format!("Staff {} not found", id))
}

fn username_taken(username: &str) -> RepoError {
    RepoError::Duplicate(
        ErrorCode::StaffUsernameExists,
        format!("Username '{}' already exists", username),
    )
}

#[derive(Clone, Debug)]
pub struct StaffRepository {
    base: BaseRepository,
}

impl StaffRepository {
    pub fn new(db: DbService) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// List staff profiles, newest first
    pub fn find_all(&self, filter: &StaffFilter) -> RepoResult<Vec<StaffProfile>> {
        let txn = self.base.db().begin_read()?;
        let table = txn.open_table(tables::STAFF)?;
        let records: Vec<StaffRecord> = scan_json(&table)?;
        let mut profiles: Vec<StaffProfile> = records
            .into_iter()
            .map(|r| r.profile)
            .filter(|p| filter.role.is_none_or(|role| p.role == role))
            .filter(|p| filter.active.is_none_or(|active| p.active == active))
            .collect();
        profiles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(profiles)
    }

    pub fn find_by_id(&self, id: &str) -> RepoResult<Option<StaffRecord>> {
        let txn = self.base.db().begin_read()?;
        let table = txn.open_table(tables::STAFF)?;
        Ok(get_json(&table, id)?)
    }

    /// Find by username (case-insensitive)
    pub fn find_by_username(&self, username: &str) -> RepoResult<Option<StaffRecord>> {
        let key = normalize_username(username);
        let txn = self.base.db().begin_read()?;
        let index = txn.open_table(tables::STAFF_BY_USERNAME)?;
        let Some(id) = index.get(key.as_str())?.map(|g| g.value().to_string()) else {
            return Ok(None);
        };
        let table = txn.open_table(tables::STAFF)?;
        Ok(get_json(&table, &id)?)
    }

    /// Whether at least one active staff member has the role
    pub fn has_active_role(&self, role: Role) -> RepoResult<bool> {
        Ok(self
            .find_all(&StaffFilter {
                role: Some(role),
                active: Some(true),
            })?
            .into_iter()
            .next()
            .is_some())
    }

    /// Create a staff member
    ///
    /// The username index is checked and written in the same transaction.
    pub fn create(&self, data: StaffCreate) -> RepoResult<StaffProfile> {
        let username = normalize_username(&data.username);
        let full_name = required("Full name", &data.full_name)?;
        let pin_hash = pin::hash_pin(&data.pin)
            .map_err(|e| RepoError::Validation(format!("Failed to hash PIN: {}", e)))?;

        let now = now_millis();
        let record = StaffRecord {
            profile: StaffProfile {
                id: new_id(),
                username: username.clone(),
                full_name,
                role: data.role,
                active: true,
                last_login: None,
                created_at: now,
                updated_at: now,
            },
            pin_hash,
        };

        let txn = self.base.db().begin_write()?;
        {
            let mut index = txn.open_table(tables::STAFF_BY_USERNAME)?;
            if index.get(username.as_str())?.is_some() {
                return Err(username_taken(&username));
            }
            index.insert(username.as_str(), record.profile.id.as_str())?;
            let mut table = txn.open_table(tables::STAFF)?;
            put_json(&mut table, &record.profile.id, &record)?;
        }
        txn.commit()?;
        Ok(record.profile)
    }

    /// Update profile fields; a username change moves the index entry
    pub fn update(&self, id: &str, data: StaffUpdate) -> RepoResult<StaffProfile> {
        let txn = self.base.db().begin_write()?;
        let profile = {
            let mut table = txn.open_table(tables::STAFF)?;
            let mut record: StaffRecord =
                get_json(&table, id)?.ok_or_else(|| staff_not_found(id))?;

            if let Some(new_username) = data.username.as_deref() {
                let new_username = normalize_username(new_username);
                if new_username != record.profile.username {
                    let mut index = txn.open_table(tables::STAFF_BY_USERNAME)?;
                    if index.get(new_username.as_str())?.is_some() {
                        return Err(username_taken(&new_username));
                    }
                    index.remove(record.profile.username.as_str())?;
                    index.insert(new_username.as_str(), id)?;
                    record.profile.username = new_username;
                }
            }
            if let Some(full_name) = data.full_name.as_deref() {
                record.profile.full_name = required("Full name", full_name)?;
            }
            if let Some(role) = data.role {
                record.profile.role = role;
            }
            if let Some(active) = data.active {
                record.profile.active = active;
            }
            record.profile.updated_at = now_millis();
            put_json(&mut table, id, &record)?;
            record.profile
        };
        txn.commit()?;
        Ok(profile)
    }

    pub fn reset_pin(&self, id: &str, new_pin: &str) -> RepoResult<StaffProfile> {
        let pin_hash = pin::hash_pin(new_pin)
            .map_err(|e| RepoError::Validation(format!("Failed to hash PIN: {}", e)))?;
        self.modify(id, |record| record.pin_hash = pin_hash)
    }

    /// Soft delete
    pub fn deactivate(&self, id: &str) -> RepoResult<StaffProfile> {
        self.modify(id, |record| record.profile.active = false)
    }

    pub fn record_login(&self, id: &str) -> RepoResult<StaffProfile> {
        let now = now_millis();
        self.modify(id, |record| record.profile.last_login = Some(now))
    }

    pub fn count(&self) -> RepoResult<u64> {
        let txn = self.base.db().begin_read()?;
        let table = txn.open_table(tables::STAFF)?;
        Ok(table.len()?)
    }

    fn modify(&self, id: &str, f: impl FnOnce(&mut StaffRecord)) -> RepoResult<StaffProfile> {
        let txn = self.base.db().begin_write()?;
        let profile = {
            let mut table = txn.open_table(tables::STAFF)?;
            let mut record: StaffRecord =
                get_json(&table, id)?.ok_or_else(|| staff_not_found(id))?;
            f(&mut record);
            record.profile.updated_at = now_millis();
            put_json(&mut table, id, &record)?;
            record.profile
        };
        txn.commit()?;
        Ok(profile)
    }
}
