//! In-memory user store

use crate::{Result, StoreError, UserRecord, UserStore};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::RwLock;

/// Volatile user store, for tests and throwaway instances
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for MemoryUserStore {
    fn lookup_password_hash(&self, username: &str) -> Result<Option<String>> {
        let users = self
            .users
            .read()
            .map_err(|_| StoreError::Internal("user map lock poisoned".to_string()))?;
        Ok(users.get(username).map(|record| record.password_hash.clone()))
    }

    fn insert_user(&self, record: &UserRecord) -> Result<()> {
        record.validate()?;

        let mut users = self
            .users
            .write()
            .map_err(|_| StoreError::Internal("user map lock poisoned".to_string()))?;

        match users.entry(record.username.clone()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateUsername(record.username.clone())),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(())
            }
        }
    }
}
