//! Persistent user store on a fjall keyspace

use crate::{Result, StoreError, UserRecord, UserStore};
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

const USERS_PARTITION: &str = "users";

/// User records as JSON values keyed by username
#[derive(Clone)]
pub struct FjallUserStore {
    keyspace: Arc<Keyspace>,
    users: PartitionHandle,
    // Serializes check-then-insert so two signups cannot claim one username
    insert_lock: Arc<Mutex<()>>,
}

impl FjallUserStore {
    /// Open or create the store at the given path
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let keyspace = Arc::new(Config::new(path).open()?);
        let users = keyspace.open_partition(USERS_PARTITION, PartitionCreateOptions::default())?;

        Ok(FjallUserStore {
            keyspace,
            users,
            insert_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Create temporary store for testing
    #[cfg(any(test, feature = "test-utils"))]
    pub fn temp() -> Result<(Self, tempfile::TempDir)> {
        let temp_dir = tempfile::tempdir()?;
        let store = Self::new(temp_dir.path())?;
        Ok((store, temp_dir))
    }

    /// Fetch a full record
    pub fn get_user(&self, username: &str) -> Result<Option<UserRecord>> {
        match self.users.get(username.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Persist all changes to disk
    pub fn persist(&self) -> Result<()> {
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }
}

impl UserStore for FjallUserStore {
    fn lookup_password_hash(&self, username: &str) -> Result<Option<String>> {
        Ok(self.get_user(username)?.map(|record| record.password_hash))
    }

    fn insert_user(&self, record: &UserRecord) -> Result<()> {
        record.validate()?;
        let value = serde_json::to_vec(record)?;

        let _guard = self
            .insert_lock
            .lock()
            .map_err(|_| StoreError::Internal("insert lock poisoned".to_string()))?;

        if self.users.contains_key(record.username.as_bytes())? {
            return Err(StoreError::DuplicateUsername(record.username.clone()));
        }

        self.users.insert(record.username.as_bytes(), value)?;
        self.persist()?;

        debug!(username = %record.username, "stored new user");
        Ok(())
    }
}
