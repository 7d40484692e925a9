//! Signature revocation
//!
//! Logging out blacklists the exact (key id, signature) pair the token carried.
//! Entries outlive the token they revoke and may be swept once it has expired,
//! since an expired token is already refused.

use crate::{auth::KeyId, AuthError, Result};
use std::collections::HashMap;
use std::sync::RwLock;

/// Set of revoked (key id, signature) pairs
pub trait RevocationStore: Send + Sync {
    /// Record a revocation. `expires_at` is the revoked token's expiration and
    /// only bounds how long the entry has to be kept. Adding a pair that is
    /// already present changes nothing.
    fn add(&self, key_id: &KeyId, signature: &[u8], expires_at: u64) -> Result<()>;

    /// Membership test
    fn contains(&self, key_id: &KeyId, signature: &[u8]) -> Result<bool>;

    /// Evict entries whose token expired at or before `now`.
    fn sweep(&self, now: u64) -> Result<usize>;
}

/// In-process revocation store
#[derive(Debug, Default)]
pub struct MemoryRevocationStore {
    // key id -> signature -> token expiration
    entries: RwLock<HashMap<KeyId, HashMap<Vec<u8>, u64>>>,
}

impl MemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of revoked signatures currently held
    pub fn len(&self) -> Result<usize> {
        let entries = self
            .entries
            .read()
            .map_err(|_| AuthError::lock_poisoned("revocation store"))?;
        Ok(entries.values().map(HashMap::len).sum())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl RevocationStore for MemoryRevocationStore {
    fn add(&self, key_id: &KeyId, signature: &[u8], expires_at: u64) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| AuthError::lock_poisoned("revocation store"))?;

        entries
            .entry(key_id.clone())
            .or_default()
            .entry(signature.to_vec())
            .or_insert(expires_at);
        Ok(())
    }

    fn contains(&self, key_id: &KeyId, signature: &[u8]) -> Result<bool> {
        let entries = self
            .entries
            .read()
            .map_err(|_| AuthError::lock_poisoned("revocation store"))?;

        Ok(entries
            .get(key_id)
            .is_some_and(|signatures| signatures.contains_key(signature)))
    }

    fn sweep(&self, now: u64) -> Result<usize> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| AuthError::lock_poisoned("revocation store"))?;

        let mut removed = 0;
        entries.retain(|_, signatures| {
            let before = signatures.len();
            signatures.retain(|_, expires_at| *expires_at > now);
            removed += before - signatures.len();
            !signatures.is_empty()
        });
        Ok(removed)
    }
}
