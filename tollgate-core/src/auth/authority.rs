//! Key authority
//!
//! Mints one key pair per issued token and keeps it until pruned. A token is
//! only ever checked against the key pair the authority filed under its id.

use crate::{auth::{KeyId, KeyPair}, AuthError, Clock, Result};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Creates, retains and verifies against signing key pairs
pub trait KeyAuthority: Send + Sync {
    /// Sign `payload` with a fresh key pair and return the signature together
    /// with the id the pair was filed under. Ids are never reused.
    fn issue(&self, payload: &[u8]) -> Result<(Vec<u8>, KeyId)>;

    /// Check `signature` over `payload` with the pair filed under `key_id`.
    /// Unknown ids and malformed signatures verify to `false`.
    fn verify(&self, payload: &[u8], signature: &[u8], key_id: &KeyId) -> Result<bool>;

    /// Drop key pairs created before `created_before` (unix seconds).
    fn prune(&self, created_before: u64) -> Result<usize>;

    /// Number of retained key pairs
    fn key_count(&self) -> Result<usize>;
}

#[derive(Debug)]
struct SigningKeyPair {
    keypair: KeyPair,
    created_at: u64,
}

/// In-process key authority
#[derive(Debug)]
pub struct MemoryKeyAuthority {
    keys: RwLock<HashMap<KeyId, SigningKeyPair>>,
    clock: Arc<dyn Clock>,
}

impl MemoryKeyAuthority {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        MemoryKeyAuthority {
            keys: RwLock::new(HashMap::new()),
            clock,
        }
    }
}

impl KeyAuthority for MemoryKeyAuthority {
    fn issue(&self, payload: &[u8]) -> Result<(Vec<u8>, KeyId)> {
        // Key generation and signing happen outside the lock.
        let keypair = KeyPair::generate();
        let signature = keypair.sign(payload).to_bytes().to_vec();
        let stored = SigningKeyPair {
            keypair,
            created_at: self.clock.now(),
        };

        let mut keys = self
            .keys
            .write()
            .map_err(|_| AuthError::lock_poisoned("key authority"))?;

        loop {
            match keys.entry(KeyId::mint()) {
                Entry::Vacant(slot) => {
                    let key_id = slot.key().clone();
                    slot.insert(stored);
                    debug!(key_id = %key_id, "issued signing key");
                    return Ok((signature, key_id));
                }
                // ULID collision, mint another
                Entry::Occupied(_) => {}
            }
        }
    }

    fn verify(&self, payload: &[u8], signature: &[u8], key_id: &KeyId) -> Result<bool> {
        let keys = self
            .keys
            .read()
            .map_err(|_| AuthError::lock_poisoned("key authority"))?;

        Ok(keys
            .get(key_id)
            .is_some_and(|stored| stored.keypair.verify(payload, signature)))
    }

    fn prune(&self, created_before: u64) -> Result<usize> {
        let mut keys = self
            .keys
            .write()
            .map_err(|_| AuthError::lock_poisoned("key authority"))?;

        let before = keys.len();
        keys.retain(|_, stored| stored.created_at >= created_before);
        Ok(before - keys.len())
    }

    fn key_count(&self) -> Result<usize> {
        let keys = self
            .keys
            .read()
            .map_err(|_| AuthError::lock_poisoned("key authority"))?;
        Ok(keys.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ManualClock;

    fn authority_at(now: u64) -> (MemoryKeyAuthority, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(now));
        (MemoryKeyAuthority::new(clock.clone()), clock)
    }

    #[test]
    fn test_issue_then_verify() {
        let (authority, _clock) = authority_at(0);
        let (signature, key_id) = authority.issue(b"payload").unwrap();

        assert!(authority.verify(b"payload", &signature, &key_id).unwrap());
        assert!(!authority.verify(b"tampered", &signature, &key_id).unwrap());
        assert_eq!(authority.key_count().unwrap(), 1);
    }

    #[test]
    fn test_unknown_key_id_verifies_false() {
        let (authority, _clock) = authority_at(0);
        let (signature, _key_id) = authority.issue(b"payload").unwrap();

        let forged = KeyId::from_wire("01ARZ3NDEKTSV4RRFFQ69G5FAV");
        assert!(!authority.verify(b"payload", &signature, &forged).unwrap());
    }

    #[test]
    fn test_signature_from_other_key_is_rejected() {
        let (authority, _clock) = authority_at(0);
        let (signature_a, _) = authority.issue(b"payload").unwrap();
        let (_, key_b) = authority.issue(b"payload").unwrap();

        assert!(!authority.verify(b"payload", &signature_a, &key_b).unwrap());
    }

    #[test]
    fn test_malformed_signature_verifies_false() {
        let (authority, _clock) = authority_at(0);
        let (_, key_id) = authority.issue(b"payload").unwrap();

        assert!(!authority.verify(b"payload", b"short", &key_id).unwrap());
        assert!(!authority.verify(b"payload", &[], &key_id).unwrap());
    }

    #[test]
    fn test_issue_never_reuses_key_ids() {
        let (authority, _clock) = authority_at(0);
        let mut seen = std::collections::HashSet::new();

        for _ in 0..200 {
            let (_, key_id) = authority.issue(b"payload").unwrap();
            assert!(seen.insert(key_id));
        }
        assert_eq!(authority.key_count().unwrap(), 200);
    }

    #[test]
    fn test_prune_drops_only_old_keys() {
        let (authority, clock) = authority_at(100);
        let (old_sig, old_id) = authority.issue(b"old").unwrap();

        clock.set(2000);
        let (new_sig, new_id) = authority.issue(b"new").unwrap();

        assert_eq!(authority.prune(1000).unwrap(), 1);
        assert!(!authority.verify(b"old", &old_sig, &old_id).unwrap());
        assert!(authority.verify(b"new", &new_sig, &new_id).unwrap());
        assert_eq!(authority.key_count().unwrap(), 1);
    }
}
