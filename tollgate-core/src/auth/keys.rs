//! Ed25519 key management
//!
//! Key pairs never leave the process. The only thing a client ever sees is the
//! [`KeyId`] a pair was filed under.

use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey, SIGNATURE_LENGTH};
use rand::rngs::OsRng;
use std::fmt;

/// Ed25519 key pair for signing session payloads
pub struct KeyPair {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl KeyPair {
    /// Generate a new Ed25519 key pair
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        let verifying_key = signing_key.verifying_key();

        KeyPair {
            signing_key,
            verifying_key,
        }
    }

    /// Get the verifying key
    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    /// Sign data with this key pair
    pub fn sign(&self, data: &[u8]) -> Signature {
        self.signing_key.sign(data)
    }

    /// Check `signature` over `data`.
    ///
    /// Anything that is not a 64-byte canonical signature is simply invalid.
    /// Revocation is keyed by signature bytes, so malleable encodings must not
    /// verify.
    pub fn verify(&self, data: &[u8], signature: &[u8]) -> bool {
        let Ok(bytes) = <[u8; SIGNATURE_LENGTH]>::try_from(signature) else {
            return false;
        };

        let signature = Signature::from_bytes(&bytes);
        self.verifying_key.verify_strict(data, &signature).is_ok()
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("verifying_key", &hex::encode(self.verifying_key.as_bytes()))
            .finish_non_exhaustive()
    }
}

/// Opaque identifier a key pair is filed under.
///
/// Only a key authority mints these. A value read back from a cookie is just
/// a lookup key; if the authority never issued it, nothing verifies against it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyId(String);

impl KeyId {
    pub(crate) fn mint() -> Self {
        KeyId(ulid::Ulid::new().to_string())
    }

    pub(crate) fn from_wire(s: impl Into<String>) -> Self {
        KeyId(s.into())
    }

    /// Get string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
