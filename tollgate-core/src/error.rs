//! Error types for the token core

use thiserror::Error;

/// Every way a session token can fail to resolve to an identity.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    #[error("Bad signature")]
    BadSignature,

    #[error("Token expired")]
    Expired,

    #[error("Token revoked")]
    Revoked,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Faults in the key or revocation stores, as opposed to a bad token.
    pub fn is_internal(&self) -> bool {
        matches!(self, AuthError::Internal(_))
    }

    pub(crate) fn lock_poisoned(store: &str) -> Self {
        AuthError::Internal(format!("{} lock poisoned", store))
    }
}
