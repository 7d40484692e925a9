//! Session authenticator
//!
//! Ties the key authority, the revocation store and the wire format together
//! to answer one question per request: is this token usable, and for whom.

use crate::{
    auth::{canonical_payload, KeyAuthority, RevocationStore, Token},
    AuthError, Clock, Identity, Result,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// How long a freshly issued token stays valid
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

/// What a maintenance sweep removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub revocations_evicted: usize,
    pub keys_pruned: usize,
}

/// Issues, verifies and revokes session tokens
pub struct SessionAuthenticator {
    keys: Arc<dyn KeyAuthority>,
    revocations: Arc<dyn RevocationStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl SessionAuthenticator {
    pub fn new(
        keys: Arc<dyn KeyAuthority>,
        revocations: Arc<dyn RevocationStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        SessionAuthenticator {
            keys,
            revocations,
            clock,
            ttl: DEFAULT_SESSION_TTL,
        }
    }

    /// Override the session lifetime
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `username`, valid for the session lifetime from now.
    pub fn login(&self, username: &str) -> Result<Token> {
        let expiration = self.clock.now().saturating_add(self.ttl.as_secs());
        let payload = canonical_payload(username, expiration);
        let (signature, public_key) = self.keys.issue(&payload)?;

        debug!(key_id = %public_key, expiration, "issued session token");

        Ok(Token {
            username: username.to_string(),
            expiration,
            signature,
            public_key,
        })
    }

    /// Resolve a token to an identity.
    ///
    /// Checks run in a fixed order: signature, expiration, revocation. A forged
    /// token never reaches the clock or the revocation store.
    pub fn verify(&self, token: &Token) -> Result<Identity> {
        if !self.is_authentic(token)? {
            return Err(AuthError::BadSignature);
        }

        if self.clock.now() >= token.expiration {
            return Err(AuthError::Expired);
        }

        if self.revocations.contains(&token.public_key, &token.signature)? {
            return Err(AuthError::Revoked);
        }

        Ok(Identity::new(token.username.clone()))
    }

    /// Decode a cookie value and verify the token inside it.
    pub fn authenticate(&self, cookie_value: &str) -> Result<Identity> {
        let token = Token::decode(cookie_value)?;
        self.verify(&token)
    }

    /// Revoke `token`.
    ///
    /// Tokens that are forged or already expired are refused anyway, so they
    /// are not recorded.
    pub fn logout(&self, token: &Token) -> Result<()> {
        if !self.is_authentic(token)? {
            debug!(key_id = %token.public_key, "ignoring logout for unauthentic token");
            return Ok(());
        }

        if self.clock.now() >= token.expiration {
            debug!(key_id = %token.public_key, "ignoring logout for expired token");
            return Ok(());
        }

        self.revocations
            .add(&token.public_key, &token.signature, token.expiration)?;
        debug!(key_id = %token.public_key, "revoked session token");
        Ok(())
    }

    /// Evict revocations and key pairs that can no longer affect any verdict.
    ///
    /// Key pairs are pruned once every token they could have signed has
    /// expired.
    pub fn sweep(&self) -> Result<SweepReport> {
        let now = self.clock.now();
        let revocations_evicted = self.revocations.sweep(now)?;
        let keys_pruned = self.keys.prune(now.saturating_sub(self.ttl.as_secs()))?;

        Ok(SweepReport {
            revocations_evicted,
            keys_pruned,
        })
    }

    fn is_authentic(&self, token: &Token) -> Result<bool> {
        let payload = canonical_payload(&token.username, token.expiration);
        self.keys
            .verify(&payload, &token.signature, &token.public_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{KeyId, ManualClock, MemoryKeyAuthority, MemoryRevocationStore};

    struct Fixture {
        auth: SessionAuthenticator,
        clock: Arc<ManualClock>,
        keys: Arc<MemoryKeyAuthority>,
        revocations: Arc<MemoryRevocationStore>,
    }

    fn fixture() -> Fixture {
        let clock = Arc::new(ManualClock::new(0));
        let keys = Arc::new(MemoryKeyAuthority::new(clock.clone()));
        let revocations = Arc::new(MemoryRevocationStore::new());
        let auth = SessionAuthenticator::new(keys.clone(), revocations.clone(), clock.clone());

        Fixture {
            auth,
            clock,
            keys,
            revocations,
        }
    }

    #[test]
    fn test_login_sets_thirty_minute_expiration() {
        let f = fixture();
        f.clock.set(1000);
        let token = f.auth.login("alice").unwrap();

        assert_eq!(token.username, "alice");
        assert_eq!(token.expiration, 2800);
        assert_eq!(f.keys.key_count().unwrap(), 1);
    }

    #[test]
    fn test_custom_ttl() {
        let f = fixture();
        let auth = f.auth.with_ttl(Duration::from_secs(60));
        let token = auth.login("alice").unwrap();
        assert_eq!(token.expiration, 60);
    }

    #[test]
    fn test_alice_session_scenario() {
        let f = fixture();
        let token = f.auth.login("alice").unwrap();
        assert_eq!(token.expiration, 1800);

        f.clock.set(900);
        assert_eq!(f.auth.verify(&token), Ok(Identity::new("alice")));

        f.clock.set(1801);
        assert_eq!(f.auth.verify(&token), Err(AuthError::Expired));

        f.clock.set(900);
        f.auth.logout(&token).unwrap();
        f.clock.set(901);
        assert_eq!(f.auth.verify(&token), Err(AuthError::Revoked));
    }

    #[test]
    fn test_expires_exactly_at_expiration() {
        let f = fixture();
        let token = f.auth.login("alice").unwrap();

        f.clock.set(1799);
        assert!(f.auth.verify(&token).is_ok());
        f.clock.set(1800);
        assert_eq!(f.auth.verify(&token), Err(AuthError::Expired));
    }

    #[test]
    fn test_altered_fields_fail_signature() {
        let f = fixture();
        let token = f.auth.login("alice").unwrap();

        let renamed = Token {
            username: "mallory".to_string(),
            ..token.clone()
        };
        assert_eq!(f.auth.verify(&renamed), Err(AuthError::BadSignature));

        let extended = Token {
            expiration: token.expiration + 3600,
            ..token.clone()
        };
        assert_eq!(f.auth.verify(&extended), Err(AuthError::BadSignature));
    }

    #[test]
    fn test_signature_checked_before_expiration() {
        let f = fixture();
        let token = f.auth.login("alice").unwrap();
        let forged = Token {
            username: "mallory".to_string(),
            ..token
        };

        f.clock.set(10_000);
        assert_eq!(f.auth.verify(&forged), Err(AuthError::BadSignature));
    }

    #[test]
    fn test_foreign_key_id_is_bad_signature() {
        let f = fixture();
        let token = f.auth.login("alice").unwrap();
        let other = f.auth.login("bob").unwrap();

        let swapped = Token {
            public_key: other.public_key,
            ..token.clone()
        };
        assert_eq!(f.auth.verify(&swapped), Err(AuthError::BadSignature));

        let unknown = Token {
            public_key: KeyId::from_wire("not-a-key-we-issued"),
            ..token
        };
        assert_eq!(f.auth.verify(&unknown), Err(AuthError::BadSignature));
    }

    #[test]
    fn test_logout_is_idempotent() {
        let f = fixture();
        let token = f.auth.login("alice").unwrap();

        f.auth.logout(&token).unwrap();
        assert_eq!(f.revocations.len().unwrap(), 1);
        f.auth.logout(&token).unwrap();
        assert_eq!(f.revocations.len().unwrap(), 1);
    }

    #[test]
    fn test_logout_ignores_forged_and_expired_tokens() {
        let f = fixture();
        let token = f.auth.login("alice").unwrap();

        let forged = Token {
            username: "mallory".to_string(),
            ..token.clone()
        };
        f.auth.logout(&forged).unwrap();
        assert!(f.revocations.is_empty().unwrap());

        f.clock.set(5000);
        f.auth.logout(&token).unwrap();
        assert!(f.revocations.is_empty().unwrap());
    }

    #[test]
    fn test_logout_only_revokes_that_token() {
        let f = fixture();
        let first = f.auth.login("alice").unwrap();
        let second = f.auth.login("alice").unwrap();

        f.auth.logout(&first).unwrap();
        assert_eq!(f.auth.verify(&first), Err(AuthError::Revoked));
        assert_eq!(f.auth.verify(&second), Ok(Identity::new("alice")));
    }

    #[test]
    fn test_authenticate_decodes_cookie() {
        let f = fixture();
        let token = f.auth.login("alice").unwrap();

        assert_eq!(f.auth.authenticate(&token.encode()), Ok(Identity::new("alice")));
        assert!(matches!(
            f.auth.authenticate("garbage"),
            Err(AuthError::MalformedToken(_))
        ));
    }

    #[test]
    fn test_sweep_prunes_dead_state() {
        let f = fixture();
        let token = f.auth.login("alice").unwrap();
        f.auth.logout(&token).unwrap();

        f.clock.set(1000);
        assert_eq!(f.auth.sweep().unwrap(), SweepReport::default());

        f.clock.set(1800);
        let report = f.auth.sweep().unwrap();
        assert_eq!(report.revocations_evicted, 1);
        assert_eq!(report.keys_pruned, 0);

        f.clock.set(1801);
        let report = f.auth.sweep().unwrap();
        assert_eq!(report.keys_pruned, 1);
        assert_eq!(f.keys.key_count().unwrap(), 0);
    }
}
