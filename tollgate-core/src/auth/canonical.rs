//! Canonical payload and cookie wire format
//!
//! The signed bytes are rebuilt from the token fields on every request, so
//! [`canonical_payload`] is the one place that decides what a signature covers.
//! Issuing and verifying must both go through it.

use crate::{auth::KeyId, AuthError, Result};
use serde::Deserialize;
use serde_json::json;

/// Name of the cookie carrying the session token
pub const AUTH_COOKIE: &str = "auth_token";

/// A signed session token as held by the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub username: String,
    /// Unix seconds
    pub expiration: u64,
    pub signature: Vec<u8>,
    pub public_key: KeyId,
}

/// Exact bytes signed for a token.
///
/// A JSON object with keys in lexicographic order, every value a string and no
/// whitespace: `{"expiration":"1800","username":"alice"}`.
pub fn canonical_payload(username: &str, expiration: u64) -> Vec<u8> {
    json!({
        "expiration": expiration.to_string(),
        "username": username,
    })
    .to_string()
    .into_bytes()
}

impl Token {
    /// Bytes this token's signature is supposed to cover
    pub fn canonical_payload(&self) -> Vec<u8> {
        canonical_payload(&self.username, self.expiration)
    }

    /// Serialize to a cookie-safe string
    pub fn encode(&self) -> String {
        let wire = json!({
            "username": self.username,
            "expiration": self.expiration.to_string(),
            "signature": hex::encode(&self.signature),
            "public_key": self.public_key.as_str(),
        });

        urlencoding::encode(&wire.to_string()).into_owned()
    }

    /// Parse a cookie value produced by [`Token::encode`].
    ///
    /// A signature of the wrong length still parses; it simply never verifies.
    pub fn decode(cookie_value: &str) -> Result<Self> {
        let json = urlencoding::decode(cookie_value)
            .map_err(|_| malformed("percent-decoded value is not UTF-8"))?;

        let wire: WireToken = serde_json::from_str(&json)
            .map_err(|e| AuthError::MalformedToken(e.to_string()))?;

        let expiration = wire
            .expiration
            .parse::<u64>()
            .map_err(|_| malformed("expiration is not unix seconds"))?;

        let signature =
            hex::decode(&wire.signature).map_err(|_| malformed("signature is not hex"))?;

        if wire.public_key.is_empty() {
            return Err(malformed("missing key id"));
        }

        Ok(Token {
            username: wire.username,
            expiration,
            signature,
            public_key: KeyId::from_wire(wire.public_key),
        })
    }
}

#[derive(Deserialize)]
struct WireToken {
    username: String,
    expiration: String,
    signature: String,
    public_key: String,
}

fn malformed(reason: &str) -> AuthError {
    AuthError::MalformedToken(reason.to_string())
}
