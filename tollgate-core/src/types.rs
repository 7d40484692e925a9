//! Core data types for Tollgate

use serde::{Deserialize, Serialize};
use std::fmt;

/// The authenticated principal resolved from a usable token
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    username: String,
}

impl Identity {
    pub fn new(username: impl Into<String>) -> Self {
        Identity {
            username: username.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.username)
    }
}

/// Who a request is acting as.
///
/// Handlers receive either a complete [`Identity`] or the explicit
/// `Anonymous` marker, never anything in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    User(Identity),
    Anonymous,
}

impl Principal {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Principal::User(identity) => Some(identity),
            Principal::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Principal::User(_))
    }
}

impl From<Option<Identity>> for Principal {
    fn from(identity: Option<Identity>) -> Self {
        identity.map_or(Principal::Anonymous, Principal::User)
    }
}
