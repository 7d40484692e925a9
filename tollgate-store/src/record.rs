//! User record

use crate::{Result, StoreError};
use serde::{Deserialize, Serialize};

/// A registered user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub password_hash: String,
    #[serde(default)]
    pub email: String,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub date_of_birth: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl UserRecord {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        UserRecord {
            username: username.into(),
            password_hash: password_hash.into(),
            email: String::new(),
            date_of_birth: String::new(),
            first_name: String::new(),
            last_name: String::new(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = first.into();
        self.last_name = last.into();
        self
    }

    pub fn with_date_of_birth(mut self, date_of_birth: impl Into<String>) -> Self {
        self.date_of_birth = date_of_birth.into();
        self
    }

    /// Reject records that cannot be stored or logged in with
    pub fn validate(&self) -> Result<()> {
        if self.username.is_empty() {
            return Err(StoreError::InvalidRecord("empty username".to_string()));
        }

        // Basic validation - no control characters
        if self.username.chars().any(|c| c.is_control()) {
            return Err(StoreError::InvalidRecord(
                "control characters not allowed in username".to_string(),
            ));
        }

        if self.password_hash.is_empty() {
            return Err(StoreError::InvalidRecord("missing password hash".to_string()));
        }

        Ok(())
    }
}
