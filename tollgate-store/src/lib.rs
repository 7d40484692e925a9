//! User record storage for Tollgate
//!
//! Only consulted on login and signup; the per-request token path never
//! touches it.

pub mod engine;
pub mod error;
pub mod memory;
pub mod record;

pub use engine::FjallUserStore;
pub use error::StoreError;
pub use memory::MemoryUserStore;
pub use record::UserRecord;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Lookup and insertion of user records
pub trait UserStore: Send + Sync {
    /// Stored password digest for `username`, `None` if no such user.
    fn lookup_password_hash(&self, username: &str) -> Result<Option<String>>;

    /// Insert a new user. Fails with [`StoreError::DuplicateUsername`] when the
    /// username is taken.
    fn insert_user(&self, record: &UserRecord) -> Result<()>;
}
