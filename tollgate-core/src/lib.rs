//! Session token core for Tollgate
//!
//! Issues, verifies and revokes the signed session tokens that travel in the
//! `auth_token` cookie.

pub mod auth;
pub mod clock;
pub mod error;
pub mod types;

pub use auth::*;
pub use clock::*;
pub use error::*;
pub use types::*;

/// Result type alias for token operations
pub type Result<T> = std::result::Result<T, AuthError>;
