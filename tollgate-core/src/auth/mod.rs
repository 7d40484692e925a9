//! Token lifecycle
//!
//! - Ed25519 key pairs minted per session and held server-side
//! - Canonical payload construction and the cookie wire format
//! - Revocation of individual token signatures on logout
//! - The session authenticator tying the pieces together

pub mod authority;
pub mod canonical;
pub mod keys;
pub mod revocation;
pub mod session;

pub use authority::*;
pub use canonical::*;
pub use keys::*;
pub use revocation::*;
pub use session::*;
