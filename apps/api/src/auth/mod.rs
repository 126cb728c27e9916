//! Signup, login and bearer-token verification.

pub mod credentials;
pub mod guard;
pub mod handlers;
pub mod password;
pub mod store;
pub mod token;

pub use guard::{require_auth, Identity};
pub use store::{CredentialStore, PgCredentialStore};
pub use token::TokenSigner;
