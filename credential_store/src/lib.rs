//! # Credential Store
//!
//! Registered users for the forecasting dashboard. Passwords are hashed with
//! Argon2id and kept in an embedded SQLite database.
//!
//! ```no_run
//! use credential_store::{CredentialStore, RegisterOutcome, VerifyOutcome};
//!
//! # fn main() -> credential_store::Result<()> {
//! let store = CredentialStore::open("users.db")?;
//! assert_eq!(store.register("alice", "s3cret")?, RegisterOutcome::Registered);
//! assert_eq!(store.verify("alice", "s3cret")?, VerifyOutcome::Authenticated);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod hashing;
pub mod store;

pub use crate::error::{CredentialError, Result};
pub use crate::hashing::CredentialHasher;
pub use crate::store::{CredentialStore, ImportSummary, RegisterOutcome, VerifyOutcome};
