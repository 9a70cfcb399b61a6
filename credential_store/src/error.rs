//! Error types for the credential_store crate

use thiserror::Error;

/// Errors raised while hashing or storing credentials
#[derive(Debug, Error)]
pub enum CredentialError {
    /// SQLite failure
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Argon2 parameter or hashing failure
    #[error("Hashing error: {0}")]
    Hashing(String),

    /// A stored hash is not a valid PHC string
    #[error("Stored hash for '{username}' is malformed")]
    MalformedHash { username: String },

    /// Error reading a legacy user file
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, CredentialError>;
