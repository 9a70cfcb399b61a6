//! SQLite-backed user store

use crate::error::{CredentialError, Result};
use crate::hashing::CredentialHasher;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Deserialize;
use std::path::Path;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    username      TEXT PRIMARY KEY,
    password_hash TEXT NOT NULL,
    created_at    TEXT NOT NULL
);
";

/// Result of a registration attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// A new user was stored
    Registered,
    /// Another user already has this name; nothing was written
    UsernameTaken,
    /// Username or password was empty
    InvalidInput,
}

/// Result of a login attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    Authenticated,
    /// Unknown user or wrong password; callers cannot tell which
    Rejected,
}

/// Counts from a legacy user file import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    /// Rows that were malformed, empty or already registered
    pub skipped: usize,
}

#[derive(Debug, Deserialize)]
struct LegacyUser {
    username: Option<String>,
    password: Option<String>,
}

/// User credentials keyed by username
///
/// Passwords are only ever stored as Argon2id PHC strings. The connection is
/// guarded by a mutex so the store can be shared between threads; uniqueness
/// is enforced by the primary key, not by a read-then-write check.
pub struct CredentialStore {
    conn: Mutex<Connection>,
    hasher: CredentialHasher,
    dummy_hash: String,
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore").finish_non_exhaustive()
    }
}

impl CredentialStore {
    /// Open (or create) a store at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        tracing::debug!(path = %path.as_ref().display(), "opened credential store");
        Self::with_connection(conn)
    }

    /// Open a store that lives only as long as this value
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;

        let hasher = CredentialHasher::new()?;
        // Checked against when the username is unknown
        let dummy_hash = hasher.hash("stock-oracle-dummy-password")?;

        Ok(Self {
            conn: Mutex::new(conn),
            hasher,
            dummy_hash,
        })
    }

    /// Register a new user
    pub fn register(&self, username: &str, password: &str) -> Result<RegisterOutcome> {
        let username = username.trim();
        if username.is_empty() || password.trim().is_empty() {
            return Ok(RegisterOutcome::InvalidInput);
        }

        let hash = self.hasher.hash(password)?;
        let created_at = chrono::Utc::now().to_rfc3339();

        let changed = self.conn.lock().execute(
            "INSERT INTO users (username, password_hash, created_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(username) DO NOTHING",
            params![username, hash, created_at],
        )?;

        if changed == 0 {
            tracing::info!(username, "registration rejected, username taken");
            return Ok(RegisterOutcome::UsernameTaken);
        }

        tracing::info!(username, "user registered");
        Ok(RegisterOutcome::Registered)
    }

    /// Check a username and password
    pub fn verify(&self, username: &str, password: &str) -> Result<VerifyOutcome> {
        let username = username.trim();
        let stored: Option<String> = self
            .conn
            .lock()
            .query_row(
                "SELECT password_hash FROM users WHERE username = ?1",
                [username],
                |row| row.get(0),
            )
            .optional()?;

        let matched = match stored {
            Some(hash) => self.hasher.verify(password, &hash).map_err(|_| {
                CredentialError::MalformedHash {
                    username: username.to_string(),
                }
            })?,
            None => {
                self.hasher.verify(password, &self.dummy_hash)?;
                false
            }
        };

        if matched {
            tracing::info!(username, "login succeeded");
            Ok(VerifyOutcome::Authenticated)
        } else {
            tracing::info!(username, "login rejected");
            Ok(VerifyOutcome::Rejected)
        }
    }

    /// Number of registered users
    pub fn user_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .lock()
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count.max(0) as usize)
    }

    /// Whether a username is registered
    pub fn contains(&self, username: &str) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .lock()
            .query_row(
                "SELECT 1 FROM users WHERE username = ?1",
                [username.trim()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Import a plaintext `username,password` file
    ///
    /// Every row is hashed and registered; the file itself is only read.
    pub fn import_legacy_csv<P: AsRef<Path>>(&self, path: P) -> Result<ImportSummary> {
        let mut reader = csv::Reader::from_path(path.as_ref())?;
        let mut summary = ImportSummary::default();

        for (row, record) in reader.deserialize::<LegacyUser>().enumerate() {
            let user = match record {
                Ok(user) => user,
                Err(e) => {
                    tracing::warn!(row, error = %e, "skipping malformed legacy user row");
                    summary.skipped += 1;
                    continue;
                }
            };

            let username = user.username.unwrap_or_default();
            let password = user.password.unwrap_or_default();
            match self.register(&username, &password)? {
                RegisterOutcome::Registered => summary.imported += 1,
                RegisterOutcome::UsernameTaken | RegisterOutcome::InvalidInput => {
                    summary.skipped += 1
                }
            }
        }

        tracing::info!(
            imported = summary.imported,
            skipped = summary.skipped,
            path = %path.as_ref().display(),
            "legacy users imported"
        );
        Ok(summary)
    }
}
