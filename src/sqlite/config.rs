use serde::{Deserialize, Serialize};

use crate::error::SqlFluentError;
use crate::executor::Database;

use super::connection::SqliteBackend;

/// Path that opens a private in-memory database.
pub const MEMORY_PATH: &str = ":memory:";

fn default_foreign_keys() -> bool {
    true
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

/// Options for opening a `SQLite` database.
///
/// Deserializable so it can sit in an application's config file; only
/// `db_path` is required.
///
/// ```rust
/// use sql_fluent::prelude::*;
///
/// let opts = SqliteOptions::from_json(r#"{ "db_path": ":memory:", "wal": true }"#).unwrap();
/// assert!(opts.wal);
/// assert!(opts.foreign_keys);
/// assert_eq!(opts.busy_timeout_ms, 5000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqliteOptions {
    pub db_path: String,
    /// Switch the journal to write-ahead logging at open.
    #[serde(default)]
    pub wal: bool,
    #[serde(default = "default_foreign_keys")]
    pub foreign_keys: bool,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl SqliteOptions {
    #[must_use]
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            wal: false,
            foreign_keys: default_foreign_keys(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }

    /// Parse options from JSON.
    ///
    /// # Errors
    /// Returns `SqlFluentError::ConfigError` for malformed JSON or missing fields.
    pub fn from_json(json: &str) -> Result<Self, SqlFluentError> {
        serde_json::from_str(json)
            .map_err(|e| SqlFluentError::ConfigError(format!("invalid SQLite options: {e}")))
    }

    #[must_use]
    pub fn is_memory(&self) -> bool {
        self.db_path == MEMORY_PATH
    }
}

/// Fluent builder for `SQLite` options.
#[derive(Debug, Clone)]
pub struct SqliteOptionsBuilder {
    opts: SqliteOptions,
}

impl SqliteOptionsBuilder {
    #[must_use]
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            opts: SqliteOptions::new(db_path),
        }
    }

    #[must_use]
    pub fn wal(mut self, wal: bool) -> Self {
        self.opts.wal = wal;
        self
    }

    #[must_use]
    pub fn foreign_keys(mut self, foreign_keys: bool) -> Self {
        self.opts.foreign_keys = foreign_keys;
        self
    }

    #[must_use]
    pub fn busy_timeout_ms(mut self, busy_timeout_ms: u64) -> Self {
        self.opts.busy_timeout_ms = busy_timeout_ms;
        self
    }

    #[must_use]
    pub fn finish(self) -> SqliteOptions {
        self.opts
    }

    /// Open the database and wrap it in a [`Database`] facade.
    ///
    /// # Errors
    /// Returns `SqlFluentError` if the path is empty, the file cannot be opened,
    /// or a pragma fails.
    pub fn build(self) -> Result<Database<SqliteBackend>, SqlFluentError> {
        Database::open_sqlite(&self.finish())
    }
}

impl Database<SqliteBackend> {
    #[must_use]
    pub fn sqlite_builder(db_path: impl Into<String>) -> SqliteOptionsBuilder {
        SqliteOptionsBuilder::new(db_path)
    }

    /// # Errors
    /// See [`SqliteBackend::open`].
    pub fn open_sqlite(opts: &SqliteOptions) -> Result<Self, SqlFluentError> {
        Ok(Database::new(SqliteBackend::open(opts)?))
    }
}
