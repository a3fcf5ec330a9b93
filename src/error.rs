use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqlFluentError {
    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[error("Invalid statement kind '{given}', expected one of: {}", .allowed.join(", "))]
    InvalidStatementKind {
        given: String,
        allowed: &'static [&'static str],
    },

    #[error("No base table set; call from() before building the statement")]
    MissingBaseTable,

    #[error("Invalid comparison operator '{given}', expected one of: {}", .allowed.join(", "))]
    InvalidComparisonOperator {
        given: String,
        allowed: &'static [&'static str],
    },

    #[error("Invalid sort direction '{given}', expected one of: {}", .allowed.join(", "))]
    InvalidSortDirection {
        given: String,
        allowed: &'static [&'static str],
    },

    #[error("Invalid projection shape: {0}")]
    InvalidProjectionShape(String),

    #[error("INSERT requires at least one row")]
    EmptyInsert,

    #[error("INSERT row {row} has columns [{}], expected [{}]", .found.join(", "), .expected.join(", "))]
    InsertColumnMismatch {
        row: usize,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("UPDATE requires at least one assignment")]
    EmptyUpdate,

    #[error("A transaction is already in progress")]
    NestedTransaction,

    #[error("No transaction is in progress")]
    NoActiveTransaction,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter binding error: {0}")]
    ParameterError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),
}

impl SqlFluentError {
    /// True for errors raised by local validation, before anything reaches the backend.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidStatementKind { .. }
                | Self::MissingBaseTable
                | Self::InvalidComparisonOperator { .. }
                | Self::InvalidSortDirection { .. }
                | Self::InvalidProjectionShape(_)
                | Self::EmptyInsert
                | Self::InsertColumnMismatch { .. }
                | Self::EmptyUpdate
        )
    }
}
