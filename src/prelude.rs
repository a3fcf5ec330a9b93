//! Convenient imports for common functionality.
//!
//! Brings the builder, the facade, the [`Clauses`](crate::Clauses) trait (needed
//! to call clause methods) and the value types into scope.

pub use crate::backend::Backend;
pub use crate::error::SqlFluentError;
pub use crate::executor::{Database, IntoQuery};
pub use crate::ident::quote_identifier;
pub use crate::query_builder::{
    Assignments, Clauses, ColumnRef, InsertRows, JoinKind, Operator, Query, SortDirection,
    StatementBuilder, StatementKind, TableRef,
};
pub use crate::results::{CustomDbRow, ResultSet};
pub use crate::types::{Bindings, QueryAndParams, RowValues};

#[cfg(feature = "sqlite")]
pub use crate::sqlite::{SqliteBackend, SqliteOptions, SqliteOptionsBuilder};
