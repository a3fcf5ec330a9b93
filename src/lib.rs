//! Fluent SQL statement builder with a small synchronous execution facade.
//!
//! Build SELECT, INSERT, UPDATE and DELETE statements clause by clause, then run
//! them through a [`Database`] that owns one connection and scopes transactions.
//! Identifiers are backtick-quoted and every value is bound, never interpolated.
//!
//! ```rust
//! use sql_fluent::prelude::*;
//!
//! # fn main() -> Result<(), SqlFluentError> {
//! let mut db = Database::sqlite_builder(":memory:").build()?;
//! db.run("CREATE TABLE orders (id INTEGER PRIMARY KEY, product_id INTEGER, price REAL)")?;
//! db.from("orders").insert([("product_id", 1.into()), ("price", RowValues::Float(9.99))])?;
//!
//! let id = db.last_insert_id().unwrap_or_default();
//! let order = db.from("orders").find(id)?;
//! assert!(order.is_some());
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod binding_names;
pub mod error;
pub mod executor;
pub mod ident;
pub mod prelude;
pub mod query_builder;
pub mod results;
#[cfg(feature = "sqlite")]
pub mod sqlite;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod types;

pub use backend::Backend;
pub use error::SqlFluentError;
pub use executor::{Database, IntoQuery};
pub use ident::quote_identifier;
pub use query_builder::{
    Assignments, Clauses, ColumnRef, InsertRows, JoinKind, Operator, Query, SortDirection,
    StatementBuilder, StatementKind, TableRef,
};
pub use results::{CustomDbRow, ResultSet};
#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteBackend, SqliteOptions, SqliteOptionsBuilder};
pub use types::{Bindings, QueryAndParams, RowValues};
