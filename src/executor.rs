use tracing::{debug, trace, warn};

use crate::backend::Backend;
use crate::error::SqlFluentError;
use crate::query_builder::{Clauses, Query, StatementBuilder};
use crate::results::{CustomDbRow, ResultSet};
use crate::types::{Bindings, QueryAndParams};

/// Anything the facade can execute: raw SQL, SQL with bindings, or a builder.
pub trait IntoQuery {
    /// # Errors
    /// Builders report their `build()` errors here.
    fn into_query(self) -> Result<QueryAndParams, SqlFluentError>;
}

impl IntoQuery for &str {
    fn into_query(self) -> Result<QueryAndParams, SqlFluentError> {
        Ok(QueryAndParams::new_without_params(self))
    }
}

impl IntoQuery for String {
    fn into_query(self) -> Result<QueryAndParams, SqlFluentError> {
        Ok(QueryAndParams::new_without_params(self))
    }
}

impl IntoQuery for QueryAndParams {
    fn into_query(self) -> Result<QueryAndParams, SqlFluentError> {
        Ok(self)
    }
}

impl IntoQuery for &QueryAndParams {
    fn into_query(self) -> Result<QueryAndParams, SqlFluentError> {
        Ok(self.clone())
    }
}

impl<P: Into<Bindings>> IntoQuery for (&str, P) {
    fn into_query(self) -> Result<QueryAndParams, SqlFluentError> {
        Ok(QueryAndParams::new(self.0, self.1))
    }
}

impl IntoQuery for &StatementBuilder {
    fn into_query(self) -> Result<QueryAndParams, SqlFluentError> {
        self.build()
    }
}

impl IntoQuery for StatementBuilder {
    fn into_query(self) -> Result<QueryAndParams, SqlFluentError> {
        self.build()
    }
}

/// Execution facade over one [`Backend`] connection.
///
/// Runs built statements or raw SQL, reports affected rows and last insert ids,
/// and scopes transactions. Transactions do not nest.
///
/// ```rust
/// use sql_fluent::prelude::*;
///
/// # fn main() -> Result<(), SqlFluentError> {
/// let mut db = SqliteOptionsBuilder::new(":memory:").build()?;
/// db.run("CREATE TABLE orders (id INTEGER PRIMARY KEY, price REAL)")?;
/// db.from("orders").insert([("price", 9.5)])?;
///
/// let total = db.from("orders").count()?;
/// assert_eq!(total, 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Database<B: Backend> {
    backend: B,
    in_transaction: bool,
}

impl<B: Backend> Database<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            in_transaction: false,
        }
    }

    /// Start a query against `table`.
    pub fn from(&mut self, table: &str) -> Query<'_, B> {
        let mut statement = StatementBuilder::new();
        statement.from(table);
        Query::new(self, statement)
    }

    /// Start a query with no table yet; add one with [`Clauses::from`].
    pub fn query(&mut self) -> Query<'_, B> {
        Query::new(self, StatementBuilder::new())
    }

    /// Execute a statement and return the backend's result.
    ///
    /// # Errors
    /// Build errors for builders, otherwise whatever the backend reports.
    pub fn run(&mut self, query: impl IntoQuery) -> Result<ResultSet, SqlFluentError> {
        let QueryAndParams { query, params } = query.into_query()?;
        debug!(sql = %query, bindings = params.len(), "executing statement");
        self.backend.execute(&query, &params)
    }

    /// Execute and return every row.
    ///
    /// # Errors
    /// See [`Database::run`].
    pub fn select(&mut self, query: impl IntoQuery) -> Result<Vec<CustomDbRow>, SqlFluentError> {
        Ok(self.run(query)?.fetch_all())
    }

    /// Execute and report whether any row was written.
    ///
    /// # Errors
    /// See [`Database::run`].
    pub fn insert(&mut self, query: impl IntoQuery) -> Result<bool, SqlFluentError> {
        Ok(self.run(query)?.rows_affected > 0)
    }

    /// Execute and return the number of rows changed.
    ///
    /// # Errors
    /// See [`Database::run`].
    pub fn update(&mut self, query: impl IntoQuery) -> Result<usize, SqlFluentError> {
        Ok(self.run(query)?.rows_affected)
    }

    /// Execute and return the number of rows removed.
    ///
    /// # Errors
    /// See [`Database::run`].
    pub fn delete(&mut self, query: impl IntoQuery) -> Result<usize, SqlFluentError> {
        Ok(self.run(query)?.rows_affected)
    }

    #[must_use]
    pub fn last_insert_id(&self) -> Option<i64> {
        self.backend.last_insert_id()
    }

    #[must_use]
    pub fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    /// # Errors
    /// [`SqlFluentError::NestedTransaction`] if one is already open, or a backend error.
    pub fn begin_transaction(&mut self) -> Result<(), SqlFluentError> {
        if self.in_transaction {
            return Err(SqlFluentError::NestedTransaction);
        }
        trace!("begin transaction");
        self.backend.begin()?;
        self.in_transaction = true;
        Ok(())
    }

    /// # Errors
    /// [`SqlFluentError::NoActiveTransaction`] if none is open, or a backend error.
    /// A failed commit leaves the transaction open.
    pub fn commit(&mut self) -> Result<(), SqlFluentError> {
        if !self.in_transaction {
            return Err(SqlFluentError::NoActiveTransaction);
        }
        trace!("commit transaction");
        self.backend.commit()?;
        self.in_transaction = false;
        Ok(())
    }

    /// # Errors
    /// [`SqlFluentError::NoActiveTransaction`] if none is open, or a backend error.
    /// The transaction is considered closed either way.
    pub fn roll_back(&mut self) -> Result<(), SqlFluentError> {
        if !self.in_transaction {
            return Err(SqlFluentError::NoActiveTransaction);
        }
        trace!("roll back transaction");
        self.in_transaction = false;
        self.backend.rollback()
    }

    /// Run `body` inside a transaction.
    ///
    /// Commits when `body` returns `Ok`. When it returns `Err`, rolls back and
    /// returns that same error; a rollback failure is logged, not returned.
    /// If `body` ends the transaction itself with [`Database::commit`] or
    /// [`Database::roll_back`], nothing further is sent and its result is returned.
    /// A panic inside `body` is not caught.
    ///
    /// ```rust
    /// use sql_fluent::prelude::*;
    ///
    /// # fn main() -> Result<(), SqlFluentError> {
    /// let mut db = SqliteOptionsBuilder::new(":memory:").build()?;
    /// db.run("CREATE TABLE t (id INTEGER PRIMARY KEY, v TEXT NOT NULL)")?;
    ///
    /// let outcome: Result<(), SqlFluentError> = db.transaction(|db| {
    ///     db.from("t").insert([("v", "kept?")])?;
    ///     db.from("t").insert([("v", None::<String>)])?;
    ///     Ok(())
    /// });
    /// assert!(outcome.is_err());
    /// assert_eq!(db.from("t").count()?, 0);
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    /// [`SqlFluentError::NestedTransaction`] (converted into `E`) if a transaction
    /// is already open, commit failures, or the error `body` returned.
    pub fn transaction<T, E, F>(&mut self, body: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self) -> Result<T, E>,
        E: From<SqlFluentError>,
    {
        self.begin_transaction()?;
        match body(self) {
            Ok(value) => {
                if !self.in_transaction {
                    trace!("transaction already closed by its body");
                    return Ok(value);
                }
                if let Err(err) = self.commit() {
                    self.roll_back_quietly();
                    return Err(err.into());
                }
                Ok(value)
            }
            Err(err) => {
                self.roll_back_quietly();
                Err(err)
            }
        }
    }

    fn roll_back_quietly(&mut self) {
        if !self.in_transaction {
            return;
        }
        if let Err(err) = self.roll_back() {
            warn!(error = %err, "rollback after failed transaction did not succeed");
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }
}
