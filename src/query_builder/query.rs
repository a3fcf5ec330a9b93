use crate::backend::Backend;
use crate::error::SqlFluentError;
use crate::executor::Database;
use crate::results::CustomDbRow;
use crate::types::{QueryAndParams, RowValues};

use super::{Assignments, Clauses, ColumnRef, InsertRows, IntoColumnRef, LimitSpec, StatementBuilder};

/// Column alias every aggregate shortcut selects into.
pub const AGGREGATE_ALIAS: &str = "aggregate";

/// A [`StatementBuilder`] bound to the [`Database`] it will run on.
///
/// Clause methods come from [`Clauses`]; the methods here execute. Terminal
/// methods never mutate the accumulated clauses, so a query can be run again
/// (or inspected with [`Query::to_sql`]) without duplicating bindings.
///
/// ```rust
/// use sql_fluent::prelude::*;
///
/// # fn main() -> Result<(), SqlFluentError> {
/// let mut db = SqliteOptionsBuilder::new(":memory:").build()?;
/// db.run("CREATE TABLE orders (id INTEGER PRIMARY KEY, product_id INTEGER, price REAL)")?;
/// db.from("orders").insert(vec![
///     vec![("product_id", RowValues::Int(1)), ("price", RowValues::Float(2.5))],
///     vec![("product_id", RowValues::Int(2)), ("price", RowValues::Float(4.0))],
/// ])?;
///
/// let cheap = db
///     .from("orders")
///     .and_where("price", "<", 3.0)?
///     .get()?;
/// assert_eq!(cheap.len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct Query<'db, B: Backend> {
    db: &'db mut Database<B>,
    statement: StatementBuilder,
}

impl<'db, B: Backend> Query<'db, B> {
    pub(crate) fn new(db: &'db mut Database<B>, statement: StatementBuilder) -> Self {
        Self { db, statement }
    }

    /// # Errors
    /// See [`StatementBuilder::build`].
    pub fn build(&self) -> Result<QueryAndParams, SqlFluentError> {
        self.statement.build()
    }

    /// # Errors
    /// See [`StatementBuilder::build`].
    pub fn to_sql(&self) -> Result<String, SqlFluentError> {
        self.statement.to_sql()
    }

    /// Detach the accumulated clauses from the database.
    #[must_use]
    pub fn into_statement(self) -> StatementBuilder {
        self.statement
    }

    /// All matching rows.
    ///
    /// # Errors
    /// Build or execution errors.
    pub fn get(&mut self) -> Result<Vec<CustomDbRow>, SqlFluentError> {
        self.db.select(&self.statement)
    }

    /// The first matching row. No LIMIT is added.
    ///
    /// # Errors
    /// Build or execution errors.
    pub fn first(&mut self) -> Result<Option<CustomDbRow>, SqlFluentError> {
        Ok(self.get()?.into_iter().next())
    }

    /// First column of the first row, fetched with `LIMIT 1` at the current offset.
    /// A missing row and a SQL `NULL` both read as `None`.
    ///
    /// # Errors
    /// Build or execution errors.
    pub fn value(&mut self) -> Result<Option<RowValues>, SqlFluentError> {
        let offset = self.statement.limit.offset;
        let mut statement = self.statement.clone();
        statement.limit_offset(1, offset);
        self.first_value(&statement)
    }

    /// Named column of the first row, fetched with `LIMIT 1` at the current offset.
    ///
    /// # Errors
    /// Build or execution errors.
    pub fn value_of(&mut self, column: &str) -> Result<Option<RowValues>, SqlFluentError> {
        let offset = self.statement.limit.offset;
        let mut statement = self.statement.clone();
        statement.limit_offset(1, offset);
        let row = self.db.select(&statement)?.into_iter().next();
        Ok(row
            .and_then(|row| row.get(column).cloned())
            .filter(|value| !value.is_null()))
    }

    /// Row with `id` equal to the given value.
    ///
    /// # Errors
    /// Build or execution errors.
    pub fn find(&mut self, id: impl Into<RowValues>) -> Result<Option<CustomDbRow>, SqlFluentError> {
        let mut statement = self.statement.clone();
        statement.and_where("id", "=", id)?;
        Ok(self.db.select(&statement)?.into_iter().next())
    }

    /// `COUNT(*)` over the matching rows.
    ///
    /// # Errors
    /// Build or execution errors, or [`SqlFluentError::ExecutionError`] if the
    /// count does not come back as an integer.
    pub fn count(&mut self) -> Result<i64, SqlFluentError> {
        let value = self.aggregate(ColumnRef::raw(format!("COUNT(*) AS `{AGGREGATE_ALIAS}`")))?;
        match value {
            None => Ok(0),
            Some(RowValues::Int(count)) => Ok(count),
            Some(other) => Err(SqlFluentError::ExecutionError(format!(
                "COUNT(*) returned a non-integer value: {other:?}"
            ))),
        }
    }

    /// # Errors
    /// Build or execution errors, or [`SqlFluentError::InvalidProjectionShape`].
    pub fn max(&mut self, column: impl IntoColumnRef) -> Result<Option<RowValues>, SqlFluentError> {
        self.aggregate_of("MAX", column)
    }

    /// # Errors
    /// Build or execution errors, or [`SqlFluentError::InvalidProjectionShape`].
    pub fn min(&mut self, column: impl IntoColumnRef) -> Result<Option<RowValues>, SqlFluentError> {
        self.aggregate_of("MIN", column)
    }

    /// # Errors
    /// Build or execution errors, or [`SqlFluentError::InvalidProjectionShape`].
    pub fn avg(&mut self, column: impl IntoColumnRef) -> Result<Option<RowValues>, SqlFluentError> {
        self.aggregate_of("AVG", column)
    }

    /// # Errors
    /// Build or execution errors, or [`SqlFluentError::InvalidProjectionShape`].
    pub fn sum(&mut self, column: impl IntoColumnRef) -> Result<Option<RowValues>, SqlFluentError> {
        self.aggregate_of("SUM", column)
    }

    /// Insert one row or a batch into the base table; true if anything was written.
    ///
    /// # Errors
    /// [`SqlFluentError::EmptyInsert`], [`SqlFluentError::InsertColumnMismatch`],
    /// build or execution errors.
    pub fn insert(&mut self, rows: impl Into<InsertRows>) -> Result<bool, SqlFluentError> {
        let mut statement = self.statement.clone();
        statement.set_insert(rows)?;
        self.db.insert(&statement)
    }

    /// Update the matching rows; returns how many changed.
    ///
    /// # Errors
    /// [`SqlFluentError::EmptyUpdate`], build or execution errors.
    pub fn update(&mut self, assignments: impl Into<Assignments>) -> Result<usize, SqlFluentError> {
        let mut statement = self.statement.clone();
        statement.set_update(assignments)?;
        self.db.update(&statement)
    }

    /// Delete the matching rows; returns how many were removed.
    ///
    /// A limit renders as `DELETE ... LIMIT n`. The bundled `SQLite` is compiled
    /// without `SQLITE_ENABLE_UPDATE_DELETE_LIMIT`, so [`SqliteBackend`] rejects that
    /// form with a syntax error; backends whose dialect accepts it run it as is.
    ///
    /// [`SqliteBackend`]: crate::SqliteBackend
    ///
    /// # Errors
    /// Build or execution errors.
    pub fn delete(&mut self) -> Result<usize, SqlFluentError> {
        let mut statement = self.statement.clone();
        statement.set_delete();
        self.db.delete(&statement)
    }

    fn aggregate_of(
        &mut self,
        function: &str,
        column: impl IntoColumnRef,
    ) -> Result<Option<RowValues>, SqlFluentError> {
        let column = column.into_column_ref()?;
        let expression = format!("{function}({}) AS `{AGGREGATE_ALIAS}`", column.to_sql());
        self.aggregate(ColumnRef::raw(expression))
    }

    /// Aggregates replace the projection and read a single row from the start.
    fn aggregate(&mut self, projection: ColumnRef) -> Result<Option<RowValues>, SqlFluentError> {
        let mut statement = self.statement.clone();
        statement.projection = vec![projection];
        statement.limit = LimitSpec {
            offset: 0,
            limit: 1,
        };
        self.first_value(&statement)
    }

    fn first_value(
        &mut self,
        statement: &StatementBuilder,
    ) -> Result<Option<RowValues>, SqlFluentError> {
        let row = self.db.select(statement)?.into_iter().next();
        Ok(row
            .and_then(CustomDbRow::into_first_value)
            .filter(|value| !value.is_null()))
    }
}

impl<B: Backend> Clauses for Query<'_, B> {
    fn statement(&self) -> &StatementBuilder {
        &self.statement
    }

    fn statement_mut(&mut self) -> &mut StatementBuilder {
        &mut self.statement
    }
}
