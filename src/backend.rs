use crate::error::SqlFluentError;
use crate::results::ResultSet;
use crate::types::Bindings;

/// Connection collaborator driven by [`Database`](crate::Database).
///
/// A backend prepares, binds and runs one statement per [`Backend::execute`] call.
/// Statements without result columns come back as a [`ResultSet`] with no rows and
/// `rows_affected` set; queries come back with their rows materialized.
///
/// The facade tracks transaction state itself, so `begin`, `commit` and `rollback`
/// are only called in a valid order.
pub trait Backend {
    /// Execute `sql` with `bindings`.
    ///
    /// # Errors
    /// Driver failures and binding mismatches.
    fn execute(&mut self, sql: &str, bindings: &Bindings) -> Result<ResultSet, SqlFluentError>;

    /// Identifier generated by the most recent successful insert, if the backend
    /// reports one. `None` means nothing has been inserted through this backend;
    /// an inserted id of 0 is reported as `Some(0)`.
    fn last_insert_id(&self) -> Option<i64>;

    /// # Errors
    /// Driver failures.
    fn begin(&mut self) -> Result<(), SqlFluentError>;

    /// # Errors
    /// Driver failures.
    fn commit(&mut self) -> Result<(), SqlFluentError>;

    /// # Errors
    /// Driver failures.
    fn rollback(&mut self) -> Result<(), SqlFluentError>;
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn execute(&mut self, sql: &str, bindings: &Bindings) -> Result<ResultSet, SqlFluentError> {
        (**self).execute(sql, bindings)
    }

    fn last_insert_id(&self) -> Option<i64> {
        (**self).last_insert_id()
    }

    fn begin(&mut self) -> Result<(), SqlFluentError> {
        (**self).begin()
    }

    fn commit(&mut self) -> Result<(), SqlFluentError> {
        (**self).commit()
    }

    fn rollback(&mut self) -> Result<(), SqlFluentError> {
        (**self).rollback()
    }
}
