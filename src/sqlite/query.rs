use std::sync::Arc;

use rusqlite::types::Value;
use rusqlite::{Batch, Connection, Statement};

use crate::error::SqlFluentError;
use crate::results::ResultSet;
use crate::types::{Bindings, RowValues};

use super::params::bind_parameters;

/// Extract a `RowValues` from a `SQLite` row.
///
/// # Errors
/// Returns `SqlFluentError::SqliteError` if the value cannot be read.
pub fn sqlite_extract_value(row: &rusqlite::Row<'_>, idx: usize) -> Result<RowValues, SqlFluentError> {
    let value: Value = row.get(idx)?;
    Ok(match value {
        Value::Null => RowValues::Null,
        Value::Integer(i) => RowValues::Int(i),
        Value::Real(f) => RowValues::Float(f),
        Value::Text(s) => RowValues::Text(s),
        Value::Blob(b) => RowValues::Blob(b),
    })
}

/// Prepare, bind and run one statement.
///
/// Statements with result columns are materialized into rows; anything else
/// reports the number of rows it changed. Text holding more than one statement
/// is rejected before anything runs.
///
/// # Errors
/// Prepare, binding and execution failures, and
/// `SqlFluentError::ExecutionError` for empty or multi-statement text.
pub fn execute_statement(
    conn: &Connection,
    sql: &str,
    bindings: &Bindings,
) -> Result<ResultSet, SqlFluentError> {
    let mut batch = Batch::new(conn, sql);
    let Some(mut stmt) = batch.next()? else {
        return Err(SqlFluentError::ExecutionError(
            "SQL text holds no statement".into(),
        ));
    };
    if !matches!(batch.next(), Ok(None)) {
        return Err(SqlFluentError::ExecutionError(format!(
            "SQL text holds more than one statement: {sql}"
        )));
    }
    bind_parameters(&mut stmt, bindings)?;

    if stmt.column_count() == 0 {
        let affected = stmt.raw_execute()?;
        return Ok(ResultSet::from_rows_affected(affected));
    }
    build_result_set(&mut stmt)
}

/// Drain an already-bound statement into a `ResultSet`.
///
/// # Errors
/// Returns `SqlFluentError::SqliteError` if stepping or reading a row fails.
pub fn build_result_set(stmt: &mut Statement<'_>) -> Result<ResultSet, SqlFluentError> {
    let column_names: Vec<String> = stmt
        .column_names()
        .iter()
        .map(std::string::ToString::to_string)
        .collect();
    let col_count = column_names.len();

    let mut result_set = ResultSet::with_capacity(10);
    result_set.set_column_names(Arc::new(column_names));

    let mut rows = stmt.raw_query();
    while let Some(row) = rows.next()? {
        let mut row_values = Vec::with_capacity(col_count);
        for i in 0..col_count {
            row_values.push(sqlite_extract_value(row, i)?);
        }
        result_set.add_row_values(row_values);
    }

    Ok(result_set)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY, v INTEGER)")
            .unwrap();
        conn
    }

    fn count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM t", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn trailing_statement_is_rejected_before_running() {
        let conn = conn();
        let err = execute_statement(
            &conn,
            "INSERT INTO t (v) VALUES (1); INSERT INTO t (v) VALUES (2)",
            &Bindings::none(),
        )
        .unwrap_err();
        assert!(matches!(err, SqlFluentError::ExecutionError(_)));
        assert_eq!(count(&conn), 0);
    }

    #[test]
    fn trailing_semicolon_and_comment_are_accepted() {
        let conn = conn();
        let rs = execute_statement(
            &conn,
            "INSERT INTO t (v) VALUES (1); -- seed\n",
            &Bindings::none(),
        )
        .unwrap();
        assert_eq!(rs.rows_affected, 1);
        assert_eq!(count(&conn), 1);
    }

    #[test]
    fn blank_text_is_rejected() {
        let conn = conn();
        assert!(matches!(
            execute_statement(&conn, "  ;  ", &Bindings::none()),
            Err(SqlFluentError::ExecutionError(_))
        ));
    }
}
