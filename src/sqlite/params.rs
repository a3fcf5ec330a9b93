use rusqlite::Statement;
use rusqlite::types::Value;

use crate::error::SqlFluentError;
use crate::types::{Bindings, RowValues};

/// Convert a single `RowValues` to a rusqlite `Value`.
///
/// `SQLite` has no boolean, timestamp or JSON storage class: booleans bind as
/// integers, timestamps as `%F %T%.f` text and JSON as its serialized text.
#[must_use]
pub fn row_value_to_sqlite_value(value: &RowValues) -> Value {
    match value {
        RowValues::Int(i) => Value::Integer(*i),
        RowValues::Float(f) => Value::Real(*f),
        RowValues::Text(s) => Value::Text(s.clone()),
        RowValues::Bool(b) => Value::Integer(i64::from(*b)),
        RowValues::Timestamp(dt) => Value::Text(dt.format("%F %T%.f").to_string()),
        RowValues::Null => Value::Null,
        RowValues::JSON(jval) => Value::Text(jval.to_string()),
        RowValues::Blob(bytes) => Value::Blob(bytes.clone()),
    }
}

/// Bind `bindings` onto a prepared statement.
///
/// Positional values fill `?1..?n` in order. Named values are looked up as
/// `:name`. The number of values must match the statement's parameter count.
///
/// # Errors
/// [`SqlFluentError::ParameterError`] on a count mismatch or an unknown name;
/// driver errors from binding.
pub fn bind_parameters(stmt: &mut Statement<'_>, bindings: &Bindings) -> Result<(), SqlFluentError> {
    let expected = stmt.parameter_count();
    if bindings.len() != expected {
        return Err(SqlFluentError::ParameterError(format!(
            "statement expects {expected} parameters, {} were bound",
            bindings.len()
        )));
    }

    match bindings {
        Bindings::Positional(values) => {
            for (idx, value) in values.iter().enumerate() {
                stmt.raw_bind_parameter(idx + 1, row_value_to_sqlite_value(value))?;
            }
        }
        Bindings::Named(pairs) => {
            for (name, value) in pairs {
                let placeholder = format!(":{name}");
                let Some(idx) = stmt.parameter_index(&placeholder)? else {
                    return Err(SqlFluentError::ParameterError(format!(
                        "statement has no parameter named {placeholder}"
                    )));
                };
                stmt.raw_bind_parameter(idx, row_value_to_sqlite_value(value))?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;

    #[test]
    fn values_map_to_sqlite_storage_classes() {
        assert_eq!(row_value_to_sqlite_value(&RowValues::Bool(true)), Value::Integer(1));
        assert_eq!(
            row_value_to_sqlite_value(&RowValues::JSON(json!({"a": 1}))),
            Value::Text(r#"{"a":1}"#.into())
        );
        let dt = NaiveDate::from_ymd_opt(2024, 1, 2)
            .and_then(|d| d.and_hms_opt(3, 4, 5))
            .unwrap();
        assert_eq!(
            row_value_to_sqlite_value(&RowValues::Timestamp(dt)),
            Value::Text("2024-01-02 03:04:05".into())
        );
    }

    #[test]
    fn binding_count_must_match() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let mut stmt = conn.prepare("SELECT ?, ?").unwrap();
        let err = bind_parameters(&mut stmt, &Bindings::Positional(vec![RowValues::Int(1)]))
            .unwrap_err();
        assert!(matches!(err, SqlFluentError::ParameterError(_)));
    }

    #[test]
    fn unknown_name_is_rejected() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let mut stmt = conn.prepare("SELECT :abcde").unwrap();
        let err = bind_parameters(
            &mut stmt,
            &Bindings::Named(vec![("zzzzz".into(), RowValues::Int(1))]),
        )
        .unwrap_err();
        assert!(matches!(err, SqlFluentError::ParameterError(_)));
    }
}
