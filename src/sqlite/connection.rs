use std::fmt;
use std::time::Duration;

use rusqlite::Connection;
use tracing::debug;

use crate::backend::Backend;
use crate::error::SqlFluentError;
use crate::results::ResultSet;
use crate::types::Bindings;

use super::config::SqliteOptions;
use super::query::execute_statement;

/// [`Backend`] over a single rusqlite connection.
pub struct SqliteBackend {
    conn: Connection,
    inserted: bool,
}

impl SqliteBackend {
    /// Open the database described by `opts` and apply its pragmas.
    ///
    /// # Errors
    /// `SqlFluentError::ConfigError` for an empty path,
    /// `SqlFluentError::ConnectionError` if the database cannot be opened, and
    /// driver errors from the pragmas.
    pub fn open(opts: &SqliteOptions) -> Result<Self, SqlFluentError> {
        if opts.db_path.trim().is_empty() {
            return Err(SqlFluentError::ConfigError(
                "SQLite db_path must not be empty".into(),
            ));
        }

        let conn = if opts.is_memory() {
            Connection::open_in_memory()
        } else {
            Connection::open(&opts.db_path)
        }
        .map_err(|e| {
            SqlFluentError::ConnectionError(format!(
                "failed to open SQLite database {}: {e}",
                opts.db_path
            ))
        })?;

        conn.busy_timeout(Duration::from_millis(opts.busy_timeout_ms))?;
        if opts.wal {
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        }
        let foreign_keys = if opts.foreign_keys { "ON" } else { "OFF" };
        conn.execute_batch(&format!("PRAGMA foreign_keys = {foreign_keys};"))?;

        debug!(
            db_path = %opts.db_path,
            wal = opts.wal,
            foreign_keys = opts.foreign_keys,
            "opened SQLite database"
        );
        Ok(Self::from_connection(conn))
    }

    /// Wrap an already configured connection.
    #[must_use]
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            inserted: false,
        }
    }

    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    #[must_use]
    pub fn into_connection(self) -> Connection {
        self.conn
    }
}

impl fmt::Debug for SqliteBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteBackend")
            .field("path", &self.conn.path())
            .field("autocommit", &self.conn.is_autocommit())
            .finish()
    }
}

impl Backend for SqliteBackend {
    fn execute(&mut self, sql: &str, bindings: &Bindings) -> Result<ResultSet, SqlFluentError> {
        let result = execute_statement(&self.conn, sql, bindings)?;
        if is_insert(sql) && self.conn.changes() > 0 {
            self.inserted = true;
        }
        Ok(result)
    }

    /// `SQLite` reports rowid 0 both before any insert and after inserting rowid 0;
    /// the two are told apart by whether an insert has run through this backend.
    fn last_insert_id(&self) -> Option<i64> {
        let id = self.conn.last_insert_rowid();
        (self.inserted || id != 0).then_some(id)
    }

    fn begin(&mut self) -> Result<(), SqlFluentError> {
        self.conn.execute_batch("BEGIN")?;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), SqlFluentError> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), SqlFluentError> {
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }
}

fn is_insert(sql: &str) -> bool {
    sql.split_whitespace().next().is_some_and(|keyword| {
        keyword.eq_ignore_ascii_case("INSERT") || keyword.eq_ignore_ascii_case("REPLACE")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_path_is_a_config_error() {
        assert!(matches!(
            SqliteBackend::open(&SqliteOptions::new("  ")),
            Err(SqlFluentError::ConfigError(_))
        ));
    }

    #[test]
    fn pragmas_are_applied() {
        let backend = SqliteBackend::open(&SqliteOptions::new(":memory:")).unwrap();
        let fk: i64 = backend
            .connection()
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 1);
    }

    #[test]
    fn last_insert_id_is_absent_before_any_insert() {
        let mut backend = SqliteBackend::open(&SqliteOptions::new(":memory:")).unwrap();
        assert_eq!(backend.last_insert_id(), None);
        backend
            .execute("CREATE TABLE t (id INTEGER PRIMARY KEY)", &Bindings::none())
            .unwrap();
        let rs = backend
            .execute("INSERT INTO t (id) VALUES (?)", &Bindings::Positional(vec![7.into()]))
            .unwrap();
        assert_eq!(rs.rows_affected, 1);
        assert_eq!(backend.last_insert_id(), Some(7));
    }

    #[test]
    fn rowid_zero_is_reported_after_an_insert() {
        let mut backend = SqliteBackend::open(&SqliteOptions::new(":memory:")).unwrap();
        backend
            .execute("CREATE TABLE t (id INTEGER PRIMARY KEY)", &Bindings::none())
            .unwrap();
        assert_eq!(backend.last_insert_id(), None);
        backend
            .execute("SELECT * FROM t", &Bindings::none())
            .unwrap();
        assert_eq!(backend.last_insert_id(), None);
        backend
            .execute("insert into t (id) values (?)", &Bindings::Positional(vec![0.into()]))
            .unwrap();
        assert_eq!(backend.last_insert_id(), Some(0));
    }

    #[test]
    fn insert_keyword_detection() {
        assert!(is_insert("  INSERT INTO t DEFAULT VALUES"));
        assert!(is_insert("replace into t (id) values (1)"));
        assert!(!is_insert("SELECT 'INSERT'"));
        assert!(!is_insert(""));
    }
}
