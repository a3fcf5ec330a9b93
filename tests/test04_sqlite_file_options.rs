#![cfg(feature = "sqlite")]
use chrono::NaiveDateTime;
use serde_json::json;
use sql_fluent::prelude::*;

fn unique_path(prefix: &str) -> String {
    let pid = std::process::id();
    let ns = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    std::env::temp_dir()
        .join(format!("{prefix}_{pid}_{ns}.db"))
        .to_string_lossy()
        .into_owned()
}

// Drop guard to clean up file-backed DBs even on failure
struct FileCleanup(String);

impl Drop for FileCleanup {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
        let _ = std::fs::remove_file(format!("{}-wal", self.0));
        let _ = std::fs::remove_file(format!("{}-shm", self.0));
    }
}

#[test]
fn file_database_with_wal_survives_reopen() -> Result<(), Box<dyn std::error::Error>> {
    let path = unique_path("sql_fluent_wal");
    let _cleanup = FileCleanup(path.clone());

    let opts = SqliteOptions::from_json(&format!(
        r#"{{ "db_path": {}, "wal": true, "busy_timeout_ms": 1000 }}"#,
        json!(path)
    ))?;
    {
        let mut db = Database::open_sqlite(&opts)?;
        let mode = db.run("PRAGMA journal_mode")?;
        let mode = mode
            .fetch_all()
            .into_iter()
            .next()
            .and_then(CustomDbRow::into_first_value);
        assert_eq!(mode, Some(RowValues::from("wal")));

        db.run("CREATE TABLE events (id INTEGER PRIMARY KEY, name TEXT)")?;
        db.from("events").insert([("name", "boot")])?;
    }

    let mut db = Database::open_sqlite(&opts)?;
    assert_eq!(db.from("events").value_of("name")?, Some(RowValues::from("boot")));
    Ok(())
}

#[test]
fn foreign_keys_follow_options() -> Result<(), Box<dyn std::error::Error>> {
    let schema = "CREATE TABLE parent (id INTEGER PRIMARY KEY);
        CREATE TABLE child (id INTEGER PRIMARY KEY, parent_id INTEGER REFERENCES parent(id));";

    let mut enforced = SqliteOptionsBuilder::new(":memory:").build()?;
    enforced.backend().connection().execute_batch(schema)?;
    let err = enforced.from("child").insert([("parent_id", 7)]).unwrap_err();
    assert!(matches!(err, SqlFluentError::SqliteError(_)));

    let mut relaxed = SqliteOptionsBuilder::new(":memory:")
        .foreign_keys(false)
        .build()?;
    relaxed.backend().connection().execute_batch(schema)?;
    assert!(relaxed.from("child").insert([("parent_id", 7)])?);
    Ok(())
}

#[test]
fn value_types_round_trip_through_sqlite() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = Database::sqlite_builder(":memory:").build()?;
    db.run(
        "CREATE TABLE samples (
            id INTEGER PRIMARY KEY,
            flag INTEGER,
            seen_at TEXT,
            payload TEXT,
            raw BLOB,
            missing TEXT
        )",
    )?;

    let seen_at = NaiveDateTime::parse_from_str("2024-03-01 12:34:56.789", "%Y-%m-%d %H:%M:%S%.f")?;
    db.from("samples").insert([
        ("flag", RowValues::Bool(true)),
        ("seen_at", RowValues::Timestamp(seen_at)),
        ("payload", RowValues::JSON(json!({"items": [1, 2]}))),
        ("raw", RowValues::Blob(vec![0, 159, 255])),
        ("missing", RowValues::Null),
    ])?;

    let row = db.from("samples").first()?.ok_or("no row")?;
    assert_eq!(row.get("flag").and_then(RowValues::as_bool), Some(&true));
    assert_eq!(row.get("seen_at").and_then(RowValues::as_timestamp), Some(seen_at));
    let payload: serde_json::Value =
        serde_json::from_str(row.get("payload").and_then(RowValues::as_text).ok_or("payload")?)?;
    assert_eq!(payload["items"][1], 2);
    assert_eq!(row.get("raw").and_then(RowValues::as_blob), Some(&[0u8, 159, 255][..]));
    assert!(row.get("missing").is_some_and(RowValues::is_null));

    let by_flag = db.from("samples").and_where("flag", "=", true)?.count()?;
    assert_eq!(by_flag, 1);
    Ok(())
}
