// SQLite backend
//
// - config: options, builder and the `Database<SqliteBackend>` constructors
// - params: value conversion and parameter binding
// - query: statement execution and result extraction
// - connection: the `Backend` implementation

pub mod config;
pub mod connection;
pub mod params;
pub mod query;

pub use config::{SqliteOptions, SqliteOptionsBuilder};
pub use connection::SqliteBackend;
pub use query::build_result_set;
