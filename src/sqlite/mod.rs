// SQLite backend - implements the engine traits on top of rusqlite
//
// - connection: `SqliteEngine`, open flags and connection-level calls
// - prepared: statement execution and the lazy row cursor
// - params: binding facade values to rusqlite statements
// - query: reading column values back out of rows
// - error: result-code names and rusqlite error conversion

mod connection;
mod error;
mod params;
mod prepared;
mod query;

pub use connection::SqliteEngine;
pub use error::code_name;
pub use prepared::{SqliteRows, SqliteStatement};

pub use rusqlite::hooks::{AuthAction, AuthContext, Authorization};
