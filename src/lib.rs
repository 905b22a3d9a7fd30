//! Synchronous facade over an embedded SQL engine.
//!
//! [`Database`] owns one engine connection and hands out [`Statement`]s and
//! [`Transaction`] functions. Every engine failure passes through one normalizer, so
//! callers can branch on [`Error::code`] / [`Error::raw_code`] whenever the engine
//! reported a result code, while other failures keep their original shape.
//!
//! ```rust
//! # #[cfg(feature = "sqlite")]
//! # fn main() -> Result<(), sql_facade::Error> {
//! use sql_facade::prelude::*;
//!
//! let db = Database::open_in_memory()?;
//! db.exec("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)")?;
//! db.prepare("INSERT INTO users (name) VALUES (?)")?.run(["alice"])?;
//!
//! let mut stmt = db.prepare("SELECT name FROM users WHERE id = :id")?;
//! let row = stmt.get(Params::named([("id", 1)]))?.expect("one row");
//! assert_eq!(row.get("name"), Some(&Value::from("alice")));
//!
//! let name = stmt.pluck(true)?.get(Params::named([("id", 1)]))?;
//! assert_eq!(name, Some(Row::Plucked(Value::from("alice"))));
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "sqlite"))]
//! # fn main() {}
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod prelude;
pub mod results;
pub mod types;

mod database;
mod statement;
mod transaction;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(test)]
mod test_utils;

pub use config::{DatabaseOptions, DatabaseOptionsBuilder};
pub use database::{Database, PragmaOptions};
pub use engine::{ColumnDescriptor, EngineError};
pub use error::{Error, Result, SqliteError};
pub use results::{ExecutionInfo, NamedRow, PragmaValue, QueryMetadata, Row};
pub use statement::{RowIter, Statement};
pub use transaction::{Transaction, TransactionMode, TransactionVariant};
pub use types::{MAX_SAFE_INTEGER, Params, Value};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteEngine;
