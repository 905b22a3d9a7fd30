//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types so a single
//! `use sql_facade::prelude::*;` is enough to get started.

pub use crate::config::{DatabaseOptions, DatabaseOptionsBuilder};
pub use crate::database::{Database, PragmaOptions};
pub use crate::engine::ColumnDescriptor;
pub use crate::error::{Error, SqliteError};
pub use crate::results::{ExecutionInfo, NamedRow, PragmaValue, Row};
pub use crate::statement::Statement;
pub use crate::transaction::TransactionMode;
pub use crate::types::{Params, Value};

#[cfg(feature = "sqlite")]
pub use crate::sqlite::SqliteEngine;
