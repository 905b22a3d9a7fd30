use std::time::Duration;

use serde::Serialize;

use super::row::Row;
use crate::types::Value;

/// Result of [`Statement::run`](crate::Statement::run).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionInfo {
    /// Rows inserted, updated or deleted by this execution; 0 when nothing changed.
    pub changes: u64,
    /// Rowid of the most recent successful INSERT on the connection.
    pub last_insert_rowid: i64,
    /// Wall-clock time spent in the engine call.
    pub duration: Duration,
}

/// Metadata that travels next to fetched rows without mixing into column data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueryMetadata {
    pub duration: Duration,
}

/// What [`Database::pragma`](crate::Database::pragma) returns.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PragmaValue {
    /// `simple` mode: first column of the first row, `None` when no row came back.
    Scalar(Option<Value>),
    Rows(Vec<Row>),
}

impl PragmaValue {
    #[must_use]
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            PragmaValue::Scalar(value) => value.as_ref(),
            PragmaValue::Rows(_) => None,
        }
    }

    #[must_use]
    pub fn rows(&self) -> Option<&[Row]> {
        match self {
            PragmaValue::Rows(rows) => Some(rows),
            PragmaValue::Scalar(_) => None,
        }
    }
}
