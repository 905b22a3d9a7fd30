//! Capability surface the facade consumes from a native SQL engine.
//!
//! The facade never parses or executes SQL itself. A backend implements these three
//! traits and every call it makes returns [`EngineError`] on failure; the facade feeds
//! those through [`crate::normalize::normalize`] before they reach callers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{BoxError, SqliteError};
use crate::types::{Params, Value};

/// Failure reported by an engine call.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine reported a result code it could name.
    #[error(transparent)]
    Structured(SqliteError),
    /// Anything else: conversion failures, binding mistakes, faults from foreign bindings.
    ///
    /// A fault whose message is a JSON wire payload is still recognized as structured.
    #[error(transparent)]
    Fault(BoxError),
}

impl EngineError {
    pub fn fault(err: impl Into<BoxError>) -> Self {
        EngineError::Fault(err.into())
    }
}

impl From<SqliteError> for EngineError {
    fn from(err: SqliteError) -> Self {
        EngineError::Structured(err)
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Static description of one result column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name as the engine reports it (alias if one was given).
    pub name: String,
    /// Declared type of the source column, when the column maps to a table column.
    #[serde(rename = "type")]
    pub decl_type: Option<String>,
}

/// Bookkeeping returned by a side-effect execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunOutcome {
    pub changes: u64,
    pub last_insert_rowid: i64,
}

/// Cancels in-flight work on the connection it was taken from.
pub trait Interrupt {
    fn interrupt(&self);
}

/// One native connection.
pub trait Engine {
    type Statement<'c>: EngineStatement
    where
        Self: 'c;

    /// Handle that can interrupt this connection from another thread.
    type InterruptHandle: Interrupt + Send + Sync + 'static;

    /// Compile one statement.
    ///
    /// # Errors
    /// Returns the engine's failure when the SQL cannot be prepared.
    fn prepare<'c>(&'c self, sql: &str) -> EngineResult<Self::Statement<'c>>;

    /// Run one or more statements without binding or result capture.
    ///
    /// # Errors
    /// Returns the engine's failure for the first statement that fails.
    fn exec(&self, sql: &str) -> EngineResult<()>;

    /// Live transaction status of the connection.
    fn in_transaction(&self) -> bool;

    fn interrupt_handle(&self) -> Self::InterruptHandle;

    /// Release the connection.
    ///
    /// # Errors
    /// Returns the engine's failure if the connection could not be closed cleanly.
    fn close(self) -> EngineResult<()>
    where
        Self: Sized;
}

/// One prepared statement owned by an [`Engine`] connection.
pub trait EngineStatement {
    type Rows<'s>: EngineRows
    where
        Self: 's;

    fn columns(&self) -> Vec<ColumnDescriptor>;

    /// Execute to completion, discarding any rows.
    ///
    /// # Errors
    /// Returns binding or execution failures.
    fn run(&mut self, params: &Params) -> EngineResult<RunOutcome>;

    /// Start a lazy row cursor.
    ///
    /// # Errors
    /// Returns binding failures; execution failures surface from [`EngineRows::next_row`].
    fn query<'s>(&'s mut self, params: &Params) -> EngineResult<Self::Rows<'s>>;

    /// Cancel in-flight work. May reach every statement on the connection.
    fn interrupt(&self);
}

/// Forward-only row cursor.
pub trait EngineRows {
    /// Step to the next row, returning its values in column order.
    ///
    /// # Errors
    /// Returns the engine's failure while stepping or converting column values.
    fn next_row(&mut self) -> EngineResult<Option<Vec<Value>>>;
}
