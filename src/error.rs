use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Boxed error type used for failures the facade does not interpret.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Structured engine failure with a stable symbolic and numeric code.
///
/// `code` is the engine's symbolic name (`"SQLITE_AUTH"`, `"SQLITE_CONSTRAINT_UNIQUE"`, ...)
/// and `raw_code` the numeric result code that goes with it.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct SqliteError {
    /// Human-readable message reported by the engine.
    pub message: String,
    /// Symbolic engine error name.
    pub code: String,
    /// Numeric engine result code.
    pub raw_code: i32,
}

impl SqliteError {
    #[must_use]
    pub fn new(message: impl Into<String>, code: impl Into<String>, raw_code: i32) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            raw_code,
        }
    }
}

/// Errors returned by the facade.
#[derive(Debug, Error)]
pub enum Error {
    /// Engine failure that carried a structured code payload.
    #[error(transparent)]
    Sqlite(#[from] SqliteError),

    /// Any other engine failure, passed through as the engine produced it.
    #[error(transparent)]
    Engine(BoxError),

    /// Rejected by the facade before any engine call was made.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unimplemented feature: {0}")]
    Unimplemented(String),

    /// `ROLLBACK` failed after the transaction body had already failed.
    ///
    /// Both errors are kept: `rollback` is the failure of the `ROLLBACK` itself and
    /// `source` is the body error that triggered it.
    #[error("rollback failed ({rollback}) after transaction body error: {source}")]
    RollbackFailed {
        rollback: Box<Error>,
        #[source]
        source: BoxError,
    },
}

impl Error {
    /// Symbolic engine code, when the error came from a structured engine failure.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Error::Sqlite(err) => Some(err.code.as_str()),
            _ => None,
        }
    }

    /// Numeric engine code, when the error came from a structured engine failure.
    #[must_use]
    pub fn raw_code(&self) -> Option<i32> {
        match self {
            Error::Sqlite(err) => Some(err.raw_code),
            _ => None,
        }
    }

    /// Borrow the structured engine error, if this is one.
    #[must_use]
    pub fn as_sqlite(&self) -> Option<&SqliteError> {
        match self {
            Error::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

/// Result alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
