//! Maps engine failures onto the facade's error taxonomy.
//!
//! Engines that only speak the JSON wire format raise a fault whose message is
//! `{"libsqlError":true,"message":...,"code":...,"rawCode":...}`. Those become
//! [`Error::Sqlite`]; every other fault is handed back untouched as [`Error::Engine`].

use serde::{Deserialize, Serialize};

use crate::engine::EngineError;
use crate::error::{Error, SqliteError};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePayload {
    #[serde(default)]
    libsql_error: bool,
    message: String,
    code: String,
    raw_code: i32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WirePayloadRef<'a> {
    libsql_error: bool,
    message: &'a str,
    code: &'a str,
    raw_code: i32,
}

/// Parse a wire payload out of an error message.
///
/// Returns `None` when the message is not JSON, lacks any required field, or does not
/// carry `libsqlError: true`.
#[must_use]
pub fn parse_wire_message(message: &str) -> Option<SqliteError> {
    let payload: WirePayload = serde_json::from_str(message).ok()?;
    if !payload.libsql_error {
        return None;
    }
    Some(SqliteError {
        message: payload.message,
        code: payload.code,
        raw_code: payload.raw_code,
    })
}

impl SqliteError {
    /// Encode this error in the JSON wire format.
    #[must_use]
    pub fn to_wire_message(&self) -> String {
        let payload = WirePayloadRef {
            libsql_error: true,
            message: &self.message,
            code: &self.code,
            raw_code: self.raw_code,
        };
        // Plain strings and an integer; serialization cannot fail.
        serde_json::to_string(&payload).unwrap_or_default()
    }
}

/// Resolve an engine failure into the error callers see.
#[must_use]
pub fn normalize(err: EngineError) -> Error {
    match err {
        EngineError::Structured(err) => Error::Sqlite(err),
        EngineError::Fault(fault) => match parse_wire_message(&fault.to_string()) {
            Some(err) => Error::Sqlite(err),
            None => Error::Engine(fault),
        },
    }
}
