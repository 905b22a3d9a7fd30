use rusqlite::types::Value as SqliteValue;

use crate::types::{Params, Value};

/// Convert a single facade `Value` to a rusqlite `Value`.
#[must_use]
pub(crate) fn to_sqlite_value(value: &Value) -> SqliteValue {
    match value {
        Value::Null => SqliteValue::Null,
        Value::Integer(i) => SqliteValue::Integer(*i),
        Value::Real(f) => SqliteValue::Real(*f),
        Value::Text(s) => SqliteValue::Text(s.clone()),
        Value::Blob(bytes) => SqliteValue::Blob(bytes.clone()),
    }
}

/// Bind every parameter slot of `stmt` for one execution.
///
/// Positional values must match the slot count exactly. Named values are looked up by
/// each slot's name; a slot without a matching value, or an anonymous `?` slot, is an
/// error. Extra named values are ignored.
pub(crate) fn bind_params(
    stmt: &mut rusqlite::Statement<'_>,
    params: &Params,
) -> rusqlite::Result<()> {
    let expected = stmt.parameter_count();
    match params {
        Params::None => {
            if expected != 0 {
                return Err(rusqlite::Error::InvalidParameterCount(0, expected));
            }
        }
        Params::Positional(values) => {
            if values.len() != expected {
                return Err(rusqlite::Error::InvalidParameterCount(
                    values.len(),
                    expected,
                ));
            }
            for (idx, value) in values.iter().enumerate() {
                stmt.raw_bind_parameter(idx + 1, to_sqlite_value(value))?;
            }
        }
        Params::Named(_) => {
            for idx in 1..=expected {
                let name = stmt
                    .parameter_name(idx)
                    .map(str::to_owned)
                    .ok_or_else(|| rusqlite::Error::InvalidParameterName(format!("?{idx}")))?;
                let value = params
                    .lookup(&name)
                    .ok_or_else(|| rusqlite::Error::InvalidParameterName(name.clone()))?;
                stmt.raw_bind_parameter(idx, to_sqlite_value(value))?;
            }
        }
    }
    Ok(())
}
