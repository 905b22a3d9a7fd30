use rusqlite::types::Value as SqliteValue;

use crate::types::Value;

/// Extract a facade `Value` from a `SQLite` row.
pub(crate) fn extract_value(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Value> {
    let value: SqliteValue = row.get(idx)?;
    Ok(match value {
        SqliteValue::Null => Value::Null,
        SqliteValue::Integer(i) => Value::Integer(i),
        SqliteValue::Real(f) => Value::Real(f),
        SqliteValue::Text(s) => Value::Text(s),
        SqliteValue::Blob(b) => Value::Blob(b),
    })
}

/// Every column of `row`, in order.
pub(crate) fn extract_row(row: &rusqlite::Row<'_>, column_count: usize) -> rusqlite::Result<Vec<Value>> {
    (0..column_count).map(|idx| extract_value(row, idx)).collect()
}
