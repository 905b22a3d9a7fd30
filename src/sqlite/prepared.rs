use crate::engine::{ColumnDescriptor, EngineResult, EngineRows, EngineStatement, RunOutcome};
use crate::types::{Params, Value};

use super::error::engine_error;
use super::params::bind_params;
use super::query::extract_row;

/// Prepared `SQLite` statement borrowed from a [`SqliteEngine`](super::SqliteEngine).
pub struct SqliteStatement<'c> {
    conn: &'c rusqlite::Connection,
    stmt: rusqlite::Statement<'c>,
}

impl<'c> SqliteStatement<'c> {
    pub(crate) fn new(conn: &'c rusqlite::Connection, stmt: rusqlite::Statement<'c>) -> Self {
        Self { conn, stmt }
    }
}

impl<'c> EngineStatement for SqliteStatement<'c> {
    type Rows<'s>
        = SqliteRows<'s>
    where
        Self: 's;

    fn columns(&self) -> Vec<ColumnDescriptor> {
        self.stmt
            .columns()
            .iter()
            .map(|column| ColumnDescriptor {
                name: column.name().to_owned(),
                decl_type: column.decl_type().map(str::to_owned),
            })
            .collect()
    }

    fn run(&mut self, params: &Params) -> EngineResult<RunOutcome> {
        let total_before = self.conn.total_changes();
        bind_params(&mut self.stmt, params).map_err(engine_error)?;
        {
            let mut rows = self.stmt.raw_query();
            while rows.next().map_err(engine_error)?.is_some() {}
        }
        // changes() is stale when this statement modified nothing.
        let changes = if self.conn.total_changes() == total_before {
            0
        } else {
            self.conn.changes()
        };
        Ok(RunOutcome {
            changes,
            last_insert_rowid: self.conn.last_insert_rowid(),
        })
    }

    fn query<'s>(&'s mut self, params: &Params) -> EngineResult<Self::Rows<'s>> {
        bind_params(&mut self.stmt, params).map_err(engine_error)?;
        let column_count = self.stmt.column_count();
        Ok(SqliteRows {
            rows: self.stmt.raw_query(),
            column_count,
        })
    }

    // sqlite3_interrupt is connection-wide
    fn interrupt(&self) {
        self.conn.get_interrupt_handle().interrupt();
    }
}

/// Lazy cursor over a running `SQLite` statement. Dropping it resets the statement.
pub struct SqliteRows<'s> {
    rows: rusqlite::Rows<'s>,
    column_count: usize,
}

impl EngineRows for SqliteRows<'_> {
    fn next_row(&mut self) -> EngineResult<Option<Vec<Value>>> {
        let column_count = self.column_count;
        match self.rows.next().map_err(engine_error)? {
            Some(row) => extract_row(row, column_count).map(Some).map_err(engine_error),
            None => Ok(None),
        }
    }
}
