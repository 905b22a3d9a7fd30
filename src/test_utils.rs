//! In-crate engine double that records every call and replays scripted results.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::config::DatabaseOptions;
use crate::database::Database;
use crate::engine::{
    ColumnDescriptor, Engine, EngineError, EngineResult, EngineRows, EngineStatement, Interrupt,
    RunOutcome,
};
use crate::error::SqliteError;
use crate::types::{Params, Value};

/// Fault carrying the JSON wire payload, the way a string-only binding reports failures.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub(crate) struct WireFault(pub String);

#[derive(Debug, Clone, Default)]
struct Script {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    fail_after: Option<(usize, SqliteError)>,
}

#[derive(Debug, Default)]
pub(crate) struct RecordingEngine {
    log: RefCell<Vec<String>>,
    failures: RefCell<HashMap<String, SqliteError>>,
    scripts: RefCell<HashMap<String, Script>>,
    in_tx: Cell<bool>,
    last_rowid: Cell<i64>,
    interrupts: Arc<AtomicUsize>,
}

impl RecordingEngine {
    /// Make `prepare` and `exec` of exactly `sql` fail with `err`, sent over the wire format.
    pub(crate) fn fail_on(&self, sql: &str, err: SqliteError) {
        self.failures.borrow_mut().insert(sql.to_owned(), err);
    }

    pub(crate) fn script_rows(&self, sql: &str, columns: &[&str], rows: Vec<Vec<Value>>) {
        self.scripts.borrow_mut().insert(
            sql.to_owned(),
            Script {
                columns: columns.iter().map(|c| (*c).to_owned()).collect(),
                rows,
                fail_after: None,
            },
        );
    }

    /// Make stepping `sql` fail once `rows` rows have been produced.
    pub(crate) fn fail_step_after(&self, sql: &str, rows: usize, err: SqliteError) {
        if let Some(script) = self.scripts.borrow_mut().get_mut(sql) {
            script.fail_after = Some((rows, err));
        }
    }

    pub(crate) fn log(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    pub(crate) fn interrupts(&self) -> usize {
        self.interrupts.load(Ordering::SeqCst)
    }

    fn record(&self, entry: impl Into<String>) {
        self.log.borrow_mut().push(entry.into());
    }

    fn scripted_failure(&self, sql: &str) -> EngineResult<()> {
        match self.failures.borrow().get(sql) {
            Some(err) => Err(EngineError::fault(WireFault(err.to_wire_message()))),
            None => Ok(()),
        }
    }
}

pub(crate) fn recording_database() -> Database<RecordingEngine> {
    Database::from_engine(
        RecordingEngine::default(),
        &DatabaseOptions::new(":memory:"),
    )
}

#[derive(Debug, Clone)]
pub(crate) struct RecordingInterrupt(Arc<AtomicUsize>);

impl Interrupt for RecordingInterrupt {
    fn interrupt(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

impl Engine for RecordingEngine {
    type Statement<'c>
        = RecordingStatement<'c>
    where
        Self: 'c;
    type InterruptHandle = RecordingInterrupt;

    fn prepare<'c>(&'c self, sql: &str) -> EngineResult<Self::Statement<'c>> {
        self.record(format!("PREPARE {sql}"));
        self.scripted_failure(sql)?;
        let script = self.scripts.borrow().get(sql).cloned().unwrap_or_default();
        Ok(RecordingStatement {
            engine: self,
            sql: sql.to_owned(),
            script,
        })
    }

    fn exec(&self, sql: &str) -> EngineResult<()> {
        self.record(sql);
        self.scripted_failure(sql)?;
        if sql.starts_with("BEGIN") {
            if self.in_tx.get() {
                return Err(SqliteError::new(
                    "cannot start a transaction within a transaction",
                    "SQLITE_ERROR",
                    1,
                )
                .into());
            }
            self.in_tx.set(true);
        } else if sql == "COMMIT" || sql == "ROLLBACK" {
            if !self.in_tx.get() {
                return Err(SqliteError::new(
                    "cannot commit - no transaction is active",
                    "SQLITE_ERROR",
                    1,
                )
                .into());
            }
            self.in_tx.set(false);
        }
        Ok(())
    }

    fn in_transaction(&self) -> bool {
        self.in_tx.get()
    }

    fn interrupt_handle(&self) -> Self::InterruptHandle {
        RecordingInterrupt(Arc::clone(&self.interrupts))
    }

    fn close(self) -> EngineResult<()> {
        Ok(())
    }
}

pub(crate) struct RecordingStatement<'c> {
    engine: &'c RecordingEngine,
    sql: String,
    script: Script,
}

impl EngineStatement for RecordingStatement<'_> {
    type Rows<'s>
        = RecordingRows
    where
        Self: 's;

    fn columns(&self) -> Vec<ColumnDescriptor> {
        self.script
            .columns
            .iter()
            .map(|name| ColumnDescriptor {
                name: name.clone(),
                decl_type: None,
            })
            .collect()
    }

    fn run(&mut self, params: &Params) -> EngineResult<RunOutcome> {
        self.engine.record(format!("RUN {} {params:?}", self.sql));
        if self.script.columns.is_empty() {
            let rowid = self.engine.last_rowid.get() + 1;
            self.engine.last_rowid.set(rowid);
            Ok(RunOutcome {
                changes: 1,
                last_insert_rowid: rowid,
            })
        } else {
            Ok(RunOutcome {
                changes: 0,
                last_insert_rowid: self.engine.last_rowid.get(),
            })
        }
    }

    fn query<'s>(&'s mut self, params: &Params) -> EngineResult<Self::Rows<'s>> {
        self.engine.record(format!("QUERY {} {params:?}", self.sql));
        Ok(RecordingRows {
            rows: self.script.rows.clone().into_iter(),
            produced: 0,
            fail_after: self.script.fail_after.clone(),
        })
    }

    fn interrupt(&self) {
        self.engine.interrupt_handle().interrupt();
    }
}

pub(crate) struct RecordingRows {
    rows: std::vec::IntoIter<Vec<Value>>,
    produced: usize,
    fail_after: Option<(usize, SqliteError)>,
}

impl EngineRows for RecordingRows {
    fn next_row(&mut self) -> EngineResult<Option<Vec<Value>>> {
        if let Some((limit, err)) = &self.fail_after {
            if self.produced >= *limit {
                return Err(err.clone().into());
            }
        }
        self.produced += 1;
        Ok(self.rows.next())
    }
}
