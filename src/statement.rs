use std::fmt;
use std::iter::FusedIterator;
use std::sync::Arc;
use std::time::Instant;

use crate::database::Database;
use crate::engine::{ColumnDescriptor, Engine, EngineRows, EngineStatement};
use crate::error::{Error, Result};
use crate::normalize::normalize;
use crate::results::{ColumnNames, ExecutionInfo, NamedRow, QueryMetadata, Row};
use crate::types::{Params, Value};

/// Per-statement output modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct StatementMode {
    raw: bool,
    pluck: bool,
    safe_integers: bool,
}

/// Turns engine values into rows. Every execution verb goes through this.
#[derive(Debug, Clone)]
struct RowShape {
    mode: StatementMode,
    columns: Arc<ColumnNames>,
}

impl RowShape {
    fn apply(&self, values: Vec<Value>) -> Row {
        let values: Vec<Value> = if self.mode.safe_integers {
            values
        } else {
            values
                .into_iter()
                .map(Value::into_unsafe_integer)
                .collect()
        };
        if self.mode.pluck {
            Row::Plucked(values.into_iter().next().unwrap_or(Value::Null))
        } else if self.mode.raw {
            Row::Raw(values)
        } else {
            Row::Named(NamedRow::new(Arc::clone(&self.columns), values))
        }
    }
}

/// A prepared statement bound to the [`Database`] that created it.
///
/// Output modes (raw, pluck, safe integers) belong to this handle alone; changing them
/// never affects another statement prepared from the same connection.
pub struct Statement<'db, E: Engine + 'db> {
    db: &'db Database<E>,
    inner: E::Statement<'db>,
    source: String,
    columns: Arc<ColumnNames>,
    mode: StatementMode,
}

impl<'db, E: Engine + 'db> Statement<'db, E> {
    pub(crate) fn new(
        db: &'db Database<E>,
        inner: E::Statement<'db>,
        source: &str,
        safe_integers: bool,
    ) -> Self {
        let names = inner.columns().into_iter().map(|c| c.name).collect();
        Self {
            db,
            inner,
            source: source.to_owned(),
            columns: Arc::new(ColumnNames::new(names)),
            mode: StatementMode {
                safe_integers,
                ..StatementMode::default()
            },
        }
    }

    fn shape(&self) -> RowShape {
        RowShape {
            mode: self.mode,
            columns: Arc::clone(&self.columns),
        }
    }

    fn ensure_reader(&self, method: &str) -> Result<()> {
        if self.reader() {
            Ok(())
        } else {
            Err(Error::InvalidArgument(format!(
                "The {method}() method is only for statements that return data"
            )))
        }
    }

    /// Execute for side effects, discarding any rows.
    ///
    /// # Errors
    /// Returns the normalized engine error if binding or execution fails.
    pub fn run(&mut self, params: impl Into<Params>) -> Result<ExecutionInfo> {
        let params = params.into();
        let start = Instant::now();
        let outcome = self.inner.run(&params).map_err(normalize)?;
        Ok(ExecutionInfo {
            changes: outcome.changes,
            last_insert_rowid: outcome.last_insert_rowid,
            duration: start.elapsed(),
        })
    }

    /// First row of the result, or `None` when the statement produced no rows.
    ///
    /// # Errors
    /// Returns the normalized engine error if binding or execution fails.
    pub fn get(&mut self, params: impl Into<Params>) -> Result<Option<Row>> {
        self.get_with_metadata(params).map(|(row, _)| row)
    }

    /// Like [`get`](Self::get), with the call's timing alongside the row.
    ///
    /// # Errors
    /// Returns the normalized engine error if binding or execution fails.
    pub fn get_with_metadata(
        &mut self,
        params: impl Into<Params>,
    ) -> Result<(Option<Row>, QueryMetadata)> {
        let params = params.into();
        let shape = self.shape();
        let start = Instant::now();
        let first = {
            let mut rows = self.inner.query(&params).map_err(normalize)?;
            rows.next_row().map_err(normalize)?
        };
        let metadata = QueryMetadata {
            duration: start.elapsed(),
        };
        Ok((first.map(|values| shape.apply(values)), metadata))
    }

    /// Every result row, materialized.
    ///
    /// # Errors
    /// Returns the normalized engine error from binding or from any step.
    pub fn all(&mut self, params: impl Into<Params>) -> Result<Vec<Row>> {
        self.iterate(params)?.collect()
    }

    /// Lazily step through the result. Dropping the iterator resets the statement.
    ///
    /// # Errors
    /// Returns the normalized engine error if binding fails; step failures are
    /// yielded by the iterator, after which it ends.
    pub fn iterate(
        &mut self,
        params: impl Into<Params>,
    ) -> Result<RowIter<'_, E::Statement<'db>>> {
        let params = params.into();
        let shape = self.shape();
        let rows = self.inner.query(&params).map_err(normalize)?;
        Ok(RowIter {
            rows,
            shape,
            done: false,
        })
    }

    /// Return rows as positional value lists. Enabling raw mode turns pluck mode off.
    ///
    /// # Errors
    /// Returns `Error::InvalidArgument` if the statement returns no columns.
    pub fn raw(&mut self, enable: bool) -> Result<&mut Self> {
        self.ensure_reader("raw")?;
        self.mode.raw = enable;
        if enable {
            self.mode.pluck = false;
        }
        Ok(self)
    }

    /// Return only the first column of each row. Enabling pluck mode turns raw mode off.
    ///
    /// # Errors
    /// Returns `Error::InvalidArgument` if the statement returns no columns.
    pub fn pluck(&mut self, enable: bool) -> Result<&mut Self> {
        self.ensure_reader("pluck")?;
        self.mode.pluck = enable;
        if enable {
            self.mode.raw = false;
        }
        Ok(self)
    }

    /// Keep every integer column as `Value::Integer`. When off, integers beyond
    /// `±MAX_SAFE_INTEGER` come back as `Value::Real`.
    pub fn safe_integers(&mut self, enable: bool) -> &mut Self {
        self.mode.safe_integers = enable;
        self
    }

    /// Result column metadata; does not execute the statement.
    #[must_use]
    pub fn columns(&self) -> Vec<ColumnDescriptor> {
        self.inner.columns()
    }

    /// Ask the engine to abort in-flight execution.
    ///
    /// Engines without per-statement cancellation interrupt the whole connection; on
    /// `SQLite` every statement running on the same [`Database`] is aborted.
    pub fn interrupt(&self) -> &Self {
        self.inner.interrupt();
        self
    }

    /// SQL text the statement was prepared from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the statement returns result columns.
    #[must_use]
    pub fn reader(&self) -> bool {
        !self.columns.is_empty()
    }

    #[must_use]
    pub fn database(&self) -> &'db Database<E> {
        self.db
    }

    #[must_use]
    pub fn is_raw(&self) -> bool {
        self.mode.raw
    }

    #[must_use]
    pub fn is_pluck(&self) -> bool {
        self.mode.pluck
    }

    #[must_use]
    pub fn is_safe_integers(&self) -> bool {
        self.mode.safe_integers
    }
}

impl<'db, E: Engine + 'db> fmt::Debug for Statement<'db, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Statement")
            .field("source", &self.source)
            .field("raw", &self.mode.raw)
            .field("pluck", &self.mode.pluck)
            .field("safe_integers", &self.mode.safe_integers)
            .finish_non_exhaustive()
    }
}

/// Lazy row sequence returned by [`Statement::iterate`]. Single pass.
pub struct RowIter<'s, S: EngineStatement + 's> {
    rows: S::Rows<'s>,
    shape: RowShape,
    done: bool,
}

impl<'s, S: EngineStatement + 's> Iterator for RowIter<'s, S> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.rows.next_row() {
            Ok(Some(values)) => Some(Ok(self.shape.apply(values))),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(normalize(err)))
            }
        }
    }
}

impl<'s, S: EngineStatement + 's> FusedIterator for RowIter<'s, S> {}
