use std::cell::Cell;
use std::fmt;

use tracing::debug;

use crate::config::{DatabaseOptions, is_memory_path};
use crate::engine::{Engine, Interrupt};
use crate::error::{Error, Result};
use crate::normalize::normalize;
use crate::results::{PragmaValue, Row};
use crate::statement::Statement;
use crate::transaction::Transaction;

#[cfg(feature = "sqlite")]
use crate::config::DatabaseOptionsBuilder;
#[cfg(feature = "sqlite")]
use crate::sqlite::SqliteEngine;

/// Options for [`Database::pragma`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PragmaOptions {
    /// Return the first column of the first row instead of every row.
    pub simple: bool,
}

impl PragmaOptions {
    #[must_use]
    pub fn simple() -> Self {
        Self { simple: true }
    }
}

/// A single connection to the engine.
///
/// Every operation is synchronous. The connection is not `Sync`; callers that share it
/// must serialize access themselves. Statements borrow the connection, so they cannot
/// outlive [`close`](Database::close).
pub struct Database<E: Engine> {
    engine: E,
    name: String,
    memory: bool,
    readonly: bool,
    default_safe_integers: Cell<bool>,
}

impl<E: Engine> Database<E> {
    /// Wrap an already-open engine connection.
    #[must_use]
    pub fn from_engine(engine: E, options: &DatabaseOptions) -> Self {
        Self {
            engine,
            name: options.path.clone(),
            memory: is_memory_path(&options.path),
            readonly: options.readonly,
            default_safe_integers: Cell::new(options.default_safe_integers),
        }
    }

    /// Compile `sql` into a [`Statement`].
    ///
    /// The statement starts with raw and pluck off and inherits the connection's current
    /// default-safe-integers setting.
    ///
    /// # Errors
    /// Returns the normalized engine error if the SQL cannot be prepared.
    pub fn prepare(&self, sql: &str) -> Result<Statement<'_, E>> {
        let inner = self.engine.prepare(sql).map_err(normalize)?;
        Ok(Statement::new(
            self,
            inner,
            sql,
            self.default_safe_integers.get(),
        ))
    }

    /// Execute one or more statements without parameters or results.
    ///
    /// # Errors
    /// Returns the normalized engine error for the first failing statement.
    pub fn exec(&self, sql: &str) -> Result<()> {
        self.engine.exec(sql).map_err(normalize)
    }

    /// Run `PRAGMA <source>`.
    ///
    /// With `options.simple` the first column of the first row comes back as a scalar;
    /// otherwise every row is returned. A pragma that produces no result columns (most
    /// setters) is executed and yields `Scalar(None)` or an empty row list.
    ///
    /// # Errors
    /// Returns `Error::InvalidArgument` for an empty source, or the normalized engine error.
    pub fn pragma(&self, source: &str, options: PragmaOptions) -> Result<PragmaValue> {
        if source.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "pragma source must not be empty".into(),
            ));
        }
        let mut stmt = self.prepare(&format!("PRAGMA {source}"))?;
        if !stmt.reader() {
            stmt.run(())?;
            return Ok(if options.simple {
                PragmaValue::Scalar(None)
            } else {
                PragmaValue::Rows(Vec::new())
            });
        }
        if options.simple {
            let row = stmt.pluck(true)?.get(())?;
            Ok(PragmaValue::Scalar(row.and_then(|row| match row {
                Row::Plucked(value) => Some(value),
                other => other.into_values().into_iter().next(),
            })))
        } else {
            Ok(PragmaValue::Rows(stmt.all(())?))
        }
    }

    /// Wrap `body` so each call runs inside a transaction.
    ///
    /// ```rust
    /// # #[cfg(feature = "sqlite")]
    /// # fn main() -> Result<(), sql_facade::Error> {
    /// use sql_facade::{Database, Error};
    ///
    /// let db = Database::open_in_memory()?;
    /// db.exec("CREATE TABLE t (x INTEGER)")?;
    /// let insert_many = db.transaction(|xs: Vec<i64>| -> Result<usize, Error> {
    ///     let mut stmt = db.prepare("INSERT INTO t VALUES (?)")?;
    ///     for x in &xs {
    ///         stmt.run([*x])?;
    ///     }
    ///     Ok(xs.len())
    /// });
    /// assert_eq!(insert_many.immediate().call(vec![1, 2, 3])?, 3);
    /// # Ok(())
    /// # }
    /// # #[cfg(not(feature = "sqlite"))]
    /// # fn main() {}
    /// ```
    pub fn transaction<F>(&self, body: F) -> Transaction<'_, E, F> {
        Transaction::new(self, body)
    }

    /// Set the safe-integers default for statements prepared from now on.
    /// Existing statements keep their own setting.
    pub fn default_safe_integers(&self, enable: bool) -> &Self {
        self.default_safe_integers.set(enable);
        self
    }

    /// Live transaction status, read from the engine on every call.
    #[must_use]
    pub fn in_transaction(&self) -> bool {
        self.engine.in_transaction()
    }

    /// Ask the engine to abort whatever is currently executing on this connection.
    pub fn interrupt(&self) {
        self.engine.interrupt_handle().interrupt();
    }

    /// Handle that can interrupt this connection from another thread.
    #[must_use]
    pub fn interrupt_handle(&self) -> E::InterruptHandle {
        self.engine.interrupt_handle()
    }

    /// Close the connection and release engine resources.
    ///
    /// Statements borrow the connection, so none can be used afterwards:
    ///
    /// ```compile_fail
    /// let db = sql_facade::Database::open_in_memory().unwrap();
    /// let mut stmt = db.prepare("SELECT 1").unwrap();
    /// db.close().unwrap();
    /// stmt.get(()).unwrap();
    /// ```
    ///
    /// # Errors
    /// Returns the normalized engine error if the connection cannot be closed cleanly.
    pub fn close(self) -> Result<()> {
        debug!(db = %self.name, "closing database");
        self.engine.close().map_err(normalize)
    }

    /// Whether the connection is backed by an in-memory database.
    #[must_use]
    pub fn memory(&self) -> bool {
        self.memory
    }

    /// Path the connection was opened with.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn readonly(&self) -> bool {
        self.readonly
    }

    /// Borrow the underlying engine connection.
    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }
}

#[cfg(feature = "sqlite")]
impl Database<SqliteEngine> {
    /// Open (or create) a `SQLite` database at `path` with default options.
    ///
    /// # Errors
    /// See [`open_with`](Self::open_with).
    pub fn open(path: impl Into<String>) -> Result<Self> {
        Self::open_with(DatabaseOptions::new(path))
    }

    /// Open a private in-memory `SQLite` database.
    ///
    /// # Errors
    /// Returns the normalized engine error if the engine cannot allocate the database.
    pub fn open_in_memory() -> Result<Self> {
        Self::open(":memory:")
    }

    #[must_use]
    pub fn builder(path: impl Into<String>) -> DatabaseOptionsBuilder {
        DatabaseOptionsBuilder::new(path)
    }

    /// Open a `SQLite` database described by `options`.
    ///
    /// # Errors
    /// Returns `Error::Unimplemented` for remote (`libsql://`, `http(s)://`) paths and the
    /// normalized engine error when the file cannot be opened or configured.
    pub fn open_with(options: DatabaseOptions) -> Result<Self> {
        if options.is_remote() {
            return Err(Error::Unimplemented(format!(
                "remote databases are not supported: {}",
                options.path
            )));
        }
        let engine = SqliteEngine::open(&options).map_err(normalize)?;
        debug!(db = %options.path, memory = options.is_memory(), "opened database");
        Ok(Self::from_engine(engine, &options))
    }
}

impl<E: Engine> fmt::Debug for Database<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("name", &self.name)
            .field("memory", &self.memory)
            .field("readonly", &self.readonly)
            .field("default_safe_integers", &self.default_safe_integers.get())
            .field("in_transaction", &self.in_transaction())
            .finish()
    }
}
