use std::fmt;
use std::panic::RefUnwindSafe;

use rusqlite::OpenFlags;
use rusqlite::hooks::{AuthContext, Authorization};

use crate::config::DatabaseOptions;
use crate::engine::{Engine, EngineResult, Interrupt};

use super::error::engine_error;
use super::prepared::SqliteStatement;

/// Engine connection backed by a `rusqlite::Connection`.
pub struct SqliteEngine {
    conn: rusqlite::Connection,
}

impl SqliteEngine {
    /// Open the database described by `options` and apply its busy timeout.
    ///
    /// # Errors
    /// Returns the engine error when the file cannot be opened or configured.
    pub fn open(options: &DatabaseOptions) -> EngineResult<Self> {
        let conn = rusqlite::Connection::open_with_flags(&options.path, open_flags(options))
            .map_err(engine_error)?;
        if let Some(timeout) = options.timeout {
            conn.busy_timeout(timeout).map_err(engine_error)?;
        }
        Ok(Self { conn })
    }

    /// Borrow the raw rusqlite connection.
    #[must_use]
    pub fn connection(&self) -> &rusqlite::Connection {
        &self.conn
    }

    /// Install (or with `None`, remove) an authorizer consulted while statements compile.
    ///
    /// Returning [`Authorization::Deny`] makes the prepare fail with `SQLITE_AUTH`.
    pub fn authorizer<F>(&self, hook: Option<F>)
    where
        F: for<'r> FnMut(AuthContext<'r>) -> Authorization + Send + RefUnwindSafe + 'static,
    {
        self.conn.authorizer(hook);
    }
}

fn open_flags(options: &DatabaseOptions) -> OpenFlags {
    let base = OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    if options.readonly {
        base | OpenFlags::SQLITE_OPEN_READ_ONLY
    } else if options.file_must_exist {
        base | OpenFlags::SQLITE_OPEN_READ_WRITE
    } else {
        base | OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE
    }
}

impl Interrupt for rusqlite::InterruptHandle {
    fn interrupt(&self) {
        rusqlite::InterruptHandle::interrupt(self);
    }
}

impl Engine for SqliteEngine {
    type Statement<'c>
        = SqliteStatement<'c>
    where
        Self: 'c;
    type InterruptHandle = rusqlite::InterruptHandle;

    fn prepare<'c>(&'c self, sql: &str) -> EngineResult<Self::Statement<'c>> {
        let stmt = self.conn.prepare(sql).map_err(engine_error)?;
        Ok(SqliteStatement::new(&self.conn, stmt))
    }

    fn exec(&self, sql: &str) -> EngineResult<()> {
        self.conn.execute_batch(sql).map_err(engine_error)
    }

    fn in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }

    fn interrupt_handle(&self) -> Self::InterruptHandle {
        self.conn.get_interrupt_handle()
    }

    fn close(self) -> EngineResult<()> {
        self.conn.close().map_err(|(_conn, err)| engine_error(err))
    }
}

impl fmt::Debug for SqliteEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteEngine")
            .field("conn", &self.conn)
            .finish()
    }
}
