use std::time::Duration;

#[cfg(feature = "sqlite")]
use crate::database::Database;
#[cfg(feature = "sqlite")]
use crate::error::Result;
#[cfg(feature = "sqlite")]
use crate::sqlite::SqliteEngine;

/// Options for opening a database connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseOptions {
    /// Filesystem path, `:memory:`, or a `file:` URI.
    pub path: String,
    /// How long a statement waits on a locked database before failing with `SQLITE_BUSY`.
    pub timeout: Option<Duration>,
    pub readonly: bool,
    /// Fail instead of creating the database file when it does not exist.
    pub file_must_exist: bool,
    /// Initial value of the connection's default-safe-integers flag.
    pub default_safe_integers: bool,
}

impl DatabaseOptions {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            timeout: None,
            readonly: false,
            file_must_exist: false,
            default_safe_integers: false,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_readonly(mut self, readonly: bool) -> Self {
        self.readonly = readonly;
        self
    }

    /// Whether the path names an in-memory database.
    #[must_use]
    pub fn is_memory(&self) -> bool {
        is_memory_path(&self.path)
    }

    /// Whether the path points at a remote server rather than a local file.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        is_remote_path(&self.path)
    }
}

/// Fluent builder for [`DatabaseOptions`].
#[derive(Debug, Clone)]
pub struct DatabaseOptionsBuilder {
    opts: DatabaseOptions,
}

impl DatabaseOptionsBuilder {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            opts: DatabaseOptions::new(path),
        }
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.opts.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn readonly(mut self, readonly: bool) -> Self {
        self.opts.readonly = readonly;
        self
    }

    #[must_use]
    pub fn file_must_exist(mut self, file_must_exist: bool) -> Self {
        self.opts.file_must_exist = file_must_exist;
        self
    }

    #[must_use]
    pub fn default_safe_integers(mut self, enable: bool) -> Self {
        self.opts.default_safe_integers = enable;
        self
    }

    #[must_use]
    pub fn finish(self) -> DatabaseOptions {
        self.opts
    }

    /// Open a `SQLite`-backed [`Database`] with these options.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unimplemented` for remote paths, or the normalized engine error if
    /// the file cannot be opened.
    #[cfg(feature = "sqlite")]
    pub fn build(self) -> Result<Database<SqliteEngine>> {
        Database::open_with(self.finish())
    }
}

pub(crate) fn is_memory_path(path: &str) -> bool {
    path.is_empty()
        || path == ":memory:"
        || path.starts_with("file::memory:")
        || (path.starts_with("file:") && path.contains("mode=memory"))
}

pub(crate) fn is_remote_path(path: &str) -> bool {
    path.starts_with("libsql://") || path.starts_with("http://") || path.starts_with("https://")
}
