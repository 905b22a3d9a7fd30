use std::fmt;

use tracing::{debug, warn};

use crate::database::Database;
use crate::engine::Engine;
use crate::error::{BoxError, Error};

/// Locking behavior requested by `BEGIN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransactionMode {
    /// Plain `BEGIN`; the engine's default (deferred for `SQLite`).
    #[default]
    Default,
    Deferred,
    Immediate,
    Exclusive,
}

impl TransactionMode {
    #[must_use]
    pub const fn begin_sql(self) -> &'static str {
        match self {
            Self::Default => "BEGIN",
            Self::Deferred => "BEGIN DEFERRED",
            Self::Immediate => "BEGIN IMMEDIATE",
            Self::Exclusive => "BEGIN EXCLUSIVE",
        }
    }
}

/// A function wrapped so that each call runs inside its own transaction.
///
/// Created by [`Database::transaction`]. Calling it (directly, or through one of the
/// mode variants) issues exactly one `BEGIN`, runs the body, then exactly one `COMMIT`
/// if the body returned `Ok`, or one `ROLLBACK` if it returned `Err`.
///
/// Nesting is not handled here: calling a transaction function from inside another one
/// sends a second `BEGIN`, which the engine rejects.
pub struct Transaction<'db, E: Engine, F> {
    db: &'db Database<E>,
    body: F,
}

impl<'db, E: Engine, F> Transaction<'db, E, F> {
    pub(crate) fn new(db: &'db Database<E>, body: F) -> Self {
        Self { db, body }
    }

    /// The connection this transaction function runs on.
    #[must_use]
    pub fn connection(&self) -> &'db Database<E> {
        self.db
    }

    #[must_use]
    pub fn variant(&self, mode: TransactionMode) -> TransactionVariant<'_, 'db, E, F> {
        TransactionVariant { owner: self, mode }
    }

    #[must_use]
    pub fn default(&self) -> TransactionVariant<'_, 'db, E, F> {
        self.variant(TransactionMode::Default)
    }

    #[must_use]
    pub fn deferred(&self) -> TransactionVariant<'_, 'db, E, F> {
        self.variant(TransactionMode::Deferred)
    }

    #[must_use]
    pub fn immediate(&self) -> TransactionVariant<'_, 'db, E, F> {
        self.variant(TransactionMode::Immediate)
    }

    #[must_use]
    pub fn exclusive(&self) -> TransactionVariant<'_, 'db, E, F> {
        self.variant(TransactionMode::Exclusive)
    }

    /// Run the body in a plain `BEGIN` transaction.
    ///
    /// # Errors
    /// See [`TransactionVariant::call`].
    pub fn call<A, T, Fail>(&self, args: A) -> Result<T, Fail>
    where
        F: Fn(A) -> Result<T, Fail>,
        Fail: From<Error> + Into<BoxError>,
    {
        self.default().call(args)
    }
}

impl<E: Engine, F> fmt::Debug for Transaction<'_, E, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("connection", &self.db.name())
            .finish_non_exhaustive()
    }
}

/// One mode of a [`Transaction`]. Every variant can reach its siblings and the connection.
pub struct TransactionVariant<'t, 'db, E: Engine, F> {
    owner: &'t Transaction<'db, E, F>,
    mode: TransactionMode,
}

impl<E: Engine, F> Clone for TransactionVariant<'_, '_, E, F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E: Engine, F> Copy for TransactionVariant<'_, '_, E, F> {}

impl<'t, 'db, E: Engine, F> TransactionVariant<'t, 'db, E, F> {
    #[must_use]
    pub fn mode(&self) -> TransactionMode {
        self.mode
    }

    #[must_use]
    pub fn connection(&self) -> &'db Database<E> {
        self.owner.db
    }

    #[must_use]
    pub fn default(&self) -> TransactionVariant<'t, 'db, E, F> {
        self.owner.variant(TransactionMode::Default)
    }

    #[must_use]
    pub fn deferred(&self) -> TransactionVariant<'t, 'db, E, F> {
        self.owner.variant(TransactionMode::Deferred)
    }

    #[must_use]
    pub fn immediate(&self) -> TransactionVariant<'t, 'db, E, F> {
        self.owner.variant(TransactionMode::Immediate)
    }

    #[must_use]
    pub fn exclusive(&self) -> TransactionVariant<'t, 'db, E, F> {
        self.owner.variant(TransactionMode::Exclusive)
    }

    /// Run the body with `args` between `BEGIN <mode>` and `COMMIT`/`ROLLBACK`.
    ///
    /// # Errors
    /// - a failed `BEGIN` is returned and the body never runs;
    /// - a body error is returned unchanged after a successful `ROLLBACK`;
    /// - a failed `COMMIT` is returned as is;
    /// - if `ROLLBACK` itself fails, `Error::RollbackFailed` carries both errors.
    ///
    /// A body that panics is rolled back while the panic unwinds.
    pub fn call<A, T, Fail>(&self, args: A) -> Result<T, Fail>
    where
        F: Fn(A) -> Result<T, Fail>,
        Fail: From<Error> + Into<BoxError>,
    {
        let db = self.owner.db;
        db.exec(self.mode.begin_sql())?;
        debug!(mode = ?self.mode, db = db.name(), "transaction begun");
        let guard = RollbackOnUnwind { db, armed: true };

        let outcome = (self.owner.body)(args);
        guard.disarm();
        match outcome {
            Ok(value) => {
                db.exec("COMMIT")?;
                debug!(db = db.name(), "transaction committed");
                Ok(value)
            }
            Err(err) => match db.exec("ROLLBACK") {
                Ok(()) => {
                    debug!(db = db.name(), "transaction rolled back");
                    Err(err)
                }
                Err(rollback) => {
                    warn!(db = db.name(), error = %rollback, "rollback failed after transaction body error");
                    Err(Fail::from(Error::RollbackFailed {
                        rollback: Box::new(rollback),
                        source: err.into(),
                    }))
                }
            },
        }
    }
}

/// Sends `ROLLBACK` when dropped while armed, i.e. when the body unwinds.
struct RollbackOnUnwind<'db, E: Engine> {
    db: &'db Database<E>,
    armed: bool,
}

impl<E: Engine> RollbackOnUnwind<'_, E> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<E: Engine> Drop for RollbackOnUnwind<'_, E> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match self.db.exec("ROLLBACK") {
            Ok(()) => debug!(db = self.db.name(), "transaction rolled back after body panicked"),
            Err(err) => {
                warn!(db = self.db.name(), error = %err, "rollback failed after body panicked");
            }
        }
    }
}

impl<E: Engine, F> fmt::Debug for TransactionVariant<'_, '_, E, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionVariant")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::panic::{self, AssertUnwindSafe};

    use super::*;
    use crate::error::SqliteError;
    use crate::test_utils::recording_database;

    #[derive(Debug, thiserror::Error)]
    enum BodyError {
        #[error("boom {0}")]
        Boom(u32),
        #[error(transparent)]
        Db(#[from] Error),
    }

    fn tx_log(log: Vec<String>) -> Vec<String> {
        log.into_iter()
            .filter(|entry| {
                entry.starts_with("BEGIN") || entry == "COMMIT" || entry == "ROLLBACK"
            })
            .collect()
    }

    #[test]
    fn commit_path_issues_begin_then_commit() {
        let db = recording_database();
        let tx = db.transaction(|(a, b): (i64, i64)| -> Result<i64, Error> { Ok(a + b) });
        assert_eq!(tx.call((2, 3)).unwrap(), 5);
        assert_eq!(tx_log(db.engine().log()), vec!["BEGIN", "COMMIT"]);
        assert!(!db.in_transaction());
    }

    #[test]
    fn body_error_rolls_back_and_is_returned_unchanged() {
        let db = recording_database();
        let tx = db.transaction(|()| -> Result<(), BodyError> {
            db.exec("INSERT INTO users VALUES (3)")?;
            Err(BodyError::Boom(7))
        });
        let err = tx.call(()).unwrap_err();
        assert!(matches!(err, BodyError::Boom(7)));
        assert_eq!(
            db.engine().log(),
            vec!["BEGIN", "INSERT INTO users VALUES (3)", "ROLLBACK"]
        );
    }

    #[test]
    fn failed_begin_never_runs_the_body() {
        let db = recording_database();
        db.engine().fail_on(
            "BEGIN IMMEDIATE",
            SqliteError::new("database is locked", "SQLITE_BUSY", 5),
        );
        let ran = Cell::new(false);
        let tx = db.transaction(|()| -> Result<(), Error> {
            ran.set(true);
            Ok(())
        });
        let err = tx.immediate().call(()).unwrap_err();
        assert_eq!(err.code(), Some("SQLITE_BUSY"));
        assert!(!ran.get());
        assert_eq!(tx_log(db.engine().log()), vec!["BEGIN IMMEDIATE"]);
    }

    #[test]
    fn failed_rollback_keeps_both_errors() {
        let db = recording_database();
        db.engine().fail_on(
            "ROLLBACK",
            SqliteError::new("disk I/O error", "SQLITE_IOERR", 10),
        );
        let tx = db.transaction(|()| -> Result<(), Error> {
            Err(Error::InvalidArgument("bad input".into()))
        });
        match tx.call(()).unwrap_err() {
            Error::RollbackFailed { rollback, source } => {
                assert_eq!(rollback.code(), Some("SQLITE_IOERR"));
                let original = source.downcast_ref::<Error>().expect("original body error");
                assert!(matches!(original, Error::InvalidArgument(msg) if msg == "bad input"));
            }
            other => panic!("expected RollbackFailed, got {other:?}"),
        }
    }

    #[test]
    fn failed_commit_is_returned() {
        let db = recording_database();
        db.engine().fail_on(
            "COMMIT",
            SqliteError::new("database is locked", "SQLITE_BUSY", 5),
        );
        let tx = db.transaction(|()| -> Result<u8, Error> { Ok(1) });
        assert_eq!(tx.call(()).unwrap_err().raw_code(), Some(5));
    }

    #[test]
    fn every_variant_issues_its_own_begin() {
        let db = recording_database();
        let tx = db.transaction(|()| -> Result<(), Error> { Ok(()) });
        tx.default().call(()).unwrap();
        tx.deferred().call(()).unwrap();
        tx.immediate().call(()).unwrap();
        tx.exclusive().call(()).unwrap();
        assert_eq!(
            tx_log(db.engine().log()),
            vec![
                "BEGIN",
                "COMMIT",
                "BEGIN DEFERRED",
                "COMMIT",
                "BEGIN IMMEDIATE",
                "COMMIT",
                "BEGIN EXCLUSIVE",
                "COMMIT",
            ]
        );
    }

    #[test]
    fn variants_reach_each_other_and_the_connection() {
        let db = recording_database();
        let tx = db.transaction(|()| -> Result<(), Error> { Ok(()) });
        let hop = tx.immediate().exclusive().deferred().default().immediate();
        assert_eq!(hop.mode(), TransactionMode::Immediate);
        assert!(std::ptr::eq(hop.connection(), &db));
        assert!(std::ptr::eq(tx.exclusive().connection(), tx.connection()));
    }

    #[test]
    fn nested_call_is_rejected_by_the_engine() {
        let db = recording_database();
        let inner = db.transaction(|()| -> Result<(), Error> { Ok(()) });
        let outer = db.transaction(|()| -> Result<(), Error> {
            assert!(db.in_transaction());
            inner.call(())
        });
        let err = outer.call(()).unwrap_err();
        assert_eq!(err.code(), Some("SQLITE_ERROR"));
        assert_eq!(tx_log(db.engine().log()), vec!["BEGIN", "BEGIN", "ROLLBACK"]);
        assert!(!db.in_transaction());
    }

    #[test]
    fn panicking_body_is_rolled_back() {
        let db = recording_database();
        let tx = db.transaction(|()| -> Result<(), Error> {
            db.exec("INSERT INTO users VALUES (4)")?;
            panic!("body blew up");
        });
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| tx.call(())));
        assert!(outcome.is_err());
        assert!(!db.in_transaction());
        assert_eq!(
            db.engine().log(),
            vec!["BEGIN", "INSERT INTO users VALUES (4)", "ROLLBACK"]
        );

        let next = db.transaction(|()| -> Result<u8, Error> { Ok(1) });
        assert_eq!(next.call(()).unwrap(), 1);
    }
}
