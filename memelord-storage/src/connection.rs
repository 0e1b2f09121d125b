//! Connect-per-operation discipline (spec §5, §9 "No shared in-process
//! connection"): every public operation opens a fresh connection, runs,
//! and closes it — never a process-global handle, because a long-lived
//! connection would serialize every other process against this one's file
//! lock.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::Rng;
use rusqlite::Connection;

use crate::error::{StorageError, StorageResult};
use crate::pragmas;

const BASE_DELAY_MS: u64 = 50;
const MAX_ATTEMPTS: u32 = 10;

/// Holds only the path to the database file — no connection, no pool.
/// Each operation calls [`Storage::with_connection`], which opens, runs,
/// and drops a connection.
#[derive(Debug, Clone)]
pub struct Storage {
    db_path: PathBuf,
}

impl Storage {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Open a connection, run `f`, and let the connection drop (close) when
    /// this returns. The embedding function must never be called while `f`
    /// is executing (spec §5).
    pub fn with_connection<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&Connection) -> StorageResult<T>,
    {
        let conn = self.connect()?;
        f(&conn)
    }

    /// Connect with capped randomized backoff on lock contention (spec §5
    /// "Lock contention"): `baseDelay * (1 + rand) * min(attempt+1, 5)`,
    /// `baseDelay = 50ms`, up to 10 attempts. Any other error propagates
    /// immediately.
    fn connect(&self) -> StorageResult<Connection> {
        for attempt in 0..MAX_ATTEMPTS {
            match self.try_connect() {
                Ok(conn) => return Ok(conn),
                Err(e) if is_lock_error(&e) => {
                    let delay = backoff_delay(attempt);
                    tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, "connect retry after lock contention");
                    std::thread::sleep(delay);
                }
                Err(e) => return Err(e),
            }
        }
        tracing::warn!(attempts = MAX_ATTEMPTS, "giving up on locked database file");
        Err(StorageError::Locked {
            attempts: MAX_ATTEMPTS,
        })
    }

    fn try_connect(&self) -> StorageResult<Connection> {
        let conn = Connection::open(&self.db_path)?;
        pragmas::apply(&conn)?;
        Ok(conn)
    }
}

fn backoff_delay(attempt: u32) -> Duration {
    let jitter: f64 = rand::thread_rng().gen_range(0.0..1.0);
    let multiplier = (1.0 + jitter) * (attempt + 1).min(5) as f64;
    Duration::from_millis((BASE_DELAY_MS as f64 * multiplier) as u64)
}

fn is_lock_error(err: &StorageError) -> bool {
    match err {
        StorageError::Sqlite(rusqlite::Error::SqliteFailure(sqlite_err, _)) => matches!(
            sqlite_err.code,
            rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
        ),
        _ => false,
    }
}
