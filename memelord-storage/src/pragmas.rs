//! PRAGMA configuration applied to every connection at connect time.

use rusqlite::Connection;

use crate::error::StorageResult;

/// Busy timeout set on every connection, per spec §5: `busy_timeout = 5000`
/// handles contention discovered *after* connect.
pub const BUSY_TIMEOUT_MS: u32 = 5000;

/// Apply the pragmas a short-lived connection needs: WAL for concurrent
/// multi-process access, NORMAL sync, and the mandatory busy timeout.
pub fn apply(conn: &Connection) -> StorageResult<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        ",
    )?;
    conn.busy_timeout(std::time::Duration::from_millis(BUSY_TIMEOUT_MS as u64))?;
    Ok(())
}
