//! Queries over `memory_retrievals`, the join table recording which
//! memories a task pulled and how they were credited (spec §3
//! "MemoryRetrieval").

use rusqlite::{params, Connection};

use memelord_core::retrieval::MemoryRetrieval;

use crate::error::StorageResult;

/// Record that `memory_id` was surfaced to `task_id` with the given
/// similarity. Idempotent on the `(memory_id, task_id)` primary key: a
/// memory retrieved twice in the same task keeps its first-seen similarity
/// (spec §4.4, "one row per task per memory").
pub fn record_retrieval(
    conn: &Connection,
    memory_id: &str,
    task_id: &str,
    similarity: f64,
) -> StorageResult<()> {
    conn.execute(
        "INSERT INTO memory_retrievals (memory_id, task_id, similarity, self_report, credit)
         VALUES (?1, ?2, ?3, NULL, NULL)
         ON CONFLICT (memory_id, task_id) DO NOTHING",
        params![memory_id, task_id, similarity],
    )?;
    Ok(())
}

/// Apply a self-report rating supplied to `endTask` (spec §4.3 `endTask`).
/// No-op if the row doesn't exist (a caller reporting on a memory that was
/// never actually retrieved for this task).
pub fn set_self_report(
    conn: &Connection,
    memory_id: &str,
    task_id: &str,
    self_report: u8,
) -> StorageResult<()> {
    conn.execute(
        "UPDATE memory_retrievals SET self_report = ?1 WHERE memory_id = ?2 AND task_id = ?3",
        params![self_report, memory_id, task_id],
    )?;
    Ok(())
}

pub fn set_credit(
    conn: &Connection,
    memory_id: &str,
    task_id: &str,
    credit: f64,
) -> StorageResult<()> {
    conn.execute(
        "UPDATE memory_retrievals SET credit = ?1 WHERE memory_id = ?2 AND task_id = ?3",
        params![credit, memory_id, task_id],
    )?;
    Ok(())
}

/// All self-reported retrievals for a task, used by `endTask` to fan out
/// credit across the memories the caller rated (spec §4.2 "Credit
/// assignment").
pub fn rated_retrievals_for_task(
    conn: &Connection,
    task_id: &str,
) -> StorageResult<Vec<MemoryRetrieval>> {
    let mut stmt = conn.prepare(
        "SELECT memory_id, task_id, similarity, self_report, credit
         FROM memory_retrievals
         WHERE task_id = ?1 AND self_report IS NOT NULL
         ORDER BY memory_id ASC",
    )?;
    let rows = stmt
        .query_map([task_id], |row| {
            Ok(MemoryRetrieval {
                memory_id: row.get(0)?,
                task_id: row.get(1)?,
                similarity: row.get(2)?,
                self_report: row.get(3)?,
                credit: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn count_retrievals_for_task(conn: &Connection, task_id: &str) -> StorageResult<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM memory_retrievals WHERE task_id = ?1",
        [task_id],
        |r| r.get(0),
    )?)
}
