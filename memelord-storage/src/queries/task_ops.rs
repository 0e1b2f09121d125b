//! Queries over the `tasks` table.

use rusqlite::{params, Connection, OptionalExtension, Row};

use memelord_core::task::{Task, TaskOutcome};
use memelord_core::vector;

use crate::error::StorageResult;

pub fn insert_task(conn: &Connection, task: &Task) -> StorageResult<()> {
    let embedding_blob = task.description_embedding.as_ref().map(|v| vector::encode(v));
    conn.execute(
        "INSERT INTO tasks (
            id, description, description_embedding, tokens_used, tool_calls,
            errors, user_corrections, completed, task_score, started_at, finished_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            task.id,
            task.description,
            embedding_blob,
            task.tokens_used,
            task.tool_calls,
            task.errors,
            task.user_corrections,
            task.completed,
            task.task_score,
            task.started_at,
            task.finished_at,
        ],
    )?;
    Ok(())
}

/// Close out a task with its final outcome counters and computed score
/// (spec §4.3 `endTask`).
pub fn finish_task(
    conn: &Connection,
    task_id: &str,
    outcome: &TaskOutcome,
    task_score: f64,
    finished_at: i64,
) -> StorageResult<()> {
    conn.execute(
        "UPDATE tasks SET
            tokens_used = ?1, tool_calls = ?2, errors = ?3, user_corrections = ?4,
            completed = ?5, task_score = ?6, finished_at = ?7
         WHERE id = ?8",
        params![
            outcome.tokens_used,
            outcome.tool_calls,
            outcome.errors,
            outcome.user_corrections,
            outcome.completed,
            task_score,
            finished_at,
            task_id,
        ],
    )?;
    Ok(())
}

fn task_from_row(row: &Row, dimensions: usize) -> rusqlite::Result<StorageResult<Task>> {
    let embedding_blob: Option<Vec<u8>> = row.get("description_embedding")?;
    let description_embedding = match embedding_blob {
        None => None,
        Some(bytes) if bytes.is_empty() => None,
        Some(bytes) => match vector::decode(&bytes, dimensions) {
            Ok(v) => Some(v),
            Err(e) => return Ok(Err(e.into())),
        },
    };

    Ok(Ok(Task {
        id: row.get("id")?,
        description: row.get("description")?,
        description_embedding,
        tokens_used: row.get("tokens_used")?,
        tool_calls: row.get("tool_calls")?,
        errors: row.get("errors")?,
        user_corrections: row.get("user_corrections")?,
        completed: row.get("completed")?,
        task_score: row.get("task_score")?,
        started_at: row.get("started_at")?,
        finished_at: row.get("finished_at")?,
    }))
}

/// Average `tokens_used` over finished tasks, used to scale a correction's
/// initial weight (spec §4.2 "Initial weight"). `None` if no task has
/// finished yet.
pub fn avg_tokens_used(conn: &Connection) -> StorageResult<Option<f64>> {
    Ok(conn.query_row(
        "SELECT AVG(tokens_used) FROM tasks WHERE finished_at IS NOT NULL",
        [],
        |r| r.get(0),
    )?)
}

pub fn count_tasks(conn: &Connection) -> StorageResult<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM tasks", [], |r| r.get(0))?)
}

/// Average `task_score` over finished tasks, for `getStats` (spec §4.3).
/// `None` if no task has finished yet.
pub fn avg_task_score(conn: &Connection) -> StorageResult<Option<f64>> {
    Ok(conn.query_row(
        "SELECT AVG(task_score) FROM tasks WHERE finished_at IS NOT NULL",
        [],
        |r| r.get(0),
    )?)
}

pub fn get_task(
    conn: &Connection,
    task_id: &str,
    dimensions: usize,
) -> StorageResult<Option<Task>> {
    conn.query_row("SELECT * FROM tasks WHERE id = ?1", [task_id], |row| {
        task_from_row(row, dimensions)
    })
    .optional()?
    .transpose()
}
