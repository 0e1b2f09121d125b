//! CRUD and maintenance queries over the `memories` table.

use rusqlite::{params, Connection, OptionalExtension, Row};

use memelord_core::memory::{Category, Memory, MemoryId};
use memelord_core::vector;

use crate::error::StorageResult;

fn memory_from_row(row: &Row, dimensions: usize) -> rusqlite::Result<StorageResult<Memory>> {
    let category_str: String = row.get("category")?;
    let category = Category::parse(&category_str).unwrap_or(Category::Insight);
    let embedding_blob: Option<Vec<u8>> = row.get("embedding")?;
    let embedding = match embedding_blob {
        None => None,
        Some(bytes) if bytes.is_empty() => None, // zero-length blob is treated as NULL (spec §8)
        Some(bytes) => match vector::decode(&bytes, dimensions) {
            Ok(v) => Some(v),
            Err(e) => return Ok(Err(e.into())),
        },
    };

    Ok(Ok(Memory {
        id: row.get("id")?,
        content: row.get("content")?,
        embedding,
        category,
        weight: row.get::<_, f64>("weight")?.into(),
        initial_cost: row.get("initial_cost")?,
        created_at: row.get("created_at")?,
        last_retrieved: row.get("last_retrieved")?,
        retrieval_count: row.get("retrieval_count")?,
        source_task: row.get("source_task")?,
    }))
}

pub fn insert_memory(conn: &Connection, memory: &Memory) -> StorageResult<()> {
    let embedding_blob = memory.embedding.as_ref().map(|v| vector::encode(v));
    conn.execute(
        "INSERT INTO memories (
            id, content, embedding, category, weight, initial_cost,
            created_at, last_retrieved, retrieval_count, source_task
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            memory.id,
            memory.content,
            embedding_blob,
            memory.category.as_str(),
            memory.weight.value(),
            memory.initial_cost,
            memory.created_at,
            memory.last_retrieved,
            memory.retrieval_count,
            memory.source_task,
        ],
    )?;
    Ok(())
}

pub fn get_memory(
    conn: &Connection,
    id: &str,
    dimensions: usize,
) -> StorageResult<Option<Memory>> {
    conn.query_row("SELECT * FROM memories WHERE id = ?1", [id], |row| {
        memory_from_row(row, dimensions)
    })
    .optional()?
    .transpose()
}

pub fn delete_memory(conn: &Connection, id: &str) -> StorageResult<bool> {
    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM memory_retrievals WHERE memory_id = ?1", [id])?;
    let deleted = tx.execute("DELETE FROM memories WHERE id = ?1", [id])?;
    tx.commit()?;
    Ok(deleted > 0)
}

pub fn update_weight(conn: &Connection, id: &str, weight: f64) -> StorageResult<()> {
    conn.execute(
        "UPDATE memories SET weight = ?1 WHERE id = ?2",
        params![weight, id],
    )?;
    Ok(())
}

pub fn get_weight(conn: &Connection, id: &str) -> StorageResult<Option<f64>> {
    Ok(conn
        .query_row("SELECT weight FROM memories WHERE id = ?1", [id], |r| {
            r.get(0)
        })
        .optional()?)
}

/// Mark a memory as retrieved: bump `retrieval_count`, set `last_retrieved`.
pub fn mark_retrieved(conn: &Connection, id: &str, now: i64) -> StorageResult<()> {
    conn.execute(
        "UPDATE memories SET last_retrieved = ?1, retrieval_count = retrieval_count + 1
         WHERE id = ?2",
        params![now, id],
    )?;
    Ok(())
}

/// All memories with a NULL embedding, in insertion order (spec §4.3
/// `embedPending`).
pub fn list_pending(conn: &Connection) -> StorageResult<Vec<MemoryId>> {
    let mut stmt = conn.prepare(
        "SELECT id FROM memories WHERE embedding IS NULL ORDER BY rowid ASC",
    )?;
    let ids = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ids)
}

/// Write back a computed embedding for a previously-pending memory. Uses
/// `UPDATE ... WHERE embedding IS NULL` so a concurrent writer's embedding
/// wins if it landed first (spec §5, idempotent `embedPending`).
pub fn set_embedding(conn: &Connection, id: &str, embedding: &[f32]) -> StorageResult<()> {
    let blob = vector::encode(embedding);
    conn.execute(
        "UPDATE memories SET embedding = ?1 WHERE id = ?2 AND embedding IS NULL",
        params![blob, id],
    )?;
    Ok(())
}

/// All memories with a non-NULL embedding, for the `startTask` ranking pass
/// (spec §4.3, §4.4). Returned with their raw fields; ranking math happens
/// in the caller, outside the connection.
pub struct RankingCandidate {
    pub id: MemoryId,
    pub content: String,
    pub category: Category,
    pub embedding: Vec<f32>,
    pub recency_anchor: i64,
}

pub fn list_ranking_candidates(
    conn: &Connection,
    dimensions: usize,
) -> StorageResult<Vec<RankingCandidate>> {
    let mut stmt = conn.prepare(
        "SELECT id, content, category, embedding, created_at, last_retrieved
         FROM memories
         WHERE embedding IS NOT NULL AND LENGTH(embedding) > 0
         ORDER BY rowid ASC",
    )?;
    let rows = stmt.query_map([], |row| {
        let id: String = row.get(0)?;
        let content: String = row.get(1)?;
        let category_str: String = row.get(2)?;
        let blob: Vec<u8> = row.get(3)?;
        let created_at: i64 = row.get(4)?;
        let last_retrieved: Option<i64> = row.get(5)?;
        Ok((id, content, category_str, blob, created_at, last_retrieved))
    })?;

    let mut out = Vec::new();
    for row in rows {
        let (id, content, category_str, blob, created_at, last_retrieved) = row?;
        let embedding = vector::decode(&blob, dimensions)?;
        let category = Category::parse(&category_str).unwrap_or(Category::Insight);
        out.push(RankingCandidate {
            id,
            content,
            category,
            embedding,
            recency_anchor: last_retrieved.unwrap_or(created_at),
        });
    }
    Ok(out)
}

/// Top `n` memories ranked purely by stored weight (spec §4.3
/// `getTopByWeight`).
pub fn top_by_weight(conn: &Connection, n: usize, dimensions: usize) -> StorageResult<Vec<Memory>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM memories ORDER BY weight DESC, rowid ASC LIMIT ?1",
    )?;
    let rows = stmt.query_map([n as i64], |row| memory_from_row(row, dimensions))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row??);
    }
    Ok(out)
}

/// Multiply every memory's weight by `decay_rate` in a single UPDATE
/// (spec §4.3 `decay`). Returns the number of rows touched.
pub fn decay_all_weights(conn: &Connection, decay_rate: f64) -> StorageResult<usize> {
    let n = conn.execute(
        "UPDATE memories SET weight = MAX(weight * ?1, ?2)",
        params![decay_rate, memelord_core::Weight::MIN],
    )?;
    Ok(n)
}

/// Delete memories with `weight < threshold AND retrieval_count > min_retrievals`
/// (spec §4.3 `decay`'s eviction guard). Returns the number deleted.
pub fn delete_decayed(
    conn: &Connection,
    weight_threshold: f64,
    min_retrievals: i64,
) -> StorageResult<usize> {
    let tx = conn.unchecked_transaction()?;
    let ids: Vec<String> = {
        let mut stmt = tx.prepare(
            "SELECT id FROM memories WHERE weight < ?1 AND retrieval_count > ?2",
        )?;
        let rows = stmt
            .query_map(params![weight_threshold, min_retrievals], |r| r.get(0))?
            .collect::<Result<_, _>>()?;
        rows
    };
    for id in &ids {
        tx.execute("DELETE FROM memory_retrievals WHERE memory_id = ?1", [id])?;
    }
    let placeholders = vec!["?"; ids.len()].join(",");
    let deleted = if ids.is_empty() {
        0
    } else {
        tx.execute(
            &format!("DELETE FROM memories WHERE id IN ({placeholders})"),
            rusqlite::params_from_iter(ids.iter()),
        )?
    };
    tx.commit()?;
    Ok(deleted)
}

/// Delete all memories with `weight < threshold`, no retrieval-count guard
/// (spec §4.3 `purge`). Returns the number deleted.
pub fn purge_below(conn: &Connection, threshold: f64) -> StorageResult<usize> {
    let tx = conn.unchecked_transaction()?;
    let ids: Vec<String> = {
        let mut stmt = tx.prepare("SELECT id FROM memories WHERE weight < ?1")?;
        let rows = stmt
            .query_map([threshold], |r| r.get(0))?
            .collect::<Result<_, _>>()?;
        rows
    };
    for id in &ids {
        tx.execute("DELETE FROM memory_retrievals WHERE memory_id = ?1", [id])?;
    }
    let placeholders = vec!["?"; ids.len()].join(",");
    let deleted = if ids.is_empty() {
        0
    } else {
        tx.execute(
            &format!("DELETE FROM memories WHERE id IN ({placeholders})"),
            rusqlite::params_from_iter(ids.iter()),
        )?
    };
    tx.commit()?;
    Ok(deleted)
}

pub fn count_memories(conn: &Connection) -> StorageResult<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM memories", [], |r| r.get(0))?)
}
