//! Schema creation and the embedding-length repair migration (spec §4.1).
//!
//! Schema is created if missing on every open: idempotent
//! `CREATE TABLE IF NOT EXISTS`, no versioned migration ladder — there is
//! exactly one schema generation, so there is nothing to version yet.

use rusqlite::Connection;

use memelord_core::vector::ELEMENT_BYTES;

use crate::error::StorageResult;

pub fn create_schema(conn: &Connection) -> StorageResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS memories (
            id               TEXT PRIMARY KEY,
            content          TEXT NOT NULL,
            embedding        BLOB,
            category         TEXT NOT NULL,
            weight           REAL NOT NULL,
            initial_cost     INTEGER NOT NULL DEFAULT 0,
            created_at       INTEGER NOT NULL,
            last_retrieved   INTEGER,
            retrieval_count  INTEGER NOT NULL DEFAULT 0,
            source_task      TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_memories_category ON memories(category);
        CREATE INDEX IF NOT EXISTS idx_memories_weight ON memories(weight);

        CREATE TABLE IF NOT EXISTS tasks (
            id                     TEXT PRIMARY KEY,
            description            TEXT NOT NULL,
            description_embedding  BLOB,
            tokens_used            INTEGER NOT NULL DEFAULT 0,
            tool_calls             INTEGER NOT NULL DEFAULT 0,
            errors                 INTEGER NOT NULL DEFAULT 0,
            user_corrections       INTEGER NOT NULL DEFAULT 0,
            completed              INTEGER NOT NULL DEFAULT 0,
            task_score             REAL,
            started_at             INTEGER NOT NULL,
            finished_at            INTEGER
        );

        CREATE TABLE IF NOT EXISTS memory_retrievals (
            memory_id    TEXT NOT NULL,
            task_id      TEXT NOT NULL,
            similarity   REAL NOT NULL,
            self_report  INTEGER,
            credit       REAL,
            PRIMARY KEY (memory_id, task_id)
        );

        CREATE INDEX IF NOT EXISTS idx_retrievals_task ON memory_retrievals(task_id);

        CREATE TABLE IF NOT EXISTS meta (
            key    TEXT PRIMARY KEY,
            value  TEXT NOT NULL
        );
        ",
    )?;
    Ok(())
}

/// One-time migration: delete any `embedding` that is non-NULL but shorter
/// than `dimensions * 4` bytes (legacy truncation), turning those memories
/// back into "pending" (spec §4.1). Returns the number repaired.
pub fn repair_truncated_embeddings(conn: &Connection, dimensions: usize) -> StorageResult<usize> {
    let expected_len = (dimensions * ELEMENT_BYTES) as i64;
    let repaired = conn.execute(
        "UPDATE memories
         SET embedding = NULL
         WHERE embedding IS NOT NULL AND LENGTH(embedding) <> ?1",
        [expected_len],
    )?;
    if repaired > 0 {
        tracing::warn!(repaired, "repaired truncated embeddings back to pending");
    }
    Ok(repaired)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn creating_schema_twice_is_idempotent() {
        let conn = open();
        create_schema(&conn).unwrap();
    }

    #[test]
    fn repair_clears_truncated_embeddings() {
        let conn = open();
        conn.execute(
            "INSERT INTO memories (id, content, embedding, category, weight, created_at)
             VALUES ('m1', 'hi', ?1, 'insight', 1.0, 0)",
            [vec![0u8; 8]], // 2 floats, but dimensions below is 4 -> truncated
        )
        .unwrap();
        let repaired = repair_truncated_embeddings(&conn, 4).unwrap();
        assert_eq!(repaired, 1);
        let embedding: Option<Vec<u8>> = conn
            .query_row("SELECT embedding FROM memories WHERE id = 'm1'", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert!(embedding.is_none());
    }

    #[test]
    fn repair_leaves_correctly_sized_embeddings_alone() {
        let conn = open();
        conn.execute(
            "INSERT INTO memories (id, content, embedding, category, weight, created_at)
             VALUES ('m1', 'hi', ?1, 'insight', 1.0, 0)",
            [vec![0u8; 16]], // exactly 4 floats
        )
        .unwrap();
        let repaired = repair_truncated_embeddings(&conn, 4).unwrap();
        assert_eq!(repaired, 0);
    }
}
