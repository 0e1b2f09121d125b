//! Key/value metadata, currently just the running [`Baseline`] (spec §3
//! "Baseline", persisted as JSON under a single `meta` row).

use rusqlite::{params, Connection, OptionalExtension};

use memelord_core::Baseline;

use crate::error::StorageResult;

const BASELINE_KEY: &str = "baseline";

pub fn get_baseline(conn: &Connection) -> StorageResult<Baseline> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT value FROM meta WHERE key = ?1",
            [BASELINE_KEY],
            |r| r.get(0),
        )
        .optional()?;
    match raw {
        Some(json) => {
            let baseline = serde_json::from_str(&json)
                .map_err(|e| crate::error::StorageError::MigrationFailed {
                    reason: format!("corrupt baseline json: {e}"),
                })?;
            Ok(baseline)
        }
        None => Ok(Baseline::zero()),
    }
}

pub fn set_baseline(conn: &Connection, baseline: &Baseline) -> StorageResult<()> {
    let json = serde_json::to_string(baseline).expect("Baseline serialization cannot fail");
    conn.execute(
        "INSERT INTO meta (key, value) VALUES (?1, ?2)
         ON CONFLICT (key) DO UPDATE SET value = excluded.value",
        params![BASELINE_KEY, json],
    )?;
    Ok(())
}
