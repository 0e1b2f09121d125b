//! # memelord-storage
//!
//! SQLite persistence: schema, the embedding-repair migration, and the
//! connect-per-operation [`Storage`] handle. No scoring math of its own
//! except the pure decay-curve call inside [`queries::ranking`] — every
//! other number comes from `memelord-scoring` or the caller.

pub mod connection;
pub mod error;
pub mod pragmas;
pub mod queries;
pub mod schema;

pub use connection::Storage;
pub use error::{StorageError, StorageResult};

/// Open (creating if absent) and bring a database file up to date: create
/// the schema if missing, then repair any truncated embeddings left behind
/// by a prior run with different `dimensions` (spec §4.1 "init").
pub fn init(storage: &Storage, dimensions: usize) -> StorageResult<()> {
    storage.with_connection(|conn| {
        schema::create_schema(conn)?;
        schema::repair_truncated_embeddings(conn, dimensions)?;
        Ok(())
    })
}
