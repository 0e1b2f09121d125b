/// Storage-layer errors (spec §7).
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// `connect` exhausted its retry budget against a locked database file
    /// (spec §5 "Lock contention").
    #[error("database locked after {attempts} connect attempts")]
    Locked { attempts: u32 },

    #[error("migration failed: {reason}")]
    MigrationFailed { reason: String },

    /// A stored vector blob had the wrong byte length for its declared
    /// dimensions (spec §7 `SchemaMismatch`: fail the operation, never
    /// silently truncate).
    #[error(transparent)]
    Core(#[from] memelord_core::CoreError),
}

pub type StorageResult<T> = Result<T, StorageError>;
