/// Errors raised by core types themselves: config validation, the vector
/// codec, and embedding-provider failures. Storage-layer failures live in
/// `memelord_storage::StorageError`; the two are unified into
/// `memelord::MemelordError` at the top of the workspace.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The embedding provider returned a vector of the wrong length.
    #[error("embedder returned {got} dims, expected {expected}")]
    EmbedDimensionMismatch { expected: usize, got: usize },

    /// The embedding provider raised while computing an embedding.
    #[error("embedding failed: {reason}")]
    EmbedFailure { reason: String },

    /// A caller-supplied argument failed validation.
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// A vector blob has the wrong byte length for its declared dimensions.
    #[error("schema mismatch: expected {expected} bytes, found {found}")]
    SchemaMismatch { expected: usize, found: usize },
}

pub type CoreResult<T> = Result<T, CoreError>;
