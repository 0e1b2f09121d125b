/// Top-level error type, unifying the core and storage taxonomies
/// (spec §7). Every public `MemoryStore` operation returns this.
#[derive(Debug, thiserror::Error)]
pub enum MemelordError {
    #[error(transparent)]
    Core(#[from] memelord_core::CoreError),

    #[error(transparent)]
    Storage(#[from] memelord_storage::StorageError),
}

pub type MemelordResult<T> = Result<T, MemelordError>;
