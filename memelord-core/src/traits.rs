use crate::error::CoreResult;

/// Injected dependency: `text -> fixed-length float vector`. The core never
/// computes embeddings itself (spec §2, layer 5). Implementations are
/// expected to be cheap to call from outside any open connection — the
/// store never holds a connection while calling `embed` (spec §5).
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single piece of text.
    fn embed(&self, text: &str) -> CoreResult<Vec<f32>>;

    /// The declared dimensionality of vectors this provider produces.
    fn dimensions(&self) -> usize;
}

/// Single clock abstraction so tests can advance time deterministically
/// (spec §9, Design Notes "Time source"). All timestamps in the data model
/// are unix seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

/// `Clock` backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }
}
