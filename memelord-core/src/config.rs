use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::traits::EmbeddingProvider;
use crate::vector::VectorType;

/// Construction-time configuration for a `MemoryStore` (spec §6).
///
/// `db_path`, `session_id`, and `embed` are required; everything else has
/// a spec-mandated default.
pub struct Config {
    pub db_path: PathBuf,
    pub session_id: String,
    pub embed: Arc<dyn EmbeddingProvider>,
    pub vector_type: VectorType,
    pub dimensions: usize,
    pub top_k: usize,
    pub learning_rate: f64,
    pub decay_rate: f64,
}

impl Config {
    pub fn new(db_path: PathBuf, session_id: String, embed: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            db_path,
            session_id,
            embed,
            vector_type: VectorType::default(),
            dimensions: 384,
            top_k: 5,
            learning_rate: 0.1,
            decay_rate: 0.995,
        }
    }

    pub fn with_vector_type(mut self, vector_type: VectorType) -> Self {
        self.vector_type = vector_type;
        self
    }

    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = dimensions;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_decay_rate(mut self, decay_rate: f64) -> Self {
        self.decay_rate = decay_rate;
        self
    }

    /// Validate invariants that aren't enforceable by the type system alone
    /// (spec §7 `InvalidArgument`): `top_k >= 1`, `decay_rate` in `(0, 1)`,
    /// and only `VectorType::Vector32` is accepted (spec §9, Open Questions
    /// — the rest of the core assumes 4-byte elements).
    pub fn validate(&self) -> CoreResult<()> {
        if self.top_k < 1 {
            return Err(CoreError::InvalidArgument {
                reason: format!("top_k must be >= 1, got {}", self.top_k),
            });
        }
        if !(self.decay_rate > 0.0 && self.decay_rate < 1.0) {
            return Err(CoreError::InvalidArgument {
                reason: format!("decay_rate must be in (0, 1), got {}", self.decay_rate),
            });
        }
        if self.vector_type != VectorType::Vector32 {
            return Err(CoreError::InvalidArgument {
                reason: format!(
                    "vector_type {} is not supported; only vector32 is implemented",
                    self.vector_type.as_str()
                ),
            });
        }
        if self.dimensions == 0 {
            return Err(CoreError::InvalidArgument {
                reason: "dimensions must be > 0".to_string(),
            });
        }
        Ok(())
    }
}
