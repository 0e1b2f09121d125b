use serde::{Deserialize, Serialize};

use crate::memory::{MemoryId, TaskId};

/// One row per `(memory, task)` pair: a record that a particular memory was
/// returned for a particular task. Primary key `(memory_id, task_id)`;
/// duplicates are ignored (spec §3 "MemoryRetrieval").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRetrieval {
    pub memory_id: MemoryId,
    pub task_id: TaskId,
    pub similarity: f64,
    /// `None` until `endTask` sets it, in `0..=3`.
    pub self_report: Option<u8>,
    /// `None` until `endTask` computes it.
    pub credit: Option<f64>,
}

/// A memory returned from `startTask`, carrying its similarity at
/// retrieval time rather than its stored weight (spec §4.3, rationale).
#[derive(Debug, Clone)]
pub struct RetrievedMemory {
    pub memory_id: MemoryId,
    pub content: String,
    pub category: crate::memory::Category,
    /// Similarity to the task description — NOT the memory's stored weight.
    pub score: f64,
}

/// A memory returned from `getTopByWeight`, carrying its stored weight as
/// `score` (spec §4.3).
#[derive(Debug, Clone)]
pub struct WeightedMemory {
    pub memory_id: MemoryId,
    pub content: String,
    pub category: crate::memory::Category,
    pub score: f64,
}
