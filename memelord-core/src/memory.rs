use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque memory identifier (a UUID v4 string, generated at insert).
pub type MemoryId = String;

/// Opaque task identifier (a UUID v4 string, generated by `startTask`).
pub type TaskId = String;

/// Closed set of memory categories. Encoded as a tagged enum, never a free
/// string, so initial-weight selection and presentation are exhaustive
/// matches (spec §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Correction,
    Insight,
    User,
    Consolidated,
    Discovery,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Correction => "correction",
            Category::Insight => "insight",
            Category::User => "user",
            Category::Consolidated => "consolidated",
            Category::Discovery => "discovery",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "correction" => Some(Category::Correction),
            "insight" => Some(Category::Insight),
            "user" => Some(Category::User),
            "consolidated" => Some(Category::Consolidated),
            "discovery" => Some(Category::Discovery),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Source of a `reportUserInput` call, used to pick the initial weight
/// (spec §4.2 "Initial weight by category").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserInputSource {
    UserDenial,
    UserCorrection,
    UserInput,
}

impl UserInputSource {
    /// Initial weight by source, per spec §4.2.
    pub fn initial_weight(self) -> f64 {
        match self {
            UserInputSource::UserDenial => 2.0,
            UserInputSource::UserCorrection => 2.5,
            UserInputSource::UserInput => 2.0,
        }
    }
}

/// A memory's persistent usefulness score, clamped to `[MIN, MAX]` on every
/// write (invariant (i) in spec §3).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Weight(f64);

impl Weight {
    pub const MIN: f64 = 0.1;
    pub const MAX: f64 = 5.0;

    pub fn new(value: f64) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Weight {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.0)
    }
}

impl From<f64> for Weight {
    fn from(v: f64) -> Self {
        Self::new(v)
    }
}

impl From<Weight> for f64 {
    fn from(w: Weight) -> Self {
        w.0
    }
}

/// The atomic unit of recall. See spec §3 "Memory".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    pub id: MemoryId,
    pub content: String,
    /// `None` means "pending" — not yet embedded, excluded from retrieval.
    pub embedding: Option<Vec<f32>>,
    pub category: Category,
    pub weight: Weight,
    /// Tokens wasted at creation time; 0 if unknown.
    pub initial_cost: i64,
    pub created_at: i64,
    pub last_retrieved: Option<i64>,
    pub retrieval_count: i64,
    pub source_task: Option<TaskId>,
}

impl Memory {
    /// The recency anchor used by the ranking formula: `last_retrieved`,
    /// falling back to `created_at` when never retrieved (spec §4.4).
    pub fn recency_anchor(&self) -> i64 {
        self.last_retrieved.unwrap_or(self.created_at)
    }

    pub fn is_pending(&self) -> bool {
        self.embedding.is_none()
    }
}
