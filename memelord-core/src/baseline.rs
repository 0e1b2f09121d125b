use serde::{Deserialize, Serialize};

/// Running mean/variance of task outcome variates, used to compute
/// z-score-based task scores (spec §3 "Meta", §4.2 "Running baseline").
///
/// Immutable value object: updates return a new `Baseline` rather than
/// mutating in place, per spec §9 "Baseline as a value object". Persisted
/// via serialize-on-write through the `meta` key `baseline`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub count: u64,
    pub mean_tokens: f64,
    pub mean_errors: f64,
    pub mean_user_corrections: f64,
    pub m2_tokens: f64,
    pub m2_errors: f64,
    pub m2_user_corrections: f64,
}

impl Baseline {
    /// The empty baseline, used before any task has finished.
    pub const fn zero() -> Self {
        Self {
            count: 0,
            mean_tokens: 0.0,
            mean_errors: 0.0,
            mean_user_corrections: 0.0,
            m2_tokens: 0.0,
            m2_errors: 0.0,
            m2_user_corrections: 0.0,
        }
    }

    /// Sample stddev of tokens from `m2_tokens`: `sqrt(m2/(n-1))` when
    /// `n >= 2`, else `1` so z-score collapses to raw delta (spec §4.2).
    pub fn stddev_tokens(&self) -> f64 {
        stddev(self.m2_tokens, self.count)
    }

    pub fn stddev_errors(&self) -> f64 {
        stddev(self.m2_errors, self.count)
    }

    pub fn stddev_user_corrections(&self) -> f64 {
        stddev(self.m2_user_corrections, self.count)
    }
}

impl Default for Baseline {
    fn default() -> Self {
        Self::zero()
    }
}

fn stddev(m2: f64, n: u64) -> f64 {
    if n >= 2 {
        (m2 / (n as f64 - 1.0)).sqrt()
    } else {
        1.0
    }
}
