use memelord_core::Baseline;

/// Tasks finished before the baseline has this many samples use the
/// cold-start heuristic instead of z-scores (spec §4.2 "Task score").
pub const COLD_START_THRESHOLD: u64 = 10;

/// Outcome variates for a single finished task, as observed by
/// `endTask` before the baseline is updated.
#[derive(Debug, Clone, Copy)]
pub struct Outcome {
    pub tokens: f64,
    pub errors: f64,
    pub user_corrections: f64,
    pub completed: bool,
}

/// Task score (higher = better), computed against the baseline *before*
/// it is updated with this task's outcome (spec §4.2 "Task score").
pub fn compute(baseline: &Baseline, outcome: Outcome) -> f64 {
    let completed_signal = if outcome.completed { 1.0 } else { -1.0 };

    if baseline.count < COLD_START_THRESHOLD {
        let token_term = if baseline.count == 0 {
            0.0
        } else {
            (baseline.mean_tokens - outcome.tokens) / baseline.mean_tokens.max(1.0)
        };
        let error_term = if baseline.count == 0 {
            0.0
        } else {
            (baseline.mean_errors - outcome.errors) / baseline.mean_errors.max(1.0)
        };
        token_term + error_term - 0.5 * outcome.user_corrections + completed_signal
    } else {
        let z_tokens = (outcome.tokens - baseline.mean_tokens) / baseline.stddev_tokens();
        let z_errors = (outcome.errors - baseline.mean_errors) / baseline.stddev_errors();
        let z_user_corrections = (outcome.user_corrections - baseline.mean_user_corrections)
            / baseline.stddev_user_corrections();
        -z_tokens - z_errors - z_user_corrections + completed_signal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cold_start_with_empty_baseline_ignores_ratio_terms() {
        let baseline = Baseline::zero();
        let score = compute(
            &baseline,
            Outcome {
                tokens: 5000.0,
                errors: 3.0,
                user_corrections: 0.0,
                completed: true,
            },
        );
        // both ratio terms are 0 when baseline.count == 0
        assert_eq!(score, 1.0);
    }

    #[test]
    fn cold_start_rewards_below_average_tokens_and_errors() {
        let mut baseline = Baseline::zero();
        for _ in 0..5 {
            baseline = crate::welford::update(&baseline, 1000.0, 2.0, 0.0);
        }
        assert!(baseline.count < COLD_START_THRESHOLD);
        let good = compute(
            &baseline,
            Outcome {
                tokens: 500.0,
                errors: 0.0,
                user_corrections: 0.0,
                completed: true,
            },
        );
        let bad = compute(
            &baseline,
            Outcome {
                tokens: 2000.0,
                errors: 5.0,
                user_corrections: 2.0,
                completed: false,
            },
        );
        assert!(good > bad);
    }

    #[test]
    fn regime_switches_at_ten_samples() {
        let mut baseline = Baseline::zero();
        for _ in 0..9 {
            baseline = crate::welford::update(&baseline, 1000.0, 2.0, 0.0);
        }
        assert_eq!(baseline.count, 9);
        assert!(baseline.count < COLD_START_THRESHOLD);

        baseline = crate::welford::update(&baseline, 1000.0, 2.0, 0.0);
        assert_eq!(baseline.count, 10);
        assert!(baseline.count >= COLD_START_THRESHOLD);

        // Both regimes must produce a finite, directionally sane score on
        // either side of the boundary.
        let outcome = Outcome {
            tokens: 500.0,
            errors: 0.0,
            user_corrections: 0.0,
            completed: true,
        };
        let score = compute(&baseline, outcome);
        assert!(score.is_finite());
    }

    #[test]
    fn normal_regime_uses_z_scores() {
        let mut baseline = Baseline::zero();
        for i in 0..20 {
            baseline = crate::welford::update(&baseline, 1000.0 + (i as f64), 1.0, 0.0);
        }
        assert!(baseline.count >= COLD_START_THRESHOLD);
        let at_mean = compute(
            &baseline,
            Outcome {
                tokens: baseline.mean_tokens,
                errors: baseline.mean_errors,
                user_corrections: baseline.mean_user_corrections,
                completed: true,
            },
        );
        // z-scores are 0 at the mean, so score collapses to completedSignal.
        assert!((at_mean - 1.0).abs() < 1e-9);
    }
}
