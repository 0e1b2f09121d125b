use memelord_core::Baseline;

/// Update the running baseline with one finished task's outcome variates,
/// using Welford's online algorithm independently for tokens, errors, and
/// user corrections (spec §4.2 "Running baseline").
///
/// `n' = n + 1`, `mean' = mean + (x - mean)/n'`, `M2' = M2 + (x - mean)(x - mean')`.
pub fn update(baseline: &Baseline, tokens: f64, errors: f64, user_corrections: f64) -> Baseline {
    let count = baseline.count + 1;

    let (mean_tokens, m2_tokens) =
        welford_step(baseline.mean_tokens, baseline.m2_tokens, count, tokens);
    let (mean_errors, m2_errors) =
        welford_step(baseline.mean_errors, baseline.m2_errors, count, errors);
    let (mean_user_corrections, m2_user_corrections) = welford_step(
        baseline.mean_user_corrections,
        baseline.m2_user_corrections,
        count,
        user_corrections,
    );

    Baseline {
        count,
        mean_tokens,
        mean_errors,
        mean_user_corrections,
        m2_tokens,
        m2_errors,
        m2_user_corrections,
    }
}

fn welford_step(mean: f64, m2: f64, new_count: u64, x: f64) -> (f64, f64) {
    let new_mean = mean + (x - mean) / new_count as f64;
    let new_m2 = m2 + (x - mean) * (x - new_mean);
    (new_mean, new_m2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch_mean(values: &[f64]) -> f64 {
        values.iter().sum::<f64>() / values.len() as f64
    }

    #[test]
    fn equivalent_to_batch_mean_within_tolerance() {
        let values = [100.0, 250.0, 75.0, 400.0, 50.0, 300.0, 120.0, 90.0];
        let mut baseline = Baseline::zero();
        for &v in &values {
            baseline = update(&baseline, v, 0.0, 0.0);
        }
        let expected = batch_mean(&values);
        let relative_error = (baseline.mean_tokens - expected).abs() / expected.abs().max(1e-12);
        assert!(
            relative_error < 1e-9,
            "welford mean {} vs batch mean {}",
            baseline.mean_tokens,
            expected
        );
    }

    #[test]
    fn count_increments_by_one_each_update() {
        let mut baseline = Baseline::zero();
        for i in 1..=20u64 {
            baseline = update(&baseline, 10.0, 1.0, 0.0);
            assert_eq!(baseline.count, i);
        }
    }

    #[test]
    fn stddev_is_one_below_two_samples() {
        let baseline = Baseline::zero();
        assert_eq!(baseline.stddev_tokens(), 1.0);
        let one = update(&baseline, 50.0, 0.0, 0.0);
        assert_eq!(one.stddev_tokens(), 1.0);
    }

    #[test]
    fn stddev_matches_sample_formula_at_two_samples() {
        let baseline = Baseline::zero();
        let b1 = update(&baseline, 10.0, 0.0, 0.0);
        let b2 = update(&b1, 20.0, 0.0, 0.0);
        // sample variance of [10, 20] is 50, stddev = sqrt(50)
        assert!((b2.stddev_tokens() - 50f64.sqrt()).abs() < 1e-9);
    }
}
