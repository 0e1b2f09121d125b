/// Time decay factor used only for ranking, never persisted
/// (spec §4.2 "Time decay factor"): `decayRate ^ days_since_last_retrieved`.
///
/// `days_since` is computed by the caller as
/// `(now - coalesce(last_retrieved, created_at)) / 86400`.
pub fn factor(decay_rate: f64, days_since: f64) -> f64 {
    decay_rate.powf(days_since.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_days_gives_factor_of_one() {
        assert!((factor(0.995, 0.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn factor_decreases_monotonically_with_age() {
        let mut prev = factor(0.995, 0.0);
        for days in [1.0, 7.0, 30.0, 365.0] {
            let current = factor(0.995, days);
            assert!(current < prev);
            prev = current;
        }
    }

    #[test]
    fn negative_days_are_clamped_to_zero() {
        assert!((factor(0.995, -5.0) - 1.0).abs() < 1e-12);
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn factor_is_bounded_zero_to_one(
            decay_rate in 0.001f64..1.0,
            days_since in -10.0f64..10_000.0,
        ) {
            let f = factor(decay_rate, days_since);
            prop_assert!(f > 0.0 && f <= 1.0, "factor {} out of (0, 1]", f);
        }

        #[test]
        fn factor_is_monotonically_non_increasing_in_age(
            decay_rate in 0.001f64..1.0,
            earlier in 0.0f64..1000.0,
            additional_days in 0.0f64..1000.0,
        ) {
            let later = earlier + additional_days;
            prop_assert!(factor(decay_rate, later) <= factor(decay_rate, earlier) + f64::EPSILON);
        }
    }
}
