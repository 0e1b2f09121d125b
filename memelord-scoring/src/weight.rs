use memelord_core::{UserInputSource, Weight};

/// EMA weight update: `w' = clamp((1-a)*w + a*credit, MIN, MAX)`
/// (spec §4.2 "Weight update"). `learning_rate` is `a`.
pub fn ema_update(current: Weight, credit: f64, learning_rate: f64) -> Weight {
    Weight::new((1.0 - learning_rate) * current.value() + learning_rate * credit)
}

/// Multiply a weight by a penalty factor, floored at `Weight::MIN`
/// (spec §4.3 `penalizeMemory`).
pub fn penalize(current: Weight, factor: f64) -> Weight {
    Weight::new((current.value() * factor).max(Weight::MIN))
}

/// Initial weight for a `correction` memory (spec §4.2 "Initial weight"):
/// `1.0 + tokensWasted / max(avgTokensPerTask, 1)`, where `avgTokensPerTask`
/// falls back to 10000 when there are no finished tasks yet.
pub fn correction_initial_weight(tokens_wasted: i64, avg_tokens_per_task: Option<f64>) -> Weight {
    let avg = avg_tokens_per_task.unwrap_or(10_000.0);
    Weight::new(1.0 + tokens_wasted as f64 / avg.max(1.0))
}

/// Initial weight for a `user` memory, keyed by report source
/// (spec §4.2 "Initial weight").
pub fn user_initial_weight(source: UserInputSource) -> Weight {
    Weight::new(source.initial_weight())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_stays_within_bounds_from_extreme_credit() {
        let w = Weight::new(1.0);
        let updated = ema_update(w, 1000.0, 0.1);
        assert!(updated.value() <= Weight::MAX);
        let updated_low = ema_update(w, -1000.0, 0.1);
        assert!(updated_low.value() >= Weight::MIN);
    }

    #[test]
    fn ema_moves_toward_credit() {
        let w = Weight::new(1.0);
        let up = ema_update(w, 5.0, 0.1);
        assert!(up.value() > 1.0);
        let down = ema_update(w, 0.0, 0.1);
        assert!(down.value() < 1.0);
    }

    #[test]
    fn penalize_floors_at_minimum() {
        let w = Weight::new(0.11);
        let penalized = penalize(w, 0.0);
        assert_eq!(penalized.value(), Weight::MIN);
    }

    #[test]
    fn correction_weight_scales_with_tokens_wasted() {
        let cheap = correction_initial_weight(0, Some(10_000.0));
        let expensive = correction_initial_weight(15_000, Some(10_000.0));
        assert_eq!(cheap.value(), 1.0);
        assert!((expensive.value() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn correction_weight_falls_back_to_ten_thousand() {
        let w = correction_initial_weight(10_000, None);
        assert!((w.value() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn user_source_weights_match_table() {
        assert_eq!(
            user_initial_weight(UserInputSource::UserDenial).value(),
            2.0
        );
        assert_eq!(
            user_initial_weight(UserInputSource::UserCorrection).value(),
            2.5
        );
        assert_eq!(
            user_initial_weight(UserInputSource::UserInput).value(),
            2.0
        );
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn ema_update_never_leaves_the_clamp_range(
            current in Weight::MIN..=Weight::MAX,
            credit in -1000.0f64..1000.0,
            learning_rate in 0.0f64..=1.0,
        ) {
            let updated = ema_update(Weight::new(current), credit, learning_rate);
            prop_assert!(updated.value() >= Weight::MIN && updated.value() <= Weight::MAX);
        }

        #[test]
        fn penalize_never_leaves_the_clamp_range(
            current in Weight::MIN..=Weight::MAX,
            factor in 0.0f64..10.0,
        ) {
            let updated = penalize(Weight::new(current), factor);
            prop_assert!(updated.value() >= Weight::MIN && updated.value() <= Weight::MAX);
        }

        #[test]
        fn correction_weight_never_leaves_the_clamp_range(
            tokens_wasted in 0i64..10_000_000,
            avg in 1.0f64..1_000_000.0,
        ) {
            let w = correction_initial_weight(tokens_wasted, Some(avg));
            prop_assert!(w.value() >= Weight::MIN && w.value() <= Weight::MAX);
        }
    }
}
