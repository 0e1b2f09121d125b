/// Per-memory credit at end-of-task (spec §4.2 "Per-memory credit"):
/// `credit(m) = taskScore * (s/3) * (1/max(k,1))`, where `k` is the number
/// of retrieved memories rated in this task.
pub fn compute(task_score: f64, self_report: u8, rated_count: usize) -> f64 {
    let s = self_report.min(3) as f64;
    task_score * (s / 3.0) * (1.0 / (rated_count.max(1) as f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_self_report_gives_zero_credit() {
        assert_eq!(compute(10.0, 0, 1), 0.0);
    }

    #[test]
    fn max_self_report_gives_full_task_score_when_alone() {
        assert!((compute(1.5, 3, 1) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn credit_splits_across_rated_memories() {
        let one = compute(3.0, 3, 1);
        let two = compute(3.0, 3, 2);
        assert!((two - one / 2.0).abs() < 1e-9);
    }

    #[test]
    fn zero_rated_count_does_not_divide_by_zero() {
        let credit = compute(2.0, 3, 0);
        assert!(credit.is_finite());
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn credit_magnitude_never_exceeds_task_score(
            task_score in -100.0f64..100.0,
            self_report in 0u8..=3,
            rated_count in 1usize..20,
        ) {
            let credit = compute(task_score, self_report, rated_count);
            prop_assert!(credit.abs() <= task_score.abs() + 1e-9);
        }
    }
}
