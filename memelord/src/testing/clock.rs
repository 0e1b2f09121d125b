use std::sync::atomic::{AtomicI64, Ordering};

use memelord_core::Clock;

/// A `Clock` a test can advance deterministically (spec §9 "Time source").
#[derive(Debug)]
pub struct TestClock {
    seconds: AtomicI64,
}

impl TestClock {
    pub fn new(start: i64) -> Self {
        Self {
            seconds: AtomicI64::new(start),
        }
    }

    pub fn advance(&self, by_seconds: i64) {
        self.seconds.fetch_add(by_seconds, Ordering::SeqCst);
    }

    pub fn advance_days(&self, days: i64) {
        self.advance(days * 86_400);
    }
}

impl Clock for TestClock {
    fn now(&self) -> i64 {
        self.seconds.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_by_requested_amount() {
        let clock = TestClock::new(1000);
        clock.advance(50);
        assert_eq!(clock.now(), 1050);
    }

    #[test]
    fn advance_days_converts_to_seconds() {
        let clock = TestClock::new(0);
        clock.advance_days(2);
        assert_eq!(clock.now(), 172_800);
    }
}
