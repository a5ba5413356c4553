use foundation::time::Time;
use std::cmp::Ordering;

/// Monotonic logical clock.
///
/// The runtime never reads wall-clock time itself; drivers feed it whatever
/// timebase they use (a test script, a tokio interval) so runs can be
/// replayed exactly.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Clock {
    now: Time,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Time {
        self.now
    }

    /// Moves the clock forward to `t`.
    ///
    /// Returns `false` (and leaves the clock untouched) if `t` is earlier than
    /// the current time or not finite.
    pub fn advance_to(&mut self, t: Time) -> bool {
        if !t.0.is_finite() || t.stable_cmp(self.now) == Ordering::Less {
            return false;
        }
        self.now = t;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::Clock;
    use foundation::time::Time;

    #[test]
    fn advances_forward_only() {
        let mut c = Clock::new();
        assert!(c.advance_to(Time(1.5)));
        assert!(!c.advance_to(Time(1.0)));
        assert_eq!(c.now(), Time(1.5));
        assert!(c.advance_to(Time(1.5)));
        assert_eq!(c.now(), Time(1.5));
    }

    #[test]
    fn rejects_non_finite_times() {
        let mut c = Clock::new();
        assert!(c.advance_to(Time(3.0)));
        assert!(!c.advance_to(Time(f64::NAN)));
        assert!(!c.advance_to(Time(f64::INFINITY)));
        assert_eq!(c.now(), Time(3.0));
    }
}
