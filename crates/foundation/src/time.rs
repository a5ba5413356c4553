use crate::math::precision::stable_total_cmp_f64;
use std::cmp::Ordering;

/// Time primitives
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct Time(pub f64); // seconds

impl Time {
    pub const ZERO: Time = Time(0.0);

    pub fn seconds(self) -> f64 {
        self.0
    }

    /// Offset from this instant by `seconds`.
    pub fn after(self, seconds: f64) -> Time {
        Time(self.0 + seconds)
    }

    /// Seconds elapsed since `earlier`, clamped at zero.
    pub fn since(self, earlier: Time) -> f64 {
        (self.0 - earlier.0).max(0.0)
    }

    pub fn stable_cmp(self, other: Time) -> Ordering {
        stable_total_cmp_f64(self.0, other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::Time;
    use std::cmp::Ordering;

    #[test]
    fn offsets_and_elapsed() {
        let t = Time(2.0).after(1.5);
        assert_eq!(t, Time(3.5));
        assert_eq!(t.since(Time(2.0)), 1.5);
        assert_eq!(Time(1.0).since(Time(2.0)), 0.0);
    }

    #[test]
    fn stable_cmp_orders_times() {
        assert_eq!(Time(1.0).stable_cmp(Time(1.5)), Ordering::Less);
        assert_eq!(Time(-0.0).stable_cmp(Time::ZERO), Ordering::Equal);
    }
}
