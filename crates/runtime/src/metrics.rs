use std::collections::BTreeMap;

/// Named counters, gauges and value summaries for session activity.
///
/// Keys are static metric names; sorted maps keep the HUD status listing in
/// a stable order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Metrics {
    counters: BTreeMap<&'static str, u64>,
    gauges: BTreeMap<&'static str, i64>,
    summaries: BTreeMap<&'static str, Summary>,
}

/// Running count/min/max/sum of observed values.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Summary {
    pub count: u64,
    pub sum: i64,
    pub min: i64,
    pub max: i64,
}

impl Summary {
    pub fn observe(&mut self, value: i64) {
        let first = self.count == 0;
        self.min = if first { value } else { self.min.min(value) };
        self.max = if first { value } else { self.max.max(value) };
        self.count += 1;
        self.sum = self.sum.saturating_add(value);
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum as f64 / self.count as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub counters: Vec<(&'static str, u64)>,
    pub gauges: Vec<(&'static str, i64)>,
    pub summaries: Vec<(&'static str, Summary)>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counter(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    pub fn incr(&mut self, name: &'static str) {
        *self.counters.entry(name).or_default() += 1;
    }

    pub fn set_gauge(&mut self, name: &'static str, value: i64) {
        self.gauges.insert(name, value);
    }

    pub fn observe(&mut self, name: &'static str, value: i64) {
        self.summaries.entry(name).or_default().observe(value);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            counters: self.counters.iter().map(|(k, v)| (*k, *v)).collect(),
            gauges: self.gauges.iter().map(|(k, v)| (*k, *v)).collect(),
            summaries: self.summaries.iter().map(|(k, v)| (*k, *v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Metrics, Summary};

    #[test]
    fn counters_accumulate() {
        let mut m = Metrics::new();
        m.incr("bounty.submitted");
        m.incr("bounty.submitted");
        assert_eq!(m.counter("bounty.submitted"), 2);
        assert_eq!(m.counter("bounty.completed"), 0);
    }

    #[test]
    fn gauges_overwrite() {
        let mut m = Metrics::new();
        m.set_gauge("wallet.balance_cents", 10_000);
        m.set_gauge("wallet.balance_cents", 11_500);
        assert_eq!(m.snapshot().gauges, vec![("wallet.balance_cents", 11_500)]);
    }

    #[test]
    fn summary_tracks_min_max_and_mean() {
        let mut s = Summary::default();
        assert_eq!(s.mean(), None);
        s.observe(4000);
        s.observe(2000);
        assert_eq!((s.min, s.max, s.count), (2000, 4000, 2));
        assert_eq!(s.mean(), Some(3000.0));
    }

    #[test]
    fn snapshot_lists_names_in_order() {
        let mut m = Metrics::new();
        m.incr("timers.discarded");
        m.incr("bounty.cancelled");
        m.observe("bounty.latency_ms", 4000);
        let snap = m.snapshot();
        assert_eq!(
            snap.counters,
            vec![("bounty.cancelled", 1), ("timers.discarded", 1)]
        );
        assert!(snap.gauges.is_empty());
        let [(name, latency)] = snap.summaries.as_slice() else {
            panic!("one summary expected");
        };
        assert_eq!((*name, latency.count), ("bounty.latency_ms", 1));
    }
}
