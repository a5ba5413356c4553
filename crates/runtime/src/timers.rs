use std::collections::BTreeMap;

use foundation::math::precision::StableF64;
use foundation::time::Time;

/// Handle returned by [`TimerQueue::schedule`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerKey(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct Timer<T> {
    pub key: TimerKey,
    pub due: Time,
    pub payload: T,
}

/// Deterministic queue of delayed payloads.
///
/// Ordering contract:
/// - Timers fire in ascending `due` order.
/// - Timers with the same `due` fire in insertion order.
#[derive(Debug)]
pub struct TimerQueue<T> {
    next_order: u64,
    timers: BTreeMap<(StableF64, u64), T>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            next_order: 0,
            timers: BTreeMap::new(),
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: Time, payload: T) -> TimerKey {
        let order = self.next_order;
        self.next_order = self.next_order.wrapping_add(1);
        self.timers.insert((StableF64(due.0), order), payload);
        TimerKey(order)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Removes and returns every timer due at or before `now`, in firing order.
    pub fn pop_due(&mut self, now: Time) -> Vec<Timer<T>> {
        let mut fired = Vec::new();
        while let Some(entry) = self.timers.first_entry() {
            let (due, _) = *entry.key();
            if due > StableF64(now.0) {
                break;
            }
            let ((due, order), payload) = entry.remove_entry();
            fired.push(Timer {
                key: TimerKey(order),
                due: Time(due.0),
                payload,
            });
        }
        fired
    }

    /// Drops every pending timer whose payload matches `cancel`.
    ///
    /// Returns the number of timers removed.
    pub fn cancel_where(&mut self, mut cancel: impl FnMut(&T) -> bool) -> usize {
        let before = self.timers.len();
        self.timers.retain(|_, payload| !cancel(payload));
        before - self.timers.len()
    }
}
