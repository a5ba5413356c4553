use std::collections::VecDeque;

use foundation::time::Time;

/// One line of activity, stamped with the logical time it happened at.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub at: Time,
    pub kind: &'static str,
    pub message: String,
}

/// Append-only activity log with an optional retention limit.
///
/// When a limit is set the oldest events are evicted first, which makes the
/// bus usable directly as a rolling "live feed".
#[derive(Debug, Default)]
pub struct EventBus {
    events: VecDeque<Event>,
    capacity: Option<usize>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps at most `capacity` events. Storage grows on demand, so the limit
    /// may be larger than what is ever emitted.
    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            events: VecDeque::new(),
            capacity: Some(capacity),
        }
    }

    pub fn emit(&mut self, at: Time, kind: &'static str, message: impl Into<String>) {
        self.events.push_back(Event {
            at,
            kind,
            message: message.into(),
        });
        if let Some(cap) = self.capacity {
            while self.events.len() > cap {
                self.events.pop_front();
            }
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Oldest first.
    pub fn events(&self) -> impl Iterator<Item = &Event> + '_ {
        self.events.iter()
    }

    /// The `n` most recent events, newest first.
    pub fn recent(&self, n: usize) -> Vec<&Event> {
        self.events.iter().rev().take(n).collect()
    }
}
