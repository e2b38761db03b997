//! Deferred continuations on simulation time
//!
//! Everything that "waits" (charge steps, swing keyframes, intro pauses,
//! delayed audio checks) is a timer owned by the mode that scheduled it.
//! Timers fire in due-time order, ties broken by id, and are popped one
//! at a time so a handler can cancel timers that are due in the same tick.

use serde::{Deserialize, Serialize};

/// Slack for float accumulation when comparing due times
const DUE_EPSILON: f64 = 1e-6;

/// Handle for a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Entry<K> {
    id: TimerId,
    due: f64,
    interval: Option<f64>,
    kind: K,
}

/// Cancellable one-shot and repeating timers
#[derive(Debug, Clone)]
pub struct Timers<K> {
    now: f64,
    next_id: u64,
    entries: Vec<Entry<K>>,
    closed: bool,
}

impl<K: Copy + std::fmt::Debug> Default for Timers<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy + std::fmt::Debug> Timers<K> {
    pub fn new() -> Self {
        Self {
            now: 0.0,
            next_id: 1,
            entries: Vec::new(),
            closed: false,
        }
    }

    /// Current simulation time (seconds)
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Fire once after `delay` seconds
    pub fn after(&mut self, delay: f32, kind: K) -> TimerId {
        self.schedule(delay, None, kind)
    }

    /// Fire every `interval` seconds, first fire one interval from now
    pub fn every(&mut self, interval: f32, kind: K) -> TimerId {
        self.schedule(interval, Some(interval as f64), kind)
    }

    fn schedule(&mut self, delay: f32, interval: Option<f64>, kind: K) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        if self.closed {
            log::error!("Timer {:?} scheduled after teardown, dropping it", kind);
            return id;
        }
        self.entries.push(Entry {
            id,
            due: self.now + delay.max(0.0) as f64,
            interval,
            kind,
        });
        id
    }

    /// Cancel a timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.entries.clear();
    }

    /// Cancel everything and refuse new timers (mode teardown)
    pub fn close(&mut self) {
        self.entries.clear();
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Move the clock forward. Call `pop_due` afterwards to collect fires.
    pub fn advance(&mut self, dt: f32) {
        self.now += dt as f64;
    }

    /// Next timer that is due, earliest first. Repeating timers are
    /// rescheduled one interval later, so a long step can fire them
    /// more than once.
    pub fn pop_due(&mut self) -> Option<(TimerId, K)> {
        let limit = self.now + DUE_EPSILON;
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= limit)
            .min_by(|(_, a), (_, b)| a.due.total_cmp(&b.due).then(a.id.cmp(&b.id)))
            .map(|(i, _)| i)?;

        let entry = &mut self.entries[idx];
        let fired = (entry.id, entry.kind);
        match entry.interval {
            Some(interval) => entry.due += interval,
            None => {
                self.entries.remove(idx);
            }
        }
        Some(fired)
    }
}

/// Leading-edge rate limiter: passes the first event, then drops events
/// until `interval` seconds have passed.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: f64,
    last: Option<f64>,
}

impl Throttle {
    pub fn new(interval: f32) -> Self {
        Self {
            interval: interval as f64,
            last: None,
        }
    }

    pub fn try_pass(&mut self, now: f64) -> bool {
        match self.last {
            Some(last) if now - last + DUE_EPSILON < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
