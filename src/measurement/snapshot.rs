//! Paired clock and counter readings.

use super::clock::{diff_seconds, Clock, ProcessCpuClock, Timestamp};
use super::counters::{CounterGroup, CounterLayout, CounterSource, EVENTS};
use super::error::MeasurementResult;

/// Clock and counter state at one instant.
///
/// Only meaningful as one half of a (start, end) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    timestamp: Timestamp,
    counters: Vec<u64>,
}

impl Snapshot {
    /// Bundle a clock reading with a raw group read.
    pub fn new(timestamp: Timestamp, counters: Vec<u64>) -> Self {
        Self {
            timestamp,
            counters,
        }
    }

    /// When the snapshot was taken.
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Raw group read (`nr`, then `value, id` pairs); empty without counters.
    pub fn counters(&self) -> &[u64] {
        &self.counters
    }

    /// Seconds elapsed from `self` to `later`.
    pub fn seconds_until(&self, later: &Snapshot) -> f64 {
        diff_seconds(self.timestamp, later.timestamp)
    }
}

/// Capture hook handed to the calibrator and to workloads.
pub trait Capture {
    /// Take a snapshot now.
    fn capture(&mut self) -> MeasurementResult<Snapshot>;

    /// Layout of the counters in captured snapshots.
    fn layout(&self) -> &CounterLayout;
}

/// Measurement context: a clock plus a counter group.
///
/// Owns the process's counter group; pass it by reference rather than
/// reaching for a global.
#[derive(Debug)]
pub struct Probe<C = CounterGroup, K = ProcessCpuClock> {
    counters: C,
    clock: K,
}

impl Probe {
    /// Open the default event group against the process CPU clock.
    pub fn open() -> Self {
        Self::with_parts(CounterGroup::open(&EVENTS), ProcessCpuClock)
    }
}

impl<C: CounterSource, K: Clock> Probe<C, K> {
    /// Build a probe from explicit parts.
    pub fn with_parts(counters: C, clock: K) -> Self {
        Self { counters, clock }
    }
}

impl<C: CounterSource, K: Clock> Capture for Probe<C, K> {
    #[inline]
    fn capture(&mut self) -> MeasurementResult<Snapshot> {
        let mut counters = Vec::with_capacity(self.counters.layout().read_len());
        let timestamp = self.clock.now()?;
        self.counters.read_into(&mut counters)?;
        Ok(Snapshot::new(timestamp, counters))
    }

    fn layout(&self) -> &CounterLayout {
        self.counters.layout()
    }
}
