//! Hardware counter group.
//!
//! A fixed list of [`EventSpec`]s is opened as one perf_event group so a
//! single `read(2)` on the leader returns every counter atomically. The
//! group read format is `PERF_FORMAT_GROUP | PERF_FORMAT_ID`:
//!
//! ```text
//! [ nr, value_0, id_0, value_1, id_1, ... ]
//! ```
//!
//! Counters that fail to open are marked inactive and read as a zero delta.
//! When none open, the group is absent and reads are a no-op.

use std::fs::File;
use std::io::Read;

use super::error::{MeasurementError, MeasurementResult};
use super::perf;
use super::snapshot::Snapshot;

/// perf_event counter type (the `type` field of `perf_event_attr`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterType {
    /// Generalized hardware events (`PERF_TYPE_HARDWARE`).
    Hardware,
}

/// One counter of the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventSpec {
    /// Short name used in logs.
    pub name: &'static str,
    /// Counter type.
    pub counter_type: CounterType,
    /// Type-specific event code (the `config` field of `perf_event_attr`).
    pub config: u64,
}

/// CPU cycles (`PERF_COUNT_HW_CPU_CYCLES`).
pub const CYCLES: EventSpec = EventSpec {
    name: "cycles",
    counter_type: CounterType::Hardware,
    config: 0,
};

/// Retired instructions (`PERF_COUNT_HW_INSTRUCTIONS`).
pub const INSTRUCTIONS: EventSpec = EventSpec {
    name: "instructions",
    counter_type: CounterType::Hardware,
    config: 1,
};

/// The events every benchmark is measured with, in slot order.
pub const EVENTS: [EventSpec; 2] = [CYCLES, INSTRUCTIONS];

/// Which declared events are actually being counted.
///
/// Slots are indexed by declaration order. The active counters appear in
/// the group read in that same order, since they are opened (and join the
/// group) in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterLayout {
    events: Vec<EventSpec>,
    active: Vec<bool>,
}

impl CounterLayout {
    /// Layout with the given activity per declared event.
    ///
    /// Missing flags count as inactive; extra flags are ignored.
    pub fn new(events: &[EventSpec], mut active: Vec<bool>) -> Self {
        active.resize(events.len(), false);
        Self {
            events: events.to_vec(),
            active,
        }
    }

    /// Layout with every event inactive.
    pub fn inactive(events: &[EventSpec]) -> Self {
        Self::new(events, vec![false; events.len()])
    }

    /// Layout with every event active.
    pub fn all_active(events: &[EventSpec]) -> Self {
        Self::new(events, vec![true; events.len()])
    }

    /// Declared events, in slot order.
    pub fn events(&self) -> &[EventSpec] {
        &self.events
    }

    /// Number of declared events.
    pub fn declared(&self) -> usize {
        self.events.len()
    }

    /// Number of events that opened.
    pub fn active_count(&self) -> usize {
        self.active.iter().filter(|a| **a).count()
    }

    /// Whether the event in `slot` is being counted.
    pub fn is_active(&self, slot: usize) -> bool {
        self.active.get(slot).copied().unwrap_or(false)
    }

    /// True when every declared event is counted.
    pub fn is_fully_active(&self) -> bool {
        !self.events.is_empty() && self.active_count() == self.declared()
    }

    /// Declared slot of `event`, if it is part of the layout.
    pub fn slot_of(&self, event: &EventSpec) -> Option<usize> {
        self.events.iter().position(|e| e == event)
    }

    /// Number of `u64` words one group read produces.
    pub fn read_len(&self) -> usize {
        match self.active_count() {
            0 => 0,
            n => 2 * n + 1,
        }
    }

    /// Per-declared-slot counter deltas from `start` to `end`.
    ///
    /// Inactive slots, and slots missing from a snapshot, are zero.
    pub fn deltas(&self, start: &Snapshot, end: &Snapshot) -> Vec<u64> {
        let mut out = Vec::with_capacity(self.declared());
        let mut j = 0;
        for slot in 0..self.declared() {
            if !self.is_active(slot) {
                out.push(0);
                continue;
            }
            let idx = 2 * j + 1;
            let delta = match (start.counters().get(idx), end.counters().get(idx)) {
                (Some(s), Some(e)) => e.wrapping_sub(*s),
                _ => 0,
            };
            out.push(delta);
            j += 1;
        }
        out
    }
}

/// Something that can be read as a counter group.
///
/// Implemented by [`CounterGroup`]; tests substitute deterministic fakes.
pub trait CounterSource {
    /// Layout of the counters this source reports.
    fn layout(&self) -> &CounterLayout;

    /// Read all active counters into `buf` (cleared first).
    ///
    /// Leaves `buf` empty when no counter is active.
    fn read_into(&mut self, buf: &mut Vec<u64>) -> MeasurementResult<()>;
}

/// An opened perf_event counter group.
///
/// Created once per process and kept for its lifetime. The descriptors
/// close when the group is dropped.
#[derive(Debug)]
pub struct CounterGroup {
    layout: CounterLayout,
    handles: Vec<Option<File>>,
    leader: Option<usize>,
}

impl CounterGroup {
    /// Open `specs` as one group, skipping counters that cannot be opened.
    ///
    /// Never fails: restricted or virtualized environments simply end up
    /// with fewer (or no) active counters.
    pub fn open(specs: &[EventSpec]) -> Self {
        let mut handles: Vec<Option<File>> = Vec::with_capacity(specs.len());
        let mut leader: Option<usize> = None;

        for spec in specs {
            let group_fd = leader.and_then(|i| handles[i].as_ref());
            match perf::open_counter(spec, group_fd) {
                Ok(file) => {
                    if leader.is_none() {
                        leader = Some(handles.len());
                    }
                    handles.push(Some(file));
                }
                Err(e) => {
                    tracing::warn!(event = spec.name, error = %e, "perf_event_open failed");
                    handles.push(None);
                }
            }
        }

        let active = handles.iter().map(Option::is_some).collect();
        let group = Self {
            layout: CounterLayout::new(specs, active),
            handles,
            leader,
        };

        tracing::info!(
            active = group.active_count(),
            declared = specs.len(),
            "perf counter group initialized"
        );

        group
    }

    /// A group with nothing open. Reads are a no-op.
    pub fn disabled(specs: &[EventSpec]) -> Self {
        Self {
            layout: CounterLayout::inactive(specs),
            handles: specs.iter().map(|_| None).collect(),
            leader: None,
        }
    }

    /// Number of counters that opened.
    pub fn active_count(&self) -> usize {
        self.layout.active_count()
    }

    /// Whether any counter is open.
    pub fn is_present(&self) -> bool {
        self.leader.is_some()
    }
}

impl CounterSource for CounterGroup {
    fn layout(&self) -> &CounterLayout {
        &self.layout
    }

    fn read_into(&mut self, buf: &mut Vec<u64>) -> MeasurementResult<()> {
        buf.clear();
        let Some(mut leader) = self.leader.and_then(|i| self.handles[i].as_ref()) else {
            return Ok(());
        };

        let words = self.layout.read_len();
        let mut bytes = vec![0u8; words * 8];
        let n = leader
            .read(&mut bytes)
            .map_err(MeasurementError::CounterRead)?;
        if n < bytes.len() {
            return Err(MeasurementError::ShortCounterRead {
                expected: bytes.len(),
                actual: n,
            });
        }

        buf.extend(bytes.chunks_exact(8).map(|w| {
            let mut word = [0u8; 8];
            word.copy_from_slice(w);
            u64::from_ne_bytes(word)
        }));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::clock::Timestamp;

    fn snap(counters: Vec<u64>) -> Snapshot {
        Snapshot::new(Timestamp::default(), counters)
    }

    #[test]
    fn test_read_len() {
        assert_eq!(CounterLayout::inactive(&EVENTS).read_len(), 0);
        assert_eq!(CounterLayout::all_active(&EVENTS).read_len(), 5);
        assert_eq!(CounterLayout::new(&EVENTS, vec![false, true]).read_len(), 3);
    }

    #[test]
    fn test_deltas_full_group() {
        let layout = CounterLayout::all_active(&EVENTS);
        let start = snap(vec![2, 100, 7, 1_000, 8]);
        let end = snap(vec![2, 350, 7, 1_600, 8]);
        assert_eq!(layout.deltas(&start, &end), vec![250, 600]);
    }

    #[test]
    fn test_deltas_keep_declared_order_when_leader_missing() {
        // cycles failed, instructions opened: the one value in the read is
        // the instruction count and must land in slot 1.
        let layout = CounterLayout::new(&EVENTS, vec![false, true]);
        let start = snap(vec![1, 40, 9]);
        let end = snap(vec![1, 90, 9]);
        assert_eq!(layout.deltas(&start, &end), vec![0, 50]);
    }

    #[test]
    fn test_deltas_empty_when_absent() {
        let layout = CounterLayout::inactive(&EVENTS);
        assert_eq!(layout.deltas(&snap(vec![]), &snap(vec![])), vec![0, 0]);
    }

    #[test]
    fn test_fully_active() {
        assert!(CounterLayout::all_active(&EVENTS).is_fully_active());
        assert!(!CounterLayout::new(&EVENTS, vec![true, false]).is_fully_active());
        assert!(!CounterLayout::inactive(&EVENTS).is_fully_active());
        assert_eq!(CounterLayout::all_active(&EVENTS).slot_of(&INSTRUCTIONS), Some(1));
    }

    #[test]
    fn test_layout_pads_missing_flags() {
        let layout = CounterLayout::new(&EVENTS, vec![true]);
        assert_eq!(layout.declared(), 2);
        assert!(layout.is_active(0));
        assert!(!layout.is_active(1));
        assert_eq!(layout.read_len(), 3);

        let layout = CounterLayout::new(&EVENTS, vec![true, true, true]);
        assert!(layout.is_fully_active());
        assert_eq!(layout.read_len(), 5);
    }

    #[test]
    fn test_disabled_group_reads_nothing() {
        let mut group = CounterGroup::disabled(&EVENTS);
        let mut buf = vec![1, 2, 3];
        group.read_into(&mut buf).unwrap();
        assert!(buf.is_empty());
        assert_eq!(group.active_count(), 0);
        assert!(!group.is_present());
    }

    #[test]
    fn test_open_degrades_gracefully() {
        // May or may not have perf access here; either way this must not fail.
        let mut group = CounterGroup::open(&EVENTS);
        assert!(group.active_count() <= EVENTS.len());
        let mut buf = Vec::new();
        group.read_into(&mut buf).unwrap();
        assert_eq!(buf.len(), group.layout().read_len());
    }
}
