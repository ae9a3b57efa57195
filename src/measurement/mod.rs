//! Measurement infrastructure.
//!
//! This module provides:
//! - A process CPU-time clock with exact timestamp differences
//! - A perf_event counter group (cycles, instructions) read atomically
//! - Snapshots pairing the two, and the [`Probe`] context that takes them
//!
//! # Counter availability
//!
//! Hardware counters are opened with `perf_event_open(2)` when the `perf`
//! feature is enabled (the default) on Linux. They are strictly optional:
//! without permission, inside most containers and VMs, or on other
//! platforms the group simply has fewer active counters and reports
//! throughput only.
//!
//! ```bash
//! cat /proc/sys/kernel/perf_event_paranoid   # <= 2 is enough
//! ```

mod clock;
mod counters;
mod error;
mod perf;
mod snapshot;

pub use clock::{diff_seconds, Clock, ProcessCpuClock, Timestamp};
pub use counters::{
    CounterGroup, CounterLayout, CounterSource, CounterType, EventSpec, CYCLES, EVENTS,
    INSTRUCTIONS,
};
pub use error::{MeasurementError, MeasurementResult};
pub use perf::open_counter;
pub use snapshot::{Capture, Probe, Snapshot};
