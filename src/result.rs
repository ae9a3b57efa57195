//! Benchmark results.

use serde::{Deserialize, Serialize};

use crate::adaptive::Calibration;
use crate::measurement::Snapshot;

/// A converged measurement, ready to be reported.
#[derive(Debug, Clone)]
pub struct TrialResult {
    /// Workload name.
    pub name: String,
    /// Input label (typically a file name).
    pub label: String,
    /// Size in bytes of one logical unit of input.
    pub byte_size: usize,
    /// Repetitions of the accepted trial.
    pub repetitions: u64,
    /// Snapshot at the start of the accepted trial.
    pub start: Snapshot,
    /// Snapshot at the end of the accepted trial.
    pub end: Snapshot,
}

impl TrialResult {
    /// Result of `calibration` for the named workload and input.
    pub fn new(
        name: impl Into<String>,
        label: impl Into<String>,
        byte_size: usize,
        calibration: Calibration,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            byte_size,
            repetitions: calibration.repetitions,
            start: calibration.start,
            end: calibration.end,
        }
    }

    /// CPU seconds of the accepted trial.
    pub fn elapsed_secs(&self) -> f64 {
        self.start.seconds_until(&self.end)
    }
}

/// Derived numbers for one benchmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    /// Workload name.
    pub name: String,
    /// Input label.
    pub label: String,
    /// Bytes processed per repetition.
    pub bytes: u64,
    /// Repetitions of the accepted trial.
    pub repetitions: u64,
    /// CPU seconds of the accepted trial.
    pub elapsed_secs: f64,
    /// Nanoseconds per repetition.
    pub ns_per_op: f64,
    /// Throughput in MB/s (10^6 bytes per second).
    pub mb_per_sec: f64,
    /// Counter-derived metrics; present only when every counter was active.
    pub efficiency: Option<Efficiency>,
}

/// Hardware-counter-derived efficiency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Efficiency {
    /// CPU cycles per input byte.
    pub cycles_per_byte: f64,
    /// Retired instructions per input byte.
    pub instructions_per_byte: f64,
    /// Retired instructions per cycle.
    pub ipc: f64,
}
