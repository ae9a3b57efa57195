//! # cyclebench
//!
//! Self-calibrating micro-benchmark harness.
//!
//! A workload is run with a growing repetition count until one trial takes
//! at least the target amount of process CPU time. The accepted trial is
//! reported as a single Go-benchmark-format line with:
//! - Nanoseconds per repetition
//! - Throughput in MB/s
//! - Cycles per byte, instructions per byte and IPC, when the perf_event
//!   counters for cycles and instructions are both available
//!
//! ## Quick Start
//!
//! ```ignore
//! use cyclebench::{workload, Config, Runner, Trial};
//!
//! let data = vec![0u16; 4096];
//! let mut runner = Runner::new(Config::default());
//! let mut wl = workload::from_fn(|_: &mut Trial<'_>, buf: &[u16], m| {
//!     for _ in 0..m {
//!         std::hint::black_box(checksum(buf));
//!     }
//!     Ok(())
//! });
//!
//! // BenchmarkChecksum/zeros	     ...	... ns/op	... MB/s
//! runner.run_benchmark("checksum", "zeros", &mut wl, &data[..], data.len() * 2)?;
//! ```
//!
//! Counters are optional. Without perf access the harness still runs and
//! simply leaves out the counter columns.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
mod config;
mod error;
mod result;
mod runner;

// Functional modules
pub mod adaptive;
pub mod measurement;
pub mod output;
pub mod utf16;
pub mod workload;

// Re-exports for public API
pub use adaptive::{Calibration, CalibrationPolicy, Calibrator};
pub use config::{Config, ConfigError};
pub use error::{BenchError, WorkloadError};
pub use measurement::{CounterGroup, Probe, Snapshot};
pub use output::{OutputFormat, Reporter};
pub use result::{BenchmarkReport, Efficiency, TrialResult};
pub use runner::Runner;
pub use workload::{Trial, Workload};
