//! Result reporting.

pub mod benchfmt;
pub mod json;

use crate::measurement::{CounterLayout, CYCLES, INSTRUCTIONS};
use crate::result::{BenchmarkReport, Efficiency, TrialResult};

pub use benchfmt::{format_failure, format_g, format_line};

/// Output style for result lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Go benchmark format, one tab-separated line per benchmark.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Turns converged trials into report lines.
///
/// Holds the counter layout so it knows which counter columns are
/// trustworthy: efficiency figures are printed only when every declared
/// counter was active.
#[derive(Debug, Clone)]
pub struct Reporter {
    layout: CounterLayout,
}

impl Reporter {
    /// Reporter for snapshots taken with `layout`.
    pub fn new(layout: CounterLayout) -> Self {
        Self { layout }
    }

    /// Compute the derived numbers for `result`.
    pub fn summarize(&self, result: &TrialResult) -> BenchmarkReport {
        let elapsed = result.elapsed_secs();
        let m = result.repetitions as f64;
        let n = result.byte_size as f64;

        BenchmarkReport {
            name: result.name.clone(),
            label: result.label.clone(),
            bytes: result.byte_size as u64,
            repetitions: result.repetitions,
            elapsed_secs: elapsed,
            ns_per_op: (elapsed * 1e9) / m,
            mb_per_sec: (1e-6 * n * m) / elapsed,
            efficiency: self.efficiency(result),
        }
    }

    fn efficiency(&self, result: &TrialResult) -> Option<Efficiency> {
        if !self.layout.is_fully_active() {
            return None;
        }
        let counts = self.layout.deltas(&result.start, &result.end);
        let cycles = counts[self.layout.slot_of(&CYCLES)?] as f64;
        let instructions = counts[self.layout.slot_of(&INSTRUCTIONS)?] as f64;
        let units = result.byte_size as f64 * result.repetitions as f64;

        Some(Efficiency {
            cycles_per_byte: cycles / units,
            instructions_per_byte: instructions / units,
            ipc: instructions / cycles,
        })
    }

    /// Render `result` in the given format.
    pub fn format(&self, result: &TrialResult, format: OutputFormat) -> String {
        let report = self.summarize(result);
        match format {
            OutputFormat::Text => format_line(&report),
            OutputFormat::Json => json::to_json(&report).unwrap_or_else(|e| {
                tracing::error!(error = %e, "could not serialize report");
                format_line(&report)
            }),
        }
    }
}
