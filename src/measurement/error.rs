//! Error types for snapshot capture.

use std::io;

/// Error returned when a clock or counter reading fails.
///
/// Any of these aborts the trial that was being measured. The harness
/// moves on to the next benchmark; a failed capture is never turned into
/// a zero reading, since a fabricated snapshot would corrupt the delta.
#[derive(Debug)]
pub enum MeasurementError {
    /// `clock_gettime(CLOCK_PROCESS_CPUTIME_ID)` failed.
    Clock(io::Error),

    /// `read(2)` on the counter group leader failed.
    ///
    /// Only raised when the group exists. An absent group reads as empty.
    CounterRead(io::Error),

    /// The group read returned fewer bytes than the group layout needs.
    ShortCounterRead {
        /// Bytes the layout requires.
        expected: usize,
        /// Bytes the kernel returned.
        actual: usize,
    },
}

impl std::fmt::Display for MeasurementError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Clock(e) => write!(f, "process CPU clock unavailable: {}", e),
            Self::CounterRead(e) => write!(f, "perf counter group read failed: {}", e),
            Self::ShortCounterRead { expected, actual } => write!(
                f,
                "perf counter group read returned {} bytes, expected {}",
                actual, expected
            ),
        }
    }
}

impl std::error::Error for MeasurementError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Clock(e) | Self::CounterRead(e) => Some(e),
            Self::ShortCounterRead { .. } => None,
        }
    }
}

/// Result type for snapshot capture.
pub type MeasurementResult<T> = Result<T, MeasurementError>;
