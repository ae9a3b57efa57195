//! Benchmark failure types.

use std::io;

use crate::measurement::MeasurementError;

/// Failure reported by a workload.
///
/// Workload failures are never retried: a validation mismatch or a missing
/// input will not fix itself on the next trial. A failed capture inside
/// [`crate::Trial::restart`] keeps its [`MeasurementError`] and is reported
/// as [`BenchError::Measurement`].
#[derive(Debug)]
pub struct WorkloadError {
    message: String,
    cause: Option<Cause>,
}

#[derive(Debug)]
enum Cause {
    Io(io::Error),
    Measurement(MeasurementError),
}

impl WorkloadError {
    /// A failure described by `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    /// An I/O failure with context.
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self {
            message: context.into(),
            cause: Some(Cause::Io(source)),
        }
    }
}

impl std::fmt::Display for WorkloadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.cause {
            Some(Cause::Io(e)) => write!(f, "{}: {}", self.message, e),
            Some(Cause::Measurement(e)) => write!(f, "{}: {}", self.message, e),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for WorkloadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.cause {
            Some(Cause::Io(e)) => Some(e),
            Some(Cause::Measurement(e)) => Some(e),
            None => None,
        }
    }
}

impl From<MeasurementError> for WorkloadError {
    fn from(err: MeasurementError) -> Self {
        Self {
            message: "restart capture failed".to_string(),
            cause: Some(Cause::Measurement(err)),
        }
    }
}

/// Why a benchmark produced no result.
///
/// Every variant is local to one (workload, input) pair; the driver logs it
/// and moves on to the next pair.
#[derive(Debug)]
pub enum BenchError {
    /// A snapshot could not be taken.
    Measurement(MeasurementError),
    /// The workload reported failure.
    Workload(WorkloadError),
    /// The result line could not be written.
    Output(io::Error),
}

impl std::fmt::Display for BenchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BenchError::Measurement(e) => write!(f, "measurement failed: {}", e),
            BenchError::Workload(e) => write!(f, "workload failed: {}", e),
            BenchError::Output(e) => write!(f, "could not write result: {}", e),
        }
    }
}

impl std::error::Error for BenchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BenchError::Measurement(e) => Some(e),
            BenchError::Workload(e) => Some(e),
            BenchError::Output(e) => Some(e),
        }
    }
}

impl From<MeasurementError> for BenchError {
    fn from(err: MeasurementError) -> Self {
        BenchError::Measurement(err)
    }
}

impl From<WorkloadError> for BenchError {
    fn from(err: WorkloadError) -> Self {
        let WorkloadError { message, cause } = err;
        match cause {
            Some(Cause::Measurement(e)) => BenchError::Measurement(e),
            cause => BenchError::Workload(WorkloadError { message, cause }),
        }
    }
}
