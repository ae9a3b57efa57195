//! The workload contract.
//!
//! A workload performs `repetitions` applications of the operation under
//! test against one input. It receives the [`Trial`] it runs in, which lets
//! it push its own setup out of the timed region:
//!
//! ```ignore
//! use cyclebench::workload::{self, Trial};
//!
//! let mut validate = workload::from_fn(|trial: &mut Trial<'_>, path: &Path, m| {
//!     let data = std::fs::read(path).map_err(|e| WorkloadError::io("read", e))?;
//!     trial.restart()?; // file I/O is not part of the measurement
//!     for _ in 0..m {
//!         black_box(check(&data));
//!     }
//!     Ok(())
//! });
//! ```

use std::marker::PhantomData;

use crate::error::WorkloadError;
use crate::measurement::{Capture, MeasurementResult, Snapshot};

/// One measured run of a workload.
pub struct Trial<'a> {
    probe: &'a mut dyn Capture,
    start: Snapshot,
    byte_size: usize,
}

impl<'a> Trial<'a> {
    pub(crate) fn new(probe: &'a mut dyn Capture, start: Snapshot, byte_size: usize) -> Self {
        Self {
            probe,
            start,
            byte_size,
        }
    }

    /// Size in bytes of one logical unit of input.
    pub fn byte_size(&self) -> usize {
        self.byte_size
    }

    /// Retake the start snapshot, excluding everything done so far.
    pub fn restart(&mut self) -> MeasurementResult<()> {
        self.start = self.probe.capture()?;
        Ok(())
    }

    /// The snapshot the trial is currently measured from.
    pub fn start(&self) -> &Snapshot {
        &self.start
    }

    pub(crate) fn into_start(self) -> Snapshot {
        self.start
    }
}

/// Something that can be benchmarked against inputs of type `I`.
pub trait Workload<I: ?Sized> {
    /// Apply the operation `repetitions` times to `input`.
    fn run(&mut self, trial: &mut Trial<'_>, input: &I, repetitions: u64)
        -> Result<(), WorkloadError>;
}

impl<I: ?Sized, W: Workload<I> + ?Sized> Workload<I> for &mut W {
    fn run(
        &mut self,
        trial: &mut Trial<'_>,
        input: &I,
        repetitions: u64,
    ) -> Result<(), WorkloadError> {
        (**self).run(trial, input, repetitions)
    }
}

/// Workload backed by a closure. See [`from_fn`].
pub struct FnWorkload<F, I: ?Sized> {
    f: F,
    _input: PhantomData<fn(&I)>,
}

/// Wrap a closure as a [`Workload`].
pub fn from_fn<I, F>(f: F) -> FnWorkload<F, I>
where
    I: ?Sized,
    F: FnMut(&mut Trial<'_>, &I, u64) -> Result<(), WorkloadError>,
{
    FnWorkload {
        f,
        _input: PhantomData,
    }
}

impl<I, F> Workload<I> for FnWorkload<F, I>
where
    I: ?Sized,
    F: FnMut(&mut Trial<'_>, &I, u64) -> Result<(), WorkloadError>,
{
    fn run(
        &mut self,
        trial: &mut Trial<'_>,
        input: &I,
        repetitions: u64,
    ) -> Result<(), WorkloadError> {
        (self.f)(trial, input, repetitions)
    }
}
