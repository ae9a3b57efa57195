//! The calibration trial loop.

use crate::error::BenchError;
use crate::measurement::{Capture, Snapshot};
use crate::workload::{Trial, Workload};

use super::state::{CalibrationPolicy, CalibrationState, Step};

/// Outcome of a converged calibration.
#[derive(Debug, Clone)]
pub struct Calibration {
    /// Repetitions of the accepted trial.
    pub repetitions: u64,
    /// Snapshot at the start of the accepted trial.
    pub start: Snapshot,
    /// Snapshot at the end of the accepted trial.
    pub end: Snapshot,
    /// Trials run, including discarded ones.
    pub trials: u64,
}

impl Calibration {
    /// CPU seconds of the accepted trial.
    pub fn elapsed_secs(&self) -> f64 {
        self.start.seconds_until(&self.end)
    }
}

/// Runs a workload with growing repetition counts until one trial fills
/// the target window.
pub struct Calibrator<'p> {
    probe: &'p mut dyn Capture,
    policy: CalibrationPolicy,
}

impl<'p> Calibrator<'p> {
    /// Calibrator measuring through `probe`.
    pub fn new(probe: &'p mut dyn Capture, policy: CalibrationPolicy) -> Self {
        Self { probe, policy }
    }

    /// Calibrate `workload` on `input`.
    ///
    /// Returns the first trial, other than the very first one, whose CPU
    /// time reaches the target. A capture or workload failure aborts the
    /// whole calibration; nothing from earlier trials is returned.
    pub fn calibrate<I, W>(
        &mut self,
        workload: &mut W,
        input: &I,
        byte_size: usize,
    ) -> Result<Calibration, BenchError>
    where
        I: ?Sized,
        W: Workload<I> + ?Sized,
    {
        let mut state = CalibrationState::new(self.policy);

        loop {
            let repetitions = state.repetitions();

            let start = self.probe.capture()?;
            let mut trial = Trial::new(&mut *self.probe, start, byte_size);
            workload.run(&mut trial, input, repetitions)?;
            let start = trial.into_start();
            let end = self.probe.capture()?;

            let elapsed = start.seconds_until(&end);
            let step = state.observe(elapsed);
            tracing::debug!(
                repetitions,
                elapsed,
                phase = ?state.phase(),
                "calibration trial"
            );

            if step == Step::Accept {
                return Ok(Calibration {
                    repetitions,
                    start,
                    end,
                    trials: state.trials(),
                });
            }
        }
    }
}
