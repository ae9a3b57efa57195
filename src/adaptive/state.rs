//! Repetition-count state machine.
//!
//! Pure arithmetic over `(repetitions, elapsed, first trial)`; the trial
//! loop in [`super::calibrator`] feeds it one elapsed time per trial.
//!
//! ```text
//!            elapsed < target/2            target/2 <= elapsed < target
//!   Ramping  ───────────────────  m *= 2   Converging  m = max(ceil(m*T*k/e), m+1)
//!
//!   first trial, elapsed >= target   ──►  WarmupDiscard (same m again)
//!   later trial, elapsed >= target   ──►  Done
//! ```

/// Target window and overshoot for calibration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationPolicy {
    /// Minimum CPU time an accepted trial must take, in seconds.
    pub target_secs: f64,
    /// Factor the proportional estimate aims past the target by.
    pub overshoot: f64,
}

impl CalibrationPolicy {
    /// Default overshoot factor.
    pub const DEFAULT_OVERSHOOT: f64 = 1.05;

    /// Policy for `target_secs` with the default overshoot.
    pub fn new(target_secs: f64) -> Self {
        Self {
            target_secs,
            overshoot: Self::DEFAULT_OVERSHOOT,
        }
    }
}

/// Where the calibration currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Far below target; the count doubles.
    Ramping,
    /// Within a factor of two; the count is estimated proportionally.
    Converging,
    /// The first trial already met the target and is being repeated.
    WarmupDiscard,
    /// A trial met the target and is accepted.
    Done,
}

/// What to do after a trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Run another trial with this many repetitions.
    Continue {
        /// Repetitions for the next trial.
        repetitions: u64,
    },
    /// Accept the trial just observed.
    Accept,
}

/// Calibration progress.
#[derive(Debug, Clone)]
pub struct CalibrationState {
    policy: CalibrationPolicy,
    repetitions: u64,
    first_run: bool,
    phase: Phase,
    trials: u64,
}

impl CalibrationState {
    /// Start at one repetition.
    pub fn new(policy: CalibrationPolicy) -> Self {
        Self {
            policy,
            repetitions: 1,
            first_run: true,
            phase: Phase::Ramping,
            trials: 0,
        }
    }

    /// Repetitions for the trial about to run (or the accepted one, once done).
    pub fn repetitions(&self) -> u64 {
        self.repetitions
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Trials observed so far.
    pub fn trials(&self) -> u64 {
        self.trials
    }

    /// Whether a trial has been accepted.
    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    /// Feed the elapsed seconds of the trial that ran at [`Self::repetitions`].
    pub fn observe(&mut self, elapsed: f64) -> Step {
        debug_assert!(!self.is_done(), "observe after accept");

        let target = self.policy.target_secs;
        let first_run = self.first_run;
        self.first_run = false;
        self.trials += 1;

        if elapsed < target {
            let m = self.repetitions;
            if elapsed < target * 0.5 {
                self.repetitions = m.saturating_mul(2);
                self.phase = Phase::Ramping;
            } else {
                let candidate = (m as f64 * target * self.policy.overshoot / elapsed).ceil();
                // `as` saturates, so an absurd estimate clamps to u64::MAX.
                self.repetitions = (candidate as u64).max(m.saturating_add(1));
                self.phase = Phase::Converging;
            }
            return Step::Continue {
                repetitions: self.repetitions,
            };
        }

        if first_run {
            self.phase = Phase::WarmupDiscard;
            return Step::Continue {
                repetitions: self.repetitions,
            };
        }

        self.phase = Phase::Done;
        Step::Accept
    }
}
