//! Adaptive repetition-count calibration.
//!
//! A benchmark is only meaningful once a single trial runs long enough to
//! swamp timer granularity and per-trial overhead. Calibration starts at
//! one repetition, doubles while far below the target window, then jumps
//! proportionally (aiming 5% past the target) until a trial lands in it.
//!
//! The very first trial is never reported, even when it already meets the
//! target: it carries one-time costs such as page faults and cold caches.

mod calibrator;
mod state;

pub use calibrator::{Calibration, Calibrator};
pub use state::{CalibrationPolicy, CalibrationState, Phase, Step};
