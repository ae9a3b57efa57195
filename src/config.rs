//! Configuration for benchmark runs.

use std::env;

use crate::adaptive::CalibrationPolicy;
use crate::output::OutputFormat;

/// Configuration options for [`crate::Runner`].
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// CPU seconds an accepted trial must take (default: 2.0).
    pub target_secs: f64,

    /// Factor the proportional estimate aims past the target by (default: 1.05).
    pub overshoot: f64,

    /// Style of result lines (default: Go benchmark text).
    pub output: OutputFormat,

    /// Write a `FAIL\t<name>` line when a benchmark fails (default: true).
    pub report_failures: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_secs: 2.0,
            overshoot: CalibrationPolicy::DEFAULT_OVERSHOOT,
            output: OutputFormat::Text,
            report_failures: true,
        }
    }
}

/// Rejected configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Target must be a positive, finite number of seconds.
    InvalidTarget(f64),
    /// Overshoot must be finite and at least 1.0.
    InvalidOvershoot(f64),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidTarget(v) => {
                write!(f, "target time must be positive and finite, got {}", v)
            }
            ConfigError::InvalidOvershoot(v) => {
                write!(f, "overshoot must be finite and >= 1.0, got {}", v)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Set the target trial time in seconds.
    pub fn target_secs(mut self, secs: f64) -> Self {
        self.target_secs = secs;
        self
    }

    /// Set the overshoot factor.
    pub fn overshoot(mut self, factor: f64) -> Self {
        self.overshoot = factor;
        self
    }

    /// Set the output format.
    pub fn output(mut self, output: OutputFormat) -> Self {
        self.output = output;
        self
    }

    /// Enable or disable `FAIL` lines.
    pub fn report_failures(mut self, enabled: bool) -> Self {
        self.report_failures = enabled;
        self
    }

    /// Merge configuration from environment variables.
    ///
    /// - `CYCLEBENCH_TIME_GOAL`: target seconds
    /// - `CYCLEBENCH_OVERSHOOT`: overshoot factor
    /// - `CYCLEBENCH_OUTPUT`: `text` or `json`
    /// - `CYCLEBENCH_REPORT_FAILURES`: `0`/`false` to suppress `FAIL` lines
    ///
    /// Unparseable values are ignored.
    pub fn from_env(mut self) -> Self {
        if let Some(secs) = parse_f64_env("CYCLEBENCH_TIME_GOAL") {
            self = self.target_secs(secs);
        }
        if let Some(factor) = parse_f64_env("CYCLEBENCH_OVERSHOOT") {
            self = self.overshoot(factor);
        }
        if let Some(output) = parse_output_env("CYCLEBENCH_OUTPUT") {
            self = self.output(output);
        }
        if let Some(enabled) = parse_bool_env("CYCLEBENCH_REPORT_FAILURES") {
            self = self.report_failures(enabled);
        }
        self
    }

    /// Check that the values can drive a calibration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.target_secs.is_finite() || self.target_secs <= 0.0 {
            return Err(ConfigError::InvalidTarget(self.target_secs));
        }
        if !self.overshoot.is_finite() || self.overshoot < 1.0 {
            return Err(ConfigError::InvalidOvershoot(self.overshoot));
        }
        Ok(())
    }

    /// The calibration policy these settings describe.
    pub fn policy(&self) -> CalibrationPolicy {
        CalibrationPolicy {
            target_secs: self.target_secs,
            overshoot: self.overshoot,
        }
    }
}

fn parse_f64_env(key: &str) -> Option<f64> {
    env::var(key).ok()?.parse().ok()
}

fn parse_output_env(key: &str) -> Option<OutputFormat> {
    match env::var(key).ok()?.to_ascii_lowercase().as_str() {
        "text" => Some(OutputFormat::Text),
        "json" => Some(OutputFormat::Json),
        _ => None,
    }
}

fn parse_bool_env(key: &str) -> Option<bool> {
    match env::var(key).ok()?.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}
