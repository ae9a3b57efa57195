//! Process CPU-time clock.
//!
//! Benchmarks are timed against `CLOCK_PROCESS_CPUTIME_ID` rather than a
//! wall clock, so time the scheduler hands to unrelated processes does not
//! show up in the measurement.

use std::io;

use super::error::{MeasurementError, MeasurementResult};

const NANOS_PER_SEC: i64 = 1_000_000_000;

/// A point on a clock, split the way `struct timespec` splits it.
///
/// `nanos` is expected in `0..1_000_000_000`, but [`diff_seconds`] does not
/// depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp {
    /// Whole seconds.
    pub secs: i64,
    /// Nanoseconds within the second.
    pub nanos: i64,
}

impl Timestamp {
    /// Create a timestamp from its parts.
    pub const fn new(secs: i64, nanos: i64) -> Self {
        Self { secs, nanos }
    }

    /// Create a normalized timestamp from a nanosecond count.
    pub const fn from_nanos(total: i64) -> Self {
        Self {
            secs: total.div_euclid(NANOS_PER_SEC),
            nanos: total.rem_euclid(NANOS_PER_SEC),
        }
    }
}

/// Seconds from `start` to `end`, with nanosecond precision.
///
/// The nanosecond component borrows from the seconds component when it
/// underflows, so `{1s, 900ms}` to `{2s, 100ms}` is `0.2`. The result is
/// formed from an exact integer nanosecond count, which keeps
/// `diff_seconds(a, b) == -diff_seconds(b, a)` bit for bit.
pub fn diff_seconds(start: Timestamp, end: Timestamp) -> f64 {
    let mut secs = end.secs as i128 - start.secs as i128;
    let mut nanos = end.nanos as i128 - start.nanos as i128;
    if nanos < 0 {
        secs -= 1;
        nanos += NANOS_PER_SEC as i128;
    }

    (secs * NANOS_PER_SEC as i128 + nanos) as f64 / 1e9
}

/// Source of timestamps for snapshots.
pub trait Clock {
    /// Read the clock.
    fn now(&self) -> MeasurementResult<Timestamp>;
}

/// CPU time consumed by this process, from `clock_gettime(2)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessCpuClock;

impl Clock for ProcessCpuClock {
    #[inline]
    fn now(&self) -> MeasurementResult<Timestamp> {
        let mut ts = libc::timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };
        // SAFETY: `ts` is a valid, writable timespec.
        let res = unsafe { libc::clock_gettime(libc::CLOCK_PROCESS_CPUTIME_ID, &mut ts) };
        if res == -1 {
            return Err(MeasurementError::Clock(io::Error::last_os_error()));
        }

        Ok(Timestamp::new(ts.tv_sec as i64, ts.tv_nsec as i64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_borrows_across_second_boundary() {
        let start = Timestamp::new(1, 900_000_000);
        let end = Timestamp::new(2, 100_000_000);
        assert_eq!(diff_seconds(start, end), 0.2);
        assert_eq!(diff_seconds(end, start), -0.2);
    }

    #[test]
    fn test_diff_same_second() {
        let start = Timestamp::new(5, 250_000_000);
        let end = Timestamp::new(5, 750_000_000);
        assert_eq!(diff_seconds(start, end), 0.5);
        assert_eq!(diff_seconds(start, start), 0.0);
    }

    #[test]
    fn test_from_nanos_normalizes() {
        assert_eq!(Timestamp::from_nanos(2_100_000_000), Timestamp::new(2, 100_000_000));
        assert_eq!(Timestamp::from_nanos(-1), Timestamp::new(-1, 999_999_999));
    }

    #[test]
    fn test_process_clock_advances() {
        let clock = ProcessCpuClock;
        let a = clock.now().unwrap();
        let mut sum = 0u64;
        for i in 0..200_000u64 {
            sum = sum.wrapping_add(std::hint::black_box(i));
        }
        std::hint::black_box(sum);
        let b = clock.now().unwrap();
        assert!(diff_seconds(a, b) >= 0.0);
    }
}
