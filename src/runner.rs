//! Benchmark orchestration: calibrate, then report.

use std::io::{self, Write};

use crate::adaptive::Calibrator;
use crate::config::Config;
use crate::error::BenchError;
use crate::measurement::{Capture, Clock, CounterGroup, CounterSource, ProcessCpuClock, Probe};
use crate::output::{format_failure, Reporter};
use crate::result::{BenchmarkReport, TrialResult};
use crate::workload::Workload;

/// Entry point for drivers.
///
/// Owns the measurement context and the output sink. Each call to
/// [`Runner::run_benchmark`] is independent: a failure is returned (and
/// logged) and the next benchmark can run normally.
#[derive(Debug)]
pub struct Runner<C = CounterGroup, K = ProcessCpuClock, O = io::Stdout> {
    probe: Probe<C, K>,
    config: Config,
    out: O,
}

impl Runner {
    /// Runner opening the default counter group and printing to stdout.
    pub fn new(config: Config) -> Self {
        Self::with_parts(Probe::open(), config, io::stdout())
    }
}

impl<C: CounterSource, K: Clock, O: Write> Runner<C, K, O> {
    /// Runner from explicit parts.
    pub fn with_parts(probe: Probe<C, K>, config: Config, out: O) -> Self {
        Self { probe, config, out }
    }

    /// Current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The measurement context.
    pub fn probe(&self) -> &Probe<C, K> {
        &self.probe
    }

    /// Consume the runner, returning the output sink.
    pub fn into_output(self) -> O {
        self.out
    }

    /// Calibrate `workload` on `input` and write one result line.
    ///
    /// `name` identifies the workload and `label` the input; `byte_size` is
    /// the number of bytes one repetition processes. On failure nothing but
    /// an optional `FAIL` marker is written.
    pub fn run_benchmark<I, W>(
        &mut self,
        name: &str,
        label: &str,
        workload: &mut W,
        input: &I,
        byte_size: usize,
    ) -> Result<BenchmarkReport, BenchError>
    where
        I: ?Sized,
        W: Workload<I> + ?Sized,
    {
        let result = match self.measure(name, label, workload, input, byte_size) {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(benchmark = name, input = label, error = %e, "benchmark failed");
                if self.config.report_failures {
                    self.write_line(&format_failure(name))?;
                }
                return Err(e);
            }
        };

        let reporter = Reporter::new(self.probe.layout().clone());
        let report = reporter.summarize(&result);
        self.write_line(&reporter.format(&result, self.config.output))?;
        Ok(report)
    }

    fn measure<I, W>(
        &mut self,
        name: &str,
        label: &str,
        workload: &mut W,
        input: &I,
        byte_size: usize,
    ) -> Result<TrialResult, BenchError>
    where
        I: ?Sized,
        W: Workload<I> + ?Sized,
    {
        let calibration = Calibrator::new(&mut self.probe, self.config.policy())
            .calibrate(workload, input, byte_size)?;
        tracing::debug!(
            benchmark = name,
            repetitions = calibration.repetitions,
            trials = calibration.trials,
            "calibrated"
        );
        Ok(TrialResult::new(name, label, byte_size, calibration))
    }

    fn write_line(&mut self, line: &str) -> Result<(), BenchError> {
        writeln!(self.out, "{}", line)
            .and_then(|()| self.out.flush())
            .map_err(BenchError::Output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WorkloadError;
    use crate::measurement::{
        CounterLayout, MeasurementError, MeasurementResult, Timestamp, EVENTS,
    };
    use crate::workload::{self, Trial};
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Clone)]
    struct ManualClock(Rc<Cell<i64>>);

    impl Clock for ManualClock {
        fn now(&self) -> MeasurementResult<Timestamp> {
            Ok(Timestamp::from_nanos(self.0.get()))
        }
    }

    fn runner(clock: &ManualClock, config: Config) -> Runner<CounterGroup, ManualClock, Vec<u8>> {
        Runner::with_parts(
            Probe::with_parts(CounterGroup::disabled(&EVENTS), clock.clone()),
            config,
            Vec::new(),
        )
    }

    #[test]
    fn test_success_writes_one_line() {
        let clock = ManualClock(Rc::new(Cell::new(0)));
        let ticks = clock.0.clone();
        let mut wl = workload::from_fn(move |_: &mut Trial<'_>, _: &[u8], m| {
            ticks.set(ticks.get() + m as i64 * 10_000_000);
            Ok(())
        });

        let mut runner = runner(&clock, Config::default().target_secs(0.5));
        let report = runner
            .run_benchmark("ref", "a.txt", &mut wl, &[0u8; 8][..], 8)
            .unwrap();
        assert!(report.elapsed_secs >= 0.5);

        let out = String::from_utf8(runner.into_output()).unwrap();
        assert_eq!(out.lines().count(), 1);
        assert!(out.starts_with("BenchmarkRef/a.txt\t"));
    }

    #[test]
    fn test_failure_writes_marker_only() {
        let clock = ManualClock(Rc::new(Cell::new(0)));
        let mut wl = workload::from_fn(|_: &mut Trial<'_>, _: &(), _| {
            Err(WorkloadError::new("did not validate"))
        });

        let mut runner = runner(&clock, Config::default());
        let err = runner.run_benchmark("avx512", "b.txt", &mut wl, &(), 2).unwrap_err();
        assert!(matches!(err, BenchError::Workload(_)));
        assert_eq!(String::from_utf8(runner.into_output()).unwrap(), "FAIL\tavx512\n");
    }

    #[test]
    fn test_failure_marker_can_be_disabled() {
        let clock = ManualClock(Rc::new(Cell::new(0)));
        let mut wl = workload::from_fn(|_: &mut Trial<'_>, _: &(), _| {
            Err(WorkloadError::new("boom"))
        });

        let mut runner = runner(&clock, Config::default().report_failures(false));
        assert!(runner.run_benchmark("ref", "c.txt", &mut wl, &(), 2).is_err());
        assert!(runner.into_output().is_empty());
    }

    #[test]
    fn test_layout_reaches_reporter() {
        let clock = ManualClock(Rc::new(Cell::new(0)));
        let runner = runner(&clock, Config::default());
        assert_eq!(runner.probe().layout(), &CounterLayout::inactive(&EVENTS));
    }

    /// Full group that fails exactly its `fail_at`-th read (1-based).
    struct FlakyCounters {
        layout: CounterLayout,
        reads: u32,
        fail_at: u32,
    }

    impl FlakyCounters {
        fn new(fail_at: u32) -> Self {
            Self {
                layout: CounterLayout::all_active(&EVENTS),
                reads: 0,
                fail_at,
            }
        }
    }

    impl CounterSource for FlakyCounters {
        fn layout(&self) -> &CounterLayout {
            &self.layout
        }

        fn read_into(&mut self, buf: &mut Vec<u64>) -> MeasurementResult<()> {
            self.reads += 1;
            if self.reads == self.fail_at {
                return Err(MeasurementError::CounterRead(io::Error::from_raw_os_error(
                    libc::EIO,
                )));
            }
            buf.clear();
            buf.extend([2, 0, 1, 0, 2]);
            Ok(())
        }
    }

    /// Clock that fails on its `fail_at`-th reading and otherwise reads `ticks`.
    struct FlakyClock {
        ticks: Rc<Cell<i64>>,
        calls: Cell<u32>,
        fail_at: u32,
    }

    impl Clock for FlakyClock {
        fn now(&self) -> MeasurementResult<Timestamp> {
            self.calls.set(self.calls.get() + 1);
            if self.calls.get() == self.fail_at {
                return Err(MeasurementError::Clock(io::Error::from_raw_os_error(
                    libc::EINVAL,
                )));
            }
            Ok(Timestamp::from_nanos(self.ticks.get()))
        }
    }

    fn ticking(ticks: &Rc<Cell<i64>>) -> impl Workload<()> {
        let ticks = ticks.clone();
        workload::from_fn(move |_: &mut Trial<'_>, _: &(), m| {
            ticks.set(ticks.get() + m as i64 * 1_000_000);
            Ok(())
        })
    }

    #[test]
    fn test_counter_read_failure_mid_calibration() {
        let clock = ManualClock(Rc::new(Cell::new(0)));
        let mut wl = ticking(&clock.0);

        // Read 4 is the end snapshot of the second trial.
        let mut runner = Runner::with_parts(
            Probe::with_parts(FlakyCounters::new(4), clock),
            Config::default().target_secs(0.1),
            Vec::new(),
        );
        let err = runner.run_benchmark("ref", "a.txt", &mut wl, &(), 64).unwrap_err();
        assert!(matches!(
            err,
            BenchError::Measurement(MeasurementError::CounterRead(_))
        ));
        assert_eq!(String::from_utf8(runner.into_output()).unwrap(), "FAIL\tref\n");
    }

    #[test]
    fn test_clock_failure_mid_calibration() {
        let ticks = Rc::new(Cell::new(0));
        let mut wl = ticking(&ticks);
        let clock = FlakyClock {
            ticks,
            calls: Cell::new(0),
            fail_at: 3,
        };

        let mut runner = Runner::with_parts(
            Probe::with_parts(CounterGroup::disabled(&EVENTS), clock),
            Config::default().target_secs(0.1),
            Vec::new(),
        );
        let err = runner.run_benchmark("ref", "a.txt", &mut wl, &(), 64).unwrap_err();
        assert!(matches!(
            err,
            BenchError::Measurement(MeasurementError::Clock(_))
        ));
        assert_eq!(String::from_utf8(runner.into_output()).unwrap(), "FAIL\tref\n");
    }

    #[test]
    fn test_restart_failure_is_a_measurement_failure() {
        let clock = ManualClock(Rc::new(Cell::new(0)));
        let ticks = clock.0.clone();
        let mut wl = workload::from_fn(move |trial: &mut Trial<'_>, _: &(), m| {
            trial.restart()?;
            ticks.set(ticks.get() + m as i64 * 1_000_000);
            Ok(())
        });

        // Read 1 is the trial start, read 2 the restart inside the workload.
        let mut runner = Runner::with_parts(
            Probe::with_parts(FlakyCounters::new(2), clock),
            Config::default().target_secs(0.1),
            Vec::new(),
        );
        let err = runner.run_benchmark("ref", "a.txt", &mut wl, &(), 64).unwrap_err();
        assert!(matches!(
            err,
            BenchError::Measurement(MeasurementError::CounterRead(_))
        ));
        assert_eq!(String::from_utf8(runner.into_output()).unwrap(), "FAIL\tref\n");
    }

    #[test]
    fn test_runner_continues_after_measurement_failure() {
        let clock = ManualClock(Rc::new(Cell::new(0)));
        let mut wl = ticking(&clock.0);

        let mut runner = Runner::with_parts(
            Probe::with_parts(FlakyCounters::new(4), clock),
            Config::default().target_secs(0.1),
            Vec::new(),
        );
        assert!(runner.run_benchmark("ref", "a.txt", &mut wl, &(), 64).is_err());
        let report = runner.run_benchmark("ref", "a.txt", &mut wl, &(), 64).unwrap();
        assert!(report.elapsed_secs >= 0.1);

        let out = String::from_utf8(runner.into_output()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "FAIL\tref");
        assert!(lines[1].starts_with("BenchmarkRef/a.txt\t"));
    }
}
