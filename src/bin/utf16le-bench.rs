//! Benchmark UTF-16LE validators against files.
//!
//! # Usage
//!
//! ```bash
//! utf16le-bench corpus/*.txt
//! utf16le-bench --time-goal 0.5 --json corpus/en.txt > results.jsonl
//! RUST_LOG=cyclebench=debug utf16le-bench corpus/en.txt   # trace calibration
//! ```
//!
//! Results go to stdout in Go benchmark format; diagnostics go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cyclebench::output::OutputFormat;
use cyclebench::utf16::{Utf16FileWorkload, VALIDATORS};
use cyclebench::{Config, Runner};

/// Measure UTF-16LE validation throughput and efficiency
#[derive(Parser, Debug)]
#[command(name = "utf16le-bench")]
#[command(version)]
struct Args {
    /// Input files, each validated as one buffer
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// CPU seconds each benchmark must run for (overrides CYCLEBENCH_TIME_GOAL)
    #[arg(long)]
    time_goal: Option<f64>,

    /// Emit JSON Lines instead of Go benchmark format
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = Config::default().from_env();
    if let Some(secs) = args.time_goal {
        config = config.target_secs(secs);
    }
    if args.json {
        config = config.output(OutputFormat::Json);
    }
    if let Err(e) = config.validate() {
        eprintln!("utf16le-bench: {}", e);
        return ExitCode::FAILURE;
    }

    let mut runner = Runner::new(config);

    for path in &args.files {
        let len = match std::fs::metadata(path) {
            Ok(meta) => usize::try_from(meta.len()).unwrap_or(usize::MAX),
            Err(e) => {
                tracing::error!(input = %path.display(), error = %e, "skipping input");
                continue;
            }
        };
        let label = path.display().to_string();

        for (name, validate) in VALIDATORS {
            let mut workload = Utf16FileWorkload::new(*validate);
            // Failures are already logged and marked in the output.
            let _ = runner.run_benchmark(name, &label, &mut workload, path.as_path(), len);
        }
    }

    ExitCode::SUCCESS
}
