//! UTF-16LE validation workloads.
//!
//! The validators here are the reference implementations the harness is
//! usually pointed at; [`Utf16FileWorkload`] wraps one as a file-backed
//! [`Workload`].

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::error::WorkloadError;
use crate::workload::{Trial, Workload};

/// A UTF-16 validator: returns the length, in code units, of the longest
/// valid prefix of its input. Valid input returns its full length.
pub type Validator = fn(&[u16]) -> usize;

/// Validators available to drivers, by benchmark name.
pub const VALIDATORS: &[(&str, Validator)] = &[
    ("ref", validate_utf16le),
    ("std", validate_utf16le_std),
];

/// Scalar validator: surrogates must come in high/low pairs.
pub fn validate_utf16le(units: &[u16]) -> usize {
    let mut i = 0;
    while i < units.len() {
        match units[i] {
            0xD800..=0xDBFF => match units.get(i + 1) {
                Some(&lo) if (0xDC00..=0xDFFF).contains(&lo) => i += 2,
                _ => return i,
            },
            0xDC00..=0xDFFF => return i,
            _ => i += 1,
        }
    }
    i
}

/// Validator built on [`char::decode_utf16`].
pub fn validate_utf16le_std(units: &[u16]) -> usize {
    let mut valid = 0;
    for c in char::decode_utf16(units.iter().copied()) {
        match c {
            Ok(c) => valid += c.len_utf16(),
            Err(_) => break,
        }
    }
    valid
}

/// Benchmarks a validator over the contents of a file.
///
/// Each trial reads `byte_size` bytes from the file, restarts the
/// measurement so the I/O is not timed, then validates the buffer
/// `repetitions` times. A file that did not validate is logged, not failed.
#[derive(Debug, Clone, Copy)]
pub struct Utf16FileWorkload {
    validate: Validator,
}

impl Utf16FileWorkload {
    /// Workload running `validate`.
    pub fn new(validate: Validator) -> Self {
        Self { validate }
    }
}

impl Workload<Path> for Utf16FileWorkload {
    fn run(
        &mut self,
        trial: &mut Trial<'_>,
        path: &Path,
        repetitions: u64,
    ) -> Result<(), WorkloadError> {
        let units = load_units(path, trial.byte_size())?;

        trial.restart()?;

        let mut sum: u64 = 0;
        for _ in 0..repetitions {
            let valid = (self.validate)(std::hint::black_box(&units));
            sum = sum.wrapping_add(std::hint::black_box(valid) as u64);
        }

        if sum != (units.len() as u64).wrapping_mul(repetitions) {
            tracing::warn!(input = %path.display(), "did not validate");
        }

        Ok(())
    }
}

/// Read exactly `n` bytes from `path` as little-endian code units.
fn load_units(path: &Path, n: usize) -> Result<Vec<u16>, WorkloadError> {
    let mut file =
        File::open(path).map_err(|e| WorkloadError::io(path.display().to_string(), e))?;

    let mut bytes = Vec::with_capacity(n);
    let got = (&mut file)
        .take(n as u64)
        .read_to_end(&mut bytes)
        .map_err(|e| WorkloadError::io(path.display().to_string(), e))?;
    if got < n {
        return Err(WorkloadError::io(
            path.display().to_string(),
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("file shorter than expected ({} B < {} B)", got, n),
            ),
        ));
    }

    Ok(bytes
        .chunks_exact(2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
        .collect())
}
