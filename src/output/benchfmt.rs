//! Go benchmark format lines.
//!
//! One tab-separated line per benchmark, following
//! <https://golang.org/design/14313-benchmark-format>:
//!
//! ```text
//! BenchmarkRef/en.txt	     12288	162721.52 ns/op	402.72591 MB/s	0.12 cy/B	0.48 ins/B	4 ipc
//! ```
//!
//! Downstream tools (`benchstat` and friends) parse this, so the layout is
//! fixed. Numbers use C `%.8g` rendering.

use crate::result::BenchmarkReport;

/// Significant digits for every floating-point field.
pub const SIGNIFICANT_DIGITS: usize = 8;

/// Render one report as a benchmark line (without trailing newline).
pub fn format_line(report: &BenchmarkReport) -> String {
    let mut line = format!(
        "Benchmark{}/{}\t{:>10}\t{} ns/op\t{} MB/s",
        capitalize(&report.name),
        report.label,
        report.repetitions,
        format_g(report.ns_per_op, SIGNIFICANT_DIGITS),
        format_g(report.mb_per_sec, SIGNIFICANT_DIGITS),
    );

    if let Some(eff) = &report.efficiency {
        line.push_str(&format!(
            "\t{} cy/B\t{} ins/B\t{} ipc",
            format_g(eff.cycles_per_byte, SIGNIFICANT_DIGITS),
            format_g(eff.instructions_per_byte, SIGNIFICANT_DIGITS),
            format_g(eff.ipc, SIGNIFICANT_DIGITS),
        ));
    }

    line
}

/// Marker line for a benchmark that produced no result.
pub fn format_failure(name: &str) -> String {
    format!("FAIL\t{}", name)
}

/// ASCII-upper-case the first character; an empty name becomes a single space.
fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => std::iter::once(first.to_ascii_uppercase()).chain(chars).collect(),
        None => " ".to_string(),
    }
}

/// Format `value` like C's `%.<precision>g`.
///
/// Uses scientific notation when the decimal exponent is below -4 or at
/// least `precision`, fixed notation otherwise, and drops trailing zeros.
pub fn format_g(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return if value.is_sign_negative() { "-nan" } else { "nan" }.to_string();
    }
    if value.is_infinite() {
        return if value < 0.0 { "-inf" } else { "inf" }.to_string();
    }

    let precision = precision.max(1);
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // The exponent after rounding to `precision` digits decides the style.
    let sci = format!("{:.*e}", precision - 1, value);
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exp: i32 = exp.parse().unwrap_or(0);

    if exp < -4 || exp >= precision as i32 {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exp.unsigned_abs())
    } else {
        let decimals = (precision as i32 - 1 - exp).max(0) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
