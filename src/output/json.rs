//! JSON Lines output of benchmark reports.

use crate::result::BenchmarkReport;

/// Serialize a report to a single-line JSON string.
pub fn to_json(report: &BenchmarkReport) -> Result<String, serde_json::Error> {
    serde_json::to_string(report)
}
