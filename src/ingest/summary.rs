//! End-of-run summary block

use crate::models::RunReport;

pub const RULE: &str = "============================================================";

/// Lines logged after every run that processed at least one file
pub fn summary_lines(report: &RunReport) -> Vec<String> {
    let verb = if report.dry_run { "Would move" } else { "Moved" };

    vec![
        RULE.to_string(),
        if report.dry_run {
            "RUN SUMMARY (dry run)".to_string()
        } else {
            "RUN SUMMARY".to_string()
        },
        RULE.to_string(),
        format!("Files found: {}", report.found),
        format!("  ✓ {} to Bronze: {}", verb, report.tally.bronze),
        format!("  ✗ {} to Bad Data: {}", verb, report.tally.bad_data),
        format!("  ⚠ Errors: {}", report.tally.errors),
        format!("Duration: {:.2} seconds", report.duration.as_secs_f64()),
        RULE.to_string(),
    ]
}
