use crate::runner::{CheckResult, RunStatus};
use owo_colors::OwoColorize;
use std::io::Write;

/// Totals across one rendered suite.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl Summary {
    pub fn clean(&self) -> bool {
        self.failed == 0 && self.errors == 0
    }
}

fn status_label(status: RunStatus, color: bool) -> String {
    match (status, color) {
        (RunStatus::Passed, true) => "PASS".green().to_string(),
        (RunStatus::Failed, true) => "FAIL".red().to_string(),
        (RunStatus::Skipped, true) => "SKIP".yellow().to_string(),
        (RunStatus::Error, true) => "ERROR".red().bold().to_string(),
        (RunStatus::Passed, false) => "PASS".to_string(),
        (RunStatus::Failed, false) => "FAIL".to_string(),
        (RunStatus::Skipped, false) => "SKIP".to_string(),
        (RunStatus::Error, false) => "ERROR".to_string(),
    }
}

/// Render one PASS/FAIL/SKIP/ERROR line per check with violation
/// details indented beneath, then the totals line.
pub fn render(results: &[CheckResult], color: bool, out: &mut impl Write) -> std::io::Result<Summary> {
    let mut summary = Summary::default();
    for result in results {
        match result.status {
            RunStatus::Passed => summary.passed += 1,
            RunStatus::Failed => summary.failed += 1,
            RunStatus::Skipped => summary.skipped += 1,
            RunStatus::Error => summary.errors += 1,
        }
        writeln!(
            out,
            "{} {} / {}",
            status_label(result.status, color),
            result.subject,
            result.check
        )?;
        for line in &result.details {
            writeln!(out, "    {}", line)?;
        }
    }
    writeln!(
        out,
        "\n{} passed, {} failed, {} skipped, {} errors",
        summary.passed, summary.failed, summary.skipped, summary.errors
    )?;
    Ok(summary)
}
