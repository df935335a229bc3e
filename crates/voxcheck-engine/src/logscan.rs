use crate::error::Result;
use log::debug;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Error-keyword configuration: substrings that indicate a failure and
/// whitelisted substrings that suppress an otherwise-matching line
/// (e.g. known benign warnings containing an error-like word).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanConfig {
    #[serde(default)]
    errors: Vec<String>,
    #[serde(default)]
    whitelist: Vec<String>,
}

impl ScanConfig {
    pub fn new(errors: Vec<String>, whitelist: Vec<String>) -> Self {
        Self { errors, whitelist }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&contents)?)
    }
}

/// Flags unexpected error markers in pipeline log output.
pub struct LogScanner {
    errors: Vec<String>,
    whitelist: Vec<String>,
}

/// Lines flagged in one log, plus a rendered context window for
/// diagnostics. Presentation carries no pass/fail semantics beyond
/// "any flagged line ⇒ fail".
#[derive(Debug, Clone)]
pub struct LogScanReport {
    /// Log file under scan.
    pub artifact: String,
    /// 0-based indices of flagged lines.
    pub flagged: Vec<usize>,
    /// Flagged lines with ±2 lines of context, flagged lines marked.
    pub context: Vec<String>,
}

impl LogScanReport {
    pub fn passed(&self) -> bool {
        self.flagged.is_empty()
    }
}

impl LogScanner {
    pub fn new(config: ScanConfig) -> Self {
        // Matching is case-folded once up front.
        Self {
            errors: config.errors.iter().map(|s| s.to_lowercase()).collect(),
            whitelist: config.whitelist.iter().map(|s| s.to_lowercase()).collect(),
        }
    }

    fn line_matches(&self, line: &str) -> bool {
        self.errors.iter().any(|needle| line.contains(needle))
            && !self.whitelist.iter().any(|needle| line.contains(needle))
    }

    /// Indices of lines containing an error substring and no whitelist
    /// substring, case-insensitively. Empty means clean.
    pub fn find_error_lines(&self, lines: &[String]) -> Vec<usize> {
        lines
            .iter()
            .enumerate()
            .filter(|(_, line)| self.line_matches(&line.to_lowercase()))
            .map(|(index, _)| index)
            .collect()
    }

    /// Scan a log and render a ±2-line context window around each
    /// flagged line (1-based line numbers, flagged lines starred).
    pub fn scan(&self, artifact: &str, lines: &[String]) -> LogScanReport {
        let flagged = self.find_error_lines(lines);
        if flagged.is_empty() {
            debug!("no errors found in {}", artifact);
            return LogScanReport {
                artifact: artifact.to_string(),
                flagged,
                context: Vec::new(),
            };
        }

        let mut window: BTreeSet<usize> = BTreeSet::new();
        for &index in &flagged {
            let start = index.saturating_sub(2);
            let end = (index + 2).min(lines.len().saturating_sub(1));
            window.extend(start..=end);
        }

        let context = window
            .into_iter()
            .map(|index| {
                if flagged.contains(&index) {
                    format!("{:*>4}**: {}", index + 1, lines[index])
                } else {
                    format!("{:>4}:   {}", index + 1, lines[index])
                }
            })
            .collect();

        LogScanReport {
            artifact: artifact.to_string(),
            flagged,
            context,
        }
    }
}
