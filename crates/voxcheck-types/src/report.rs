use std::fmt;

/// One tolerance-bounded discrepancy between reference and test.
///
/// Violations are data, not errors: a comparison returning violations
/// still completed normally, and the caller decides pass/fail by
/// checking for emptiness.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// Entity the discrepancy belongs to (label name, measure name, SegId, header field).
    pub entity: String,
    /// Rendered reference-side value.
    pub expected: String,
    /// Rendered test-side value.
    pub actual: String,
    /// Rendered tolerance that was applied.
    pub tolerance: String,
}

impl Violation {
    /// A violation judged against a numeric absolute tolerance.
    pub fn with_tolerance(
        entity: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
        tolerance: f64,
    ) -> Self {
        Self {
            entity: entity.into(),
            expected: expected.into(),
            actual: actual.into(),
            tolerance: tolerance.to_string(),
        }
    }

    /// A violation of an exact-equality property (headers, identity sets).
    pub fn exact(
        entity: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            entity: entity.into(),
            expected: expected.into(),
            actual: actual.into(),
            tolerance: "exact".to_string(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected {}, got {} (tolerance {})",
            self.entity, self.expected, self.actual, self.tolerance
        )
    }
}

/// Outcome of one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    Passed,
    Failed,
    /// Nothing was configured to check; deliberately distinct from Passed and Failed.
    Skipped,
}

/// Result of comparing one artifact: the (possibly empty) ordered list
/// of violations. Order follows reference-table row order or ascending
/// label order, so diagnostics are reproducible.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonReport {
    /// Artifact under comparison (filename or check label).
    pub artifact: String,
    pub violations: Vec<Violation>,
    skipped: bool,
}

impl ComparisonReport {
    pub fn new(artifact: impl Into<String>) -> Self {
        Self {
            artifact: artifact.into(),
            violations: Vec::new(),
            skipped: false,
        }
    }

    /// A report for a check that had nothing configured to verify.
    pub fn skipped(artifact: impl Into<String>) -> Self {
        Self {
            artifact: artifact.into(),
            violations: Vec::new(),
            skipped: true,
        }
    }

    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Append another report's violations, preserving order.
    pub fn merge(&mut self, other: ComparisonReport) {
        self.violations.extend(other.violations);
    }

    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn outcome(&self) -> CheckOutcome {
        if !self.violations.is_empty() {
            CheckOutcome::Failed
        } else if self.skipped {
            CheckOutcome::Skipped
        } else {
            CheckOutcome::Passed
        }
    }
}

impl fmt::Display for ComparisonReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome() {
            CheckOutcome::Passed => write!(f, "{}: ok", self.artifact),
            CheckOutcome::Skipped => write!(f, "{}: nothing to check", self.artifact),
            CheckOutcome::Failed => {
                write!(f, "{}: {} violation(s)", self.artifact, self.violations.len())?;
                for violation in &self.violations {
                    write!(f, "\n  {}", violation)?;
                }
                Ok(())
            }
        }
    }
}
