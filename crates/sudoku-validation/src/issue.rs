use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warn,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "ERROR",
            Severity::Warn => "WARN",
        })
    }
}

/// A single validation finding produced by a stage, rule, or schema check.
/// `code` is a contract, not prose — see spec.md §4.4's taxonomy table.
#[derive(Debug, Clone)]
pub struct Issue {
    pub code: String,
    pub message: String,
    pub path: String,
    pub severity: Severity,
}

impl Issue {
    pub fn error(code: impl Into<String>, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            path: path.into(),
            severity: Severity::Error,
        }
    }

    pub fn warn(code: impl Into<String>, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            path: path.into(),
            severity: Severity::Warn,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Timings {
    pub schema_ms: u64,
    pub invariants_ms: u64,
    pub crossrefs_ms: u64,
}

/// Aggregate result of running the Validation Center.
#[derive(Debug, Clone, Default)]
pub struct Report {
    pub ok: bool,
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
    pub timings: Timings,
}

impl Report {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("validation failed with {} error(s) and {} warning(s)", report.errors.len(), report.warnings.len())]
pub struct ValidationFailed {
    pub report: Report,
}

/// Raise if the report is not `ok`, or if `warn_as_error` is set and any
/// warnings are present.
pub fn assert_valid(report: Report, warn_as_error: bool) -> Result<Report, ValidationFailed> {
    if !report.ok || (warn_as_error && !report.warnings.is_empty()) {
        return Err(ValidationFailed { report });
    }
    Ok(report)
}
