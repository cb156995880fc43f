//! Accumulated, non-fatal diagnostics.
//!
//! Length mismatches under the lenient policy and broken cross-references are
//! recorded here instead of aborting. Each entry is also emitted as a
//! `tracing` event. The caller decides whether accumulated errors block a
//! save.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorLog {
    entries: Vec<Diagnostic>,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a problem the user must fix before exporting.
    pub fn log_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!("{message}");
        self.entries.push(Diagnostic {
            severity: Severity::Error,
            message,
        });
    }

    pub fn log_warning(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{message}");
        self.entries.push(Diagnostic {
            severity: Severity::Warning,
            message,
        });
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Moves every entry of `other` into this log.
    pub fn merge(&mut self, other: ErrorLog) {
        self.entries.extend(other.entries);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    #[traced_test]
    fn entries_are_kept_and_traced() {
        let mut log = ErrorLog::new();
        log.log_warning("bone link 0 child index 7 out of range");
        assert!(!log.has_errors());
        log.log_error("bone link 1 parent unset");
        assert!(log.has_errors());
        assert_eq!(log.warnings().count(), 1);
        assert_eq!(log.entries()[1].severity, Severity::Error);
        assert!(logs_contain("child index 7 out of range"));
        assert!(logs_contain("parent unset"));
    }

    #[test]
    fn merge_appends() {
        let mut a = ErrorLog::new();
        a.log_warning("a");
        let mut b = ErrorLog::new();
        b.log_error("b");
        a.merge(b);
        assert_eq!(a.entries().len(), 2);
        a.clear();
        assert!(a.is_empty());
    }
}
