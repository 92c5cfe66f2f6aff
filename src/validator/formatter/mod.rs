//! Output formatters for validation runs.
//!
//! Everything here is a pure function of its inputs: callers pass whether
//! colour is wanted rather than relying on process-wide switches.

pub mod plain;
pub mod table;

use colored::Colorize;
use std::fmt;

pub use plain::{ReportOptions, format_outcome, format_summary, format_violation};
pub use table::TableReport;

/// Tag attached to a report line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Ok,
    Info,
    Warning,
    Error,
    /// Untagged; the message is printed as-is.
    Unknown,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Unknown => "UNKNOWN",
        }
    }

    fn paint(&self, text: &str) -> String {
        match self {
            Self::Ok => text.green().to_string(),
            Self::Info => text.blue().to_string(),
            Self::Warning => text.yellow().to_string(),
            Self::Error => text.red().to_string(),
            Self::Unknown => text.to_string(),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Format one report line: `[TAG]: message\n`, or just `message\n` for
/// [`Severity::Unknown`].
pub fn tagged(severity: Severity, message: &str, color: bool) -> String {
    if severity == Severity::Unknown {
        return format!("{}\n", message);
    }
    let tag = if color {
        severity.paint(severity.as_str())
    } else {
        severity.as_str().to_string()
    };
    format!("[{}]: {}\n", tag, message)
}

/// Optionally colour a bare value (summary counters).
pub(crate) fn paint(severity: Severity, text: &str, color: bool) -> String {
    if color {
        severity.paint(text)
    } else {
        text.to_string()
    }
}
