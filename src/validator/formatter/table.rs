//! Tabular resource report.

use crate::validator::parser::relative_path;
use crate::validator::validate::BuildOutcome;
use prettytable::{Table, format, row};
use std::path::{Path, PathBuf};

/// Column titles, in order.
pub const COLUMNS: [&str; 6] = [
    "Relative path",
    "ApiVersion",
    "Kind",
    "Name",
    "Namespace",
    "Validation error",
];

/// Accumulates one row per resource (or per failed build) and renders them
/// as a single table.
pub struct TableReport {
    base_dir: PathBuf,
    table: Table,
    rows: usize,
}

impl TableReport {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row![
            COLUMNS[0], COLUMNS[1], COLUMNS[2], COLUMNS[3], COLUMNS[4], COLUMNS[5]
        ]);
        Self {
            base_dir: base_dir.into(),
            table,
            rows: 0,
        }
    }

    /// Add rows for one build directory.
    pub fn add_outcome(&mut self, outcome: &BuildOutcome) {
        if let Some(err) = &outcome.result.error {
            let path = self.display_path(&outcome.result.path);
            self.table
                .add_row(row![path, "", "", "", "", format!("build failed: {}", err)]);
            self.rows += 1;
            return;
        }

        for resource in &outcome.resources {
            let error = outcome
                .violations
                .find_for(resource)
                .map(|v| v.to_string())
                .unwrap_or_default();
            self.table.add_row(row![
                resource.source_path.display(),
                resource.api_version,
                resource.kind,
                resource.name,
                resource.namespace,
                error
            ]);
            self.rows += 1;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    /// Render the table, or an empty string when there are no rows.
    pub fn render(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        self.table.to_string()
    }

    fn display_path(&self, path: &Path) -> String {
        relative_path(path, &self.base_dir)
            .unwrap_or_else(|| path.to_path_buf())
            .display()
            .to_string()
    }
}
