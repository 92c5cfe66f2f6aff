//! Handler for a validation run.
//!
//! Merges command-line options over the configuration file, runs the
//! pipeline and prints either streamed messages or a table followed by the
//! summary counters.

use crate::config::{Config, load_config};
use crate::error::{Result, ValidatorError};
use crate::validator::formatter::{
    ReportOptions, TableReport, format_outcome, format_summary,
};
use crate::validator::{
    ContentValidator, KustomizeExecutor, PipelineOptions, RunSummary, run_pipeline,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Options for a validation run. Unset fields fall back to the config file.
#[derive(Debug, Clone, Default)]
pub struct ValidateOptions {
    /// Directory to search
    pub path: PathBuf,
    /// Explicit configuration file
    pub config: Option<PathBuf>,
    /// Check expressions; replaces the configured list when non-empty
    pub checks: Vec<String>,
    pub timeout_secs: Option<u64>,
    pub jobs: Option<usize>,
    pub kustomize_bin: Option<PathBuf>,
    pub verbose: bool,
    pub errors_only: bool,
    pub table: bool,
    pub color: bool,
}

impl ValidateOptions {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            color: true,
            ..Default::default()
        }
    }
}

/// Effective settings after merging options over configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub checks: Vec<String>,
    pub timeout: Option<Duration>,
    pub max_parallel: Option<usize>,
    pub binary: PathBuf,
    pub args: Vec<String>,
    pub report: ReportSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSettings {
    pub verbose: bool,
    pub errors_only: bool,
    pub table: bool,
    pub color: bool,
}

/// Command line wins over the config file, which wins over defaults.
pub fn resolve_settings(options: &ValidateOptions, config: Config) -> Settings {
    let checks = if options.checks.is_empty() {
        config.checks
    } else {
        options.checks.clone()
    };
    let timeout_secs = options.timeout_secs.unwrap_or(config.timeout_secs);
    let jobs = options.jobs.unwrap_or(config.jobs);

    Settings {
        checks,
        timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
        max_parallel: (jobs > 0).then_some(jobs),
        binary: options
            .kustomize_bin
            .clone()
            .unwrap_or_else(|| PathBuf::from(config.kustomize.binary)),
        args: config.kustomize.args,
        report: ReportSettings {
            verbose: options.verbose || config.output.verbose,
            errors_only: options.errors_only || config.output.errors_only,
            table: options.table || config.output.table,
            color: options.color,
        },
    }
}

/// Run a validation and print the report. Returns whether the run passed.
pub async fn handle_validate(options: ValidateOptions) -> Result<bool> {
    let root = options.path.clone();
    check_root(&root)?;

    let config = load_config(options.config.as_deref(), &root)?;
    let settings = resolve_settings(&options, config);
    log::info!(
        "validating {} with checks {:?}",
        root.display(),
        settings.checks
    );

    // Relative roots are reported relative to where they were given.
    let base_dir = if root.is_absolute() {
        std::env::current_dir()?
    } else {
        PathBuf::from(".")
    };

    let executor = KustomizeExecutor::new()
        .with_binary(settings.binary.clone())
        .with_args(settings.args.clone());
    let validator = ContentValidator::new(settings.checks.as_slice());
    let pipeline = PipelineOptions::new(&base_dir)
        .with_timeout(settings.timeout)
        .with_max_parallel(settings.max_parallel);

    let report = settings.report;
    let plain = ReportOptions {
        errors_only: report.errors_only,
        verbose: report.verbose,
        color: report.color,
    };
    let mut table = report.table.then(|| TableReport::new(&base_dir));

    println!("Validating Kustomization files {}", root.display());

    let summary: RunSummary = run_pipeline(
        &root,
        Arc::new(executor),
        &validator,
        &pipeline,
        interrupted(),
        |outcome| match table.as_mut() {
            Some(table) => table.add_outcome(outcome),
            None => print!("{}", format_outcome(outcome, &plain)),
        },
    )
    .await;

    if let Some(table) = &table {
        print!("{}", table.render());
    }
    print!("{}", format_summary(&summary, report.color));

    Ok(summary.passed())
}

fn check_root(root: &Path) -> Result<()> {
    let metadata = std::fs::metadata(root).map_err(|e| ValidatorError::RootInaccessible {
        path: root.to_path_buf(),
        reason: e.to_string(),
    })?;
    if !metadata.is_dir() {
        return Err(ValidatorError::RootInaccessible {
            path: root.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }
    Ok(())
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::debug!("Ctrl-C handler unavailable: {}", e);
        std::future::pending::<()>().await;
    }
}
