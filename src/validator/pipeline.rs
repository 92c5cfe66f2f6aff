//! Discovery → build → parse → validate, bounded by a deadline.
//!
//! The consumer reads build results as they arrive and stops early when the
//! deadline passes or the caller's interrupt future resolves. Stopping shuts
//! the discovery stream down, which kills any builds still running before
//! [`run_pipeline`] returns.

use crate::validator::kustomize::BuildExecutor;
use crate::validator::validate::{BuildOutcome, ContentValidator};
use crate::validator::walker::{DiscoverOptions, discover};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Default time allowed for all builds to report.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Settings for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Directory resource paths are reported relative to.
    pub base_dir: PathBuf,
    /// Stop consuming after this long; `None` waits for every build.
    pub timeout: Option<Duration>,
    pub discover: DiscoverOptions,
}

impl PipelineOptions {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            timeout: Some(DEFAULT_TIMEOUT),
            discover: DiscoverOptions::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_parallel(mut self, max_parallel: Option<usize>) -> Self {
        self.discover.max_parallel = max_parallel;
        self
    }
}

/// Why consumption stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Every scheduled build reported.
    Finished,
    /// The deadline passed first.
    TimedOut,
    /// The interrupt future resolved first.
    Interrupted,
}

/// Counters for a pipeline run. Independent of result arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Builds scheduled but not reported when consumption stopped.
    pub abandoned: usize,
    pub completion: Completion,
}

impl Default for RunSummary {
    fn default() -> Self {
        Self {
            total: 0,
            succeeded: 0,
            failed: 0,
            abandoned: 0,
            completion: Completion::Finished,
        }
    }
}

impl RunSummary {
    /// Count one outcome.
    pub fn record(&mut self, outcome: &BuildOutcome) {
        self.total += 1;
        if outcome.is_failure() {
            self.failed += 1;
        } else {
            self.succeeded += 1;
        }
    }

    /// Share of failed directories, in percent.
    pub fn failure_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.failed as f64 / self.total as f64 * 100.0
        }
    }

    /// True when every directory built cleanly and the run was not cut short.
    pub fn passed(&self) -> bool {
        self.failed == 0 && self.completion == Completion::Finished
    }
}

/// Run the pipeline over `root`, handing each outcome to `on_outcome` as it
/// arrives.
pub async fn run_pipeline<E, F, I>(
    root: &Path,
    executor: Arc<E>,
    validator: &ContentValidator,
    options: &PipelineOptions,
    interrupt: I,
    mut on_outcome: F,
) -> RunSummary
where
    E: BuildExecutor,
    F: FnMut(&BuildOutcome),
    I: Future<Output = ()>,
{
    let mut discovery = discover(root, executor, options.discover.clone());
    let mut summary = RunSummary::default();

    let timeout = options.timeout;
    let deadline = async move {
        match timeout {
            Some(limit) => tokio::time::sleep(limit).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(deadline);
    tokio::pin!(interrupt);

    loop {
        tokio::select! {
            _ = &mut deadline => {
                summary.completion = Completion::TimedOut;
                break;
            }
            _ = &mut interrupt => {
                summary.completion = Completion::Interrupted;
                break;
            }
            next = discovery.next() => match next {
                Some(result) => {
                    let outcome = validator.evaluate(result, &options.base_dir);
                    summary.record(&outcome);
                    on_outcome(&outcome);
                }
                None => break,
            }
        }
    }

    summary.abandoned = discovery.scheduled().saturating_sub(summary.total);
    match summary.completion {
        Completion::TimedOut => log::warn!(
            "deadline reached, abandoning {} unfinished build(s)",
            summary.abandoned
        ),
        Completion::Interrupted => log::warn!(
            "interrupted, abandoning {} unfinished build(s)",
            summary.abandoned
        ),
        Completion::Finished => log::info!("all {} build(s) reported", summary.total),
    }

    discovery.shutdown().await;
    summary
}
