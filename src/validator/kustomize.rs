//! Running `kustomize build` for a single directory.

use crate::validator::types::{BuildError, BuildResult};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Default build binary.
pub const DEFAULT_BINARY: &str = "kustomize";

/// Arguments placed before the directory: enables Helm chart inflation and
/// alpha plugins (e.g. PolicyGenerator).
pub const DEFAULT_ARGS: &[&str] = &["build", "--enable-helm", "--enable-alpha-plugins"];

/// Builds one directory and reports what happened.
///
/// Implementations never fail: every problem is folded into
/// [`BuildResult::error`].
pub trait BuildExecutor: Send + Sync + 'static {
    fn execute(&self, dir: PathBuf) -> impl Future<Output = BuildResult> + Send;
}

/// Executor that shells out to the kustomize binary.
///
/// The child process is killed if the returned future is dropped before it
/// completes, so abandoning a build does not leave it running.
#[derive(Debug, Clone)]
pub struct KustomizeExecutor {
    binary: PathBuf,
    args: Vec<String>,
}

impl Default for KustomizeExecutor {
    fn default() -> Self {
        Self {
            binary: PathBuf::from(DEFAULT_BINARY),
            args: DEFAULT_ARGS.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl KustomizeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different binary (absolute path or name looked up in PATH).
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Replace the arguments that precede the directory.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    async fn run(&self, dir: PathBuf) -> BuildResult {
        log::debug!(
            "running {} {} {}",
            self.binary.display(),
            self.args.join(" "),
            dir.display()
        );

        let output = Command::new(&self.binary)
            .args(&self.args)
            .arg(&dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await;

        let output = match output {
            Ok(output) => output,
            Err(e) => {
                return BuildResult::failure(
                    dir,
                    BuildError::Spawn {
                        binary: self.binary.display().to_string(),
                        message: e.to_string(),
                    },
                );
            }
        };

        let error = if output.status.success() {
            None
        } else {
            Some(match output.status.code() {
                Some(code) => BuildError::ExitStatus { code },
                None => BuildError::Signalled,
            })
        };

        BuildResult {
            path: dir,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            error,
        }
    }
}

impl BuildExecutor for KustomizeExecutor {
    fn execute(&self, dir: PathBuf) -> impl Future<Output = BuildResult> + Send {
        self.run(dir)
    }
}
