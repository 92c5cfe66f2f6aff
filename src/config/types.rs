use crate::validator::kustomize::{DEFAULT_ARGS, DEFAULT_BINARY};
use serde::{Deserialize, Serialize};

/// Placeholder markers looked for when no checks are configured.
pub const DEFAULT_CHECKS: &[&str] = &["PATCH_ME", "CHANGE_ME"];

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Check expressions (`PATTERN`, `glob:PATTERN`, `regex:PATTERN`)
    pub checks: Vec<String>,
    /// Seconds to wait for builds to report; 0 waits indefinitely
    pub timeout_secs: u64,
    /// Maximum concurrently running builds; 0 is unbounded
    pub jobs: usize,
    pub kustomize: KustomizeConfig,
    pub output: OutputConfig,
}

/// How the build binary is invoked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KustomizeConfig {
    pub binary: String,
    /// Arguments placed before the directory
    pub args: Vec<String>,
}

/// Output configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub verbose: bool,
    pub errors_only: bool,
    pub table: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            checks: DEFAULT_CHECKS.iter().map(|c| c.to_string()).collect(),
            timeout_secs: 2,
            jobs: 0,
            kustomize: KustomizeConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for KustomizeConfig {
    fn default() -> Self {
        Self {
            binary: DEFAULT_BINARY.to_string(),
            args: DEFAULT_ARGS.iter().map(|a| a.to_string()).collect(),
        }
    }
}
