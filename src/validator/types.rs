//! Core types for the validator pipeline.
//!
//! - `BuildResult` - what one `kustomize build` invocation produced
//! - `BuildError` - why an invocation failed
//! - `Resource` - a Kubernetes object decoded from build output
//! - `Violation` - a forbidden pattern found inside a resource

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Namespace reported for resources that do not declare one.
pub const DEFAULT_NAMESPACE: &str = "<none>";

/// Lines of context captured on each side of a matching line.
pub const CONTEXT_LINES: usize = 2;

static FAILED_PATH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"from '(.*?)'").expect("static regex is valid"));

/// Why a build invocation did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The build binary could not be started at all.
    #[error("failed to launch {binary}: {message}")]
    Spawn { binary: String, message: String },

    /// The build binary ran but exited with a non-zero status.
    #[error("exit status {code}")]
    ExitStatus { code: i32 },

    /// The build binary was killed by a signal.
    #[error("terminated by signal")]
    Signalled,
}

/// Result envelope for a single build directory.
///
/// Produced exactly once per discovered directory and never mutated after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildResult {
    /// Directory the build ran in.
    pub path: PathBuf,
    /// Captured standard output (the rendered manifests on success).
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Set when the build could not be launched or exited non-zero.
    pub error: Option<BuildError>,
}

impl BuildResult {
    /// A successful build.
    pub fn success(path: impl Into<PathBuf>, stdout: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            stdout: stdout.into(),
            stderr: String::new(),
            error: None,
        }
    }

    /// A failed build.
    pub fn failure(path: impl Into<PathBuf>, error: BuildError) -> Self {
        Self {
            path: path.into(),
            stdout: String::new(),
            stderr: String::new(),
            error: Some(error),
        }
    }

    /// Attach captured stderr.
    pub fn with_stderr(mut self, stderr: impl Into<String>) -> Self {
        self.stderr = stderr.into();
        self
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Files referenced by kustomize error messages (`... from 'path'`),
    /// joined onto the build directory.
    pub fn failed_paths(&self) -> Vec<PathBuf> {
        if self.is_success() {
            return Vec::new();
        }

        [self.stderr.as_str(), self.stdout.as_str()]
            .iter()
            .flat_map(|text| FAILED_PATH_RE.captures_iter(text))
            .filter_map(|caps| caps.get(1))
            .map(|m| self.path.join(m.as_str()))
            .collect()
    }
}

/// A Kubernetes object decoded from build output.
///
/// `api_version`, `kind` and `name` are never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    /// Declared namespace or [`DEFAULT_NAMESPACE`].
    pub namespace: String,
    /// Build directory, relative to the base directory when possible.
    pub source_path: PathBuf,
    /// The YAML document this resource was decoded from.
    pub content: String,
}

impl Resource {
    /// Whether this resource has the given identity.
    pub fn is(&self, api_version: &str, kind: &str, namespace: &str, name: &str) -> bool {
        self.api_version == api_version
            && self.kind == kind
            && self.namespace == namespace
            && self.name == name
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.api_version, self.kind, self.namespace, self.name
        )
    }
}

/// A forbidden pattern found in a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub resource: Resource,
    /// Pattern text with any `glob:`/`regex:` prefix removed.
    pub pattern: String,
    /// 1-based line of the match within `resource.content`.
    pub line_number: usize,
    pub matched_line: String,
    /// Up to [`CONTEXT_LINES`] lines either side of the match, match included.
    pub context: Vec<String>,
}

impl Violation {
    /// Line number of the first entry in `context`.
    pub fn context_start(&self) -> usize {
        self.line_number.saturating_sub(CONTEXT_LINES).max(1)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "validation failed: found '{}' in line {} for resource {}",
            self.pattern, self.line_number, self.resource
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource() -> Resource {
        Resource {
            api_version: "v1".to_string(),
            kind: "Pod".to_string(),
            name: "my-app".to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            source_path: PathBuf::from("overlays/prod"),
            content: String::new(),
        }
    }

    #[test]
    fn test_failed_paths_from_stderr() {
        let result = BuildResult::failure("overlays/prod", BuildError::ExitStatus { code: 1 })
            .with_stderr(
                "Error: accumulating resources: accumulation err='accumulating resources from 'deployment.yaml': missing'\n\
                 couldn't make target for path from '../base'",
            );

        let paths = result.failed_paths();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("overlays/prod/deployment.yaml"),
                PathBuf::from("overlays/prod/../base"),
            ]
        );
    }

    #[test]
    fn test_failed_paths_empty_on_success() {
        let result = BuildResult::success("base", "from 'ignored.yaml'");
        assert!(result.failed_paths().is_empty());
    }

    #[test]
    fn test_build_error_display() {
        assert_eq!(
            BuildError::ExitStatus { code: 2 }.to_string(),
            "exit status 2"
        );
        assert_eq!(
            BuildError::Signalled.to_string(),
            "terminated by signal"
        );
        let spawn = BuildError::Spawn {
            binary: "kustomize".to_string(),
            message: "No such file or directory".to_string(),
        };
        assert!(spawn.to_string().starts_with("failed to launch kustomize"));
    }

    #[test]
    fn test_resource_identity() {
        let res = resource();
        assert!(res.is("v1", "Pod", "<none>", "my-app"));
        assert!(!res.is("v1", "Pod", "default", "my-app"));
        assert_eq!(res.to_string(), "v1/Pod/<none>/my-app");
    }

    #[test]
    fn test_violation_display_and_context_start() {
        let violation = Violation {
            resource: resource(),
            pattern: "PATCH_ME".to_string(),
            line_number: 2,
            matched_line: "  app: PATCH_ME".to_string(),
            context: vec!["a".into(), "  app: PATCH_ME".into(), "b".into()],
        };
        assert_eq!(
            violation.to_string(),
            "validation failed: found 'PATCH_ME' in line 2 for resource v1/Pod/<none>/my-app"
        );
        assert_eq!(violation.context_start(), 1);
    }
}
