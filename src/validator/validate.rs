//! Validation of parsed resources against content checks.

use crate::validator::matcher::{Check, compile_check};
use crate::validator::parser::parse_build_output;
use crate::validator::types::{BuildResult, Resource, Violation};
use std::ops::Deref;
use std::path::Path;

/// Violations collected for a set of resources.
///
/// Ordered by check, then by resource. A resource appears once per check
/// that matched it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations(Vec<Violation>);

impl Violations {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self(violations)
    }

    /// First violation for the resource with this identity.
    pub fn find(
        &self,
        api_version: &str,
        kind: &str,
        namespace: &str,
        name: &str,
    ) -> Option<&Violation> {
        self.0
            .iter()
            .find(|v| v.resource.is(api_version, kind, namespace, name))
    }

    /// First violation for `resource`.
    pub fn find_for(&self, resource: &Resource) -> Option<&Violation> {
        self.find(
            &resource.api_version,
            &resource.kind,
            &resource.namespace,
            &resource.name,
        )
    }

    pub fn into_inner(self) -> Vec<Violation> {
        self.0
    }
}

impl Deref for Violations {
    type Target = [Violation];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl IntoIterator for Violations {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Compiled check list, reusable across build results.
#[derive(Debug, Clone, Default)]
pub struct ContentValidator {
    checks: Vec<Check>,
}

impl ContentValidator {
    /// Compile check expressions (`PATCH_ME`, `glob:...`, `regex:...`).
    pub fn new<S: AsRef<str>>(checks: &[S]) -> Self {
        Self {
            checks: checks.iter().map(|c| compile_check(c.as_ref())).collect(),
        }
    }

    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    /// Run every check over every resource.
    pub fn validate(&self, resources: &[Resource]) -> Violations {
        let violations = self
            .checks
            .iter()
            .flat_map(|check| resources.iter().filter_map(move |res| check.scan(res)))
            .collect();
        Violations(violations)
    }

    /// Parse and validate the output of one build.
    pub fn evaluate(&self, result: BuildResult, base_dir: &Path) -> BuildOutcome {
        let resources = parse_build_output(&result.stdout, &result.path, base_dir);
        let violations = self.validate(&resources);
        BuildOutcome {
            result,
            resources,
            violations,
        }
    }
}

/// Validate resources against raw check expressions.
pub fn validate_content<S: AsRef<str>>(resources: &[Resource], checks: &[S]) -> Violations {
    ContentValidator::new(checks).validate(resources)
}

/// Everything known about one build directory after validation.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub result: BuildResult,
    pub resources: Vec<Resource>,
    pub violations: Violations,
}

impl BuildOutcome {
    /// A directory fails if it did not build or its output matched a check.
    pub fn is_failure(&self) -> bool {
        self.result.error.is_some() || !self.violations.is_empty()
    }
}
