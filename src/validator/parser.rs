//! Decoding of `kustomize build` output into resources.
//!
//! Build output is a multi-document YAML stream. Each document is decoded
//! independently; documents that are malformed or lack `apiVersion`, `kind`
//! or `metadata.name` are skipped so one bad document never hides the rest.

use crate::validator::types::{DEFAULT_NAMESPACE, Resource};
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};

const DOCUMENT_SEPARATOR: &str = "---";

/// The subset of a Kubernetes object the validator needs.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectHeader {
    #[serde(default)]
    api_version: Option<String>,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    metadata: Option<ObjectMeta>,
}

#[derive(Debug, Default, Deserialize)]
struct ObjectMeta {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    namespace: Option<String>,
}

/// Why a document was left out of the parse result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Nothing but whitespace between separators.
    Empty,
    /// Not decodable as a YAML mapping.
    Malformed(String),
    /// `apiVersion`, `kind` or `metadata.name` missing or empty.
    Incomplete,
}

/// Parse build output for one directory.
///
/// `source_path` is the build directory; it is stored relative to
/// `base_dir` when possible and unchanged otherwise.
pub fn parse_build_output(stdout: &str, source_path: &Path, base_dir: &Path) -> Vec<Resource> {
    if stdout.is_empty() {
        return Vec::new();
    }

    let source = relative_path(source_path, base_dir).unwrap_or_else(|| source_path.to_path_buf());

    stdout
        .split(DOCUMENT_SEPARATOR)
        .filter_map(|doc| match parse_document(doc, &source) {
            Ok(resource) => Some(resource),
            Err(reason) => {
                if let SkipReason::Malformed(ref msg) = reason {
                    log::trace!("skipping undecodable document in {}: {}", source.display(), msg);
                }
                None
            }
        })
        .collect()
}

/// Decode a single YAML document.
pub fn parse_document(doc: &str, source: &Path) -> Result<Resource, SkipReason> {
    let doc = doc.trim();
    if doc.is_empty() {
        return Err(SkipReason::Empty);
    }

    let header: ObjectHeader =
        serde_yaml::from_str(doc).map_err(|e| SkipReason::Malformed(e.to_string()))?;

    let metadata = header.metadata.unwrap_or_default();
    let (Some(api_version), Some(kind), Some(name)) = (
        non_empty(header.api_version),
        non_empty(header.kind),
        non_empty(metadata.name),
    ) else {
        return Err(SkipReason::Incomplete);
    };

    Ok(Resource {
        api_version,
        kind,
        name,
        namespace: non_empty(metadata.namespace).unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
        source_path: source.to_path_buf(),
        content: doc.to_string(),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Express `path` relative to `base`, lexically.
///
/// Returns `None` when no relative path exists, e.g. one path is absolute
/// and the other is not, or they sit on different roots.
pub fn relative_path(path: &Path, base: &Path) -> Option<PathBuf> {
    if path.is_absolute() != base.is_absolute() {
        return None;
    }

    let path = normalize(path)?;
    let base = normalize(base)?;

    let common = path
        .iter()
        .zip(base.iter())
        .take_while(|(a, b)| a == b)
        .count();

    // Different prefixes (e.g. drive letters) cannot be bridged with `..`.
    if common == 0 && (has_prefix(&path) || has_prefix(&base)) {
        return None;
    }

    // Climbing out of an unknown parent is not expressible.
    if base[common..].iter().any(|c| matches!(c, Component::ParentDir)) {
        return None;
    }

    let mut relative = PathBuf::new();
    for _ in common..base.len() {
        relative.push("..");
    }
    for component in &path[common..] {
        relative.push(component.as_os_str());
    }

    if relative.as_os_str().is_empty() {
        relative.push(".");
    }
    Some(relative)
}

fn has_prefix(components: &[Component<'_>]) -> bool {
    matches!(components.first(), Some(Component::Prefix(_)))
}

/// Drop `.` components and fold `name/..` pairs.
fn normalize(path: &Path) -> Option<Vec<Component<'_>>> {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last().copied() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => return None,
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    Some(out)
}
