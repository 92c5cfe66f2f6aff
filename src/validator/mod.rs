//! Kustomize build validation.
//!
//! Finds every Kustomize directory under a root, builds each one concurrently
//! with the `kustomize` binary, decodes the rendered manifests and scans them
//! for forbidden placeholder content.
//!
//! # Example
//!
//! ```rust,ignore
//! use kustomize_validator::validator::{
//!     ContentValidator, KustomizeExecutor, PipelineOptions, run_pipeline,
//! };
//! use std::sync::Arc;
//!
//! let validator = ContentValidator::new(&["PATCH_ME", "regex:CHANGE_\\w+"]);
//! let options = PipelineOptions::new(std::env::current_dir()?);
//! let summary = run_pipeline(
//!     "deploy".as_ref(),
//!     Arc::new(KustomizeExecutor::default()),
//!     &validator,
//!     &options,
//!     std::future::pending(),
//!     |outcome| println!("{}", outcome.result.path.display()),
//! )
//! .await;
//! ```

pub mod formatter;
pub mod kustomize;
pub mod matcher;
pub mod parser;
pub mod pipeline;
pub mod types;
pub mod validate;
pub mod walker;

pub use formatter::{ReportOptions, Severity, TableReport};
pub use kustomize::{BuildExecutor, KustomizeExecutor};
pub use matcher::{Check, CheckSpec, LineMatcher, compile_check, scan};
pub use parser::{SkipReason, parse_build_output, parse_document, relative_path};
pub use pipeline::{Completion, PipelineOptions, RunSummary, run_pipeline};
pub use types::{BuildError, BuildResult, DEFAULT_NAMESPACE, Resource, Violation};
pub use validate::{BuildOutcome, ContentValidator, Violations, validate_content};
pub use walker::{DiscoverOptions, Discovery, discover};
