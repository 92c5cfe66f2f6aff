//! # kustomize-validator
//!
//! Builds every Kustomization found under a directory tree and checks the
//! rendered manifests for placeholder content that must not be deployed.
//!
//! ## Features
//!
//! - **Discovery**: Finds every `kustomization.yaml`/`kustomization.yml`
//! - **Concurrent builds**: One `kustomize build` per directory, optionally capped
//! - **Content checks**: Literal, glob and regex patterns matched per line
//! - **Deadline**: Stops waiting after a configurable timeout and kills stragglers
//! - **Reports**: Streamed per-directory messages or a resource table
//!
//! ## Example
//!
//! ```rust,no_run
//! use kustomize_validator::{ValidateOptions, handle_validate};
//!
//! # async fn run() -> kustomize_validator::Result<()> {
//! let mut options = ValidateOptions::new("./deploy");
//! options.checks = vec!["PATCH_ME".to_string(), "regex:CHANGE_\\w+".to_string()];
//! let passed = handle_validate(options).await?;
//! println!("passed: {}", passed);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod validator;

// Re-export commonly used types and functions
pub use error::{Result, ValidatorError};
pub use handlers::{ValidateOptions, handle_validate};
pub use validator::{BuildOutcome, BuildResult, ContentValidator, Resource, Violation};

/// The current version of the CLI tool
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
