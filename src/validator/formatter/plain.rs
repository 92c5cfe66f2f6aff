//! Plain text formatter.

use super::{Severity, paint, tagged};
use crate::validator::pipeline::{Completion, RunSummary};
use crate::validator::types::{BuildResult, Violation};
use crate::validator::validate::BuildOutcome;

/// What to include in the plain report.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    /// Suppress messages for directories that passed.
    pub errors_only: bool,
    /// Include build output and violation context.
    pub verbose: bool,
    pub color: bool,
}

/// Format everything known about one build directory.
pub fn format_outcome(outcome: &BuildOutcome, options: &ReportOptions) -> String {
    let result = &outcome.result;
    let path = result.path.display();
    let mut output = String::new();

    match &result.error {
        Some(err) => {
            output.push_str(&tagged(
                Severity::Error,
                &format!("Error while executing kustomize in path: {}, {}", path, err),
                options.color,
            ));
            for failed in result.failed_paths() {
                output.push_str(&tagged(
                    Severity::Info,
                    &format!("Referenced file: {}", failed.display()),
                    options.color,
                ));
            }
            if options.verbose {
                push_streams(&mut output, result, options.color);
            }
        }
        None => {
            if !options.errors_only {
                output.push_str(&tagged(
                    Severity::Ok,
                    &format!("Successfully executed kustomize on {}", path),
                    options.color,
                ));
                if options.verbose {
                    push_streams(&mut output, result, options.color);
                }
            }
        }
    }

    for violation in outcome.violations.iter() {
        output.push_str(&format_violation(violation, options.verbose, options.color));
    }

    output
}

fn push_streams(output: &mut String, result: &BuildResult, color: bool) {
    let path = result.path.display();
    for (name, text) in [("Stdout", &result.stdout), ("Stderr", &result.stderr)] {
        output.push_str(&tagged(
            Severity::Unknown,
            &format!("==> {} ({}):\n{}", name, path, text),
            color,
        ));
    }
}

/// Multi-line description of a violation. Verbose adds the numbered context
/// window with the matching line marked.
pub fn format_violation(violation: &Violation, verbose: bool, color: bool) -> String {
    let res = &violation.resource;
    let mut output = tagged(
        Severity::Error,
        &format!(
            "Content validation failed for apiVersion {}, kind {}, namespace {}, name {}",
            res.api_version, res.kind, res.namespace, res.name
        ),
        color,
    );
    output.push_str(&format!("\tPattern: {}\n", violation.pattern));
    output.push_str(&format!("\tLine: {}\n", violation.line_number));
    output.push_str(&format!("\tMatch: {}\n", violation.matched_line.trim()));

    if verbose && !violation.context.is_empty() {
        output.push_str("\n\tContext:\n");
        let start = violation.context_start();
        for (offset, line) in violation.context.iter().enumerate() {
            let number = start + offset;
            let marker = if number == violation.line_number {
                "→ "
            } else {
                "  "
            };
            output.push_str(&format!("    {}{:4} | {}\n", marker, number, line));
        }
    }

    output.push('\n');
    output
}

/// Closing counters for a run.
pub fn format_summary(summary: &RunSummary, color: bool) -> String {
    let mut output = String::new();

    match summary.completion {
        Completion::TimedOut => output.push_str(&tagged(
            Severity::Warning,
            &format!(
                "Deadline reached before all builds finished ({} abandoned)",
                summary.abandoned
            ),
            color,
        )),
        Completion::Interrupted => output.push_str(&tagged(
            Severity::Warning,
            &format!("Interrupted ({} builds abandoned)", summary.abandoned),
            color,
        )),
        Completion::Finished => {}
    }

    output.push_str(&format!(
        "Total: {}\n",
        paint(Severity::Info, &summary.total.to_string(), color)
    ));
    output.push_str(&format!(
        "Success: {}\n",
        paint(Severity::Ok, &summary.succeeded.to_string(), color)
    ));
    output.push_str(&format!(
        "Error: {}\n",
        paint(Severity::Error, &summary.failed.to_string(), color)
    ));
    output.push_str(&format!(
        "Failed in %: {}\n",
        paint(
            Severity::Error,
            &format!("{:.2}%", summary.failure_rate()),
            color
        )
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::types::{BuildError, DEFAULT_NAMESPACE, Resource};
    use crate::validator::validate::{ContentValidator, Violations};
    use std::path::{Path, PathBuf};

    const PLAIN: ReportOptions = ReportOptions {
        errors_only: false,
        verbose: false,
        color: false,
    };

    fn violation() -> Violation {
        Violation {
            resource: Resource {
                api_version: "apps/v1".to_string(),
                kind: "Deployment".to_string(),
                name: "web".to_string(),
                namespace: DEFAULT_NAMESPACE.to_string(),
                source_path: PathBuf::from("app"),
                content: String::new(),
            },
            pattern: "PATCH_ME".to_string(),
            line_number: 3,
            matched_line: "    image: PATCH_ME  ".to_string(),
            context: vec![
                "spec:".to_string(),
                "  containers:".to_string(),
                "    image: PATCH_ME  ".to_string(),
                "    name: web".to_string(),
            ],
        }
    }

    #[test]
    fn test_success_message() {
        let outcome = ContentValidator::default()
            .evaluate(BuildResult::success("/repo/base", ""), Path::new("/repo"));
        assert_eq!(
            format_outcome(&outcome, &PLAIN),
            "[OK]: Successfully executed kustomize on /repo/base\n"
        );

        let quiet = ReportOptions {
            errors_only: true,
            ..PLAIN
        };
        assert_eq!(format_outcome(&outcome, &quiet), "");
    }

    #[test]
    fn test_failure_message_with_streams() {
        let outcome = ContentValidator::default().evaluate(
            BuildResult::failure("base", BuildError::ExitStatus { code: 1 })
                .with_stderr("Error: accumulating resources from 'svc.yaml'"),
            Path::new("."),
        );
        let verbose = ReportOptions {
            verbose: true,
            errors_only: true,
            ..PLAIN
        };
        let text = format_outcome(&outcome, &verbose);

        assert!(text.starts_with(
            "[ERROR]: Error while executing kustomize in path: base, exit status 1\n"
        ));
        assert!(text.contains("[INFO]: Referenced file: base/svc.yaml\n"));
        assert!(text.contains("==> Stderr (base):\nError: accumulating resources"));
    }

    #[test]
    fn test_violation_terse() {
        let text = format_violation(&violation(), false, false);
        assert_eq!(
            text,
            "[ERROR]: Content validation failed for apiVersion apps/v1, kind Deployment, namespace <none>, name web\n\
             \tPattern: PATCH_ME\n\
             \tLine: 3\n\
             \tMatch: image: PATCH_ME\n\
             \n"
        );
    }

    #[test]
    fn test_violation_verbose_marks_matching_line() {
        let text = format_violation(&violation(), true, false);
        assert!(text.contains("\n\tContext:\n"));
        assert!(text.contains("       1 | spec:\n"));
        assert!(text.contains("    →    3 |     image: PATCH_ME  \n"));
        assert!(text.contains("       4 |     name: web\n"));
    }

    #[test]
    fn test_outcome_lists_violations() {
        let outcome = BuildOutcome {
            result: BuildResult::success("app", ""),
            resources: Vec::new(),
            violations: Violations::new(vec![violation()]),
        };
        let text = format_outcome(&outcome, &PLAIN);
        assert!(text.starts_with("[OK]: Successfully executed kustomize on app\n"));
        assert!(text.contains("\tPattern: PATCH_ME\n"));
    }

    #[test]
    fn test_summary() {
        let summary = RunSummary {
            total: 4,
            succeeded: 3,
            failed: 1,
            ..RunSummary::default()
        };
        assert_eq!(
            format_summary(&summary, false),
            "Total: 4\nSuccess: 3\nError: 1\nFailed in %: 25.00%\n"
        );

        let empty = format_summary(&RunSummary::default(), false);
        assert!(empty.ends_with("Failed in %: 0.00%\n"));

        let timed_out = RunSummary {
            completion: Completion::TimedOut,
            abandoned: 2,
            ..RunSummary::default()
        };
        assert!(format_summary(&timed_out, false).starts_with(
            "[WARNING]: Deadline reached before all builds finished (2 abandoned)\n"
        ));
    }
}
