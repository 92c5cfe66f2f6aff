use clap::Parser;
use kustomize_validator::cli::Cli;
use kustomize_validator::handlers::{ValidateOptions, handle_validate};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // Returning lets the runtime shut down, dropping any build still alive.
    match run().await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> kustomize_validator::Result<bool> {
    let cli = Cli::parse();

    // Initialize logging
    cli.init_logging();

    let options = ValidateOptions {
        path: cli.path,
        config: cli.config,
        checks: cli.checks,
        timeout_secs: cli.timeout,
        jobs: cli.jobs,
        kustomize_bin: cli.kustomize_bin,
        verbose: cli.verbose > 0,
        errors_only: cli.errors_only,
        table: cli.table,
        color: !cli.no_color,
    };

    handle_validate(options).await
}
