use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "kustomize-validator")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build every Kustomization under a directory and check the output")]
#[command(long_about = "Finds every directory containing a kustomization.yaml, runs `kustomize build` on each of them concurrently, and scans the rendered manifests for placeholder content such as PATCH_ME that must not reach a cluster.")]
pub struct Cli {
    /// Directory to search for Kustomizations
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Show build output and violation context (-vv for debug logs, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only report directories that failed
    #[arg(short, long)]
    pub errors_only: bool,

    /// Print a table of rendered resources instead of per-directory messages
    #[arg(short, long)]
    pub table: bool,

    /// Content check: PATTERN, glob:PATTERN or regex:PATTERN (repeatable)
    #[arg(short = 'c', long = "check", value_name = "CHECK")]
    pub checks: Vec<String>,

    /// Seconds to wait for all builds; 0 waits indefinitely
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Maximum builds running at once; 0 is unbounded
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Path to the kustomize binary
    #[arg(long, value_name = "PATH", env = "KUSTOMIZE_BIN")]
    pub kustomize_bin: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Suppress log output
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable coloured output
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Initialize logging based on verbosity level
    pub fn init_logging(&self) {
        if self.quiet {
            return;
        }

        let level = match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };

        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();
    }
}
