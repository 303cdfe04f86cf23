use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "license-gate",
    about = "Run the Dash license tool on a lockfile and fail on restricted dependencies missing from the baseline",
    version
)]
pub struct Cli {
    /// Config file [default: ./.license-gate/config.toml, fallback ~/.config/license-gate/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Lockfile handed to the scanner
    #[arg(long, value_name = "FILE")]
    pub lockfile: Option<PathBuf>,

    /// Summary report written by the scanner
    #[arg(long, value_name = "FILE")]
    pub summary: Option<PathBuf>,

    /// Baseline of accepted restricted dependencies (JSON array or object)
    #[arg(long, value_name = "FILE")]
    pub baseline: Option<PathBuf>,

    /// Reuse the existing summary instead of fetching and running the scanner
    #[arg(long)]
    pub skip_scan: bool,

    /// Rewrite the baseline to accept exactly the current restricted dependencies
    #[arg(long)]
    pub write_baseline: bool,

    /// Report format
    #[arg(long, default_value = "terminal", value_name = "FORMAT")]
    pub report: ReportFormat,

    /// Disable colored output (also honoured via NO_COLOR)
    #[arg(long)]
    pub no_color: bool,

    /// List every restricted dependency in a table
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    Terminal,
    Json,
}
