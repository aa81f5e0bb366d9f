//! Command-line interface for the health checker

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::models::{Category, Severity};

/// Verbosity level for output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd)]
pub enum Verbosity {
    /// Quiet mode - only show errors
    Quiet = 0,

    /// Normal mode - show errors and warnings
    #[default]
    Normal = 1,

    /// Verbose mode - also show which parser read each file
    Verbose = 2,

    /// Debug mode - show everything including debug info
    Debug = 3,
}

impl From<u8> for Verbosity {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Debug,
        }
    }
}

impl Verbosity {
    /// Default `env_logger` filter for this level
    pub fn log_filter(&self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "info",
            Self::Debug => "debug",
        }
    }
}

/// Output format for printed results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored, human-readable output
    #[default]
    Pretty,

    /// Machine-readable JSON
    Json,
}

/// PC Health Checker - scored health assessment from OS diagnostic reports
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "🩺 PC Health Checker - turn OS diagnostic reports into a scored health assessment",
    long_about = "Reads the reports produced by Windows and Linux diagnostic tools (powercfg, msinfo32, dxdiag, systeminfo, driverquery, ipconfig, smartctl, dmesg, journalctl and more), recognises each format, extracts the problems it reveals and scores the machine per category and overall."
)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Report files or directories to analyze
    #[arg(name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Verbosity level (-v shows parser matches, -vv debug output)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (only errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Custom configuration file
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable emoji in output
    #[arg(long, global = true)]
    pub no_emoji: bool,
}

impl Cli {
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            Verbosity::from(self.verbose)
        }
    }
}

/// Commands the health checker can execute
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect, parse and score reports (default command)
    #[command(visible_alias = "check")]
    Analyze(AnalyzeArgs),

    /// Parse one file with a named parser, skipping detection
    Parse(ParseArgs),

    /// Write a markdown health report
    Export(ExportArgs),

    /// List available parsers
    #[command(visible_alias = "list")]
    Parsers(ParsersArgs),
}

/// Arguments for the analyze command
#[derive(Args, Debug, Default)]
pub struct AnalyzeArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,

    /// Only show issues in this category (repeatable)
    #[arg(long)]
    pub category: Vec<Category>,

    /// Only show issues of this severity (repeatable)
    #[arg(long)]
    pub severity: Vec<Severity>,

    /// Only show issues containing every word of this query
    #[arg(long)]
    pub query: Option<String>,

    /// Exit non-zero when the global score is below this value
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub fail_under: Option<u8>,

    /// Show raw evidence and extracted facts
    #[arg(long)]
    pub show_raw: bool,

    /// Report files or directories to analyze
    #[arg(name = "PATH")]
    pub paths: Vec<PathBuf>,
}

/// Arguments for the parse command
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Parser name, as listed by `pchc parsers`
    #[arg(short, long)]
    pub parser: String,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,

    /// Report file to parse
    #[arg(name = "FILE")]
    pub file: PathBuf,
}

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output file (defaults to pc-health-report-<date>.md)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Report files or directories to include
    #[arg(name = "PATH")]
    pub paths: Vec<PathBuf>,
}

/// Arguments for the parsers command
#[derive(Args, Debug)]
pub struct ParsersArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,
}
