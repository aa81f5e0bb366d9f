use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use pchc::app::HealthApp;
use pchc::cli::{AnalyzeArgs, Cli, Commands, Verbosity};
use pchc::config::TomlConfigProvider;
use pchc::errors::HealthError;

fn main() -> ExitCode {
    // Parse command line arguments
    let cli = Cli::parse();
    let verbosity = cli.verbosity();

    // Initialize logger, RUST_LOG still wins when set
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(verbosity.log_filter()),
    )
    .format_timestamp(None)
    .init();

    match run(cli, verbosity) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("{} {}", "error:".red().bold(), err);
            ExitCode::from(2)
        }
    }
}

/// Dispatch the command; `Ok(false)` means the score threshold was not met
fn run(cli: Cli, verbosity: Verbosity) -> Result<bool, HealthError> {
    let config_provider = match cli.config {
        Some(path) => TomlConfigProvider::new().with_config_file(path),
        None => TomlConfigProvider::new(),
    };

    let app = HealthApp::new(config_provider)
        .with_verbosity(verbosity)
        .with_emoji(!cli.no_emoji);

    match cli.command.unwrap_or(Commands::Analyze(AnalyzeArgs::default())) {
        Commands::Analyze(args) => app.analyze(args, cli.paths),
        Commands::Parse(args) => app.parse(args).map(|()| true),
        Commands::Export(args) => app.export(args, cli.paths).map(|_| true),
        Commands::Parsers(args) => app.parsers(args).map(|()| true),
    }
}
