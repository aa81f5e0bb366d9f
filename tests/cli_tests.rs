use clap::Parser;
use pchc::cli::{Cli, Commands, OutputFormat, Verbosity};
use pchc::models::{Category, Severity};
use pretty_assertions::assert_eq;
use std::path::PathBuf;

#[test]
fn test_cli_default_values() {
    // Test default values when no arguments are provided
    let cli = Cli::parse_from(["pchc"]);

    assert!(cli.command.is_none());
    assert!(cli.paths.is_empty());
    assert_eq!(cli.verbose, 0);
    assert!(!cli.quiet);
    assert_eq!(cli.config, None);
    assert!(!cli.no_emoji);
    assert_eq!(cli.verbosity(), Verbosity::Normal);
}

#[test]
fn test_verbosity_levels() {
    let cli = Cli::parse_from(["pchc", "--quiet"]);
    assert_eq!(cli.verbosity(), Verbosity::Quiet);

    let cli = Cli::parse_from(["pchc", "-v"]);
    assert_eq!(cli.verbosity(), Verbosity::Verbose);

    let cli = Cli::parse_from(["pchc", "-vvv"]);
    assert_eq!(cli.verbose, 3);
    assert_eq!(cli.verbosity(), Verbosity::Debug);

    // Quiet wins over verbose
    let cli = Cli::parse_from(["pchc", "-q", "-v"]);
    assert_eq!(cli.verbosity(), Verbosity::Quiet);

    assert_eq!(Verbosity::Quiet.log_filter(), "error");
    assert_eq!(Verbosity::Normal.log_filter(), "warn");
    assert_eq!(Verbosity::Debug.log_filter(), "debug");
}

#[test]
fn test_top_level_paths() {
    let cli = Cli::parse_from(["pchc", "reports/", "battery-report.html"]);

    assert!(cli.command.is_none());
    assert_eq!(
        cli.paths,
        vec![
            PathBuf::from("reports/"),
            PathBuf::from("battery-report.html")
        ]
    );
}

#[test]
fn test_analyze_command_filters() {
    let cli = Cli::parse_from([
        "pchc",
        "analyze",
        "--category",
        "Storage",
        "--category",
        "power",
        "--severity",
        "critical",
        "--query",
        "disk space",
        "--fail-under",
        "70",
        "--format",
        "json",
        "reports",
    ]);

    match cli.command {
        Some(Commands::Analyze(args)) => {
            assert_eq!(args.category, vec![Category::Storage, Category::Power]);
            assert_eq!(args.severity, vec![Severity::Critical]);
            assert_eq!(args.query.as_deref(), Some("disk space"));
            assert_eq!(args.fail_under, Some(70));
            assert_eq!(args.format, OutputFormat::Json);
            assert_eq!(args.paths, vec![PathBuf::from("reports")]);
        }
        other => panic!("Expected analyze command, got {:?}", other),
    }
}

#[test]
fn test_check_alias() {
    let cli = Cli::parse_from(["pchc", "check", "--show-raw"]);

    match cli.command {
        Some(Commands::Analyze(args)) => assert!(args.show_raw),
        other => panic!("Expected analyze command, got {:?}", other),
    }
}

#[test]
fn test_fail_under_out_of_range_is_rejected() {
    let result = Cli::try_parse_from(["pchc", "analyze", "--fail-under", "101"]);

    assert!(result.is_err());
}

#[test]
fn test_parse_command() {
    let cli = Cli::parse_from(["pchc", "parse", "-p", "Battery Report", "battery.html"]);

    match cli.command {
        Some(Commands::Parse(args)) => {
            assert_eq!(args.parser, "Battery Report");
            assert_eq!(args.file, PathBuf::from("battery.html"));
            assert_eq!(args.format, OutputFormat::Pretty);
        }
        other => panic!("Expected parse command, got {:?}", other),
    }
}

#[test]
fn test_export_command() {
    let cli = Cli::parse_from(["pchc", "export", "-o", "health.md", "reports"]);

    match cli.command {
        Some(Commands::Export(args)) => {
            assert_eq!(args.output, Some(PathBuf::from("health.md")));
            assert_eq!(args.paths, vec![PathBuf::from("reports")]);
        }
        other => panic!("Expected export command, got {:?}", other),
    }
}

#[test]
fn test_parsers_list_alias_with_global_flags() {
    let cli = Cli::parse_from(["pchc", "list", "--no-emoji", "-c", "custom.toml"]);

    assert!(matches!(cli.command, Some(Commands::Parsers(_))));
    assert!(cli.no_emoji);
    assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
}
