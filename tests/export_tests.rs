use std::fs;

use chrono::{NaiveDate, NaiveDateTime};
use pchc::app::HealthApp;
use pchc::cli::{ExportArgs, Verbosity};
use pchc::config::TomlConfigProvider;
use pchc::models::{Category, DetectionOutcome, Issue, ParseResult, ParserIdentity, Summary};
use pchc::output::MarkdownExporter;
use pchc::parsers::Clock;
use pchc::scoring::{calculate_scores, ScoringResult};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn generated_at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 16)
        .and_then(|date| date.and_hms_opt(9, 30, 5))
        .expect("valid timestamp")
}

fn storage_outcome() -> DetectionOutcome {
    DetectionOutcome {
        parser: ParserIdentity {
            name: "Disk Info".to_string(),
            category: Category::Storage,
        },
        result: ParseResult::new(
            Summary::new(),
            vec![
                Issue::info("2 disks detected"),
                Issue::critical("Volume C: is almost full (98% used)")
                    .with_detail("Only 9 GB free of 466 GB total on C:.")
                    .with_recommendation("Free up disk space immediately."),
            ],
        ),
    }
}

#[test]
fn test_markdown_report_layout() {
    let outcomes = vec![storage_outcome()];
    let scoring = calculate_scores(&outcomes);

    let markdown = MarkdownExporter::render(&scoring, generated_at());
    let lines: Vec<&str> = markdown.lines().collect();

    assert_eq!(lines[0], "# PC Health Check Report");
    assert_eq!(lines[1], "*Generated: 2026-10-16 09:30:05*");
    assert!(markdown.contains("## Global Health Score: 68/100 (Fair)"));
    assert!(markdown.contains("| Category | Score | Critical | Warning | Info |"));
    assert!(markdown.contains("| 💾 Storage | 68/100 | 1 | 0 | 1 |"));
    assert!(markdown.contains("| ⚡ Power & Battery | No data | - | - | - |"));
    assert!(markdown.contains("### 🔴 Critical (1)"));
    assert!(markdown.contains("#### 💾 Volume C: is almost full (98% used)"));
    assert!(markdown.contains("- **Detail:** Only 9 GB free of 466 GB total on C:."));
    assert!(markdown.contains("- **Recommendation:** Free up disk space immediately."));
    assert!(!markdown.contains("### 🟠 Warning"));

    // Critical issues are listed before info ones
    let critical = markdown.find("### 🔴 Critical").expect("critical heading");
    let info = markdown.find("### 🔵 Info").expect("info heading");
    assert!(critical < info);
}

#[test]
fn test_markdown_without_data() {
    let markdown = MarkdownExporter::render(&ScoringResult::default(), generated_at());

    assert!(markdown.contains("## Global Health Score: No Data"));
    assert_eq!(markdown.matches("| No data | - | - | - |").count(), 6);
    assert!(!markdown.contains("### "));
}

#[test]
fn test_default_file_name() {
    let date = NaiveDate::from_ymd_opt(2026, 10, 16).expect("valid date");

    assert_eq!(
        MarkdownExporter::default_file_name(date),
        "pc-health-report-2026-10-16.md"
    );
}

#[test]
fn test_export_writes_markdown_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let reports = temp_dir.path().join("reports");
    fs::create_dir(&reports).expect("mkdir");
    fs::write(
        reports.join("battery-report.txt"),
        "Battery report\nDesign Capacity: 50,000 mWh\nFull Charge Capacity: 20,000 mWh\n",
    )
    .expect("write");
    let output = temp_dir.path().join("health.md");

    let app = HealthApp::new(TomlConfigProvider::new())
        .with_verbosity(Verbosity::Quiet)
        .with_clock(Clock::Fixed(generated_at()));
    let written = app
        .export(
            ExportArgs {
                output: Some(output.clone()),
                paths: vec![reports],
            },
            Vec::new(),
        )
        .expect("export");

    assert_eq!(written, output);
    let markdown = fs::read_to_string(&output).expect("read report");
    assert!(markdown.contains("*Generated: 2026-10-16 09:30:05*"));
    assert!(markdown.contains("## Global Health Score: 70/100 (Fair)"));
    assert!(markdown.contains("Battery health critically low at 40%"));
}
