//! `journalctl -b --output=json` line-delimited journal export

use serde_json::{Map, Value};

use crate::errors::ParseError;
use crate::models::{Category, Issue, ParseResult, Summary};
use crate::parsers::text::{filename_has, take_chars};
use crate::parsers::{ParserBase, ReportParser};

/// Entry priority counts from the systemd journal
pub struct Journalctl {
    base: ParserBase,
}

impl Default for Journalctl {
    fn default() -> Self {
        Self::new()
    }
}

impl Journalctl {
    pub fn new() -> Self {
        Self {
            base: ParserBase::new(
                "journalctl",
                Category::Security,
                "Systemd journal for the current boot, counted by priority and unit",
            ),
        }
    }
}

/// `PRIORITY` as a number, whether the journal wrote it as a string or an integer
fn priority(entry: &Value) -> Option<i64> {
    match entry.get("PRIORITY")? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn unit(entry: &Value) -> &str {
    ["_SYSTEMD_UNIT", "SYSLOG_IDENTIFIER"]
        .iter()
        .find_map(|key| entry.get(*key).and_then(Value::as_str).filter(|s| !s.is_empty()))
        .unwrap_or("unknown")
}

impl ReportParser for Journalctl {
    parser_identity!();

    fn detect(&self, content: &str, filename: &str) -> bool {
        if filename_has(filename, &["journalctl", "journal.json"]) {
            return true;
        }
        regex!(r#"(?i)"_SYSTEMD_UNIT"|"__REALTIME_TIMESTAMP"|"PRIORITY""#)
            .is_match(take_chars(content, 2000))
    }

    fn parse(&self, content: &str) -> Result<ParseResult, ParseError> {
        // malformed lines are skipped
        let entries: Vec<Value> = content
            .split('\n')
            .map(str::trim)
            .filter(|line| line.starts_with('{'))
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect();

        let (mut critical, mut errors, mut warnings) = (0usize, 0usize, 0usize);
        let mut units = Map::new();
        for entry in &entries {
            let count = units.entry(unit(entry)).or_insert(Value::from(0u64));
            *count = Value::from(count.as_u64().unwrap_or(0) + 1);

            match priority(entry) {
                Some(p) if p <= 2 => critical += 1,
                Some(3) => errors += 1,
                Some(4) => warnings += 1,
                _ => {}
            }
        }

        let mut summary = Summary::new()
            .with("critical", critical)
            .with("errors", errors)
            .with("warnings", warnings)
            .with("total_entries", entries.len());
        summary.insert("units", Value::Object(units));

        let mut issues = Vec::new();

        if critical > 0 {
            issues.push(
                Issue::critical(format!("{} critical/emergency journal entries found", critical))
                    .with_detail(format!(
                        "The system journal contains {} entries with priority level critical, alert, or emergency.",
                        critical
                    ))
                    .with_raw(format!(
                        "Total entries: {} | Critical: {} | Errors: {} | Warnings: {}",
                        entries.len(),
                        critical,
                        errors,
                        warnings
                    ))
                    .with_recommendation("Review critical journal entries with: journalctl -b -p 0..2 . These may indicate kernel panics, hardware failures, or severe service crashes."),
            );
        }

        if errors > 20 {
            issues.push(
                Issue::warning(format!("{} error-level journal entries", errors))
                    .with_detail("A high number of error-level messages were logged during this boot.")
                    .with_raw(format!("Error entries: {}", errors))
                    .with_recommendation("Review errors with: journalctl -b -p 3 . Investigate recurring units or services that produce errors."),
            );
        } else if errors > 0 {
            issues.push(
                Issue::info(format!("{} error-level journal entries", errors))
                    .with_detail("Some error messages were found in the system journal.")
                    .with_raw(format!("Error entries: {}", errors))
                    .with_recommendation("Review with: journalctl -b -p 3"),
            );
        }

        if warnings > 50 {
            issues.push(
                Issue::warning(format!("{} warning-level journal entries", warnings))
                    .with_detail("A high number of warnings in the system journal may indicate recurring issues.")
                    .with_raw(format!("Warning entries: {}", warnings))
                    .with_recommendation("Run: journalctl -b -p 4 to see all warnings. Look for patterns."),
            );
        }

        Ok(ParseResult::new(summary, issues).or_fallback(
            Issue::info("System journal looks clean")
                .with_detail(format!(
                    "No critical or error entries found in this boot journal ({} entries analyzed).",
                    entries.len()
                ))
                .with_recommendation("No action needed."),
        ))
    }
}
