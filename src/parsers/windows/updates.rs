//! `wmic qfe list full /format:csv`

use chrono::NaiveDate;
use serde_json::Value;

use crate::errors::ParseError;
use crate::models::{Category, Issue, ParseResult, Summary};
use crate::parsers::text::{
    column, csv_rows, field, filename_has, has_extension, parse_compact_date, parse_iso_date,
    parse_us_date, Clock,
};
use crate::parsers::{ParserBase, ReportParser};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Installed hotfixes and how long ago the newest one landed
pub struct WindowsUpdates {
    base: ParserBase,
    clock: Clock,
}

impl Default for WindowsUpdates {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowsUpdates {
    pub fn new() -> Self {
        Self::with_clock(Clock::System)
    }

    /// Use `clock` when computing days since the last update
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            base: ParserBase::new(
                "Windows Updates",
                Category::Security,
                "Windows hotfixes and updates with install dates",
            ),
            clock,
        }
    }
}

/// `M/D/YYYY`, bare `YYYYMMDD`, or ISO dates
fn parse_install_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    parse_us_date(text)
        .or_else(|| {
            regex!(r"^\d{8}$")
                .is_match(text)
                .then(|| parse_compact_date(text))
                .flatten()
        })
        .or_else(|| parse_iso_date(text))
}

impl ReportParser for WindowsUpdates {
    parser_identity!();

    fn detect(&self, content: &str, filename: &str) -> bool {
        if filename_has(filename, &["update", "hotfix", "qfe"])
            && has_extension(filename, &[".csv"])
        {
            return true;
        }
        regex!(r"(?i)HotFixID").is_match(content) && regex!(r"(?i)InstalledOn").is_match(content)
    }

    fn parse(&self, content: &str) -> Result<ParseResult, ParseError> {
        let rows = csv_rows(content);
        if rows.len() < 2 {
            return Ok(ParseResult::with_score(
                Summary::new().with("update_count", 0),
                80,
                vec![Issue::warning("No update data found")
                    .with_detail("Could not parse Windows updates output.")
                    .with_recommendation("Ensure the file was generated with: wmic qfe list full /format:csv")],
            ));
        }

        let (headers, body) = (&rows[0], &rows[1..]);
        let hotfix_col = column(headers, "hotfixid");
        let date_col = column(headers, "installedon");
        let desc_col = column(headers, "description");

        // (hotfix id, installed on, description)
        let updates: Vec<(&str, &str, &str)> = body
            .iter()
            .map(|row| (field(row, hotfix_col), field(row, date_col), field(row, desc_col)))
            .filter(|(hotfix, _, _)| !hotfix.is_empty())
            .collect();

        let mut issues = Vec::new();
        let mut summary = Summary::new().with("update_count", updates.len());

        let mut newest: Option<(NaiveDate, &str)> = None;
        for (hotfix, installed_on, _) in &updates {
            if let Some(date) = parse_install_date(installed_on) {
                if newest.map_or(true, |(best, _)| date > best) {
                    newest = Some((date, hotfix));
                }
            }
        }

        if let Some((date, kb)) = newest {
            let midnight = date.and_hms_opt(0, 0, 0).unwrap_or_default();
            let days = (self.clock.now() - midnight)
                .num_seconds()
                .div_euclid(SECONDS_PER_DAY);
            let shown = date.format("%-m/%-d/%Y").to_string();
            summary.insert("days_since_last_update", days);
            summary.insert("last_update_date", shown.clone());
            summary.insert("last_update_kb", kb);

            let raw = format!("Last update: {} on {}", kb, shown);
            if days > 90 {
                issues.push(
                    Issue::critical(format!("Windows updates are {} days old", days))
                        .with_detail(format!(
                            "Last update ({}) was installed on {}. That's over {} months without updates.",
                            kb,
                            shown,
                            days.div_euclid(30)
                        ))
                        .with_raw(raw)
                        .with_recommendation("Run Windows Update immediately. Unpatched systems are vulnerable to security exploits."),
                );
            } else if days > 45 {
                issues.push(
                    Issue::warning(format!("Last Windows update was {} days ago", days))
                        .with_detail(format!("Last update ({}) installed on {}.", kb, shown))
                        .with_raw(raw)
                        .with_recommendation("Check for pending Windows updates. Updates should be installed at least monthly."),
                );
            } else {
                issues.push(
                    Issue::info(format!("Windows updates are current ({} days ago)", days))
                        .with_detail(format!("Last update ({}) installed on {}.", kb, shown))
                        .with_raw(raw)
                        .with_recommendation("Updates are up to date. Keep automatic updates enabled."),
                );
            }
        }

        let security = updates
            .iter()
            .filter(|(_, _, description)| regex!(r"(?i)security").is_match(description))
            .count();
        summary.insert("security_updates", security);

        if security == 0 && !updates.is_empty() {
            issues.push(
                Issue::warning("No security updates detected in installed updates")
                    .with_detail(format!(
                        "Of {} installed updates, none are marked as security updates.",
                        updates.len()
                    ))
                    .with_raw(format!("Total updates: {}, Security: 0", updates.len()))
                    .with_recommendation("Run Windows Update and specifically check for security updates."),
            );
        }

        summary.insert(
            "kb_numbers",
            Value::from(
                updates
                    .iter()
                    .map(|(hotfix, _, _)| *hotfix)
                    .filter(|hotfix| regex!(r"(?i)^KB").is_match(hotfix))
                    .collect::<Vec<_>>(),
            ),
        );

        let result = ParseResult::new(summary, issues);
        Ok(result.or_fallback(
            Issue::info("No installed updates listed")
                .with_detail("The update listing contained a header but no hotfix rows.")
                .with_recommendation("Ensure the file was generated with: wmic qfe list full /format:csv"),
        ))
    }
}
