//! `driverquery /v /fo csv`

use chrono::NaiveDate;

use crate::errors::ParseError;
use crate::models::{Category, Issue, ParseResult, Summary};
use crate::parsers::text::{
    column, csv_rows, field, filename_has, has_extension, months_since, parse_iso_date,
    parse_us_date, Clock,
};
use crate::parsers::{ParserBase, ReportParser};

struct Driver<'a> {
    module: &'a str,
    display_name: &'a str,
    driver_type: &'a str,
    link_date: &'a str,
    state: &'a str,
    start_mode: &'a str,
}

impl Driver<'_> {
    fn label(&self) -> &str {
        if self.display_name.is_empty() {
            self.module
        } else {
            self.display_name
        }
    }
}

/// Installed drivers with state, start mode and link date
pub struct DriverQuery {
    base: ParserBase,
    clock: Clock,
}

impl Default for DriverQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl DriverQuery {
    pub fn new() -> Self {
        Self::with_clock(Clock::System)
    }

    /// Use `clock` when computing driver age
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            base: ParserBase::new(
                "Driver Query",
                Category::System,
                "All installed drivers with version, date, and status",
            ),
            clock,
        }
    }
}

fn parse_driver_date(text: &str) -> Option<NaiveDate> {
    parse_us_date(text).or_else(|| parse_iso_date(text))
}

impl ReportParser for DriverQuery {
    parser_identity!();

    fn detect(&self, content: &str, filename: &str) -> bool {
        if filename_has(filename, &["driver"]) && has_extension(filename, &[".csv"]) {
            return true;
        }
        regex!(r"(?i)Module Name").is_match(content)
            && regex!(r"(?i)Display Name").is_match(content)
            && regex!(r"(?i)Driver Type").is_match(content)
    }

    fn parse(&self, content: &str) -> Result<ParseResult, ParseError> {
        let rows = csv_rows(content);
        let Some((headers, body)) = rows.split_first() else {
            return Ok(ParseResult::with_score(
                Summary::new().with("total_drivers", 0),
                100,
                vec![Issue::info("No driver data found")
                    .with_detail("Could not parse driver query output.")
                    .with_recommendation("Ensure the file was generated with: driverquery /v /fo csv")],
            ));
        };

        let module_col = column(headers, "Module Name");
        let display_col = column(headers, "Display Name");
        let type_col = column(headers, "Driver Type");
        let date_col = column(headers, "Link Date");
        let state_col = column(headers, "State");
        let start_col = column(headers, "Start Mode");

        let drivers: Vec<Driver> = body
            .iter()
            .map(|row| Driver {
                module: field(row, module_col),
                display_name: field(row, display_col),
                driver_type: field(row, type_col),
                link_date: field(row, date_col),
                state: field(row, state_col),
                start_mode: field(row, start_col),
            })
            .collect();

        let mut issues = Vec::new();
        let mut summary = Summary::new().with("total_drivers", drivers.len());

        let stopped: Vec<&Driver> = drivers
            .iter()
            .filter(|d| {
                regex!(r"(?i)stopped").is_match(d.state)
                    && regex!(r"(?i)boot|system|auto").is_match(d.start_mode)
            })
            .collect();
        if !stopped.is_empty() {
            let verb = if stopped.len() > 1 { "s are" } else { " is" };
            issues.push(
                Issue::warning(format!("{} auto-start driver{} stopped", stopped.len(), verb))
                    .with_detail(format!(
                        "Drivers expected to be running but are stopped: {}",
                        stopped.iter().take(5).map(|d| d.label()).collect::<Vec<_>>().join(", ")
                    ))
                    .with_raw(
                        stopped
                            .iter()
                            .take(5)
                            .map(|d| format!("{} ({}) - {}", d.module, d.display_name, d.state))
                            .collect::<Vec<_>>()
                            .join("\n"),
                    )
                    .with_recommendation("These drivers should be running. Check Device Manager for errors or reinstall affected drivers."),
            );
        }

        let now = self.clock.now();
        let mut old = 0usize;
        let mut very_old: Vec<&Driver> = Vec::new();
        for driver in &drivers {
            let Some(date) = parse_driver_date(driver.link_date) else {
                continue;
            };
            let age = months_since(date, now);
            if age > 60 {
                very_old.push(driver);
            } else if age > 36 {
                old += 1;
            }
        }
        summary.insert("outdated_drivers", very_old.len() + old);

        let listing: Vec<String> = very_old
            .iter()
            .take(5)
            .map(|d| format!("{}: {}", d.label(), d.link_date))
            .collect();
        if very_old.len() > 10 {
            issues.push(
                Issue::warning(format!("{} drivers are over 5 years old", very_old.len()))
                    .with_detail("Many drivers haven't been updated in over 5 years. This is common for built-in Windows drivers but some may need attention.")
                    .with_raw(listing.join("\n"))
                    .with_recommendation("Review old drivers. Some may be built-in Windows drivers (normal), but third-party drivers should be updated."),
            );
        } else if !very_old.is_empty() {
            let verb = if very_old.len() > 1 { "s are" } else { " is" };
            issues.push(
                Issue::info(format!("{} driver{} over 5 years old", very_old.len(), verb))
                    .with_detail(listing.join("; "))
                    .with_raw(listing.join("\n"))
                    .with_recommendation("Check if these drivers have newer versions available."),
            );
        }

        summary.insert(
            "kernel_drivers",
            drivers
                .iter()
                .filter(|d| regex!(r"(?i)kernel").is_match(d.driver_type))
                .count(),
        );
        summary.insert(
            "file_system_drivers",
            drivers
                .iter()
                .filter(|d| regex!(r"(?i)file system").is_match(d.driver_type))
                .count(),
        );

        if issues.is_empty() {
            issues.push(
                Issue::info(format!("{} drivers loaded — no issues detected", drivers.len()))
                    .with_detail("All checked drivers appear to be in normal state.")
                    .with_recommendation("Drivers look healthy. Keep them updated periodically."),
            );
        }

        Ok(ParseResult::new(summary, issues))
    }
}
