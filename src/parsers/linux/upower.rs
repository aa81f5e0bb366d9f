//! `upower -d` device dump

use crate::errors::ParseError;
use crate::models::{Category, Issue, ParseResult, Summary};
use crate::parsers::text::{capture, capture_trimmed, filename_has, parse_float, parse_int, round};
use crate::parsers::{ParserBase, ReportParser};

/// Battery wear, cycles and charge state from UPower
pub struct Upower {
    base: ParserBase,
}

impl Default for Upower {
    fn default() -> Self {
        Self::new()
    }
}

impl Upower {
    pub fn new() -> Self {
        Self {
            base: ParserBase::new(
                "upower",
                Category::Power,
                "Battery capacity, wear level and charge state from upower -d",
            ),
        }
    }
}

fn watt_hours(re: &regex::Regex, content: &str) -> Option<f64> {
    capture(re, content).and_then(parse_float)
}

impl ReportParser for Upower {
    parser_identity!();

    fn detect(&self, content: &str, filename: &str) -> bool {
        if filename_has(filename, &["upower"]) {
            return true;
        }
        regex!(r"(?i)Device:.*battery").is_match(content)
            && regex!(r"(?i)energy-full").is_match(content)
    }

    fn parse(&self, content: &str) -> Result<ParseResult, ParseError> {
        let mut issues = Vec::new();
        let mut summary = Summary::new();

        let design = watt_hours(regex!(r"(?i)energy-full-design:\s*([\d.]+)\s*Wh"), content);
        let full = watt_hours(regex!(r"(?i)energy-full:\s*([\d.]+)\s*Wh"), content);
        summary.insert("design_capacity", design);
        summary.insert("full_charge_capacity", full);

        if let Some(energy) = watt_hours(regex!(r"(?i)energy:\s*([\d.]+)\s*Wh"), content) {
            summary.insert("current_energy", energy);
        }
        let percent =
            capture(regex!(r"(?i)percentage:\s*([\d.]+)%"), content).and_then(parse_float);
        if let Some(percent) = percent {
            summary.insert("charge_percent", percent);
        }
        let state = capture(regex!(r"(?i)state:\s*(\S+)"), content);
        if let Some(state) = state {
            summary.insert("state", state);
        }
        let cycles = capture(regex!(r"(?i)charge-cycles:\s*(\d+)"), content).and_then(parse_int);
        if let Some(cycles) = cycles {
            summary.insert("cycle_count", cycles);
        }
        for (key, re) in [
            ("technology", regex!(r"(?i)technology:\s*(.+)")),
            ("vendor", regex!(r"(?i)vendor:\s*(.+)")),
            ("model", regex!(r"(?i)model:\s*(.+)")),
        ] {
            if let Some(value) = capture_trimmed(re, content) {
                summary.insert(key, value);
            }
        }

        let mut health = None;
        if let (Some(design), Some(full)) =
            (design.filter(|d| *d > 0.0), full.filter(|f| *f > 0.0))
        {
            let percent = round(full / design * 100.0);
            health = Some(percent);
            summary.insert("health_percent", percent);

            let raw = format!("energy-full-design: {} Wh | energy-full: {} Wh", design, full);
            if percent <= 40 {
                issues.push(
                    Issue::critical(format!("Battery health critically low at {}%", percent))
                        .with_detail(format!(
                            "The battery can only hold {}% of its original design capacity. Design: {} Wh, Current: {} Wh.",
                            percent, design, full
                        ))
                        .with_raw(raw)
                        .with_recommendation("Battery replacement is strongly recommended."),
                );
            } else if percent < 60 {
                issues.push(
                    Issue::warning(format!("Battery health degraded at {}%", percent))
                        .with_detail(format!(
                            "The battery holds {}% of its original capacity.",
                            percent
                        ))
                        .with_raw(raw)
                        .with_recommendation("Consider replacing the battery soon."),
                );
            } else if percent < 80 {
                issues.push(
                    Issue::info(format!("Battery health at {}%", percent))
                        .with_detail(format!(
                            "The battery holds {}% of its original capacity, normal for a used battery.",
                            percent
                        ))
                        .with_raw(raw)
                        .with_recommendation("Battery is aging normally. Monitor periodically."),
                );
            }
        }

        if let Some(cycles) = cycles {
            let detail = format!("The battery has completed {} charge cycles.", cycles);
            let raw = format!("charge-cycles: {}", cycles);
            if cycles > 1000 {
                issues.push(
                    Issue::warning(format!("High battery cycle count: {}", cycles))
                        .with_detail(detail)
                        .with_raw(raw)
                        .with_recommendation("Battery has exceeded typical cycle life. Consider replacement."),
                );
            } else if cycles > 500 {
                issues.push(
                    Issue::info(format!("Battery cycle count: {}", cycles))
                        .with_detail(detail)
                        .with_raw(raw)
                        .with_recommendation("Monitor battery health closely."),
                );
            }
        }

        if let (Some("discharging"), Some(percent)) = (state, percent) {
            if percent > 0.0 && percent < 20.0 {
                issues.push(
                    Issue::warning(format!("Battery charge low: {}%", percent))
                        .with_detail("System is running on battery with low charge.")
                        .with_raw(format!("State: discharging | Charge: {}%", percent))
                        .with_recommendation("Connect to power soon to avoid unexpected shutdown."),
                );
            }
        }

        let fallback = if design.is_some_and(|d| d > 0.0) {
            Issue::info("Battery health is good")
                .with_detail(match health.filter(|h| *h != 0) {
                    Some(percent) => format!("Battery is at {}% of design capacity.", percent),
                    None => "No significant battery issues detected.".to_string(),
                })
                .with_recommendation("No action needed.")
        } else {
            Issue::info("No battery detected")
                .with_detail("No battery information found. This may be a desktop system.")
                .with_recommendation("No action needed for desktop systems.")
        };

        Ok(ParseResult::new(summary, issues).or_fallback(fallback))
    }
}
