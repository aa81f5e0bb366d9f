//! `powercfg /batteryreport` HTML

use crate::errors::ParseError;
use crate::models::{Category, Issue, ParseResult, Summary};
use crate::parsers::text::{capture, filename_has, has_extension, parse_int, round};
use crate::parsers::{ParserBase, ReportParser};

/// Battery capacity, wear and drain from the Windows battery report
pub struct BatteryReport {
    base: ParserBase,
}

impl Default for BatteryReport {
    fn default() -> Self {
        Self::new()
    }
}

impl BatteryReport {
    pub fn new() -> Self {
        Self {
            base: ParserBase::new(
                "Battery Report",
                Category::Power,
                "Battery health, capacity, cycle count, and usage history",
            ),
        }
    }
}

impl ReportParser for BatteryReport {
    parser_identity!();

    fn detect(&self, content: &str, filename: &str) -> bool {
        if filename_has(filename, &["battery"]) && has_extension(filename, &[".html", ".htm"]) {
            return true;
        }
        regex!(r"(?i)battery\s*report").is_match(content)
            || regex!(r"(?i)BATTERY:BATTERY").is_match(content)
            || (regex!(r"(?i)Design\s*Capacity").is_match(content)
                && regex!(r"(?i)Full\s*Charge\s*Capacity").is_match(content))
    }

    fn parse(&self, content: &str) -> Result<ParseResult, ParseError> {
        let mut issues = Vec::new();
        let mut summary = Summary::new();

        let design = capture(regex!(r"(?i)Design\s*Capacity[^<\d]*?([\d,]+)\s*mWh"), content)
            .and_then(parse_int);
        let full = capture(
            regex!(r"(?i)Full\s*Charge\s*Capacity[^<\d]*?([\d,]+)\s*mWh"),
            content,
        )
        .and_then(parse_int);
        let cycles =
            capture(regex!(r"(?i)Cycle\s*Count[^<\d]*?(\d+)"), content).and_then(parse_int);

        summary.insert("design_capacity", design);
        summary.insert("full_charge_capacity", full);
        summary.insert("cycle_count", cycles);

        let mut health = None;
        if let (Some(design), Some(full)) = (design.filter(|d| *d > 0), full.filter(|f| *f > 0)) {
            let percent = round(full as f64 / design as f64 * 100.0);
            health = Some(percent);
            summary.insert("health_percent", percent);

            let raw = format!(
                "Design Capacity: {} mWh | Full Charge Capacity: {} mWh",
                design, full
            );
            if percent <= 40 {
                issues.push(
                    Issue::critical(format!("Battery health critically low at {}%", percent))
                        .with_detail(format!(
                            "The battery can only hold {}% of its original design capacity. Design: {} mWh, Current: {} mWh.",
                            percent, design, full
                        ))
                        .with_raw(raw)
                        .with_recommendation("Battery replacement is strongly recommended. The battery has significantly degraded and may cause unexpected shutdowns."),
                );
            } else if percent < 60 {
                issues.push(
                    Issue::warning(format!("Battery health degraded at {}%", percent))
                        .with_detail(format!(
                            "The battery holds {}% of its original capacity. Design: {} mWh, Current: {} mWh.",
                            percent, design, full
                        ))
                        .with_raw(raw)
                        .with_recommendation("Consider replacing the battery soon. Avoid leaving the laptop unplugged for extended periods."),
                );
            } else if percent < 80 {
                issues.push(
                    Issue::info(format!("Battery health at {}%", percent))
                        .with_detail(format!(
                            "The battery holds {}% of its original capacity, which is normal for a used battery.",
                            percent
                        ))
                        .with_raw(raw)
                        .with_recommendation("Battery is aging normally. Monitor health periodically."),
                );
            }
        }

        if let Some(cycles) = cycles {
            if cycles > 1000 {
                issues.push(
                    Issue::warning(format!("High battery cycle count: {}", cycles))
                        .with_detail(format!(
                            "The battery has completed {} charge cycles. Most batteries are rated for 300-500 cycles.",
                            cycles
                        ))
                        .with_raw(format!("Cycle Count: {}", cycles))
                        .with_recommendation("Battery has exceeded typical cycle life. Consider replacement if experiencing short battery life."),
                );
            } else if cycles > 500 {
                issues.push(
                    Issue::info(format!("Battery cycle count: {}", cycles))
                        .with_detail(format!("The battery has completed {} charge cycles.", cycles))
                        .with_raw(format!("Cycle Count: {}", cycles))
                        .with_recommendation("Battery is approaching end of rated cycle life. Monitor battery health closely."),
                );
            }
        }

        // Drain rate across the first ten "Active" usage rows
        let drain_rates: Vec<i64> = regex!(r"(?is)<tr[^>]*>.*?Active.*?</tr>")
            .find_iter(content)
            .take(10)
            .filter_map(|row| capture(regex!(r"(?i)(\d+)\s*mW"), row.as_str()))
            .filter_map(parse_int)
            .collect();
        if !drain_rates.is_empty() {
            let total: f64 = drain_rates.iter().map(|rate| *rate as f64).sum();
            let average = round(total / drain_rates.len() as f64);
            summary.insert("avg_drain_rate", average);
            if average > 30000 {
                let watts = average as f64 / 1000.0;
                issues.push(
                    Issue::warning(format!("High average battery drain rate: {:.1}W", watts))
                        .with_detail(format!(
                            "Average power consumption is {:.1}W during recent active use.",
                            watts
                        ))
                        .with_raw(format!(
                            "Average drain: {} mW across {} samples",
                            average,
                            drain_rates.len()
                        ))
                        .with_recommendation("Check for power-hungry background applications. Consider adjusting power plan to \"Power Saver\" when on battery."),
                );
            }
        }

        let fallback = if design.is_some_and(|d| d > 0) {
            Issue::info("Battery health is good")
                .with_detail(match health {
                    Some(percent) => format!("Battery is at {}% of design capacity.", percent),
                    None => "No significant battery issues detected.".to_string(),
                })
                .with_recommendation("No action needed. Continue normal usage.")
        } else {
            Issue::info("No battery capacity data found")
                .with_detail("Could not extract design or full charge capacity from the report.")
                .with_recommendation("Generate the report with: powercfg /batteryreport")
        };

        Ok(ParseResult::new(summary, issues).or_fallback(fallback))
    }
}
