//! `smartctl -a` drive report

use crate::errors::ParseError;
use crate::models::{Category, Issue, ParseResult, Summary};
use crate::parsers::text::{capture, capture_trimmed, filename_has, parse_int};
use crate::parsers::{ParserBase, ReportParser};

/// Drive self-assessment, temperature, wear and bad sectors from smartctl
pub struct Smartctl {
    base: ParserBase,
}

impl Default for Smartctl {
    fn default() -> Self {
        Self::new()
    }
}

impl Smartctl {
    pub fn new() -> Self {
        Self {
            base: ParserBase::new(
                "smartctl",
                Category::Storage,
                "SMART health, temperature, power-on hours and sector reallocation",
            ),
        }
    }
}

/// RAW_VALUE of an ATA attribute table row
///
/// Rows look like
/// `194 Temperature_Celsius 0x0022 036 045 000 Old_age Always - 36 (Min/Max 19/45)`;
/// the raw value is the tenth column. Rows with fewer columns fall back to the
/// last number on the line.
fn attribute(content: &str, name: &str) -> Option<i64> {
    content.lines().find_map(|line| {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let at = fields.iter().position(|f| *f == name)?;
        if fields.len() >= at + 9 {
            return parse_int(fields[at + 8]);
        }
        fields[at + 1..].iter().rev().find_map(|f| parse_int(f))
    })
}

/// `52000` as `52,000`
fn thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::new();
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if value < 0 {
        out.insert(0, '-');
    }
    out
}

impl ReportParser for Smartctl {
    parser_identity!();

    fn detect(&self, content: &str, filename: &str) -> bool {
        if filename_has(filename, &["smartctl", "smart"]) {
            return true;
        }
        regex!(r"(?i)smartctl\s+[\d.]+").is_match(content)
            || regex!(r"(?i)SMART\s+overall-health").is_match(content)
            || regex!(r"(?i)SMART/Health\s+Information").is_match(content)
    }

    fn parse(&self, content: &str) -> Result<ParseResult, ParseError> {
        let mut issues = Vec::new();
        let mut summary = Summary::new();

        let model = capture_trimmed(
            regex!(r"(?i)(?:Device Model|Product|Model Number):\s*(.+)"),
            content,
        );
        if let Some(model) = &model {
            summary.insert("model", model.as_str());
        }
        for (key, re) in [
            ("serial", regex!(r"(?i)Serial\s*Number:\s*(.+)")),
            ("firmware", regex!(r"(?i)Firmware\s*Version:\s*(.+)")),
            ("capacity", regex!(r"(?i)User\s*Capacity:\s*([\d,.\s]+bytes)")),
        ] {
            if let Some(value) = capture_trimmed(re, content) {
                summary.insert(key, value);
            }
        }

        if let Some(health) =
            capture_trimmed(regex!(r"(?i)SMART\s+overall-health.*?:\s*(.+)"), content)
        {
            summary.insert("health", health.as_str());
            if !regex!(r"(?i)passed|ok").is_match(&health) {
                issues.push(
                    Issue::critical(format!("SMART health check FAILED: {}", health))
                        .with_detail("The drive self-assessment test indicates the drive is failing or has failed.")
                        .with_raw(format!("SMART overall-health: {}", health))
                        .with_recommendation("Back up all data immediately and replace the drive as soon as possible."),
                );
            }
        }

        let temperature = attribute(content, "Temperature_Celsius").or_else(|| {
            capture(regex!(r"(?i)Temperature:\s*(\d+)\s*Celsius"), content).and_then(parse_int)
        });
        if let Some(temp) = temperature {
            summary.insert("temperature", format!("{} C", temp));
            let raw = format!("Temperature: {} C", temp);
            if temp > 60 {
                issues.push(
                    Issue::critical(format!("Disk temperature critically high: {} C", temp))
                        .with_detail("Drive temperature exceeds safe operating limits (typically 0-60 C).")
                        .with_raw(raw)
                        .with_recommendation("Improve case airflow, add cooling fans, or move the drive to a cooler location. Sustained high temperatures accelerate drive failure."),
                );
            } else if temp > 50 {
                issues.push(
                    Issue::warning(format!("Disk temperature elevated: {} C", temp))
                        .with_detail("Drive temperature is higher than ideal (recommended: below 45 C).")
                        .with_raw(raw)
                        .with_recommendation("Ensure adequate airflow. Clean dust from vents and fans."),
                );
            }
        }

        let hours = attribute(content, "Power_On_Hours").or_else(|| {
            capture(regex!(r"(?i)Power On Hours:\s*([\d,]+)"), content).and_then(parse_int)
        });
        if let Some(hours) = hours {
            summary.insert("power_on_hours", hours);
            if hours > 50000 {
                issues.push(
                    Issue::warning(format!("Drive has {} power-on hours", thousands(hours)))
                        .with_detail("Extended use increases the likelihood of drive failure.")
                        .with_raw(format!("Power-On Hours: {}", hours))
                        .with_recommendation("Ensure backups are current. Consider proactive drive replacement."),
                );
            }
        }

        if let Some(realloc) = attribute(content, "Reallocated_Sector_Ct") {
            summary.insert("reallocated_sectors", realloc);
            let raw = format!("Reallocated_Sector_Ct: {}", realloc);
            if realloc > 100 {
                issues.push(
                    Issue::critical(format!("{} reallocated sectors detected", realloc))
                        .with_detail("A high number of bad sectors have been remapped. The drive is likely failing.")
                        .with_raw(raw)
                        .with_recommendation("Back up data immediately. Replace the drive."),
                );
            } else if realloc > 0 {
                issues.push(
                    Issue::warning(format!("{} reallocated sector(s) detected", realloc))
                        .with_detail("Some bad sectors have been remapped. This may indicate early drive degradation.")
                        .with_raw(raw)
                        .with_recommendation("Monitor SMART data regularly. Ensure backups are current."),
                );
            }
        }

        if let Some(pending) = attribute(content, "Current_Pending_Sector") {
            summary.insert("pending_sectors", pending);
            if pending > 0 {
                issues.push(
                    Issue::warning(format!("{} pending sector(s) awaiting reallocation", pending))
                        .with_detail("Sectors that could not be read are waiting to be remapped on next write.")
                        .with_raw(format!("Current_Pending_Sector: {}", pending))
                        .with_recommendation("Run a full disk surface scan. Back up data as a precaution."),
                );
            }
        }

        if let Some(offline) = attribute(content, "Offline_Uncorrectable").filter(|n| *n > 0) {
            issues.push(
                Issue::warning(format!("{} uncorrectable offline sector(s)", offline))
                    .with_detail("These sectors could not be read or corrected during offline testing.")
                    .with_raw(format!("Offline_Uncorrectable: {}", offline))
                    .with_recommendation("Run: smartctl -t long /dev/sdX to perform a full test."),
            );
        }

        Ok(ParseResult::new(summary, issues).or_fallback(
            Issue::info("Disk SMART health is good")
                .with_detail(match &model {
                    Some(model) => format!(
                        "Drive: {} — all SMART attributes within normal ranges.",
                        model
                    ),
                    None => "All SMART attributes within normal ranges.".to_string(),
                })
                .with_recommendation("No action needed. Continue regular backups."),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn attribute_reads_raw_value_column() {
        let table = "194 Temperature_Celsius     0x0022   036   045   000    Old_age   Always       -       36 (Min/Max 19/45)\n";
        assert_eq!(attribute(table, "Temperature_Celsius"), Some(36));
        assert_eq!(attribute("Reallocated_Sector_Ct 12", "Reallocated_Sector_Ct"), Some(12));
        assert_eq!(attribute(table, "Power_On_Hours"), None);
    }

    #[test]
    fn thousands_groups_digits() {
        assert_eq!(thousands(52000), "52,000");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1234567), "1,234,567");
    }
}
