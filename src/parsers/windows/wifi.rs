//! `netsh wlan show wlanreport` HTML

use crate::errors::ParseError;
use crate::models::{Category, Issue, ParseResult, Summary};
use crate::parsers::text::{
    capture, capture_trimmed, count_matches, filename_has, has_extension, parse_int, plural,
};
use crate::parsers::{ParserBase, ReportParser};

/// WiFi connection history: disconnects, failures, signal and error codes
pub struct WifiReport {
    base: ParserBase,
}

impl Default for WifiReport {
    fn default() -> Self {
        Self::new()
    }
}

impl WifiReport {
    pub fn new() -> Self {
        Self {
            base: ParserBase::new(
                "WiFi Report",
                Category::Network,
                "WiFi connection history, disconnects, signal quality, errors",
            ),
        }
    }
}

impl ReportParser for WifiReport {
    parser_identity!();

    fn detect(&self, content: &str, filename: &str) -> bool {
        if filename_has(filename, &["wifi", "wlan"])
            && has_extension(filename, &[".html", ".htm"])
        {
            return true;
        }
        (regex!(r"(?i)Wireless LAN").is_match(content) && regex!(r"(?i)wlan").is_match(content))
            || regex!(r"(?i)WlanReport").is_match(content)
            || regex!(r"(?i)Wi-Fi\s*Session").is_match(content)
    }

    fn parse(&self, content: &str) -> Result<ParseResult, ParseError> {
        let mut issues = Vec::new();
        let mut summary = Summary::new();

        let ssid = capture_trimmed(regex!(r"(?i)SSID[^<:]*?[>:]\s*([^<\n]+)"), content);
        summary.insert(
            "adapter",
            capture_trimmed(
                regex!(r"(?i)(?:Adapter|Interface)\s*(?:Name|Description)[^<:]*?[>:]\s*([^<\n]+)"),
                content,
            ),
        );
        summary.insert("ssid", ssid.clone());
        summary.insert(
            "profile",
            capture_trimmed(regex!(r"(?i)Profile[^<:]*?[>:]\s*([^<\n]+)"), content),
        );

        // Each event tends to show up twice, once as a label and once as a value
        let disconnects = count_matches(regex!(r"(?i)disconnect"), content) / 2;
        let failures = count_matches(regex!(r"(?i)fail"), content) / 2;
        summary.insert("disconnects", disconnects);
        summary.insert("connection_failures", failures);

        let signal = capture(regex!(r"(?i)Signal\s*(?:Quality|Strength)[^<\d]*?(\d+)\s*%"), content)
            .and_then(parse_int);
        if let Some(signal) = signal {
            summary.insert("signal_quality", signal);
            if signal < 30 {
                issues.push(
                    Issue::critical(format!("Very weak WiFi signal: {}%", signal))
                        .with_detail("WiFi signal quality is very poor, which will cause slow speeds and frequent disconnections.")
                        .with_raw(format!("Signal Quality: {}%", signal))
                        .with_recommendation("Move closer to the router, remove physical obstructions, or consider a WiFi extender/mesh system."),
                );
            } else if signal < 50 {
                issues.push(
                    Issue::warning(format!("Weak WiFi signal: {}%", signal))
                        .with_detail("WiFi signal is below optimal levels. You may experience slower speeds.")
                        .with_raw(format!("Signal Quality: {}%", signal))
                        .with_recommendation("Try moving closer to the router or adjusting its position for better coverage."),
                );
            }
        }

        let raw = format!("Disconnection events: ~{}", disconnects);
        if disconnects > 10 {
            issues.push(
                Issue::critical(format!("{} WiFi disconnections detected", disconnects))
                    .with_detail("Frequent WiFi disconnections indicate a serious connectivity problem.")
                    .with_raw(raw)
                    .with_recommendation("Check WiFi driver, router firmware, and interference from nearby networks. Try changing WiFi channel."),
            );
        } else if disconnects > 5 {
            issues.push(
                Issue::warning(format!("{} WiFi disconnections detected", disconnects))
                    .with_detail("Several WiFi disconnection events found in the report.")
                    .with_raw(raw)
                    .with_recommendation("Update WiFi adapter driver. Check for interference from other WiFi networks or devices."),
            );
        } else if disconnects > 0 {
            issues.push(
                Issue::info(format!(
                    "{} WiFi disconnection{} detected",
                    disconnects,
                    plural(disconnects)
                ))
                .with_detail("A few WiFi disconnections were found, which may be normal.")
                .with_raw(raw)
                .with_recommendation("Monitor for recurring disconnection patterns."),
            );
        }

        if failures > 5 {
            issues.push(
                Issue::warning("Multiple WiFi connection failures detected")
                    .with_detail(format!(
                        "Approximately {} connection failures found in the report.",
                        failures
                    ))
                    .with_raw(format!("Connection failures: ~{}", failures))
                    .with_recommendation("Check WiFi password, driver, and router settings. Try forgetting and reconnecting to the network."),
            );
        }

        let mut error_codes: Vec<&str> = Vec::new();
        let codes = regex!(r"(?i)(?:Error|error code)[^<\d]*?(?:0x[0-9a-fA-F]+|\d+)");
        for m in codes.find_iter(content) {
            let code = m.as_str().trim();
            if !error_codes.contains(&code) {
                error_codes.push(code);
            }
        }
        if error_codes.len() > 3 {
            issues.push(
                Issue::warning(format!("{} error codes found in WiFi report", error_codes.len()))
                    .with_detail(format!(
                        "Error codes: {}",
                        error_codes[..5.min(error_codes.len())].join(", ")
                    ))
                    .with_raw(error_codes.iter().take(10).copied().collect::<Vec<_>>().join("\n"))
                    .with_recommendation("Search for these error codes to identify specific WiFi issues. Updating the WiFi driver often resolves many errors."),
            );
        }

        if issues.is_empty() {
            issues.push(
                Issue::info("WiFi report shows no significant issues")
                    .with_detail(match &ssid {
                        Some(ssid) => format!("Connected to: {}", ssid),
                        None => "No major WiFi problems detected.".to_string(),
                    })
                    .with_recommendation("WiFi connectivity appears healthy."),
            );
        }

        Ok(ParseResult::new(summary, issues))
    }
}
