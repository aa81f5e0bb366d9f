//! `powercfg /energy` HTML

use crate::errors::ParseError;
use crate::models::{Category, Issue, ParseResult, Summary};
use crate::parsers::text::{
    capture, extract_section, filename_has, has_extension, parse_int, plural,
};
use crate::parsers::{ParserBase, ReportParser};

/// Energy efficiency diagnostics
pub struct EnergyReport {
    base: ParserBase,
}

impl Default for EnergyReport {
    fn default() -> Self {
        Self::new()
    }
}

impl EnergyReport {
    pub fn new() -> Self {
        Self {
            base: ParserBase::new(
                "Energy Report",
                Category::Power,
                "Power efficiency diagnostics, errors, warnings, and power policy issues",
            ),
        }
    }
}

impl ReportParser for EnergyReport {
    parser_identity!();

    fn detect(&self, content: &str, filename: &str) -> bool {
        if filename_has(filename, &["energy"]) && has_extension(filename, &[".html", ".htm"]) {
            return true;
        }
        regex!(r"(?i)Energy Efficiency Diagnostics Report").is_match(content)
            || regex!(r"(?i)energy-report").is_match(content)
            || (regex!(r"(?i)Errors?\s*:").is_match(content)
                && regex!(r"(?i)Warnings?\s*:").is_match(content)
                && regex!(r"(?i)Informational").is_match(content)
                && regex!(r"(?i)Power Policy").is_match(content))
    }

    fn parse(&self, content: &str) -> Result<ParseResult, ParseError> {
        let mut issues = Vec::new();

        let count = |pattern: &regex::Regex| {
            capture(pattern, content).and_then(parse_int).unwrap_or(0)
        };
        let errors = count(regex!(r"(?i)(\d+)\s*Error"));
        let warnings = count(regex!(r"(?i)(\d+)\s*Warning"));
        let informational = count(regex!(r"(?i)(\d+)\s*Informational"));

        let summary = Summary::new()
            .with("errors", errors)
            .with("warnings", warnings)
            .with("informational", informational);

        if regex!(r"(?i)USB\s*Suspend").is_match(content)
            || regex!(r"(?i)not\s*entering\s*(?:the\s*)?suspend").is_match(content)
        {
            issues.push(
                Issue::warning("USB devices not entering suspend state")
                    .with_detail("One or more USB devices are preventing power saving by not entering suspend mode.")
                    .with_raw(extract_section(content, "USB Suspend"))
                    .with_recommendation("Check USB device drivers. Update or uninstall unused USB devices to improve power efficiency."),
            );
        }

        if regex!(r"(?i)Timer\s*Resolution").is_match(content)
            || regex!(r"(?i)platform\s*timer").is_match(content)
        {
            let resolution = capture(regex!(r"(?i)Timer\s*Resolution[^<\d]*?(\d+)"), content)
                .and_then(parse_int);
            if let Some(resolution) = resolution.filter(|r| *r < 5) {
                issues.push(
                    Issue::warning(format!("Platform timer resolution is high ({}ms)", resolution))
                        .with_detail("A low timer resolution forces the CPU to wake more frequently, increasing power usage.")
                        .with_raw(format!("Timer Resolution: {}ms", resolution))
                        .with_recommendation("Identify the application requesting high timer resolution and close it when on battery power."),
                );
            }
        }

        if regex!(r"(?i)Processor\s*power\s*management").is_match(content)
            && (regex!(r"(?i)not\s*configured").is_match(content)
                || regex!(r"(?i)disabled").is_match(content))
        {
            issues.push(
                Issue::warning("Processor power management not optimally configured")
                    .with_detail("Processor power management settings may not be configured for best efficiency.")
                    .with_raw(extract_section(content, "Processor power management"))
                    .with_recommendation("Review power plan settings. Set minimum processor state to a lower value when on battery."),
            );
        }

        if errors > 0 {
            issues.push(
                Issue::critical(format!(
                    "Energy report found {} error{}",
                    errors,
                    plural(errors as usize)
                ))
                .with_detail(format!(
                    "The energy efficiency diagnostics identified {} error-level issues that significantly impact power efficiency.",
                    errors
                ))
                .with_raw(format!(
                    "Errors: {}, Warnings: {}, Informational: {}",
                    errors, warnings, informational
                ))
                .with_recommendation("Review and address each error in the energy report. These typically indicate drivers or settings that waste significant power."),
            );
        }

        if warnings > 5 {
            issues.push(
                Issue::warning(format!("Energy report has {} warnings", warnings))
                    .with_detail(format!(
                        "The energy report identified {} warning-level issues.",
                        warnings
                    ))
                    .with_raw(format!("Warnings: {}", warnings))
                    .with_recommendation("Review warnings for quick power efficiency wins like adjusting display timeout or sleep settings."),
            );
        } else if warnings > 0 {
            issues.push(
                Issue::info(format!(
                    "Energy report has {} warning{}",
                    warnings,
                    plural(warnings as usize)
                ))
                .with_detail(format!(
                    "The energy report identified {} minor warning-level issues.",
                    warnings
                ))
                .with_raw(format!("Warnings: {}", warnings))
                .with_recommendation("Review warnings to see if any quick power savings can be achieved."),
            );
        }

        if informational > 0 && errors == 0 && warnings == 0 {
            issues.push(
                Issue::info(format!(
                    "Energy report: {} informational item{}",
                    informational,
                    plural(informational as usize)
                ))
                .with_detail("Only informational items were found, no significant power efficiency problems detected.")
                .with_raw(format!("Informational: {}", informational))
                .with_recommendation("No major action needed. Review informational items for optional tweaks."),
            );
        }

        Ok(ParseResult::new(summary, issues).or_fallback(
            Issue::info("Energy report shows no efficiency problems")
                .with_detail("No errors, warnings, or informational items could be extracted from the report.")
                .with_recommendation("Generate the report from an elevated prompt with: powercfg /energy"),
        ))
    }
}
