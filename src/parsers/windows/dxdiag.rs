//! `dxdiag /t` text export

use crate::errors::ParseError;
use crate::models::{Category, Issue, ParseResult, Summary};
use crate::parsers::text::{
    capture, capture_trimmed, filename_has, has_extension, months_since, parse_float, parse_us_date,
    Clock,
};
use crate::parsers::{ParserBase, ReportParser};

/// DirectX diagnostics: GPU, display driver age and reported problems
pub struct DxDiag {
    base: ParserBase,
    clock: Clock,
}

impl Default for DxDiag {
    fn default() -> Self {
        Self::new()
    }
}

impl DxDiag {
    pub fn new() -> Self {
        Self::with_clock(Clock::System)
    }

    /// Use `clock` when computing driver age
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            base: ParserBase::new(
                "DxDiag Report",
                Category::System,
                "DirectX diagnostics: GPU, display driver, audio devices, problems found",
            ),
            clock,
        }
    }
}

impl ReportParser for DxDiag {
    parser_identity!();

    fn detect(&self, content: &str, filename: &str) -> bool {
        if filename_has(filename, &["dxdiag"]) && has_extension(filename, &[".txt"]) {
            return true;
        }
        (regex!(r"(?i)DxDiag").is_match(content) && regex!(r"(?i)DirectX").is_match(content))
            || (regex!(r"(?i)System Information").is_match(content)
                && regex!(r"(?i)Display Devices").is_match(content)
                && regex!(r"(?i)DirectX Version").is_match(content))
    }

    fn parse(&self, content: &str) -> Result<ParseResult, ParseError> {
        let mut issues = Vec::new();
        let mut summary = Summary::new();

        let directx_version = capture_trimmed(regex!(r"(?i)DirectX Version:\s*(.+)"), content)
            .unwrap_or_else(|| "Unknown".to_string());
        summary.insert("directx_version", directx_version.clone());
        summary.insert(
            "os",
            capture_trimmed(regex!(r"(?i)Operating System:\s*(.+)"), content),
        );
        summary.insert("cpu", capture_trimmed(regex!(r"(?i)Processor:\s*(.+)"), content));
        summary.insert("ram", capture_trimmed(regex!(r"(?i)Memory:\s*(.+)"), content));

        // The display section runs until the next dashed banner
        let display = capture(
            regex!(r"(?i)-+\s*Display Devices\s*-+\s*([\s\S]*?)(?:-{5,}|\z)"),
            content,
        )
        .unwrap_or(content);

        let gpu_name = capture_trimmed(regex!(r"(?i)Card name:\s*(.+)"), display)
            .unwrap_or_else(|| "Unknown".to_string());
        let driver_version =
            capture_trimmed(regex!(r"(?i)Driver Version:\s*(.+)"), display).unwrap_or_default();
        let driver_date = capture_trimmed(regex!(r"(?i)Driver Date/Size:\s*(.+)"), display)
            .or_else(|| capture_trimmed(regex!(r"(?i)Driver Date:\s*(.+)"), display))
            .unwrap_or_default();

        summary.insert("gpu_name", gpu_name.clone());
        summary.insert(
            "gpu_manufacturer",
            capture_trimmed(regex!(r"(?i)Manufacturer:\s*(.+)"), display),
        );
        summary.insert(
            "vram",
            capture_trimmed(
                regex!(r"(?i)(?:Dedicated Memory|Display Memory|Approx\.\s*Total Memory):\s*(.+)"),
                display,
            ),
        );
        summary.insert("driver_version", driver_version.clone());
        summary.insert("driver_date", driver_date.clone());

        if let Some(date) = parse_us_date(&driver_date) {
            let age = months_since(date, self.clock.now());
            summary.insert("driver_age_months", age);
            let raw = format!("Driver: {}, Date: {}", driver_version, driver_date);
            if age > 24 {
                issues.push(
                    Issue::warning(format!("Display driver is {} months old", age))
                        .with_detail(format!(
                            "GPU driver for {} was last updated {}. That's over {} years ago.",
                            gpu_name,
                            driver_date,
                            age / 12
                        ))
                        .with_raw(raw)
                        .with_recommendation("Update your GPU driver from the manufacturer website (NVIDIA, AMD, or Intel)."),
                );
            } else if age > 12 {
                issues.push(
                    Issue::info(format!("Display driver is {} months old", age))
                        .with_detail(format!(
                            "GPU driver for {} was last updated {}.",
                            gpu_name, driver_date
                        ))
                        .with_raw(raw)
                        .with_recommendation("Consider updating your GPU driver for best performance and compatibility."),
                );
            }
        }

        for note in regex!(r"(?i)(?:Notes|Problems Found):\s*(.+)").captures_iter(content) {
            let text = note[1].trim();
            if text.chars().count() > 3
                && !regex!(r"(?i)No problems found").is_match(text)
                && !regex!(r"(?i)N/A").is_match(text)
            {
                issues.push(
                    Issue::warning("DxDiag reported a problem")
                        .with_detail(text)
                        .with_raw(note[0].trim_end())
                        .with_recommendation("Investigate the reported issue. May require driver update or DirectX repair."),
                );
            }
        }

        if let Some(whql) = capture(regex!(r"(?i)WHQL.*?:\s*(.+)"), display) {
            if regex!(r"(?i)no").is_match(whql) {
                issues.push(
                    Issue::info("Display driver is not WHQL certified")
                        .with_detail("The GPU driver has not been certified by Windows Hardware Quality Labs.")
                        .with_raw(format!("WHQL: {}", whql.trim()))
                        .with_recommendation("Consider using a WHQL-certified driver version for maximum stability."),
                );
            }
        }

        let numeric: String = directx_version
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        if parse_float(&numeric).is_some_and(|v| v > 0.0 && v < 12.0) {
            issues.push(
                Issue::info(format!("DirectX {} (not the latest)", directx_version))
                    .with_detail(format!(
                        "System is running DirectX {}. DirectX 12 is recommended for modern games and applications.",
                        directx_version
                    ))
                    .with_raw(format!("DirectX Version: {}", directx_version))
                    .with_recommendation("Update Windows to get the latest DirectX version. DirectX 12 comes with Windows 10/11."),
            );
        }

        if issues.is_empty() {
            issues.push(
                Issue::info("Display and DirectX configuration looks good")
                    .with_detail(format!(
                        "GPU: {}, Driver: {}, DirectX: {}",
                        gpu_name, driver_version, directx_version
                    ))
                    .with_recommendation("No issues detected."),
            );
        }

        Ok(ParseResult::new(summary, issues))
    }
}
