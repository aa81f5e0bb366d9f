//! Suggested fixes for known issue patterns

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use strum_macros::{Display, EnumString};

use crate::models::Issue;

/// How an issue can be resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FixKind {
    /// A command exists the user can run
    Fixable,

    /// Needs human judgement, no safe command
    Manual,

    /// Needs physical intervention or replacement
    Hardware,
}

impl FixKind {
    pub fn label(&self) -> &'static str {
        match self {
            FixKind::Fixable => "Fixable",
            FixKind::Manual => "Manual",
            FixKind::Hardware => "Hardware",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            FixKind::Fixable => "🔧",
            FixKind::Manual => "📋",
            FixKind::Hardware => "🔩",
        }
    }
}

/// A suggested fix for one issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RemediationEntry {
    pub fix_kind: FixKind,

    /// Command to run, when one exists
    pub command: Option<&'static str>,

    /// What to do, in prose
    pub guide: &'static str,
}

struct Rule {
    pattern: Regex,
    entry: RemediationEntry,
}

type RuleSpec = (&'static str, FixKind, Option<&'static str>, &'static str);

/// Rules in match order; specific patterns sit ahead of the general ones they overlap
const RULE_SPECS: &[RuleSpec] = &[
    // Battery and power
    (
        r"(?i)battery.*(?:critically|very)\s*low|battery.*health.*(?:[0-3]\d|[0-4]0)%",
        FixKind::Hardware,
        None,
        "Battery is severely degraded. Replace the battery or contact the manufacturer for a replacement part.",
    ),
    (
        r"(?i)battery.*(?:degraded|health.*(?:[4-7]\d)%)",
        FixKind::Manual,
        None,
        "Battery health is declining. Calibrate by fully charging, then discharging to ~5%, then fully charging again. Avoid extreme temperatures.",
    ),
    (
        r"(?i)high.*(?:battery|power).*drain",
        FixKind::Fixable,
        Some("powercfg /energy"),
        "Run an energy report to identify power-hungry components. Check background apps and adjust power plan to \"Balanced\" or \"Power Saver\".",
    ),
    (
        r"(?i)high.*cycle\s*count",
        FixKind::Hardware,
        None,
        "Battery has exceeded its rated charge cycle life. Consider replacing the battery to restore full capacity.",
    ),
    // Drivers
    (
        r"(?i)outdated.*driver|driver.*outdated|old.*driver",
        FixKind::Fixable,
        Some("pnputil /scan-devices"),
        "Update outdated drivers via Device Manager > right-click device > Update driver, or download from the manufacturer website.",
    ),
    (
        r"(?i)driver.*error|driver.*problem|device.*error",
        FixKind::Fixable,
        Some("pnputil /scan-devices"),
        "Reinstall the problematic driver: Device Manager > right-click > Uninstall device > Scan for hardware changes.",
    ),
    // Startup and boot
    (
        r"(?i)(?:high|many|too many).*startup|startup.*(?:count|programs?).*(?:high|\d{2,})",
        FixKind::Fixable,
        Some("msconfig"),
        "Open Task Manager > Startup tab, and disable unnecessary startup programs to speed up boot time.",
    ),
    (
        r"(?i)slow.*boot|boot.*slow|long.*boot",
        FixKind::Fixable,
        Some("systemd-analyze blame"),
        "Identify slow boot services. Disable unnecessary services that delay startup.",
    ),
    // Disk and storage
    (
        r"(?i)low.*(?:disk|storage|space)|disk.*(?:space|full)|free.*space.*(?:low|critical)",
        FixKind::Fixable,
        Some("cleanmgr"),
        "Run Disk Cleanup (cleanmgr) to remove temporary files. Uninstall unused programs. Move large files to external storage.",
    ),
    (
        r"(?i)bad\s*sectors|reallocated|pending\s*sectors",
        FixKind::Hardware,
        None,
        "Disk has failing sectors. Back up data immediately and plan to replace the drive.",
    ),
    (
        r"(?i)disk.*(?:temperature|temp).*high|high.*disk.*temp",
        FixKind::Manual,
        None,
        "Ensure adequate airflow around the drive. Clean dust from vents and fans. Consider adding a cooling pad for laptops.",
    ),
    (
        r"(?i)smart.*(?:fail|warning|alert)",
        FixKind::Hardware,
        None,
        "SMART health check indicates the drive may be failing. Back up all data immediately and replace the drive.",
    ),
    // WiFi and network
    (
        r"(?i)wifi.*disconnect|wireless.*disconnect|wifi.*drop|connection.*drop",
        FixKind::Fixable,
        Some("netsh wlan show wlanreport"),
        "Reset the WiFi adapter: Settings > Network > Wi-Fi > Manage > Forget network, then reconnect. Update WiFi drivers.",
    ),
    (
        r"(?i)no.*(?:ip|network|internet)|network.*(?:down|unavailable)",
        FixKind::Fixable,
        Some("ipconfig /release && ipconfig /renew"),
        "Release and renew IP address. If that fails, reset the network stack: netsh winsock reset && netsh int ip reset",
    ),
    (
        r"(?i)interface.*down|link.*down",
        FixKind::Fixable,
        Some("sudo ip link set <iface> up"),
        "Bring the interface up. Check cable connections or WiFi settings if the issue persists.",
    ),
    // Updates and security
    (
        r"(?i)missing.*update|update.*missing|no.*recent.*update|days.*since.*update.*(?:[6-9]\d|\d{3,})",
        FixKind::Fixable,
        Some("wuauclt /detectnow"),
        "Open Windows Update (Settings > Update & Security) and install all pending updates to stay protected.",
    ),
    (
        r"(?i)pending.*update|upgradable.*package|package.*upgrade",
        FixKind::Fixable,
        Some("sudo apt update && sudo apt upgrade -y"),
        "Install pending package updates to get the latest security patches and bug fixes.",
    ),
    (
        r"(?i)critical.*event|critical.*error|kernel.*panic|oops",
        FixKind::Manual,
        None,
        "Review the critical events in detail. These may indicate hardware failure, driver bugs, or OS corruption. Consider running system file checks.",
    ),
    (
        r"(?i)segfault|segmentation\s*fault",
        FixKind::Manual,
        None,
        "Segmentation faults indicate software or memory issues. Test RAM with memtest86+ and check for software updates.",
    ),
    // Memory
    (
        r"(?i)high.*memory.*usage|memory.*(?:high|critical|full)|ram.*(?:full|maxed|high)",
        FixKind::Fixable,
        Some("tasklist /v /fo csv"),
        "Close memory-hungry applications. Check for memory leaks. Consider adding more RAM if usage is consistently high.",
    ),
    (
        r"(?i)high.*swap|swap.*(?:usage|full|high)",
        FixKind::Manual,
        None,
        "High swap usage means RAM is full. Close unused applications or add more RAM. Increasing swap size is a temporary workaround.",
    ),
    // GPU
    (
        r"(?i)gpu.*(?:error|problem|issue)|display.*(?:error|problem)",
        FixKind::Fixable,
        None,
        "Update GPU drivers from the manufacturer website (NVIDIA, AMD, or Intel). Use DDU (Display Driver Uninstaller) for a clean reinstall if needed.",
    ),
    // Crashes
    (
        r"(?i)unexpected\s*shutdown|improper\s*shutdown|bsod|blue\s*screen",
        FixKind::Manual,
        Some("sfc /scannow"),
        "Run System File Checker (sfc /scannow) and DISM (DISM /Online /Cleanup-Image /RestoreHealth) to repair system files.",
    ),
    // USB and hardware errors
    (
        r"(?i)usb.*(?:error|fail|disconnect)|device.*descriptor.*read",
        FixKind::Manual,
        None,
        "Try a different USB port. Check the USB cable. If the issue persists, the USB device or port may be faulty.",
    ),
    (
        r"(?i)hardware.*error|pcie.*error|mce|machine\s*check",
        FixKind::Hardware,
        None,
        "Hardware errors detected. Run hardware diagnostics from the manufacturer. Check for overheating and loose connections.",
    ),
];

static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    RULE_SPECS
        .iter()
        .filter_map(|&(pattern, fix_kind, command, guide)| {
            let pattern = Regex::new(pattern).ok()?;
            Some(Rule {
                pattern,
                entry: RemediationEntry {
                    fix_kind,
                    command,
                    guide,
                },
            })
        })
        .collect()
});

/// Look up the fix for `issue`
///
/// Rules are tried in order against the title, detail and recommendation
/// joined by spaces; the first match wins. `None` means no fix is known.
pub fn get_remediation(issue: &Issue) -> Option<RemediationEntry> {
    let text = format!("{} {} {}", issue.title, issue.detail, issue.recommendation);
    RULES
        .iter()
        .find(|rule| rule.pattern.is_match(&text))
        .map(|rule| rule.entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_rule_compiles() {
        assert_eq!(RULES.len(), RULE_SPECS.len());
    }
}
