//! `apt list --upgradable` and `dnf check-update`

use serde_json::{json, Value};

use crate::errors::ParseError;
use crate::models::{Category, Issue, ParseResult, Summary};
use crate::parsers::text::filename_has;
use crate::parsers::{ParserBase, ReportParser};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PackageManager {
    Apt,
    Dnf,
    Unknown,
}

impl PackageManager {
    fn sniff(content: &str) -> Self {
        if regex!(r"(?i)upgradable").is_match(content) {
            PackageManager::Apt
        } else if regex!(r"(?i)\.x86_64|\.noarch|\.i686").is_match(content) {
            PackageManager::Dnf
        } else {
            PackageManager::Unknown
        }
    }

    fn upgrade_command(self, security_only: bool) -> &'static str {
        match (self, security_only) {
            (PackageManager::Apt, _) => "Run: sudo apt update && sudo apt upgrade -y",
            (_, true) => "Run: sudo dnf update --security -y",
            (_, false) => "Run: sudo dnf update -y",
        }
    }
}

struct Package<'a> {
    name: &'a str,
    repo: &'a str,
    new_version: &'a str,
    old_version: Option<&'a str>,
}

impl Package<'_> {
    fn is_security(&self) -> bool {
        regex!(r"(?i)security").is_match(self.repo)
    }

    fn to_json(&self) -> Value {
        let mut value = json!({
            "name": self.name,
            "repo": self.repo,
            "new_version": self.new_version,
        });
        if let (Some(old), Value::Object(map)) = (self.old_version, &mut value) {
            map.insert("old_version".to_string(), Value::from(old));
        }
        value
    }
}

fn apt_packages(content: &str) -> Vec<Package> {
    content
        .split('\n')
        .filter_map(|line| {
            let caps = regex!(r"(?i)^(\S+)/(\S+)\s+(\S+)\s+\S+\s+\[upgradable\s+from:\s+(\S+)\]")
                .captures(line)?;
            Some(Package {
                name: caps.get(1)?.as_str(),
                repo: caps.get(2)?.as_str(),
                new_version: caps.get(3)?.as_str(),
                old_version: Some(caps.get(4)?.as_str()),
            })
        })
        .collect()
}

fn dnf_packages(content: &str) -> Vec<Package> {
    content
        .split('\n')
        .map(str::trim)
        .filter(|line| {
            !line.is_empty()
                && !regex!(r"(?i)^Last metadata").is_match(line)
                && !regex!(r"(?i)Obsoleting").is_match(line)
        })
        .filter_map(|line| {
            let caps = regex!(r"^(\S+)\s+(\S+)\s+(\S+)").captures(line)?;
            let name = caps.get(1)?.as_str();
            if !regex!(r"\.\S+$").is_match(name) {
                return None;
            }
            Some(Package {
                name,
                new_version: caps.get(2)?.as_str(),
                repo: caps.get(3)?.as_str(),
                old_version: None,
            })
        })
        .collect()
}

/// Pending package upgrades on apt and dnf systems
pub struct LinuxUpdates {
    base: ParserBase,
}

impl Default for LinuxUpdates {
    fn default() -> Self {
        Self::new()
    }
}

impl LinuxUpdates {
    pub fn new() -> Self {
        Self {
            base: ParserBase::new(
                "Linux Updates",
                Category::Security,
                "Pending package upgrades from apt or dnf, security updates flagged",
            ),
        }
    }
}

impl ReportParser for LinuxUpdates {
    parser_identity!();

    fn detect(&self, content: &str, filename: &str) -> bool {
        if filename_has(filename, &["linux-updates", "upgradable", "check-update"]) {
            return true;
        }
        regex!(r"(?i)\[upgradable\s+from:").is_match(content)
            || (regex!(r"(?i)Listing\.\.\.").is_match(content)
                && regex!(r"(?i)upgradable").is_match(content))
            || (regex!(r"(?i)\.x86_64|\.noarch|\.i686").is_match(content)
                && regex!(r"(?i)updates|fedora|epel").is_match(content))
    }

    fn parse(&self, content: &str) -> Result<ParseResult, ParseError> {
        let manager = PackageManager::sniff(content);
        let packages = match manager {
            PackageManager::Apt => apt_packages(content),
            PackageManager::Dnf => dnf_packages(content),
            PackageManager::Unknown => Vec::new(),
        };
        let total = packages.len();
        let security = packages.iter().filter(|p| p.is_security()).count();

        let mut summary = Summary::new()
            .with("total_updates", total)
            .with("security_updates", security);
        summary.insert(
            "packages",
            Value::Array(packages.iter().map(Package::to_json).collect()),
        );

        let mut issues = Vec::new();

        if security > 0 {
            issues.push(
                Issue::critical(format!("{} security update(s) pending", security))
                    .with_detail("Security patches are available but not installed.")
                    .with_raw(format!("Security updates: {} out of {} total", security, total))
                    .with_recommendation(manager.upgrade_command(true)),
            );
        }

        if total > 50 {
            issues.push(
                Issue::warning(format!("{} package updates pending", total))
                    .with_detail("A large number of packages have updates available.")
                    .with_raw(format!("Total pending: {}", total))
                    .with_recommendation(manager.upgrade_command(false)),
            );
        } else if total > 10 {
            issues.push(
                Issue::info(format!("{} package updates available", total))
                    .with_detail("Several package updates are waiting to be installed.")
                    .with_raw(format!("Total pending: {}", total))
                    .with_recommendation("Run your package manager update command to stay current."),
            );
        } else if total > 0 && security == 0 {
            issues.push(
                Issue::info(format!("{} package update(s) available", total))
                    .with_detail("Minor updates are available.")
                    .with_raw(format!("Total pending: {}", total))
                    .with_recommendation("Install updates at your convenience."),
            );
        }

        Ok(ParseResult::new(summary, issues).or_fallback(
            Issue::info("System is up to date")
                .with_detail("No pending package updates found.")
                .with_recommendation("No action needed. The system has all available updates installed."),
        ))
    }
}
