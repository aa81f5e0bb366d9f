use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Severity levels for issues, most severe first
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Severity {
    /// Needs attention now
    Critical,

    /// Should be looked at
    Warning,

    /// Worth knowing about
    Info,
}

impl Severity {
    /// Points subtracted from a score of 100 for each issue of this severity
    pub fn penalty(&self) -> u32 {
        match self {
            Severity::Critical => 30,
            Severity::Warning => 10,
            Severity::Info => 2,
        }
    }

    /// Title-case label used in headings
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::Warning => "Warning",
            Severity::Info => "Info",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Severity::Critical => "🔴",
            Severity::Warning => "🟠",
            Severity::Info => "🔵",
        }
    }

    /// Color name for terminal output
    pub fn color_name(&self) -> &'static str {
        match self {
            Severity::Critical => "red",
            Severity::Warning => "yellow",
            Severity::Info => "blue",
        }
    }
}

/// The six coarse health domains issues are grouped and weighted by
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Category {
    Power,
    System,
    Storage,
    Network,
    Security,
    Performance,
}

impl Category {
    /// Weight of this category in the global score
    pub fn weight(&self) -> f64 {
        match self {
            Category::Power | Category::System => 0.20,
            Category::Storage | Category::Network | Category::Security | Category::Performance => {
                0.15
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Power => "Power & Battery",
            Category::System => "System & Hardware",
            Category::Storage => "Storage",
            Category::Network => "Network",
            Category::Security => "Security",
            Category::Performance => "Performance",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Category::Power => "⚡",
            Category::System => "💻",
            Category::Storage => "💾",
            Category::Network => "🌐",
            Category::Security => "🛡️",
            Category::Performance => "🚀",
        }
    }

    /// Hint shown for a category nothing has been parsed into yet
    pub fn empty_hint(&self) -> &'static str {
        match self {
            Category::Power => "No data, add a battery report, energy report, or sleep study",
            Category::System => "No data, add msinfo32, dxdiag, systeminfo, or driverquery output",
            Category::Storage => "No data, add disk or volume info, or smartctl output",
            Category::Network => "No data, add a WiFi report or ipconfig output",
            Category::Security => "No data, add an updates list or system event log",
            Category::Performance => "No data, add startup programs or a process list",
        }
    }
}
