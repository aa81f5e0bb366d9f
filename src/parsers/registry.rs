//! Built-in parser registry

use std::sync::Arc;

use log::{debug, info};

use crate::parsers::linux::{
    Dmesg, Journalctl, LinuxMemory, LinuxNetwork, LinuxUpdates, Lshw, Lspci, Smartctl,
    SystemdAnalyze, Upower,
};
use crate::parsers::windows::{
    BatteryReport, DiskInfo, DriverQuery, DxDiag, EnergyReport, MsInfo, NetworkConfig,
    RunningProcesses, SleepStudy, StartupPrograms, SystemEvents, SystemInfo, WifiReport,
    WindowsUpdates,
};
use crate::parsers::{Clock, ParserRegistry, ReportParser};

/// Default implementation of ParserRegistry
pub struct DefaultParserRegistry {
    /// Registered parsers, in detection order
    parsers: Vec<Arc<dyn ReportParser>>,
}

impl Default for DefaultParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultParserRegistry {
    /// Create a new empty parser registry
    pub fn new() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    /// Create a registry with every built-in parser, reading the system clock
    pub fn with_default_parsers() -> Self {
        Self::with_clock(Clock::System)
    }

    /// Create a registry with every built-in parser
    ///
    /// `clock` is handed to the parsers whose findings depend on today's date.
    pub fn with_clock(clock: Clock) -> Self {
        let mut registry = Self::new();
        registry.register_default_parsers(clock);
        registry
    }

    /// Drop every parser whose name appears in `disabled`
    pub fn without(mut self, disabled: &[String]) -> Self {
        if disabled.is_empty() {
            return self;
        }
        self.parsers.retain(|parser| {
            let keep = !disabled.iter().any(|name| name == parser.name());
            if !keep {
                debug!("Parser \"{}\" disabled by configuration", parser.name());
            }
            keep
        });
        self
    }

    /// Check if a parser with the given name is already registered
    pub fn has_parser(&self, name: &str) -> bool {
        self.parsers.iter().any(|parser| parser.name() == name)
    }

    /// Number of registered parsers
    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    /// Whether no parser is registered
    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }

    /// Register the built-in parsers
    ///
    /// Linux formats go first: their detectors are narrower, and several
    /// Windows detectors would otherwise claim Linux output.
    fn register_default_parsers(&mut self, clock: Clock) {
        debug!("Registering built-in parsers");

        self.register_linux_parsers();
        self.register_windows_parsers(clock);

        info!("Registered {} parsers", self.parsers.len());
    }

    fn register_linux_parsers(&mut self) {
        debug!("Registering Linux parsers");
        self.register_parser(Arc::new(Upower::new()));
        self.register_parser(Arc::new(Lshw::new()));
        self.register_parser(Arc::new(Lspci::new()));
        self.register_parser(Arc::new(Dmesg::new()));
        self.register_parser(Arc::new(Journalctl::new()));
        self.register_parser(Arc::new(Smartctl::new()));
        self.register_parser(Arc::new(LinuxMemory::new()));
        self.register_parser(Arc::new(LinuxNetwork::new()));
        self.register_parser(Arc::new(LinuxUpdates::new()));
        self.register_parser(Arc::new(SystemdAnalyze::new()));
    }

    fn register_windows_parsers(&mut self, clock: Clock) {
        debug!("Registering Windows parsers");
        self.register_parser(Arc::new(BatteryReport::new()));
        self.register_parser(Arc::new(EnergyReport::new()));
        self.register_parser(Arc::new(SleepStudy::new()));
        self.register_parser(Arc::new(MsInfo::new()));
        self.register_parser(Arc::new(DxDiag::with_clock(clock)));
        self.register_parser(Arc::new(SystemInfo::with_clock(clock)));
        self.register_parser(Arc::new(DriverQuery::with_clock(clock)));
        self.register_parser(Arc::new(DiskInfo::new()));
        self.register_parser(Arc::new(WifiReport::new()));
        self.register_parser(Arc::new(NetworkConfig::new()));
        self.register_parser(Arc::new(WindowsUpdates::with_clock(clock)));
        self.register_parser(Arc::new(SystemEvents::new()));
        self.register_parser(Arc::new(StartupPrograms::new()));
        self.register_parser(Arc::new(RunningProcesses::new()));
    }
}

impl ParserRegistry for DefaultParserRegistry {
    fn register_parser(&mut self, parser: Arc<dyn ReportParser>) {
        if self.has_parser(parser.name()) {
            debug!("Parser \"{}\" already registered, skipping", parser.name());
            return;
        }
        debug!("Registered parser: {}", parser.name());
        self.parsers.push(parser);
    }

    fn get_all_parsers(&self) -> Vec<Arc<dyn ReportParser>> {
        self.parsers.clone()
    }

    fn get_parser_by_name(&self, name: &str) -> Option<Arc<dyn ReportParser>> {
        self.parsers
            .iter()
            .find(|parser| parser.name() == name)
            .cloned()
    }
}
