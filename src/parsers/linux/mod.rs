//! Parsers for command output captured on Linux hosts

mod dmesg;
mod journalctl;
mod lshw;
mod lspci;
mod memory;
mod network;
mod smartctl;
mod systemd_analyze;
mod updates;
mod upower;

pub use dmesg::Dmesg;
pub use journalctl::Journalctl;
pub use lshw::Lshw;
pub use lspci::Lspci;
pub use memory::LinuxMemory;
pub use network::LinuxNetwork;
pub use smartctl::Smartctl;
pub use systemd_analyze::SystemdAnalyze;
pub use updates::LinuxUpdates;
pub use upower::Upower;
