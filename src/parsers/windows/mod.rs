//! Parsers for reports produced by Windows utilities

mod battery;
mod disk;
mod drivers;
mod dxdiag;
mod energy;
mod events;
mod msinfo;
mod network;
mod processes;
mod sleep;
mod startup;
mod sysinfo;
mod updates;
mod wifi;

pub use battery::BatteryReport;
pub use disk::DiskInfo;
pub use drivers::DriverQuery;
pub use dxdiag::DxDiag;
pub use energy::EnergyReport;
pub use events::SystemEvents;
pub use msinfo::MsInfo;
pub use network::NetworkConfig;
pub use processes::RunningProcesses;
pub use sleep::SleepStudy;
pub use startup::StartupPrograms;
pub use sysinfo::SystemInfo;
pub use updates::WindowsUpdates;
pub use wifi::WifiReport;
