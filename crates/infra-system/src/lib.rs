// ScriptSync Infrastructure - System Adapters
// Implements: TaskScheduler, ScriptLauncher, PrivilegeProbe

pub mod privilege_probe_impl;
pub mod process_launcher;
pub mod schtasks;
pub mod task_xml;

pub use privilege_probe_impl::OsPrivilegeProbe;
pub use process_launcher::ProcessLauncher;
pub use schtasks::SchtasksScheduler;
