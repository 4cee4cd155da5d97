// Port Layer - Interfaces for external dependencies

pub mod binding_store;
pub mod elevation_wrapper;
pub mod privilege_probe;
pub mod script_launcher;
pub mod task_scheduler;
pub mod time_provider;

// Re-exports
pub use binding_store::{BindingStore, PersistenceError};
pub use elevation_wrapper::{ElevationWrapper, WrapperError};
pub use privilege_probe::PrivilegeProbe;
pub use script_launcher::{
    ExecutionError, ExecutionResult, ExecutionStatus, LaunchCommand, LaunchMode, ScriptLauncher,
};
pub use task_scheduler::{SchedulerError, SchedulerSession, TaskScheduler};
pub use time_provider::TimeProvider;
