// Central Error Type for the Application

use crate::application::SyncReport;
use thiserror::Error;

/// Application-level error type
///
/// Recoverable: Persistence, Scheduler, Wrapper, SyncIncomplete.
/// Fatal: Permission (checked once at startup).
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] crate::port::PersistenceError),

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] crate::port::SchedulerError),

    #[error("Elevation wrapper error: {0}")]
    Wrapper(#[from] crate::port::WrapperError),

    #[error("Execution error: {0}")]
    Execution(#[from] crate::port::ExecutionError),

    #[error("Permission denied: {0}")]
    Permission(String),

    /// Rebuild ran to the end but some bindings have no job.
    /// The report lists what was and was not registered.
    #[error("Synchronization incomplete: {} of {} job(s) not registered", .0.failures.len(), .0.failures.len() + .0.registered.len())]
    SyncIncomplete(Box<SyncReport>),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
