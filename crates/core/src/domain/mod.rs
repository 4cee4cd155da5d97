// Domain Layer - Pure business logic and entities

pub mod binding;
pub mod error;
pub mod job;
pub mod registry;
pub mod script_kind;
pub mod wrapper;

// Re-exports
pub use binding::{Binding, BindingKey, Moment};
pub use error::DomainError;
pub use job::{Action, JobDefinition, JobSettings, LogonType, Principal, RunLevel, Trigger};
pub use registry::Registry;
pub use script_kind::ScriptKind;
