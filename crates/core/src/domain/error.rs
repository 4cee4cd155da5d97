// Domain Error Types

use crate::domain::BindingKey;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Binding already exists: {0}")]
    DuplicateBinding(BindingKey),

    #[error("Binding not found: {0}")]
    BindingNotFound(BindingKey),

    #[error("Unknown moment: {0} (expected system-startup, user-logon, before-shutdown or before-logoff)")]
    UnknownMoment(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
