// Add Binding Use Case

use crate::domain::{Binding, DomainError, Moment, Registry};
use crate::error::Result;
use std::path::PathBuf;

/// Add request (what the interaction layer collects)
#[derive(Debug, Clone)]
pub struct AddRequest {
    pub path: PathBuf,
    pub moment: Moment,
    pub elevated: bool,
    /// Defaults to the script's file name without extension
    pub name: Option<String>,
}

impl AddRequest {
    pub fn new(path: impl Into<PathBuf>, moment: Moment, elevated: bool) -> Self {
        Self {
            path: path.into(),
            moment,
            elevated,
            name: None,
        }
    }
}

/// Validate an add request before touching the registry
pub fn validate_request(req: &AddRequest) -> std::result::Result<(), DomainError> {
    if req.path.as_os_str().is_empty() {
        return Err(DomainError::ValidationError(
            "script path cannot be empty".to_string(),
        ));
    }

    if !req.path.is_absolute() {
        return Err(DomainError::ValidationError(format!(
            "script path must be absolute: {}",
            req.path.display()
        )));
    }

    if let Some(name) = &req.name {
        if name.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "binding name cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

/// Execute add use case: validate, build the binding, append it
///
/// # Arguments
///
/// * `registry` - Registry to append to
/// * `req` - Add request
pub fn execute(registry: &mut Registry, req: AddRequest) -> Result<Binding> {
    validate_request(&req)?;

    let binding = match req.name {
        Some(name) => Binding::with_name(name, req.path, req.moment, req.elevated)?,
        None => Binding::new(req.path, req.moment, req.elevated)?,
    };

    registry.add(binding.clone())?;
    Ok(binding)
}

#[cfg(test)]
#[path = "add_test.rs"]
mod add_test;
