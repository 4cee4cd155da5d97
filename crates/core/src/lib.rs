// ScriptSync Core - Domain Logic, Ports & Reconciliation Engine
// NO infrastructure dependencies (hexagonal layout)

pub mod application;
pub mod constants;
pub mod domain;
pub mod error;
pub mod port;

pub use error::{AppError, Result};
