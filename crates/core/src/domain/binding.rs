// Binding Domain Model - one script bound to one lifecycle moment

use crate::constants::{FORBIDDEN_NAME_CHARS, JOB_PREFIX};
use crate::domain::error::{DomainError, Result};
use crate::domain::ScriptKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// OS lifecycle event that triggers a binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Moment {
    SystemStartup,
    UserLogon,
    BeforeShutdown,
    BeforeLogoff,
}

impl Moment {
    pub const ALL: [Moment; 4] = [
        Moment::SystemStartup,
        Moment::UserLogon,
        Moment::BeforeShutdown,
        Moment::BeforeLogoff,
    ];

    /// Stable enumerant used in job names and the config file
    pub fn as_str(&self) -> &'static str {
        match self {
            Moment::SystemStartup => "system-startup",
            Moment::UserLogon => "user-logon",
            Moment::BeforeShutdown => "before-shutdown",
            Moment::BeforeLogoff => "before-logoff",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Moment::SystemStartup => "At system startup",
            Moment::UserLogon => "At user logon",
            Moment::BeforeShutdown => "Before system shutdown",
            Moment::BeforeLogoff => "Before user logoff",
        }
    }
}

impl std::fmt::Display for Moment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Moment {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        Moment::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::UnknownMoment(s.to_string()))
    }
}

/// Index-free identity of a binding: `(name, moment)`.
///
/// The scheduler job name is derived from exactly these two fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingKey {
    pub name: String,
    pub moment: Moment,
}

impl BindingKey {
    pub fn new(name: impl Into<String>, moment: Moment) -> Self {
        Self {
            name: name.into(),
            moment,
        }
    }

    /// Scheduler job name: `Script_<name>_<moment>`
    pub fn job_name(&self) -> String {
        format!("{}{}_{}", JOB_PREFIX, self.name, self.moment)
    }
}

impl std::fmt::Display for BindingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.moment)
    }
}

fn default_enabled() -> bool {
    true
}

/// Binding Entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub name: String,
    pub path: PathBuf,
    pub moment: Moment,
    #[serde(default)]
    pub elevated: bool,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Binding {
    /// Create an enabled binding named after the script's file stem
    pub fn new(path: impl Into<PathBuf>, moment: Moment, elevated: bool) -> Result<Self> {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .ok_or_else(|| {
                DomainError::ValidationError(format!(
                    "cannot derive a name from path {}",
                    path.display()
                ))
            })?;

        Self::with_name(name, path, moment, elevated)
    }

    /// Create an enabled binding with an explicit name
    pub fn with_name(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        moment: Moment,
        elevated: bool,
    ) -> Result<Self> {
        let binding = Self {
            name: name.into(),
            path: path.into(),
            moment,
            elevated,
            enabled: true,
        };
        binding.validate()?;
        Ok(binding)
    }

    /// Check the invariants the scheduler relies on
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "binding name cannot be empty".to_string(),
            ));
        }

        if let Some(c) = self.name.chars().find(|c| FORBIDDEN_NAME_CHARS.contains(c)) {
            return Err(DomainError::ValidationError(format!(
                "binding name '{}' contains forbidden character '{}'",
                self.name, c
            )));
        }

        if self.path.as_os_str().is_empty() {
            return Err(DomainError::ValidationError(
                "script path cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn key(&self) -> BindingKey {
        BindingKey::new(self.name.clone(), self.moment)
    }

    pub fn kind(&self) -> ScriptKind {
        ScriptKind::classify(&self.path)
    }

    pub fn job_name(&self) -> String {
        self.key().job_name()
    }
}
