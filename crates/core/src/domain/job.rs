// Scheduled Job Domain Model - backend-agnostic description of one OS job

use crate::constants::{CMD, EXECUTION_TIME_LIMIT, POWERSHELL, SHUTDOWN_EVENT_SUBSCRIPTION};
use crate::domain::{Binding, Moment, ScriptKind};
use std::path::Path;
use std::time::Duration;

/// When the OS fires the job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Once per boot
    Boot,
    /// On interactive logon
    Logon,
    /// On a matching event-log entry
    Event { subscription: String },
    /// On session/console disconnect
    SessionDisconnect,
}

impl Trigger {
    /// Fixed moment -> trigger table
    pub fn for_moment(moment: Moment) -> Self {
        match moment {
            Moment::SystemStartup => Trigger::Boot,
            Moment::UserLogon => Trigger::Logon,
            Moment::BeforeShutdown => Trigger::Event {
                subscription: SHUTDOWN_EVENT_SUBSCRIPTION.to_string(),
            },
            Moment::BeforeLogoff => Trigger::SessionDisconnect,
        }
    }
}

/// Program the job executes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub program: String,
    pub arguments: Option<String>,
}

impl Action {
    pub fn direct(program: &Path) -> Self {
        Self {
            program: program.display().to_string(),
            arguments: None,
        }
    }

    /// Launch action for a script of the given kind
    pub fn for_script(path: &Path, kind: ScriptKind) -> Self {
        match kind {
            ScriptKind::Interpreted => Self {
                program: POWERSHELL.to_string(),
                arguments: Some(format!(
                    "-ExecutionPolicy Bypass -NoProfile -WindowStyle Hidden -File \"{}\"",
                    path.display()
                )),
            },
            ScriptKind::ShellBatch => Self {
                program: CMD.to_string(),
                arguments: Some(format!("/c \"{}\"", path.display())),
            },
            ScriptKind::Executable | ScriptKind::Unknown => Self::direct(path),
        }
    }
}

/// Identity the job runs under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Principal {
    /// Current interactive user, highest run level, interactive-token logon
    InteractiveUser,
    /// Non-interactive system service account
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunLevel {
    Highest,
    LeastPrivilege,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogonType {
    InteractiveToken,
    ServiceAccount,
}

impl Principal {
    pub fn for_elevation(elevated: bool) -> Self {
        if elevated {
            Principal::InteractiveUser
        } else {
            Principal::System
        }
    }

    pub fn run_level(&self) -> RunLevel {
        match self {
            Principal::InteractiveUser => RunLevel::Highest,
            Principal::System => RunLevel::LeastPrivilege,
        }
    }

    pub fn logon_type(&self) -> LogonType {
        match self {
            Principal::InteractiveUser => LogonType::InteractiveToken,
            Principal::System => LogonType::ServiceAccount,
        }
    }
}

/// Fixed job settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSettings {
    pub allow_hard_terminate: bool,
    pub start_when_available: bool,
    pub run_only_if_network_available: bool,
    pub disallow_start_if_on_batteries: bool,
    pub stop_if_going_on_batteries: bool,
    pub execution_time_limit: Duration,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            allow_hard_terminate: true,
            start_when_available: true,
            run_only_if_network_available: false,
            disallow_start_if_on_batteries: false,
            stop_if_going_on_batteries: false,
            execution_time_limit: EXECUTION_TIME_LIMIT,
        }
    }
}

/// Everything the scheduler needs to register one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDefinition {
    pub name: String,
    pub description: String,
    pub trigger: Trigger,
    pub action: Action,
    pub principal: Principal,
    pub settings: JobSettings,
}

impl JobDefinition {
    /// Map a binding to its job.
    ///
    /// `elevation_wrapper` must be the generated wrapper when the binding is
    /// elevated; the action then launches the wrapper whatever the script kind.
    pub fn for_binding(binding: &Binding, elevation_wrapper: Option<&Path>) -> Self {
        let kind = binding.kind();

        let action = match elevation_wrapper {
            Some(wrapper) if binding.elevated => Action::direct(wrapper),
            _ => Action::for_script(&binding.path, kind),
        };

        Self {
            name: binding.job_name(),
            description: format!("Script ({})", kind.label()),
            trigger: Trigger::for_moment(binding.moment),
            action,
            principal: Principal::for_elevation(binding.elevated),
            settings: JobSettings::default(),
        }
    }
}
