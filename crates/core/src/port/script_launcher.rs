// Script Launcher Port
// Abstraction for starting a bound script on demand (test run)

use thiserror::Error;

/// How the launcher waits on the started process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    /// Start and return immediately
    Detached,
    /// Wait for exit and capture stdout/stderr
    WaitForExit,
}

/// Command line to start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: String,
    pub args: Vec<String>,
    pub mode: LaunchMode,
}

impl LaunchCommand {
    pub fn detached(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            mode: LaunchMode::Detached,
        }
    }

    pub fn waiting(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            mode: LaunchMode::WaitForExit,
        }
    }
}

/// Execution status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStatus {
    /// Detached process was started
    Started,
    Success,
    Failed,
}

/// Result of a launch
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub status: ExecutionStatus,
    pub pid: Option<u32>,
    pub exit_code: Option<i32>,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
}

/// Execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("Script reported errors: {0}")]
    ScriptFailed(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Script Launcher trait
///
/// Implementations:
/// - ProcessLauncher: spawns an OS process
pub trait ScriptLauncher: Send + Sync {
    /// Start `command`
    ///
    /// # Errors
    /// - ExecutionError::SpawnFailed if the process cannot be started
    /// - ExecutionError::IoError if waiting on the process fails
    fn launch(&self, command: &LaunchCommand) -> Result<ExecutionResult, ExecutionError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock launcher behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Always succeed
        Success,
        /// Succeed but write `stderr`
        Stderr(String),
        /// Fail to spawn with message
        Fail(String),
    }

    /// Mock Script Launcher for testing
    pub struct MockScriptLauncher {
        behavior: Arc<Mutex<MockBehavior>>,
        launched: Arc<Mutex<Vec<LaunchCommand>>>,
    }

    impl MockScriptLauncher {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior: Arc::new(Mutex::new(behavior)),
                launched: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn new_success() -> Self {
            Self::new(MockBehavior::Success)
        }

        pub fn launched(&self) -> Vec<LaunchCommand> {
            self.launched.lock().unwrap().clone()
        }
    }

    impl ScriptLauncher for MockScriptLauncher {
        fn launch(&self, command: &LaunchCommand) -> Result<ExecutionResult, ExecutionError> {
            self.launched.lock().unwrap().push(command.clone());

            let behavior = self.behavior.lock().unwrap().clone();
            let status = match command.mode {
                LaunchMode::Detached => ExecutionStatus::Started,
                LaunchMode::WaitForExit => ExecutionStatus::Success,
            };

            match behavior {
                MockBehavior::Success => Ok(ExecutionResult {
                    status,
                    pid: Some(4242),
                    exit_code: Some(0),
                    stdout: Some("mock output".to_string()),
                    stderr: None,
                }),
                MockBehavior::Stderr(stderr) => Ok(ExecutionResult {
                    status,
                    pid: Some(4242),
                    exit_code: Some(1),
                    stdout: None,
                    stderr: Some(stderr),
                }),
                MockBehavior::Fail(msg) => Err(ExecutionError::SpawnFailed(msg)),
            }
        }
    }
}
