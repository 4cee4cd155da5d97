// Process launcher implementation
// Starts a bound script on demand, outside the scheduler
use std::process::{Command, Stdio};
use tracing::info;

use scriptsync_core::port::script_launcher::{
    ExecutionError, ExecutionResult, ExecutionStatus, LaunchCommand, LaunchMode, ScriptLauncher,
};

/// Spawns OS processes with `std::process`
#[derive(Debug, Default, Clone)]
pub struct ProcessLauncher;

impl ProcessLauncher {
    pub fn new() -> Self {
        Self
    }

    fn command(&self, launch: &LaunchCommand) -> Command {
        let mut cmd = Command::new(&launch.program);
        cmd.args(&launch.args);
        cmd
    }

    fn spawn_detached(&self, launch: &LaunchCommand) -> Result<ExecutionResult, ExecutionError> {
        let child = self
            .command(launch)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ExecutionError::SpawnFailed(e.to_string()))?;

        let pid = child.id();
        info!(program = %launch.program, pid = %pid, "Started detached process");

        Ok(ExecutionResult {
            status: ExecutionStatus::Started,
            pid: Some(pid),
            exit_code: None,
            stdout: None,
            stderr: None,
        })
    }

    fn run_and_wait(&self, launch: &LaunchCommand) -> Result<ExecutionResult, ExecutionError> {
        let child = self
            .command(launch)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ExecutionError::SpawnFailed(e.to_string()))?;

        let pid = child.id();
        let output = child
            .wait_with_output()
            .map_err(|e| ExecutionError::IoError(e.to_string()))?;

        let status = if output.status.success() {
            ExecutionStatus::Success
        } else {
            ExecutionStatus::Failed
        };

        info!(
            program = %launch.program,
            pid = %pid,
            exit_code = ?output.status.code(),
            status = ?status,
            "Process finished"
        );

        Ok(ExecutionResult {
            status,
            pid: Some(pid),
            exit_code: output.status.code(),
            stdout: Some(String::from_utf8_lossy(&output.stdout).to_string()),
            stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
        })
    }
}

impl ScriptLauncher for ProcessLauncher {
    fn launch(&self, command: &LaunchCommand) -> Result<ExecutionResult, ExecutionError> {
        info!(program = %command.program, args = ?command.args, mode = ?command.mode, "Launching");

        match command.mode {
            LaunchMode::Detached => self.spawn_detached(command),
            LaunchMode::WaitForExit => self.run_and_wait(command),
        }
    }
}
