// Windows Task Scheduler adapter driven through schtasks.exe

use std::collections::BTreeSet;
use std::io::Write as _;
use std::process::{Command, Output};
use tracing::{debug, info, warn};

use scriptsync_core::domain::JobDefinition;
use scriptsync_core::port::{SchedulerError, SchedulerSession, TaskScheduler};

use crate::task_xml;

const SCHTASKS: &str = "schtasks.exe";

/// Task Scheduler access via the `schtasks` command line tool.
///
/// All managed jobs live in the root task folder.
pub struct SchtasksScheduler {
    /// `DOMAIN\user` for jobs that run in the interactive session
    interactive_user: Option<String>,
}

impl SchtasksScheduler {
    pub fn new(interactive_user: Option<String>) -> Self {
        Self { interactive_user }
    }

    fn run(&self, args: &[&str]) -> std::io::Result<Output> {
        let mut cmd = Command::new(SCHTASKS);
        cmd.args(args);

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            cmd.creation_flags(0x08000000); // CREATE_NO_WINDOW
        }

        cmd.output()
    }

    /// Stdout of `schtasks /Query /FO CSV /NH`, or the failure text
    fn query_all(&self) -> Result<String, String> {
        let output = self
            .run(&["/Query", "/FO", "CSV", "/NH"])
            .map_err(|e| e.to_string())?;

        if !output.status.success() {
            return Err(failure_text(&output));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl TaskScheduler for SchtasksScheduler {
    fn connect(&self) -> Result<Box<dyn SchedulerSession + '_>, SchedulerError> {
        // One query proves the service is reachable
        self.query_all().map_err(SchedulerError::Connect)?;

        debug!("Scheduler session opened");
        Ok(Box::new(SchtasksSession { scheduler: self }))
    }
}

struct SchtasksSession<'a> {
    scheduler: &'a SchtasksScheduler,
}

impl SchedulerSession for SchtasksSession<'_> {
    fn list_managed_jobs(&mut self, prefix: &str) -> Result<BTreeSet<String>, SchedulerError> {
        let stdout = self
            .scheduler
            .query_all()
            .map_err(SchedulerError::Enumerate)?;
        Ok(parse_task_names(&stdout, prefix))
    }

    fn delete_job(&mut self, name: &str) -> Result<(), SchedulerError> {
        let delete_error = |reason: String| SchedulerError::Delete {
            name: name.to_string(),
            reason,
        };

        let output = self
            .scheduler
            .run(&["/Delete", "/TN", name, "/F"])
            .map_err(|e| delete_error(e.to_string()))?;

        if output.status.success() {
            info!(job = %name, "Job deleted");
            return Ok(());
        }

        let reason = failure_text(&output);
        if confirms_absent(&self.scheduler.query_all(), name) {
            debug!(job = %name, "Job already absent");
            return Ok(());
        }

        Err(delete_error(reason))
    }

    fn register_job(&mut self, job: &JobDefinition) -> Result<(), SchedulerError> {
        let register_error = |reason: String| SchedulerError::Register {
            name: job.name.clone(),
            reason,
        };

        let xml = task_xml::render(job, self.scheduler.interactive_user.as_deref());

        let mut file = tempfile::Builder::new()
            .prefix("scriptsync_")
            .suffix(".xml")
            .tempfile()
            .map_err(|e| register_error(e.to_string()))?;
        file.write_all(&task_xml::encode_utf16le(&xml))
            .and_then(|_| file.flush())
            .map_err(|e| register_error(e.to_string()))?;

        let xml_path = file.path().to_string_lossy().into_owned();
        let output = self
            .scheduler
            .run(&["/Create", "/TN", &job.name, "/XML", &xml_path, "/F"])
            .map_err(|e| register_error(e.to_string()))?;

        if !output.status.success() {
            return Err(register_error(failure_text(&output)));
        }

        info!(job = %job.name, trigger = ?job.trigger, "Job registered");
        Ok(())
    }
}

impl Drop for SchtasksSession<'_> {
    fn drop(&mut self) {
        debug!("Scheduler session released");
    }
}

/// Root-folder task names starting with `prefix`, from
/// `schtasks /Query /FO CSV /NH` output (`"\Name","Next Run Time","Status"`)
pub fn parse_task_names(csv: &str, prefix: &str) -> BTreeSet<String> {
    csv.lines()
        .filter_map(first_csv_field)
        .filter_map(|path| path.strip_prefix('\\'))
        .filter(|name| !name.contains('\\') && name.starts_with(prefix))
        .map(str::to_string)
        .collect()
}

/// A failed delete counts as a no-op only when a successful listing of
/// the root folder does not contain `name`
fn confirms_absent(listing: &Result<String, String>, name: &str) -> bool {
    match listing {
        Ok(csv) => !parse_task_names(csv, "").contains(name),
        Err(_) => false,
    }
}

fn first_csv_field(line: &str) -> Option<&str> {
    let line = line.trim();
    match line.strip_prefix('"') {
        Some(rest) => rest.split('"').next(),
        None => line.split(',').next().filter(|f| !f.is_empty()),
    }
}

fn failure_text(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let text = stderr.trim();
    if text.is_empty() {
        let code = output.status.code();
        warn!(exit_code = ?code, "schtasks failed without output");
        format!("schtasks exited with {:?}", code)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\"\\Script_backup_system-startup\",\"N/A\",\"Ready\"\r\n\
\"\\OneDrive Standalone Update Task\",\"10/20/2026 10:00:00 AM\",\"Ready\"\r\n\
\"\\Script_cleanup_before-logoff\",\"N/A\",\"Disabled\"\r\n\
\r\n\
\"\\Microsoft\\Windows\\Script_nested\",\"N/A\",\"Ready\"\r\n\
\"\\Script_backup_system-startup\",\"N/A\",\"Ready\"\r\n";

    #[test]
    fn test_parse_filters_prefix_and_root_folder() {
        let names = parse_task_names(SAMPLE, "Script_");

        let expected: BTreeSet<String> = [
            "Script_backup_system-startup",
            "Script_cleanup_before-logoff",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_parse_empty_output() {
        assert!(parse_task_names("", "Script_").is_empty());
        assert!(parse_task_names("\r\n\r\n", "Script_").is_empty());
    }

    #[test]
    fn test_first_csv_field_unquoted() {
        assert_eq!(first_csv_field("\\Script_a,N/A,Ready"), Some("\\Script_a"));
        assert_eq!(first_csv_field("   "), None);
    }

    #[test]
    fn test_absence_needs_a_successful_listing() {
        assert!(confirms_absent(&Ok(SAMPLE.to_string()), "Script_gone_user-logon"));
        assert!(!confirms_absent(
            &Ok(SAMPLE.to_string()),
            "Script_cleanup_before-logoff"
        ));
        assert!(!confirms_absent(
            &Err("ERROR: Access is denied.".to_string()),
            "Script_gone_user-logon"
        ));
    }

    #[test]
    fn test_absence_check_sees_unmanaged_names_too() {
        assert!(!confirms_absent(
            &Ok(SAMPLE.to_string()),
            "OneDrive Standalone Update Task"
        ));
    }

    #[cfg(not(windows))]
    #[test]
    fn test_delete_surfaces_launch_failure() {
        let scheduler = SchtasksScheduler::new(None);
        let mut session = SchtasksSession {
            scheduler: &scheduler,
        };

        match session.delete_job("Script_backup_user-logon") {
            Err(SchedulerError::Delete { name, .. }) => {
                assert_eq!(name, "Script_backup_user-logon");
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[cfg(not(windows))]
    #[test]
    fn test_connect_fails_without_schtasks() {
        let scheduler = SchtasksScheduler::new(None);
        assert!(matches!(
            scheduler.connect().err(),
            Some(SchedulerError::Connect(_))
        ));
    }
}
