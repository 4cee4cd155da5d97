// Elevation wrapper layout and content (pure; file IO lives in the fs adapter)

use crate::constants::{WRAPPER_DIR_NAME, WRAPPER_FILE_EXTENSION, WRAPPER_FILE_PREFIX};
use crate::domain::ScriptKind;
use std::path::{Path, PathBuf};

/// `<script dir>/ScriptWrappers/elevated_<script file name>.cmd`
///
/// Returns `None` when the path has no file name.
pub fn wrapper_path(script: &Path) -> Option<PathBuf> {
    let file_name = script.file_name()?.to_string_lossy();
    let dir = script.parent().unwrap_or_else(|| Path::new(""));

    Some(dir.join(WRAPPER_DIR_NAME).join(format!(
        "{}{}.{}",
        WRAPPER_FILE_PREFIX, file_name, WRAPPER_FILE_EXTENSION
    )))
}

/// Batch launcher that asks the OS for elevation, runs the script through
/// the interpreter matching `kind`, and waits for it to finish.
///
/// Output depends only on `(script, kind)`.
pub fn render_wrapper(script: &Path, kind: ScriptKind) -> String {
    let script = script.display();

    let start_process = match kind {
        ScriptKind::Interpreted => format!(
            "Start-Process powershell.exe -ArgumentList '-ExecutionPolicy Bypass -NoProfile -File \\\"{}\\\" ' -Verb RunAs -Wait",
            script
        ),
        ScriptKind::ShellBatch => format!(
            "Start-Process cmd.exe -ArgumentList '/c \\\"{}\\\" ' -Verb RunAs -Wait",
            script
        ),
        ScriptKind::Executable | ScriptKind::Unknown => {
            format!("Start-Process \\\"{}\\\" -Verb RunAs -Wait", script)
        }
    };

    format!("@echo off\r\npowershell.exe -Command \"{}\"\r\n", start_process)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapper_path_layout() {
        let path = wrapper_path(Path::new("/opt/scripts/backup.ps1")).unwrap();
        assert_eq!(
            path,
            PathBuf::from("/opt/scripts/ScriptWrappers/elevated_backup.ps1.cmd")
        );
    }

    #[test]
    fn test_wrapper_path_requires_file_name() {
        assert!(wrapper_path(Path::new("/")).is_none());
    }

    #[test]
    fn test_render_interpreted() {
        let content = render_wrapper(Path::new("/s/a.ps1"), ScriptKind::Interpreted);

        assert!(content.starts_with("@echo off\r\n"));
        assert!(content.contains("Start-Process powershell.exe"));
        assert!(content.contains("-ExecutionPolicy Bypass -NoProfile -File \\\"/s/a.ps1\\\""));
        assert!(content.contains("-Verb RunAs -Wait"));
    }

    #[test]
    fn test_render_is_deterministic_and_kind_specific() {
        let script = Path::new("/s/a.ps1");
        let first = render_wrapper(script, ScriptKind::Interpreted);
        let second = render_wrapper(script, ScriptKind::Interpreted);
        let batch = render_wrapper(script, ScriptKind::ShellBatch);
        let direct = render_wrapper(script, ScriptKind::Executable);

        assert_eq!(first, second);
        assert_ne!(first, batch);
        assert!(batch.contains("Start-Process cmd.exe -ArgumentList '/c"));
        assert!(direct.contains("Start-Process \\\"/s/a.ps1\\\" -Verb RunAs -Wait"));
    }
}
