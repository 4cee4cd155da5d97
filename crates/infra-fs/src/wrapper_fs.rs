// Filesystem implementation of ElevationWrapper

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use scriptsync_core::domain::wrapper::{render_wrapper, wrapper_path};
use scriptsync_core::domain::ScriptKind;
use scriptsync_core::port::{ElevationWrapper, WrapperError};

/// Writes `.cmd` launchers into `ScriptWrappers/` next to each script
#[derive(Debug, Default, Clone)]
pub struct FsElevationWrapper;

impl FsElevationWrapper {
    pub fn new() -> Self {
        Self
    }

    fn locate(script: &Path) -> Result<PathBuf, WrapperError> {
        wrapper_path(script).ok_or_else(|| WrapperError::InvalidScriptPath(script.to_path_buf()))
    }
}

impl ElevationWrapper for FsElevationWrapper {
    fn generate(&self, script: &Path, kind: ScriptKind) -> Result<PathBuf, WrapperError> {
        let path = Self::locate(script)?;
        let write_error = |source| WrapperError::Write {
            path: path.clone(),
            source,
        };

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(write_error)?;
        }

        fs::write(&path, render_wrapper(script, kind)).map_err(write_error)?;

        debug!(
            script = %script.display(),
            wrapper = %path.display(),
            kind = %kind,
            "Elevation wrapper written"
        );
        Ok(path)
    }

    fn cleanup(&self, script: &Path) -> Result<bool, WrapperError> {
        let path = Self::locate(script)?;

        match fs::remove_file(&path) {
            Ok(()) => {
                info!(wrapper = %path.display(), "Elevation wrapper removed");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(WrapperError::Remove { path, source }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_writes_next_to_script() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("backup.ps1");

        let path = FsElevationWrapper::new()
            .generate(&script, ScriptKind::Interpreted)
            .unwrap();

        assert_eq!(
            path,
            dir.path().join("ScriptWrappers").join("elevated_backup.ps1.cmd")
        );
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("-Verb RunAs -Wait"));
    }

    #[test]
    fn test_regenerate_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("backup.ps1");
        let generator = FsElevationWrapper::new();

        let first_path = generator.generate(&script, ScriptKind::Interpreted).unwrap();
        let first = fs::read(&first_path).unwrap();
        let second_path = generator.generate(&script, ScriptKind::Interpreted).unwrap();
        let second = fs::read(&second_path).unwrap();

        assert_eq!(first_path, second_path);
        assert_eq!(first, second);
        assert_eq!(
            fs::read_dir(dir.path().join("ScriptWrappers")).unwrap().count(),
            1
        );
    }

    #[test]
    fn test_cleanup_removes_and_tolerates_absence() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("setup.bat");
        let generator = FsElevationWrapper::new();

        let path = generator.generate(&script, ScriptKind::ShellBatch).unwrap();
        assert!(generator.cleanup(&script).unwrap());
        assert!(!path.exists());
        assert!(!generator.cleanup(&script).unwrap());
    }
}
