// Elevation Wrapper Port
// Abstraction over writing/removing the launcher files that request elevation

use crate::domain::ScriptKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WrapperError {
    #[error("Script path has no file name: {0}")]
    InvalidScriptPath(PathBuf),

    #[error("Failed to write wrapper {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to remove wrapper {path}: {source}")]
    Remove {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Elevation wrapper generator
///
/// Implementations:
/// - FsElevationWrapper: writes `.cmd` launchers next to the script
pub trait ElevationWrapper: Send + Sync {
    /// Write (or overwrite) the wrapper for `script` and return its path
    ///
    /// Regenerating for the same `(script, kind)` yields identical content.
    fn generate(&self, script: &Path, kind: ScriptKind) -> Result<PathBuf, WrapperError>;

    /// Remove the wrapper for `script` if present
    ///
    /// # Returns
    /// true if a file was removed
    fn cleanup(&self, script: &Path) -> Result<bool, WrapperError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::wrapper::wrapper_path;
    use std::collections::{BTreeMap, HashSet};
    use std::sync::{Arc, Mutex};

    /// In-memory wrapper generator for testing
    #[derive(Clone, Default)]
    pub struct MockElevationWrapper {
        files: Arc<Mutex<BTreeMap<PathBuf, ScriptKind>>>,
        generate_calls: Arc<Mutex<usize>>,
        failing: Arc<Mutex<HashSet<PathBuf>>>,
    }

    impl MockElevationWrapper {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make generation for `script` fail
        pub fn fail_for(&self, script: impl Into<PathBuf>) {
            self.failing.lock().unwrap().insert(script.into());
        }

        pub fn wrappers(&self) -> Vec<PathBuf> {
            self.files.lock().unwrap().keys().cloned().collect()
        }

        pub fn generate_calls(&self) -> usize {
            *self.generate_calls.lock().unwrap()
        }
    }

    impl ElevationWrapper for MockElevationWrapper {
        fn generate(&self, script: &Path, kind: ScriptKind) -> Result<PathBuf, WrapperError> {
            *self.generate_calls.lock().unwrap() += 1;

            let path = wrapper_path(script)
                .ok_or_else(|| WrapperError::InvalidScriptPath(script.to_path_buf()))?;

            if self.failing.lock().unwrap().contains(script) {
                return Err(WrapperError::Write {
                    path,
                    source: std::io::Error::new(
                        std::io::ErrorKind::PermissionDenied,
                        "mock write failure",
                    ),
                });
            }

            self.files.lock().unwrap().insert(path.clone(), kind);
            Ok(path)
        }

        fn cleanup(&self, script: &Path) -> Result<bool, WrapperError> {
            let path = wrapper_path(script)
                .ok_or_else(|| WrapperError::InvalidScriptPath(script.to_path_buf()))?;
            Ok(self.files.lock().unwrap().remove(&path).is_some())
        }
    }
}
