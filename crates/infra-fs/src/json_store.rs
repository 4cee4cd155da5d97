// JSON file implementation of BindingStore

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use scriptsync_core::constants::CONFIG_FORMAT_VERSION;
use scriptsync_core::domain::{Binding, Registry};
use scriptsync_core::port::{BindingStore, PersistenceError};

/// On-disk document
#[derive(Debug, Serialize, Deserialize)]
struct ConfigDocument {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    bindings: Vec<Binding>,
}

fn default_version() -> u32 {
    CONFIG_FORMAT_VERSION
}

/// Binding list stored as one pretty-printed JSON file.
///
/// Every save rewrites the whole document: it is written to a sibling
/// `.tmp` file first and then renamed over the target.
pub struct JsonBindingStore {
    path: PathBuf,
}

impl JsonBindingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Strict read: `Ok(None)` when the file is absent, `Err` when it is
    /// unreadable or malformed
    pub fn read(&self) -> Result<Option<Registry>, PersistenceError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(PersistenceError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let document: ConfigDocument =
            serde_json::from_slice(&bytes).map_err(|source| PersistenceError::Parse {
                path: self.path.clone(),
                source,
            })?;

        if document.version > CONFIG_FORMAT_VERSION {
            warn!(
                path = %self.path.display(),
                version = document.version,
                supported = CONFIG_FORMAT_VERSION,
                "Config written by a newer version, reading what is understood"
            );
        }

        Ok(Some(Registry::from_bindings(document.bindings)))
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_error(&self, path: &Path, source: std::io::Error) -> PersistenceError {
        PersistenceError::Write {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl BindingStore for JsonBindingStore {
    fn load(&self) -> Registry {
        match self.read() {
            Ok(Some(registry)) => {
                debug!(path = %self.path.display(), bindings = registry.len(), "Config loaded");
                registry
            }
            Ok(None) => {
                info!(path = %self.path.display(), "No config file yet, starting empty");
                Registry::new()
            }
            Err(e) => {
                warn!(error = %e, "Config unreadable, starting with an empty registry");
                Registry::new()
            }
        }
    }

    fn save(&self, registry: &Registry) -> Result<(), PersistenceError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| self.write_error(dir, e))?;
        }

        let document = ConfigDocument {
            version: CONFIG_FORMAT_VERSION,
            bindings: registry.bindings().to_vec(),
        };
        let json = serde_json::to_vec_pretty(&document)?;

        let tmp = self.temp_path();
        fs::write(&tmp, &json).map_err(|e| self.write_error(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            self.write_error(&self.path, e)
        })?;

        debug!(path = %self.path.display(), bindings = registry.len(), "Config saved");
        Ok(())
    }

    fn location(&self) -> &Path {
        &self.path
    }
}
