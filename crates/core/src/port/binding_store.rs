// Binding Store Port (durable registry persistence)

use crate::domain::Registry;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to serialize registry: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Store interface for the binding list
///
/// `load` never fails: a missing or unreadable file yields an empty
/// registry so a broken config cannot block startup.
pub trait BindingStore: Send + Sync {
    /// Load the persisted registry (empty on absence or corruption)
    fn load(&self) -> Registry;

    /// Overwrite the persisted registry with `registry`
    ///
    /// # Errors
    /// - PersistenceError::Write if the directory or file cannot be written
    fn save(&self, registry: &Registry) -> Result<(), PersistenceError>;

    /// Where the registry lives (for diagnostics)
    fn location(&self) -> &Path;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// In-memory BindingStore for testing
    pub struct MockBindingStore {
        registry: Arc<Mutex<Registry>>,
        save_count: Arc<Mutex<usize>>,
        fail_saves: Arc<Mutex<bool>>,
        location: PathBuf,
    }

    impl MockBindingStore {
        pub fn new() -> Self {
            Self::with_registry(Registry::new())
        }

        pub fn with_registry(registry: Registry) -> Self {
            Self {
                registry: Arc::new(Mutex::new(registry)),
                save_count: Arc::new(Mutex::new(0)),
                fail_saves: Arc::new(Mutex::new(false)),
                location: PathBuf::from("memory://bindings.json"),
            }
        }

        pub fn stored(&self) -> Registry {
            self.registry.lock().unwrap().clone()
        }

        pub fn save_count(&self) -> usize {
            *self.save_count.lock().unwrap()
        }

        pub fn set_fail_saves(&self, fail: bool) {
            *self.fail_saves.lock().unwrap() = fail;
        }
    }

    impl Default for MockBindingStore {
        fn default() -> Self {
            Self::new()
        }
    }

    impl BindingStore for MockBindingStore {
        fn load(&self) -> Registry {
            self.registry.lock().unwrap().clone()
        }

        fn save(&self, registry: &Registry) -> Result<(), PersistenceError> {
            if *self.fail_saves.lock().unwrap() {
                return Err(PersistenceError::Write {
                    path: self.location.clone(),
                    source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
                });
            }

            *self.save_count.lock().unwrap() += 1;
            *self.registry.lock().unwrap() = registry.clone();
            Ok(())
        }

        fn location(&self) -> &Path {
            &self.location
        }
    }
}
