// ScriptSync Infrastructure - Filesystem Adapters
// Implements: BindingStore, ElevationWrapper

mod json_store;
pub mod paths;
mod wrapper_fs;

pub use json_store::JsonBindingStore;
pub use paths::{default_config_path, resolve_config_path, CONFIG_PATH_ENV};
pub use wrapper_fs::FsElevationWrapper;
