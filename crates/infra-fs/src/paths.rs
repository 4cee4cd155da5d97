// Per-user path resolution

use directories::ProjectDirs;
use scriptsync_core::constants::{APP_NAME, CONFIG_FILE_NAME};
use std::path::PathBuf;

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "SCRIPTSYNC_CONFIG_PATH";

/// Per-user config directory (roaming AppData on Windows, XDG on Linux)
pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Default location of the binding list
pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

/// Resolve the config file: explicit override first, then the default.
/// `~` in the override is expanded.
pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
    match explicit.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => Some(PathBuf::from(shellexpand::tilde(raw).into_owned())),
        None => default_config_path(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_path_wins() {
        let path = resolve_config_path(Some("/etc/scriptsync/bindings.json")).unwrap();
        assert_eq!(path, PathBuf::from("/etc/scriptsync/bindings.json"));
    }

    #[test]
    fn test_blank_override_falls_back_to_default() {
        assert_eq!(resolve_config_path(Some("  ")), default_config_path());
    }

    #[test]
    fn test_tilde_is_expanded() {
        let path = resolve_config_path(Some("~/bindings.json")).unwrap();
        assert!(!path.to_string_lossy().starts_with('~'));
        assert!(path.ends_with("bindings.json"));
    }
}
