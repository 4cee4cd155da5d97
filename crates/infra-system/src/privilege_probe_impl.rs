// Privilege probe implementation
use tracing::debug;

use scriptsync_core::port::PrivilegeProbe;

/// Reads the privileges of the running process from the OS
#[derive(Debug, Default, Clone)]
pub struct OsPrivilegeProbe;

impl OsPrivilegeProbe {
    pub fn new() -> Self {
        Self
    }
}

impl PrivilegeProbe for OsPrivilegeProbe {
    fn is_elevated(&self) -> bool {
        #[cfg(unix)]
        {
            let root = nix::unistd::Uid::effective().is_root();
            debug!(root, "Checked effective uid");
            root
        }

        #[cfg(windows)]
        {
            // `net session` is refused to non-elevated tokens
            use std::os::windows::process::CommandExt;
            use std::process::{Command, Stdio};

            let elevated = Command::new("net")
                .arg("session")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .creation_flags(0x08000000)
                .status()
                .map(|s| s.success())
                .unwrap_or(false);
            debug!(elevated, "Checked administrative token");
            elevated
        }

        #[cfg(not(any(unix, windows)))]
        {
            false
        }
    }

    fn current_user(&self) -> Option<String> {
        let user = std::env::var("USERNAME")
            .or_else(|_| std::env::var("USER"))
            .ok();
        qualify_user(std::env::var("USERDOMAIN").ok(), user)
    }
}

/// `DOMAIN\user`, or the bare user name when there is no domain
fn qualify_user(domain: Option<String>, user: Option<String>) -> Option<String> {
    let user = user.filter(|u| !u.trim().is_empty())?;
    match domain.filter(|d| !d.trim().is_empty()) {
        Some(domain) => Some(format!("{}\\{}", domain, user)),
        None => Some(user),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualify_user() {
        assert_eq!(
            qualify_user(Some("HOST".into()), Some("alice".into())),
            Some("HOST\\alice".to_string())
        );
        assert_eq!(
            qualify_user(None, Some("alice".into())),
            Some("alice".to_string())
        );
        assert_eq!(
            qualify_user(Some(" ".into()), Some("alice".into())),
            Some("alice".to_string())
        );
        assert_eq!(qualify_user(Some("HOST".into()), None), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_unix_elevation_matches_effective_uid() {
        assert_eq!(
            OsPrivilegeProbe::new().is_elevated(),
            nix::unistd::Uid::effective().is_root()
        );
    }
}
