// Privilege probe port
// Startup gate: the process must hold administrative rights

/// Privilege probe for the running process
pub trait PrivilegeProbe: Send + Sync {
    /// true if the current process runs with administrative rights
    /// (elevated token on Windows, effective uid 0 on Unix)
    fn is_elevated(&self) -> bool;

    /// Name of the interactive user the process runs as, if known
    fn current_user(&self) -> Option<String>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;

    /// Mock PrivilegeProbe for testing
    pub struct MockPrivilegeProbe {
        elevated: bool,
        user: Option<String>,
    }

    impl MockPrivilegeProbe {
        pub fn new(elevated: bool) -> Self {
            Self {
                elevated,
                user: Some("WORKSTATION\\tester".to_string()),
            }
        }
    }

    impl PrivilegeProbe for MockPrivilegeProbe {
        fn is_elevated(&self) -> bool {
            self.elevated
        }

        fn current_user(&self) -> Option<String> {
            self.user.clone()
        }
    }
}
