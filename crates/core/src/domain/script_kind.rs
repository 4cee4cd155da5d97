// Script Kind - classification by file extension

use serde::{Deserialize, Serialize};
use std::path::Path;

/// How a script has to be launched.
///
/// Decided solely by the file extension; content is never inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScriptKind {
    /// `.ps1`, run through PowerShell
    Interpreted,
    /// `.bat`, run through the command interpreter
    ShellBatch,
    /// `.exe`, invoked directly
    Executable,
    /// Anything else, invoked directly
    Unknown,
}

impl ScriptKind {
    /// Classify a script path (case-insensitive extension match)
    pub fn classify(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("ps1") => ScriptKind::Interpreted,
            Some("bat") => ScriptKind::ShellBatch,
            Some("exe") => ScriptKind::Executable,
            _ => ScriptKind::Unknown,
        }
    }

    /// Human-readable label (job description, listings)
    pub fn label(&self) -> &'static str {
        match self {
            ScriptKind::Interpreted => "PowerShell",
            ScriptKind::ShellBatch => "Batch",
            ScriptKind::Executable => "Executable",
            ScriptKind::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for ScriptKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
