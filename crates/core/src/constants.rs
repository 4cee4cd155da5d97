// Fixed values shared by the domain, the engine and the adapters (no magic values)
use std::time::Duration;

/// Application name, used for the per-user config directory
pub const APP_NAME: &str = "ScriptSync";

/// File name of the persisted binding list
pub const CONFIG_FILE_NAME: &str = "bindings.json";

/// Current on-disk format version of the binding list
pub const CONFIG_FORMAT_VERSION: u32 = 1;

/// Reserved prefix of every scheduler job owned by this system.
/// Jobs without it are never touched.
pub const JOB_PREFIX: &str = "Script_";

/// Subdirectory (next to the script) that holds elevation wrappers
pub const WRAPPER_DIR_NAME: &str = "ScriptWrappers";

/// Wrapper file name is `elevated_<script file name>.cmd`
pub const WRAPPER_FILE_PREFIX: &str = "elevated_";
pub const WRAPPER_FILE_EXTENSION: &str = "cmd";

/// Upper bound on a scheduled job's own run time (5 minutes)
pub const EXECUTION_TIME_LIMIT: Duration = Duration::from_secs(5 * 60);

/// Interpreter used for `.ps1` scripts
pub const POWERSHELL: &str = "powershell.exe";

/// Command interpreter used for `.bat` scripts
pub const CMD: &str = "cmd.exe";

/// Event-log query matching the "system is shutting down" notification
/// (User32, EventID 1074)
pub const SHUTDOWN_EVENT_SUBSCRIPTION: &str = "<QueryList><Query Id=\"0\" Path=\"System\"><Select Path=\"System\">*[System[Provider[@Name='User32'] and (EventID=1074)]]</Select></Query></QueryList>";

/// Characters the OS scheduler rejects inside a task name
pub const FORBIDDEN_NAME_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];
