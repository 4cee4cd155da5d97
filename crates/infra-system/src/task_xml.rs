// Task Scheduler XML (schema 1.2) rendering for `schtasks /Create /XML`

use std::time::Duration;

use scriptsync_core::domain::{JobDefinition, LogonType, Principal, RunLevel, Trigger};

const TASK_NAMESPACE: &str = "http://schemas.microsoft.com/windows/2004/02/mit/task";
const LOCAL_SYSTEM_SID: &str = "S-1-5-18";

/// Render a full task document.
///
/// `user` is the `DOMAIN\user` account for jobs running in the interactive
/// session; when unknown the scheduler falls back to the registering user.
pub fn render(job: &JobDefinition, user: Option<&str>) -> String {
    let mut xml = String::new();

    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-16\"?>\r\n");
    xml.push_str(&format!("<Task version=\"1.2\" xmlns=\"{}\">\r\n", TASK_NAMESPACE));

    xml.push_str("  <RegistrationInfo>\r\n");
    xml.push_str(&format!(
        "    <Description>{}</Description>\r\n",
        xml_escape(&job.description)
    ));
    xml.push_str(&format!("    <URI>\\{}</URI>\r\n", xml_escape(&job.name)));
    xml.push_str("  </RegistrationInfo>\r\n");

    render_trigger(&mut xml, &job.trigger);
    render_principal(&mut xml, job.principal, user);
    render_settings(&mut xml, job);

    xml.push_str("  <Actions Context=\"Author\">\r\n    <Exec>\r\n");
    xml.push_str(&format!(
        "      <Command>{}</Command>\r\n",
        xml_escape(&job.action.program)
    ));
    if let Some(arguments) = &job.action.arguments {
        xml.push_str(&format!(
            "      <Arguments>{}</Arguments>\r\n",
            xml_escape(arguments)
        ));
    }
    xml.push_str("    </Exec>\r\n  </Actions>\r\n");
    xml.push_str("</Task>\r\n");

    xml
}

fn render_trigger(xml: &mut String, trigger: &Trigger) {
    xml.push_str("  <Triggers>\r\n");
    match trigger {
        Trigger::Boot => {
            xml.push_str("    <BootTrigger>\r\n      <Enabled>true</Enabled>\r\n    </BootTrigger>\r\n");
        }
        Trigger::Logon => {
            xml.push_str(
                "    <LogonTrigger>\r\n      <Enabled>true</Enabled>\r\n    </LogonTrigger>\r\n",
            );
        }
        Trigger::Event { subscription } => {
            xml.push_str("    <EventTrigger>\r\n      <Enabled>true</Enabled>\r\n");
            xml.push_str(&format!(
                "      <Subscription>{}</Subscription>\r\n",
                xml_escape(subscription)
            ));
            xml.push_str("    </EventTrigger>\r\n");
        }
        Trigger::SessionDisconnect => {
            xml.push_str("    <SessionStateChangeTrigger>\r\n");
            xml.push_str("      <Enabled>true</Enabled>\r\n");
            xml.push_str("      <StateChange>ConsoleDisconnect</StateChange>\r\n");
            xml.push_str("    </SessionStateChangeTrigger>\r\n");
        }
    }
    xml.push_str("  </Triggers>\r\n");
}

fn render_principal(xml: &mut String, principal: Principal, user: Option<&str>) {
    xml.push_str("  <Principals>\r\n    <Principal id=\"Author\">\r\n");

    match principal.logon_type() {
        LogonType::ServiceAccount => {
            xml.push_str(&format!("      <UserId>{}</UserId>\r\n", LOCAL_SYSTEM_SID));
        }
        LogonType::InteractiveToken => {
            if let Some(user) = user {
                xml.push_str(&format!("      <UserId>{}</UserId>\r\n", xml_escape(user)));
            }
            xml.push_str("      <LogonType>InteractiveToken</LogonType>\r\n");
        }
    }

    let run_level = match principal.run_level() {
        RunLevel::Highest => "HighestAvailable",
        RunLevel::LeastPrivilege => "LeastPrivilege",
    };
    xml.push_str(&format!("      <RunLevel>{}</RunLevel>\r\n", run_level));

    xml.push_str("    </Principal>\r\n  </Principals>\r\n");
}

fn render_settings(xml: &mut String, job: &JobDefinition) {
    let s = &job.settings;

    xml.push_str("  <Settings>\r\n");
    xml.push_str("    <MultipleInstancesPolicy>IgnoreNew</MultipleInstancesPolicy>\r\n");
    xml.push_str(&format!(
        "    <DisallowStartIfOnBatteries>{}</DisallowStartIfOnBatteries>\r\n",
        s.disallow_start_if_on_batteries
    ));
    xml.push_str(&format!(
        "    <StopIfGoingOnBatteries>{}</StopIfGoingOnBatteries>\r\n",
        s.stop_if_going_on_batteries
    ));
    xml.push_str(&format!(
        "    <AllowHardTerminate>{}</AllowHardTerminate>\r\n",
        s.allow_hard_terminate
    ));
    xml.push_str(&format!(
        "    <StartWhenAvailable>{}</StartWhenAvailable>\r\n",
        s.start_when_available
    ));
    xml.push_str(&format!(
        "    <RunOnlyIfNetworkAvailable>{}</RunOnlyIfNetworkAvailable>\r\n",
        s.run_only_if_network_available
    ));
    xml.push_str("    <Enabled>true</Enabled>\r\n");
    xml.push_str(&format!(
        "    <ExecutionTimeLimit>{}</ExecutionTimeLimit>\r\n",
        iso_duration(s.execution_time_limit)
    ));
    xml.push_str("  </Settings>\r\n");
}

/// ISO 8601 duration in the largest whole unit (`PT5M`, `PT1H`, `PT90S`)
pub fn iso_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs == 0 {
        "PT0S".to_string()
    } else if secs % 3600 == 0 {
        format!("PT{}H", secs / 3600)
    } else if secs % 60 == 0 {
        format!("PT{}M", secs / 60)
    } else {
        format!("PT{}S", secs)
    }
}

pub fn xml_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// UTF-16LE bytes with BOM, the encoding the XML prolog declares
pub fn encode_utf16le(xml: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(2 + xml.len() * 2);
    bytes.extend_from_slice(&[0xFF, 0xFE]);
    for unit in xml.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptsync_core::domain::{Binding, Moment};
    use std::path::PathBuf;

    fn definition(moment: Moment, elevated: bool) -> JobDefinition {
        let binding = Binding::new("/scripts/backup.ps1", moment, elevated).unwrap();
        let wrapper = PathBuf::from("/scripts/ScriptWrappers/elevated_backup.ps1.cmd");
        JobDefinition::for_binding(&binding, elevated.then_some(wrapper.as_path()))
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            xml_escape("a<b>&\"c\"'d'"),
            "a&lt;b&gt;&amp;&quot;c&quot;&apos;d&apos;"
        );
        assert_eq!(xml_escape("plain"), "plain");
    }

    #[test]
    fn test_iso_duration() {
        assert_eq!(iso_duration(Duration::from_secs(300)), "PT5M");
        assert_eq!(iso_duration(Duration::from_secs(7200)), "PT2H");
        assert_eq!(iso_duration(Duration::from_secs(90)), "PT90S");
        assert_eq!(iso_duration(Duration::ZERO), "PT0S");
    }

    #[test]
    fn test_system_boot_job() {
        let xml = render(&definition(Moment::SystemStartup, false), Some("HOST\\alice"));

        assert!(xml.contains("<BootTrigger>"));
        assert!(xml.contains("<URI>\\Script_backup_system-startup</URI>"));
        assert!(xml.contains("<UserId>S-1-5-18</UserId>"));
        assert!(!xml.contains("HOST\\alice"));
        assert!(xml.contains("<RunLevel>LeastPrivilege</RunLevel>"));
        assert!(xml.contains("<Command>powershell.exe</Command>"));
        assert!(xml.contains(
            "<Arguments>-ExecutionPolicy Bypass -NoProfile -WindowStyle Hidden -File &quot;/scripts/backup.ps1&quot;</Arguments>"
        ));
        assert!(xml.contains("<ExecutionTimeLimit>PT5M</ExecutionTimeLimit>"));
        assert!(xml.contains("<StartWhenAvailable>true</StartWhenAvailable>"));
        assert!(xml.contains("<DisallowStartIfOnBatteries>false</DisallowStartIfOnBatteries>"));
    }

    #[test]
    fn test_elevated_logon_job() {
        let xml = render(&definition(Moment::UserLogon, true), Some("HOST\\alice"));

        assert!(xml.contains("<LogonTrigger>"));
        assert!(xml.contains("<UserId>HOST\\alice</UserId>"));
        assert!(xml.contains("<LogonType>InteractiveToken</LogonType>"));
        assert!(xml.contains("<RunLevel>HighestAvailable</RunLevel>"));
        assert!(xml.contains(
            "<Command>/scripts/ScriptWrappers/elevated_backup.ps1.cmd</Command>"
        ));
        assert!(!xml.contains("<Arguments>"));
    }

    #[test]
    fn test_shutdown_and_logoff_triggers() {
        let shutdown = render(&definition(Moment::BeforeShutdown, false), None);
        assert!(shutdown.contains("<EventTrigger>"));
        assert!(shutdown.contains("&lt;QueryList&gt;"));
        assert!(shutdown.contains("EventID=1074"));

        let logoff = render(&definition(Moment::BeforeLogoff, true), None);
        assert!(logoff.contains("<StateChange>ConsoleDisconnect</StateChange>"));
        assert!(!logoff.contains("<UserId>"));
    }

    #[test]
    fn test_utf16_encoding() {
        let bytes = encode_utf16le("<a/>");
        assert_eq!(&bytes[..2], &[0xFF, 0xFE]);
        assert_eq!(&bytes[2..4], &[b'<', 0]);
        assert_eq!(bytes.len(), 2 + 4 * 2);
    }
}
