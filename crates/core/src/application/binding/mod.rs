// Binding Service - interaction flows over the registry
//
// Every mutation follows the same order: change the in-memory registry,
// persist it, then reconcile the scheduler. The in-memory registry stays
// authoritative even when a later step fails.

pub mod add;

pub use add::AddRequest;

use crate::application::sync::{SyncEngine, SyncReport};
use crate::constants::POWERSHELL;
use crate::domain::{Binding, BindingKey, Moment, Registry, ScriptKind};
use crate::error::Result;
use crate::port::{
    BindingStore, ElevationWrapper, ExecutionError, ExecutionResult, LaunchCommand,
    ScriptLauncher,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Edit request; `None` keeps the current value.
/// Name and path are fixed once a binding exists.
#[derive(Debug, Clone, Default)]
pub struct EditRequest {
    pub moment: Option<Moment>,
    pub elevated: Option<bool>,
}

/// Binding Service
pub struct BindingService {
    registry: Registry,
    store: Arc<dyn BindingStore>,
    engine: SyncEngine,
    wrapper: Arc<dyn ElevationWrapper>,
    launcher: Arc<dyn ScriptLauncher>,
}

impl BindingService {
    /// Load the registry from `store` and build the service
    pub fn open(
        store: Arc<dyn BindingStore>,
        engine: SyncEngine,
        wrapper: Arc<dyn ElevationWrapper>,
        launcher: Arc<dyn ScriptLauncher>,
    ) -> Self {
        let registry = store.load();

        for key in registry.duplicate_keys() {
            warn!(binding = %key, "Registry contains duplicate bindings; only the first gets a job");
        }

        info!(
            bindings = registry.len(),
            location = %store.location().display(),
            "Registry loaded"
        );

        Self {
            registry,
            store,
            engine,
            wrapper,
            launcher,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Reconcile the scheduler with the current registry
    pub fn sync(&self) -> Result<SyncReport> {
        self.engine.synchronize(&self.registry)
    }

    /// Add a binding, persist, resynchronize
    pub fn add(&mut self, req: AddRequest) -> Result<(Binding, SyncReport)> {
        let binding = add::execute(&mut self.registry, req)?;
        info!(binding = %binding.key(), path = %binding.path.display(), "Binding added");

        self.persist()?;
        let report = self.sync()?;
        Ok((binding, report))
    }

    /// Change moment and/or elevation of an existing binding
    pub fn edit(&mut self, key: &BindingKey, req: EditRequest) -> Result<(Binding, SyncReport)> {
        let current = self.require(key)?.clone();

        let mut edited = current.clone();
        if let Some(moment) = req.moment {
            edited.moment = moment;
        }
        if let Some(elevated) = req.elevated {
            edited.elevated = elevated;
        }

        self.registry.replace(key, edited.clone())?;
        info!(from = %key, to = %edited.key(), elevated = edited.elevated, "Binding edited");

        self.persist()?;

        if current.elevated && !edited.elevated && !self.wrapper_in_use(&current.path, key) {
            self.wrapper.cleanup(&current.path)?;
        }

        let report = self.sync()?;
        Ok((edited, report))
    }

    /// Flip `enabled`; returns the new state
    pub fn toggle(&mut self, key: &BindingKey) -> Result<(bool, SyncReport)> {
        let enabled = self.registry.toggle(key)?;
        info!(binding = %key, enabled, "Binding toggled");

        self.persist()?;
        let report = self.sync()?;
        Ok((enabled, report))
    }

    /// Remove a binding together with its job and wrapper
    ///
    /// The wrapper is kept while another elevated binding runs the same
    /// script. If the wrapper or the job cannot be removed the binding stays.
    pub fn remove(&mut self, key: &BindingKey) -> Result<Binding> {
        let binding = self.require(key)?.clone();

        if binding.elevated && !self.wrapper_in_use(&binding.path, key) {
            self.wrapper.cleanup(&binding.path)?;
        }

        self.engine.remove_job(&binding)?;

        let removed = self.registry.remove(key)?;
        info!(binding = %key, "Binding removed");

        self.persist()?;
        Ok(removed)
    }

    /// Start the binding's script right now
    ///
    /// Elevated bindings go through a freshly generated wrapper. PowerShell
    /// scripts run to completion and fail if they wrote to stderr; anything
    /// else is started and left running.
    pub fn test_run(&self, key: &BindingKey) -> Result<ExecutionResult> {
        let binding = self.require(key)?;
        let command = self.test_command(binding)?;

        info!(binding = %key, program = %command.program, "Test run");
        let result = self.launcher.launch(&command)?;

        if let Some(stderr) = result.stderr.as_deref().map(str::trim) {
            if !stderr.is_empty() {
                return Err(ExecutionError::ScriptFailed(stderr.to_string()).into());
            }
        }

        Ok(result)
    }

    fn test_command(&self, binding: &Binding) -> Result<LaunchCommand> {
        let path = binding.path.display().to_string();
        let kind = binding.kind();

        if binding.elevated {
            let wrapper = self.wrapper.generate(&binding.path, kind)?;
            return Ok(LaunchCommand::detached(
                wrapper.display().to_string(),
                Vec::new(),
            ));
        }

        Ok(match kind {
            ScriptKind::Interpreted => LaunchCommand::waiting(
                POWERSHELL,
                vec![
                    "-ExecutionPolicy".to_string(),
                    "Bypass".to_string(),
                    "-NoProfile".to_string(),
                    "-File".to_string(),
                    path,
                ],
            ),
            _ => LaunchCommand::detached(path, Vec::new()),
        })
    }

    /// Wrappers are per script, so bindings at other moments may share one
    fn wrapper_in_use(&self, script: &Path, except: &BindingKey) -> bool {
        self.registry
            .bindings()
            .iter()
            .any(|b| b.elevated && b.path == script && b.key() != *except)
    }

    fn require(&self, key: &BindingKey) -> Result<&Binding> {
        self.registry
            .get(key)
            .ok_or_else(|| crate::domain::DomainError::BindingNotFound(key.clone()).into())
    }

    fn persist(&self) -> Result<()> {
        self.store.save(&self.registry).map_err(|e| {
            warn!(error = %e, "Registry not persisted; in-memory state is ahead of disk");
            e.into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::port::binding_store::mocks::MockBindingStore;
    use crate::port::elevation_wrapper::mocks::MockElevationWrapper;
    use crate::port::script_launcher::mocks::{MockBehavior, MockScriptLauncher};
    use crate::port::task_scheduler::mocks::InMemoryTaskScheduler;
    use crate::port::time_provider::FixedTimeProvider;
    use crate::port::LaunchMode;

    struct Fixture {
        store: Arc<MockBindingStore>,
        scheduler: InMemoryTaskScheduler,
        wrapper: MockElevationWrapper,
        launcher: Arc<MockScriptLauncher>,
    }

    impl Fixture {
        fn new() -> Self {
            Self::with_launcher(MockScriptLauncher::new_success())
        }

        fn with_launcher(launcher: MockScriptLauncher) -> Self {
            Self {
                store: Arc::new(MockBindingStore::new()),
                scheduler: InMemoryTaskScheduler::new(),
                wrapper: MockElevationWrapper::new(),
                launcher: Arc::new(launcher),
            }
        }

        fn service(&self) -> BindingService {
            let engine = SyncEngine::new(
                Arc::new(self.scheduler.clone()),
                Arc::new(self.wrapper.clone()),
                Arc::new(FixedTimeProvider(0)),
            );
            BindingService::open(
                self.store.clone(),
                engine,
                Arc::new(self.wrapper.clone()),
                self.launcher.clone(),
            )
        }
    }

    #[test]
    fn test_add_persists_and_registers() {
        let fx = Fixture::new();
        let mut service = fx.service();

        let (binding, report) = service
            .add(AddRequest::new("/s/backup.ps1", Moment::SystemStartup, false))
            .unwrap();

        assert_eq!(binding.name, "backup");
        assert_eq!(report.registered, vec!["Script_backup_system-startup"]);
        assert_eq!(fx.store.stored().len(), 1);
        assert_eq!(fx.scheduler.job_names(), vec!["Script_backup_system-startup"]);
    }

    #[test]
    fn test_add_keeps_memory_state_when_save_fails() {
        let fx = Fixture::new();
        fx.store.set_fail_saves(true);
        let mut service = fx.service();

        let err = service
            .add(AddRequest::new("/s/backup.ps1", Moment::UserLogon, false))
            .unwrap_err();

        assert!(matches!(err, AppError::Persistence(_)));
        assert_eq!(service.registry().len(), 1);
        assert!(fx.store.stored().is_empty());
        // no sync after a failed save
        assert_eq!(fx.scheduler.connect_count(), 0);
    }

    #[test]
    fn test_edit_moves_job_to_new_moment() {
        let fx = Fixture::new();
        let mut service = fx.service();
        service
            .add(AddRequest::new("/s/backup.ps1", Moment::UserLogon, false))
            .unwrap();

        let key = BindingKey::new("backup", Moment::UserLogon);
        let req = EditRequest {
            moment: Some(Moment::BeforeLogoff),
            elevated: None,
        };
        service.edit(&key, req).unwrap();

        assert_eq!(fx.scheduler.job_names(), vec!["Script_backup_before-logoff"]);
        assert_eq!(fx.store.stored().bindings()[0].moment, Moment::BeforeLogoff);
    }

    #[test]
    fn test_edit_dropping_elevation_cleans_wrapper() {
        let fx = Fixture::new();
        let mut service = fx.service();
        service
            .add(AddRequest::new("/s/setup.bat", Moment::UserLogon, true))
            .unwrap();
        assert_eq!(fx.wrapper.wrappers().len(), 1);

        let key = BindingKey::new("setup", Moment::UserLogon);
        let req = EditRequest {
            moment: None,
            elevated: Some(false),
        };
        service.edit(&key, req).unwrap();

        assert!(fx.wrapper.wrappers().is_empty());
        let job = fx.scheduler.job("Script_setup_user-logon").unwrap();
        assert_eq!(job.action.program, "cmd.exe");
    }

    #[test]
    fn test_toggle_removes_and_restores_job() {
        let fx = Fixture::new();
        let mut service = fx.service();
        service
            .add(AddRequest::new("/s/backup.ps1", Moment::SystemStartup, false))
            .unwrap();
        let key = BindingKey::new("backup", Moment::SystemStartup);

        let (enabled, _) = service.toggle(&key).unwrap();
        assert!(!enabled);
        assert!(fx.scheduler.job_names().is_empty());
        assert!(!fx.store.stored().bindings()[0].enabled);

        let (enabled, _) = service.toggle(&key).unwrap();
        assert!(enabled);
        assert_eq!(fx.scheduler.job_names(), vec!["Script_backup_system-startup"]);
    }

    #[test]
    fn test_remove_deletes_job_and_wrapper() {
        let fx = Fixture::new();
        let mut service = fx.service();
        service
            .add(AddRequest::new("/s/setup.bat", Moment::UserLogon, true))
            .unwrap();
        service
            .add(AddRequest::new("/s/backup.ps1", Moment::UserLogon, false))
            .unwrap();

        let removed = service
            .remove(&BindingKey::new("setup", Moment::UserLogon))
            .unwrap();

        assert_eq!(removed.name, "setup");
        assert!(fx.wrapper.wrappers().is_empty());
        assert_eq!(fx.scheduler.job_names(), vec!["Script_backup_user-logon"]);
        assert_eq!(fx.store.stored().len(), 1);
    }

    #[test]
    fn test_remove_keeps_wrapper_shared_with_other_moment() {
        let fx = Fixture::new();
        let mut service = fx.service();
        for moment in [Moment::UserLogon, Moment::BeforeShutdown] {
            service
                .add(AddRequest::new("/s/setup.ps1", moment, true))
                .unwrap();
        }

        service
            .remove(&BindingKey::new("setup", Moment::UserLogon))
            .unwrap();

        assert_eq!(fx.wrapper.wrappers().len(), 1);
        let job = fx.scheduler.job("Script_setup_before-shutdown").unwrap();
        assert_eq!(job.action.program, fx.wrapper.wrappers()[0].display().to_string());

        service
            .remove(&BindingKey::new("setup", Moment::BeforeShutdown))
            .unwrap();
        assert!(fx.wrapper.wrappers().is_empty());
    }

    #[test]
    fn test_edit_keeps_wrapper_shared_with_other_moment() {
        let fx = Fixture::new();
        let mut service = fx.service();
        for moment in [Moment::UserLogon, Moment::SystemStartup] {
            service
                .add(AddRequest::new("/s/setup.bat", moment, true))
                .unwrap();
        }

        let req = EditRequest {
            moment: None,
            elevated: Some(false),
        };
        service
            .edit(&BindingKey::new("setup", Moment::UserLogon), req)
            .unwrap();

        assert_eq!(fx.wrapper.wrappers().len(), 1);
        let job = fx.scheduler.job("Script_setup_system-startup").unwrap();
        assert!(job.action.program.ends_with("elevated_setup.bat.cmd"));
    }

    #[test]
    fn test_remove_keeps_binding_when_job_delete_fails() {
        let fx = Fixture::new();
        let mut service = fx.service();
        service
            .add(AddRequest::new("/s/backup.ps1", Moment::UserLogon, false))
            .unwrap();
        fx.scheduler.fail_delete("Script_backup_user-logon");

        let key = BindingKey::new("backup", Moment::UserLogon);
        let err = service.remove(&key).unwrap_err();

        assert!(matches!(err, AppError::Scheduler(_)));
        assert!(service.registry().get(&key).is_some());
        assert_eq!(fx.store.stored().len(), 1);
        assert_eq!(fx.scheduler.job_names(), vec!["Script_backup_user-logon"]);
    }

    #[test]
    fn test_sync_connect_failure_surfaces() {
        let fx = Fixture::new();
        let mut service = fx.service();
        fx.scheduler.set_fail_connect(true);

        let err = service
            .add(AddRequest::new("/s/backup.ps1", Moment::UserLogon, false))
            .unwrap_err();

        assert!(matches!(err, AppError::Scheduler(_)));
        // saved before the scheduler is touched
        assert_eq!(fx.store.stored().len(), 1);
        assert!(fx.scheduler.job_names().is_empty());
    }

    #[test]
    fn test_remove_unknown_binding() {
        let fx = Fixture::new();
        let mut service = fx.service();

        let err = service
            .remove(&BindingKey::new("ghost", Moment::UserLogon))
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_test_run_powershell_waits() {
        let fx = Fixture::new();
        let mut service = fx.service();
        service
            .add(AddRequest::new("/s/backup.ps1", Moment::UserLogon, false))
            .unwrap();

        service
            .test_run(&BindingKey::new("backup", Moment::UserLogon))
            .unwrap();

        let launched = fx.launcher.launched();
        assert_eq!(launched.len(), 1);
        assert_eq!(launched[0].program, "powershell.exe");
        assert_eq!(launched[0].mode, LaunchMode::WaitForExit);
        assert_eq!(launched[0].args.last().map(String::as_str), Some("/s/backup.ps1"));
    }

    #[test]
    fn test_test_run_elevated_starts_wrapper() {
        let fx = Fixture::new();
        let mut service = fx.service();
        service
            .add(AddRequest::new("/s/agent.exe", Moment::UserLogon, true))
            .unwrap();

        service
            .test_run(&BindingKey::new("agent", Moment::UserLogon))
            .unwrap();

        let launched = fx.launcher.launched();
        assert!(launched[0].program.ends_with("elevated_agent.exe.cmd"));
        assert_eq!(launched[0].mode, LaunchMode::Detached);
    }

    #[test]
    fn test_test_run_fails_on_stderr() {
        let fx = Fixture::with_launcher(MockScriptLauncher::new(MockBehavior::Stderr(
            "Access denied".to_string(),
        )));
        let mut service = fx.service();
        service
            .add(AddRequest::new("/s/backup.ps1", Moment::UserLogon, false))
            .unwrap();

        let err = service
            .test_run(&BindingKey::new("backup", Moment::UserLogon))
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Execution(ExecutionError::ScriptFailed(_))
        ));
    }
}
