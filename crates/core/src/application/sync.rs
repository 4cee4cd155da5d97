//! Synchronization Engine - rebuilds the scheduler's managed jobs from the registry
//!
//! Reconciliation is a full teardown followed by a rebuild:
//! 1. every job carrying the reserved prefix is deleted
//! 2. one job is registered per enabled binding
//!
//! The two phases are not atomic. If registration fails part-way, the
//! scheduler is left with fewer managed jobs than the registry lists as
//! enabled; the next successful `synchronize` restores them. The returned
//! report (or `AppError::SyncIncomplete`) says exactly which jobs are missing.

use crate::constants::JOB_PREFIX;
use crate::domain::{Binding, JobDefinition, Registry};
use crate::error::{AppError, Result};
use crate::port::{ElevationWrapper, SchedulerSession, TaskScheduler, TimeProvider};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Phase in which a binding failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    /// Wrapper could not be written; registration skipped
    Wrapper,
    /// Scheduler rejected the job
    Register,
}

/// One binding that ended the cycle without a job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncFailure {
    pub job_name: String,
    pub stage: FailureStage,
    pub message: String,
}

/// Outcome of one reconciliation cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Managed jobs deleted during teardown
    pub removed: Vec<String>,
    /// Jobs registered during rebuild, in registry order
    pub registered: Vec<String>,
    /// Job names of disabled bindings (no job created)
    pub disabled: Vec<String>,
    /// Job names skipped because an earlier binding already claimed them
    pub duplicates: Vec<String>,
    pub failures: Vec<SyncFailure>,
    pub duration_ms: i64,
}

impl SyncReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Synchronization engine
pub struct SyncEngine {
    scheduler: Arc<dyn TaskScheduler>,
    wrapper: Arc<dyn ElevationWrapper>,
    time_provider: Arc<dyn TimeProvider>,
}

impl SyncEngine {
    pub fn new(
        scheduler: Arc<dyn TaskScheduler>,
        wrapper: Arc<dyn ElevationWrapper>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            scheduler,
            wrapper,
            time_provider,
        }
    }

    /// Make the scheduler's managed jobs match `registry`
    ///
    /// # Errors
    /// - AppError::Scheduler if connecting, enumerating or deleting fails
    ///   (the cycle stops there)
    /// - AppError::SyncIncomplete if any enabled binding ended without a job
    pub fn synchronize(&self, registry: &Registry) -> Result<SyncReport> {
        let start_time = self.time_provider.now_millis();

        info!(
            bindings = registry.len(),
            enabled = registry.enabled().count(),
            "Starting scheduler synchronization"
        );

        let mut report = SyncReport::default();
        {
            let mut session = self.scheduler.connect()?;
            self.teardown(session.as_mut(), &mut report)?;
            self.rebuild(session.as_mut(), registry, &mut report);
        }

        report.duration_ms = self.time_provider.now_millis() - start_time;

        info!(
            removed = report.removed.len(),
            registered = report.registered.len(),
            disabled = report.disabled.len(),
            duplicates = report.duplicates.len(),
            failures = report.failures.len(),
            duration_ms = report.duration_ms,
            "Scheduler synchronization finished"
        );

        if report.is_complete() {
            Ok(report)
        } else {
            Err(AppError::SyncIncomplete(Box::new(report)))
        }
    }

    /// Delete the job of a single binding (used by the remove flow)
    pub fn remove_job(&self, binding: &Binding) -> Result<()> {
        let job_name = binding.job_name();
        let mut session = self.scheduler.connect()?;
        session.delete_job(&job_name)?;

        info!(job_name = %job_name, "Deleted scheduled job");
        Ok(())
    }

    fn teardown(
        &self,
        session: &mut (dyn SchedulerSession + '_),
        report: &mut SyncReport,
    ) -> Result<()> {
        let managed = session.list_managed_jobs(JOB_PREFIX)?;

        for name in managed {
            session.delete_job(&name)?;
            debug!(job_name = %name, "Deleted managed job");
            report.removed.push(name);
        }

        Ok(())
    }

    fn rebuild(
        &self,
        session: &mut (dyn SchedulerSession + '_),
        registry: &Registry,
        report: &mut SyncReport,
    ) {
        let mut claimed = HashSet::new();

        for binding in registry.bindings() {
            let job_name = binding.job_name();

            if !binding.enabled {
                debug!(job_name = %job_name, "Binding disabled, no job");
                report.disabled.push(job_name);
                continue;
            }

            if !claimed.insert(job_name.clone()) {
                warn!(
                    job_name = %job_name,
                    path = %binding.path.display(),
                    "Duplicate binding maps to an already registered job, skipping"
                );
                report.duplicates.push(job_name);
                continue;
            }

            let definition = match self.definition_for(binding) {
                Ok(definition) => definition,
                Err(e) => {
                    warn!(job_name = %job_name, error = %e, "Elevation wrapper failed, job skipped");
                    report.failures.push(SyncFailure {
                        job_name,
                        stage: FailureStage::Wrapper,
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            match session.register_job(&definition) {
                Ok(()) => {
                    debug!(
                        job_name = %job_name,
                        moment = %binding.moment,
                        elevated = binding.elevated,
                        "Registered job"
                    );
                    report.registered.push(job_name);
                }
                Err(e) => {
                    warn!(job_name = %job_name, error = %e, "Job registration failed");
                    report.failures.push(SyncFailure {
                        job_name,
                        stage: FailureStage::Register,
                        message: e.to_string(),
                    });
                }
            }
        }
    }

    fn definition_for(&self, binding: &Binding) -> Result<JobDefinition> {
        if binding.elevated {
            let wrapper = self.wrapper.generate(&binding.path, binding.kind())?;
            Ok(JobDefinition::for_binding(binding, Some(&wrapper)))
        } else {
            Ok(JobDefinition::for_binding(binding, None))
        }
    }
}
