// Task Scheduler Port - boundary over the OS job scheduler

use crate::domain::JobDefinition;
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("Scheduler connection failed: {0}")]
    Connect(String),

    #[error("Failed to enumerate jobs: {0}")]
    Enumerate(String),

    #[error("Failed to delete job {name}: {reason}")]
    Delete { name: String, reason: String },

    #[error("Failed to register job {name}: {reason}")]
    Register { name: String, reason: String },
}

/// Entry point to the OS scheduler.
///
/// Every batch of operations runs inside one session obtained from
/// `connect`; the session is released when dropped, including on early
/// return through `?`.
pub trait TaskScheduler: Send + Sync {
    fn connect(&self) -> Result<Box<dyn SchedulerSession + '_>, SchedulerError>;
}

/// Scoped handle to the scheduler
pub trait SchedulerSession {
    /// Names of all jobs starting with `prefix`
    fn list_managed_jobs(&mut self, prefix: &str) -> Result<BTreeSet<String>, SchedulerError>;

    /// Delete a job by name (no-op if absent)
    fn delete_job(&mut self, name: &str) -> Result<(), SchedulerError>;

    /// Create or replace the job named `job.name`
    fn register_job(&mut self, job: &JobDefinition) -> Result<(), SchedulerError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::{BTreeMap, HashSet};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct State {
        jobs: BTreeMap<String, JobDefinition>,
        open_sessions: usize,
        connect_count: usize,
        register_calls: usize,
        fail_connect: bool,
        fail_enumerate: bool,
        fail_register: HashSet<String>,
        fail_delete: HashSet<String>,
    }

    /// In-memory scheduler for testing
    ///
    /// Jobs registered outside of the managed prefix (via `with_job`)
    /// behave like user/OS-owned entries.
    #[derive(Clone, Default)]
    pub struct InMemoryTaskScheduler {
        state: Arc<Mutex<State>>,
    }

    impl InMemoryTaskScheduler {
        pub fn new() -> Self {
            Self::default()
        }

        /// Seed a pre-existing job
        pub fn with_job(self, job: JobDefinition) -> Self {
            self.state
                .lock()
                .unwrap()
                .jobs
                .insert(job.name.clone(), job);
            self
        }

        pub fn job_names(&self) -> Vec<String> {
            self.state.lock().unwrap().jobs.keys().cloned().collect()
        }

        pub fn job(&self, name: &str) -> Option<JobDefinition> {
            self.state.lock().unwrap().jobs.get(name).cloned()
        }

        pub fn open_sessions(&self) -> usize {
            self.state.lock().unwrap().open_sessions
        }

        pub fn connect_count(&self) -> usize {
            self.state.lock().unwrap().connect_count
        }

        pub fn register_calls(&self) -> usize {
            self.state.lock().unwrap().register_calls
        }

        pub fn set_fail_connect(&self, fail: bool) {
            self.state.lock().unwrap().fail_connect = fail;
        }

        pub fn set_fail_enumerate(&self, fail: bool) {
            self.state.lock().unwrap().fail_enumerate = fail;
        }

        /// Make registration of `name` fail
        pub fn fail_register(&self, name: impl Into<String>) {
            self.state.lock().unwrap().fail_register.insert(name.into());
        }

        /// Make deletion of `name` fail
        pub fn fail_delete(&self, name: impl Into<String>) {
            self.state.lock().unwrap().fail_delete.insert(name.into());
        }
    }

    impl TaskScheduler for InMemoryTaskScheduler {
        fn connect(&self) -> Result<Box<dyn SchedulerSession + '_>, SchedulerError> {
            let mut state = self.state.lock().unwrap();
            if state.fail_connect {
                return Err(SchedulerError::Connect("mock connection refused".to_string()));
            }
            state.connect_count += 1;
            state.open_sessions += 1;

            Ok(Box::new(InMemorySession {
                state: Arc::clone(&self.state),
            }))
        }
    }

    struct InMemorySession {
        state: Arc<Mutex<State>>,
    }

    impl SchedulerSession for InMemorySession {
        fn list_managed_jobs(&mut self, prefix: &str) -> Result<BTreeSet<String>, SchedulerError> {
            let state = self.state.lock().unwrap();
            if state.fail_enumerate {
                return Err(SchedulerError::Enumerate("mock enumerate failure".to_string()));
            }

            Ok(state
                .jobs
                .keys()
                .filter(|name| name.starts_with(prefix))
                .cloned()
                .collect())
        }

        fn delete_job(&mut self, name: &str) -> Result<(), SchedulerError> {
            let mut state = self.state.lock().unwrap();
            if state.fail_delete.contains(name) {
                return Err(SchedulerError::Delete {
                    name: name.to_string(),
                    reason: "mock delete failure".to_string(),
                });
            }

            state.jobs.remove(name);
            Ok(())
        }

        fn register_job(&mut self, job: &JobDefinition) -> Result<(), SchedulerError> {
            let mut state = self.state.lock().unwrap();
            state.register_calls += 1;

            if state.fail_register.contains(&job.name) {
                return Err(SchedulerError::Register {
                    name: job.name.clone(),
                    reason: "mock register failure".to_string(),
                });
            }

            state.jobs.insert(job.name.clone(), job.clone());
            Ok(())
        }
    }

    impl Drop for InMemorySession {
        fn drop(&mut self) {
            if let Ok(mut state) = self.state.lock() {
                state.open_sessions -= 1;
            }
        }
    }
}
