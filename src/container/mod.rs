//! Dependency-injection seam used to build job delegates by type id.

mod factory;

pub use factory::{DynamicComponentFactory, RetryPolicy};

use std::collections::HashMap;
use std::sync::Arc;

use crate::scheduler::jobs::{
    JobRunner, NotificationJob, ReportJob, SystemLoadReporterJob, TaskJob, NOTIFICATION_JOB,
    REPORT_JOB, SYSTEM_LOAD_REPORTER_JOB, TASK_JOB,
};
use crate::scheduler::JobDelegate;
use crate::types::AppError;
use crate::Result;

/// Builds delegate instances with their collaborators wired in.
pub trait ComponentContainer: Send + Sync {
    fn create_autowired(&self, type_id: &str) -> Result<Arc<dyn JobDelegate>>;
}

type Constructor = Box<dyn Fn() -> Result<Arc<dyn JobDelegate>> + Send + Sync>;

/// Static table of delegate constructors keyed by type id.
pub struct DelegateContainer {
    constructors: HashMap<String, Constructor>,
}

impl DelegateContainer {
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Container preloaded with the built-in job types.
    pub fn with_builtin_jobs(runner: Arc<dyn JobRunner>) -> Self {
        let mut container = Self::new();

        let r = runner.clone();
        container.register(TASK_JOB, move || Ok(Arc::new(TaskJob::new(r.clone()))));
        let r = runner.clone();
        container.register(REPORT_JOB, move || Ok(Arc::new(ReportJob::new(r.clone()))));
        let r = runner.clone();
        container.register(NOTIFICATION_JOB, move || {
            Ok(Arc::new(NotificationJob::new(r.clone())))
        });
        container.register(SYSTEM_LOAD_REPORTER_JOB, move || {
            Ok(Arc::new(SystemLoadReporterJob::new(runner.clone())))
        });

        container
    }

    pub fn register<F>(&mut self, type_id: &str, constructor: F)
    where
        F: Fn() -> Result<Arc<dyn JobDelegate>> + Send + Sync + 'static,
    {
        if self
            .constructors
            .insert(type_id.to_string(), Box::new(constructor))
            .is_some()
        {
            tracing::warn!(type_id, "Replacing delegate constructor");
        }
    }

    pub fn knows(&self, type_id: &str) -> bool {
        self.constructors.contains_key(type_id)
    }
}

impl Default for DelegateContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentContainer for DelegateContainer {
    fn create_autowired(&self, type_id: &str) -> Result<Arc<dyn JobDelegate>> {
        let constructor = self
            .constructors
            .get(type_id)
            .ok_or_else(|| AppError::ComponentCreation(format!("no constructor for {}", type_id)))?;
        constructor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::jobs::LoggingJobRunner;

    #[test]
    fn test_builtin_jobs_are_constructible() {
        let container = DelegateContainer::with_builtin_jobs(Arc::new(LoggingJobRunner));

        for type_id in [TASK_JOB, REPORT_JOB, NOTIFICATION_JOB, SYSTEM_LOAD_REPORTER_JOB] {
            let delegate = container.create_autowired(type_id).unwrap();
            assert_eq!(delegate.kind(), type_id);
        }
    }

    #[test]
    fn test_unknown_type_fails_creation() {
        let container = DelegateContainer::new();
        let err = container.create_autowired("Nope").err().unwrap();
        assert!(err.is_transient());
    }
}
