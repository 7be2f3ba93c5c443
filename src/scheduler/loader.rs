use std::sync::Arc;

use async_trait::async_trait;

use super::manager::MultiTenantJobScheduler;
use super::source::{SchedulingConf, SchedulingSource};
use crate::extension::RegistryHandle;
use crate::lifecycle::{BootstrapComponent, SCHEDULER_LOADER_PRIORITY};
use crate::types::AppError;
use crate::Result;

/// Reconciles the scheduler with persistence at boot and clears it at
/// shutdown.
pub struct SchedulerLoader {
    scheduler: Arc<MultiTenantJobScheduler>,
    registry: RegistryHandle,
    source: Arc<dyn SchedulingSource>,
    disabled: bool,
    report_system_load: bool,
}

impl SchedulerLoader {
    pub fn new(
        scheduler: Arc<MultiTenantJobScheduler>,
        registry: RegistryHandle,
        source: Arc<dyn SchedulingSource>,
    ) -> Self {
        Self {
            scheduler,
            registry,
            source,
            disabled: false,
            report_system_load: true,
        }
    }

    /// Puts the engine in standby instead of loading jobs.
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn report_system_load(mut self, enabled: bool) -> Self {
        self.report_system_load = enabled;
        self
    }
}

#[async_trait]
impl BootstrapComponent for SchedulerLoader {
    fn name(&self) -> &'static str {
        "job_scheduler"
    }

    fn priority(&self) -> i32 {
        SCHEDULER_LOADER_PRIORITY
    }

    async fn init(&self) -> Result<()> {
        let registry = self.registry.get().ok_or_else(|| {
            AppError::Internal("extension registry not published before scheduler".to_string())
        })?;

        if self.disabled {
            tracing::info!("Scheduler disabled on this instance, entering standby");
            return self.scheduler.standby().await;
        }

        let mut conf = SchedulingConf::load(self.source.as_ref()).await?;
        conf.report_system_load = self.report_system_load;
        let domains = self.source.domains().await?;

        self.scheduler
            .reload_all(registry, &domains, self.source.as_ref(), &conf)
            .await;
        Ok(())
    }

    async fn teardown(&self) -> Result<()> {
        let removed = self.scheduler.unregister_all().await;
        tracing::info!(removed, "Scheduler jobs unregistered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::{ExtensionRegistry, BUILTIN_EXTENSIONS};
    use crate::scheduler::SchedulingEngine;
    use crate::test_utils::{FixtureBuilder, TestScheduler};
    use crate::types::{SchedTask, TaskKind};

    fn loader(t: &TestScheduler, handle: RegistryHandle) -> SchedulerLoader {
        let source = FixtureBuilder::default()
            .task("Master", SchedTask::new("p1", TaskKind::Pull).with_cron("0 0 * * * ?"))
            .build();
        SchedulerLoader::new(t.scheduler.clone(), handle, Arc::new(source))
    }

    #[tokio::test]
    async fn test_init_requires_published_registry() {
        let t = TestScheduler::new();
        let err = loader(&t, RegistryHandle::new()).init().await.unwrap_err();
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_init_loads_and_teardown_clears() {
        let t = TestScheduler::new();
        let handle = RegistryHandle::new();
        handle
            .publish(ExtensionRegistry::discover(BUILTIN_EXTENSIONS))
            .unwrap();
        let loader = loader(&t, handle);

        loader.init().await.unwrap();
        assert!(t.engine.job("taskJobp1").await.unwrap().is_some());
        assert_eq!(t.scheduler.registered_jobs().await.len(), 3);

        loader.teardown().await.unwrap();
        assert!(t.scheduler.registered_jobs().await.is_empty());
    }

    #[tokio::test]
    async fn test_disabled_loader_puts_engine_in_standby() {
        let t = TestScheduler::new();
        let handle = RegistryHandle::new();
        handle
            .publish(ExtensionRegistry::discover(BUILTIN_EXTENSIONS))
            .unwrap();

        loader(&t, handle).disabled(true).init().await.unwrap();

        assert!(t.engine.is_standby());
        assert!(t.scheduler.registered_jobs().await.is_empty());
    }
}
