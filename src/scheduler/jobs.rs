//! Built-in job types the container knows how to construct.

use std::sync::Arc;

use async_trait::async_trait;

use super::delegate::{JobDelegate, JobExecutionContext};
use crate::types::{AppError, TenantDomain};
use crate::Result;

pub const TASK_JOB: &str = "TaskJob";
pub const REPORT_JOB: &str = "ReportJob";
pub const NOTIFICATION_JOB: &str = "NotificationJob";
pub const SYSTEM_LOAD_REPORTER_JOB: &str = "SystemLoadReporterJob";

/// Provisioning-side work the built-in jobs hand off to.
#[async_trait]
pub trait JobRunner: Send + Sync {
    async fn run_task(
        &self,
        domain: &TenantDomain,
        task_key: &str,
        delegate_implementation: &str,
        executor: &str,
    ) -> Result<()>;

    async fn run_report(
        &self,
        domain: &TenantDomain,
        report_key: &str,
        delegate_implementation: Option<&str>,
        executor: &str,
    ) -> Result<()>;

    async fn dispatch_notifications(&self) -> Result<usize>;

    async fn report_system_load(&self) -> Result<()>;
}

/// Runner that only logs what would be executed.
#[derive(Debug, Default)]
pub struct LoggingJobRunner;

#[async_trait]
impl JobRunner for LoggingJobRunner {
    async fn run_task(
        &self,
        domain: &TenantDomain,
        task_key: &str,
        delegate_implementation: &str,
        executor: &str,
    ) -> Result<()> {
        tracing::info!(%domain, task_key, delegate_implementation, executor, "Running task");
        Ok(())
    }

    async fn run_report(
        &self,
        domain: &TenantDomain,
        report_key: &str,
        delegate_implementation: Option<&str>,
        executor: &str,
    ) -> Result<()> {
        tracing::info!(%domain, report_key, ?delegate_implementation, executor, "Running report");
        Ok(())
    }

    async fn dispatch_notifications(&self) -> Result<usize> {
        tracing::debug!("Dispatching pending notifications");
        Ok(0)
    }

    async fn report_system_load(&self) -> Result<()> {
        let cpus = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        tracing::debug!(cpus, "System load report");
        Ok(())
    }
}

pub struct TaskJob {
    runner: Arc<dyn JobRunner>,
}

impl TaskJob {
    pub fn new(runner: Arc<dyn JobRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl JobDelegate for TaskJob {
    fn kind(&self) -> &'static str {
        TASK_JOB
    }

    async fn execute(&self, ctx: &JobExecutionContext) -> Result<()> {
        if !ctx.data.is_active() {
            tracing::info!(job = %ctx.job_name, "Task not active, skipping");
            return Ok(());
        }
        let task_key = ctx
            .data
            .task_key
            .as_deref()
            .ok_or_else(|| AppError::InvalidJob(format!("{} has no task key", ctx.job_name)))?;
        let delegate = ctx.data.delegate_implementation.as_deref().ok_or_else(|| {
            AppError::InvalidJob(format!("{} has no delegate implementation", ctx.job_name))
        })?;

        let mut attempt = 0;
        loop {
            match self
                .runner
                .run_task(&ctx.data.domain, task_key, delegate, &ctx.data.executor)
                .await
            {
                Ok(()) => return Ok(()),
                Err(e) if e.is_transient() && attempt < ctx.data.interrupt_max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        job = %ctx.job_name,
                        attempt,
                        max = ctx.data.interrupt_max_retries,
                        error = %e,
                        "Task execution interrupted, retrying"
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }
}

pub struct ReportJob {
    runner: Arc<dyn JobRunner>,
}

impl ReportJob {
    pub fn new(runner: Arc<dyn JobRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl JobDelegate for ReportJob {
    fn kind(&self) -> &'static str {
        REPORT_JOB
    }

    async fn execute(&self, ctx: &JobExecutionContext) -> Result<()> {
        if !ctx.data.is_active() {
            tracing::info!(job = %ctx.job_name, "Report not active, skipping");
            return Ok(());
        }
        let report_key = ctx
            .data
            .report_key
            .as_deref()
            .ok_or_else(|| AppError::InvalidJob(format!("{} has no report key", ctx.job_name)))?;

        self.runner
            .run_report(
                &ctx.data.domain,
                report_key,
                ctx.data.delegate_implementation.as_deref(),
                &ctx.data.executor,
            )
            .await
    }
}

pub struct NotificationJob {
    runner: Arc<dyn JobRunner>,
}

impl NotificationJob {
    pub fn new(runner: Arc<dyn JobRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl JobDelegate for NotificationJob {
    fn kind(&self) -> &'static str {
        NOTIFICATION_JOB
    }

    async fn execute(&self, _ctx: &JobExecutionContext) -> Result<()> {
        let sent = self.runner.dispatch_notifications().await?;
        if sent > 0 {
            tracing::info!(sent, "Notifications dispatched");
        }
        Ok(())
    }
}

pub struct SystemLoadReporterJob {
    runner: Arc<dyn JobRunner>,
}

impl SystemLoadReporterJob {
    pub fn new(runner: Arc<dyn JobRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl JobDelegate for SystemLoadReporterJob {
    fn kind(&self) -> &'static str {
        SYSTEM_LOAD_REPORTER_JOB
    }

    async fn execute(&self, _ctx: &JobExecutionContext) -> Result<()> {
        self.runner.report_system_load().await
    }
}
