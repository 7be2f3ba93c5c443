use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::instrument;

use super::delegate::DelegateTable;
use super::engine::{JobDetail, SchedulingEngine, TriggerSpec};
use super::jobs::{NOTIFICATION_JOB, REPORT_JOB, SYSTEM_LOAD_REPORTER_JOB, TASK_JOB};
use super::source::{SchedulingConf, SchedulingSource, SYSTEM_LOAD_REPORTER_CRON};
use crate::container::DynamicComponentFactory;
use crate::context::RuntimeContext;
use crate::extension::builtin::{
    LIVE_SYNC_JOB_DELEGATE, MACRO_JOB_DELEGATE, PULL_JOB_DELEGATE, PUSH_JOB_DELEGATE,
};
use crate::extension::{CapabilityType, ExtensionRegistry};
use crate::types::{
    report_job_name, task_job_name, trigger_name, AppError, JobData, JobDefinition, Report,
    Schedule, SchedTask, TaskKind, TenantDomain, NOTIFICATION_JOB_NAME,
    SYSTEM_LOAD_REPORTER_JOB_NAME,
};
use crate::Result;

/// Outcome of a successful registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Scheduled,
    /// The job was executing; nothing was touched.
    AlreadyRunning,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReloadSummary {
    pub registered: usize,
    pub already_running: usize,
    pub failed: usize,
}

impl ReloadSummary {
    fn record(&mut self, outcome: &Result<Registration>) {
        match outcome {
            Ok(Registration::Scheduled) => self.registered += 1,
            Ok(Registration::AlreadyRunning) => self.already_running += 1,
            Err(_) => self.failed += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobStatus {
    pub name: String,
    pub registered: bool,
    /// `Durable` when registered without a trigger.
    pub schedule: Option<Schedule>,
    pub running: bool,
}

/// Keeps the scheduling engine in step with the tasks and reports of every
/// tenant domain.
///
/// Registration and unregistration are serialized by one critical section per
/// scheduler; job execution is not.
pub struct MultiTenantJobScheduler {
    engine: Arc<dyn SchedulingEngine>,
    factory: DynamicComponentFactory,
    delegates: Arc<DelegateTable>,
    registration: Mutex<()>,
    executor: String,
}

impl MultiTenantJobScheduler {
    pub fn new(
        engine: Arc<dyn SchedulingEngine>,
        factory: DynamicComponentFactory,
        delegates: Arc<DelegateTable>,
        executor: impl Into<String>,
    ) -> Self {
        Self {
            engine,
            factory,
            delegates,
            registration: Mutex::new(()),
            executor: executor.into(),
        }
    }

    pub fn executor(&self) -> &str {
        &self.executor
    }

    pub fn delegates(&self) -> &Arc<DelegateTable> {
        &self.delegates
    }

    /// Executing locally, or on another node per the engine.
    pub async fn is_running(&self, job_name: &str) -> Result<bool> {
        if self
            .engine
            .currently_executing()
            .await?
            .iter()
            .any(|name| name == job_name)
        {
            return Ok(true);
        }
        self.engine.is_running_elsewhere(job_name).await
    }

    #[instrument(skip(self, ctx, definition), fields(domain = %ctx.domain(), job = %definition.name))]
    pub async fn register_job(
        &self,
        ctx: &RuntimeContext,
        mut definition: JobDefinition,
    ) -> Result<Registration> {
        let _section = self.registration.lock().await;

        if self.is_running(&definition.name).await? {
            tracing::debug!("Job already running, not registering");
            return Ok(Registration::AlreadyRunning);
        }

        self.unregister_locked(&definition.name).await;

        let delegate = self.factory.create(&definition.delegate_type).await?;
        self.delegates.publish(&definition.name, delegate).await;

        definition.data.domain = ctx.domain().clone();
        let schedule = definition.schedule();
        let detail = JobDetail {
            name: definition.name.clone(),
            delegate_type: definition.delegate_type.clone(),
            data: definition.data,
            durable: schedule.is_durable(),
        };

        let scheduled = if schedule.is_durable() {
            self.engine.add_job(detail, true).await
        } else {
            let trigger = TriggerSpec {
                name: trigger_name(&definition.name),
                job_name: definition.name.clone(),
                start_at: definition.start_at.unwrap_or_else(Utc::now),
                schedule,
            };
            self.engine.schedule_job(detail, trigger).await
        };

        if let Err(e) = scheduled {
            self.delegates.remove(&definition.name).await;
            return Err(e);
        }

        tracing::info!("Job registered");
        Ok(Registration::Scheduled)
    }

    /// Returns whether anything was removed.
    pub async fn unregister_job(&self, job_name: &str) -> bool {
        let _section = self.registration.lock().await;
        self.unregister_locked(job_name).await
    }

    async fn unregister_locked(&self, job_name: &str) -> bool {
        let unscheduled = match self.engine.unschedule_job(&trigger_name(job_name)).await {
            Ok(removed) => removed,
            Err(e) => {
                tracing::warn!(job = job_name, error = %e, "Could not remove trigger");
                false
            }
        };
        let deleted = match self.engine.delete_job(job_name).await {
            Ok(removed) => removed,
            Err(e) => {
                tracing::warn!(job = job_name, error = %e, "Could not remove job");
                false
            }
        };
        let unpublished = self.delegates.remove(job_name).await;

        if unscheduled || deleted || unpublished {
            tracing::debug!(job = job_name, "Job unregistered");
        }
        unscheduled || deleted || unpublished
    }

    pub async fn register_task(
        &self,
        ctx: &RuntimeContext,
        task: &SchedTask,
        start_at: Option<DateTime<Utc>>,
        interrupt_max_retries: u64,
    ) -> Result<Registration> {
        let delegate = task_delegate(ctx.registry(), task)?;

        let mut data = JobData::new(ctx.domain().clone(), &self.executor, interrupt_max_retries);
        data.task_key = Some(task.key.clone());
        data.delegate_implementation = Some(delegate);
        data.set_active(task.active);

        let definition = JobDefinition::new(task_job_name(&task.key), TASK_JOB, data)
            .with_cron(task.cron_expression.clone())
            .with_start_at(start_at);
        self.register_job(ctx, definition).await
    }

    pub async fn register_report(
        &self,
        ctx: &RuntimeContext,
        report: &Report,
        start_at: Option<DateTime<Utc>>,
        interrupt_max_retries: u64,
    ) -> Result<Registration> {
        let delegate = match report.conf_type.as_deref() {
            Some(conf_type) => Some(
                ctx.registry()
                    .resolve_for(conf_type)
                    .map(str::to_string)
                    .ok_or_else(|| {
                        AppError::InvalidJob(format!(
                            "no report delegate for configuration {}",
                            conf_type
                        ))
                    })?,
            ),
            None => None,
        };

        let mut data = JobData::new(ctx.domain().clone(), &self.executor, interrupt_max_retries);
        data.report_key = Some(report.key.clone());
        data.delegate_implementation = delegate;
        data.set_active(report.active);

        let definition = JobDefinition::new(report_job_name(&report.key), REPORT_JOB, data)
            .with_cron(report.cron_expression.clone())
            .with_start_at(start_at);
        self.register_job(ctx, definition).await
    }

    pub async fn unregister_task(&self, task_key: &str) -> bool {
        self.unregister_job(&task_job_name(task_key)).await
    }

    pub async fn unregister_report(&self, report_key: &str) -> bool {
        self.unregister_job(&report_job_name(report_key)).await
    }

    /// Unregisters every task and report job of the context's domain.
    pub async fn unload_domain(&self, ctx: &RuntimeContext, source: &dyn SchedulingSource) -> usize {
        let domain = ctx.domain();
        let mut removed = 0;

        match source.tasks(domain).await {
            Ok(tasks) => {
                for task in &tasks {
                    if self.unregister_task(&task.key).await {
                        removed += 1;
                    }
                }
            }
            Err(e) => tracing::error!(%domain, error = %e, "Could not list tasks to unload"),
        }
        match source.reports(domain).await {
            Ok(reports) => {
                for report in &reports {
                    if self.unregister_report(&report.key).await {
                        removed += 1;
                    }
                }
            }
            Err(e) => tracing::error!(%domain, error = %e, "Could not list reports to unload"),
        }

        tracing::info!(%domain, removed, "Domain unloaded");
        removed
    }

    pub async fn unregister_all(&self) -> usize {
        let mut removed = 0;
        for name in self.delegates.names().await {
            if self.unregister_job(&name).await {
                removed += 1;
            }
        }
        removed
    }

    /// Registers every task and report of every domain, then the process-wide
    /// jobs. Item failures are logged and skipped.
    pub async fn reload_all(
        &self,
        registry: Arc<ExtensionRegistry>,
        domains: &[TenantDomain],
        source: &dyn SchedulingSource,
        conf: &SchedulingConf,
    ) -> ReloadSummary {
        let mut summary = ReloadSummary::default();
        let master = RuntimeContext::master(registry);

        for domain in domains {
            let ctx = master.for_domain(domain.clone());

            match source.tasks(domain).await {
                Ok(tasks) => {
                    for task in &tasks {
                        let outcome = self
                            .register_task(&ctx, task, task.start_at, conf.interrupt_max_retries)
                            .await;
                        if let Err(e) = &outcome {
                            tracing::error!(%domain, task = %task.key, error = %e, "While loading job for task");
                        }
                        summary.record(&outcome);
                    }
                }
                Err(e) => {
                    summary.failed += 1;
                    tracing::error!(%domain, error = %e, "Could not list tasks");
                }
            }

            match source.reports(domain).await {
                Ok(reports) => {
                    for report in &reports {
                        let outcome = self
                            .register_report(&ctx, report, None, conf.interrupt_max_retries)
                            .await;
                        if let Err(e) = &outcome {
                            tracing::error!(%domain, report = %report.key, error = %e, "While loading job for report");
                        }
                        summary.record(&outcome);
                    }
                }
                Err(e) => {
                    summary.failed += 1;
                    tracing::error!(%domain, error = %e, "Could not list reports");
                }
            }
        }

        match conf.notification_cron.as_deref().map(str::trim) {
            Some(cron) if !cron.is_empty() => {
                let data = JobData::new(
                    master.domain().clone(),
                    &self.executor,
                    conf.interrupt_max_retries,
                );
                let definition =
                    JobDefinition::new(NOTIFICATION_JOB_NAME, NOTIFICATION_JOB, data)
                        .with_cron(Some(cron));
                let outcome = self.register_job(&master, definition).await;
                if let Err(e) = &outcome {
                    tracing::error!(error = %e, "While loading notification job");
                }
                summary.record(&outcome);
            }
            _ => tracing::debug!("No notification cron, not scheduling notifications"),
        }

        if conf.report_system_load {
            let data = JobData::new(
                master.domain().clone(),
                &self.executor,
                conf.interrupt_max_retries,
            );
            let definition =
                JobDefinition::new(SYSTEM_LOAD_REPORTER_JOB_NAME, SYSTEM_LOAD_REPORTER_JOB, data)
                    .with_cron(Some(SYSTEM_LOAD_REPORTER_CRON));
            let outcome = self.register_job(&master, definition).await;
            if let Err(e) = &outcome {
                tracing::error!(error = %e, "While loading system load reporter job");
            }
            summary.record(&outcome);
        }

        tracing::info!(
            registered = summary.registered,
            already_running = summary.already_running,
            failed = summary.failed,
            "Scheduler reload finished"
        );
        summary
    }

    pub async fn job_status(&self, job_name: &str) -> Result<JobStatus> {
        let registered = self.engine.job(job_name).await?.is_some();
        let schedule = if registered {
            let triggers = self.engine.triggers_of(job_name).await?;
            Some(
                triggers
                    .into_iter()
                    .next()
                    .map(|t| t.schedule)
                    .unwrap_or(Schedule::Durable),
            )
        } else {
            None
        };

        Ok(JobStatus {
            name: job_name.to_string(),
            registered,
            schedule,
            running: self.is_running(job_name).await?,
        })
    }

    pub async fn registered_jobs(&self) -> Vec<String> {
        self.delegates.names().await
    }

    pub async fn standby(&self) -> Result<()> {
        self.engine.standby().await
    }
}

/// Built-in delegates of the well-known task kinds win over a configured id.
fn task_delegate(registry: &ExtensionRegistry, task: &SchedTask) -> Result<String> {
    let builtin = match task.kind {
        TaskKind::Pull => Some(PULL_JOB_DELEGATE),
        TaskKind::Push => Some(PUSH_JOB_DELEGATE),
        TaskKind::LiveSync => Some(LIVE_SYNC_JOB_DELEGATE),
        TaskKind::Macro => Some(MACRO_JOB_DELEGATE),
        TaskKind::Scheduled => None,
    };

    if let Some(builtin) = builtin {
        if let Some(configured) = task.job_delegate.as_deref().filter(|c| *c != builtin) {
            tracing::debug!(task = %task.key, configured, builtin, "Using built-in delegate");
        }
        return Ok(builtin.to_string());
    }

    let configured = task
        .job_delegate
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::InvalidJob(format!("task {} has no job delegate", task.key)))?;
    if !registry.contains(CapabilityType::TaskJobDelegate, configured) {
        tracing::warn!(task = %task.key, delegate = configured, "Job delegate is not a known extension");
    }
    Ok(configured.to_string())
}
