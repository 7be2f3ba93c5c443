//! In-process scheduling engine.
//!
//! Stores jobs and triggers, fires one-shot triggers at their instant and any
//! stored job on demand. Cron triggers are recorded with their expression but
//! not evaluated here.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tokio::task::{AbortHandle, JoinSet};

use super::delegate::{DelegateTable, JobExecutionContext};
use super::engine::{JobDetail, SchedulingEngine, TriggerSpec};
use crate::lifecycle::{ShutdownPriority, ShutdownResult, WorkerPool};
use crate::types::{AppError, Schedule};
use crate::Result;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EngineSnapshot {
    pub jobs: BTreeMap<String, JobDetail>,
    pub triggers: BTreeMap<String, TriggerSpec>,
}

#[derive(Default)]
struct JobStore {
    jobs: BTreeMap<String, JobDetail>,
    triggers: BTreeMap<String, TriggerSpec>,
    timers: HashMap<String, AbortHandle>,
}

impl JobStore {
    fn remove_trigger(&mut self, trigger_name: &str) -> bool {
        if let Some(timer) = self.timers.remove(trigger_name) {
            timer.abort();
        }
        self.triggers.remove(trigger_name).is_some()
    }
}

struct EngineInner {
    instance_id: String,
    delegates: Arc<DelegateTable>,
    store: Mutex<JobStore>,
    executing: std::sync::Mutex<HashMap<String, usize>>,
    executions: Mutex<JoinSet<()>>,
    standby: AtomicBool,
    shut_down: AtomicBool,
    completed: AtomicUsize,
}

/// Marks a job as executing for as long as it lives.
struct ExecutionGuard {
    inner: Arc<EngineInner>,
    job_name: String,
}

impl ExecutionGuard {
    fn enter(inner: Arc<EngineInner>, job_name: &str) -> Self {
        *inner
            .executing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(job_name.to_string())
            .or_default() += 1;
        Self {
            inner,
            job_name: job_name.to_string(),
        }
    }
}

impl Drop for ExecutionGuard {
    fn drop(&mut self) {
        let mut executing = self
            .inner
            .executing
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        if let Some(count) = executing.get_mut(&self.job_name) {
            *count -= 1;
            if *count == 0 {
                executing.remove(&self.job_name);
            }
        }
        self.inner.completed.fetch_add(1, Ordering::Relaxed);
    }
}

impl EngineInner {
    async fn start_execution(self: &Arc<Self>, job_name: &str) -> Result<()> {
        if self.shut_down.load(Ordering::Acquire) {
            return Err(AppError::SchedulerShutdown);
        }
        if self.standby.load(Ordering::Acquire) {
            return Err(AppError::Scheduler(format!(
                "instance {} is in standby",
                self.instance_id
            )));
        }

        let detail = self
            .store
            .lock()
            .await
            .jobs
            .get(job_name)
            .cloned()
            .ok_or_else(|| AppError::JobNotFound(job_name.to_string()))?;
        let delegate = self.delegates.get(job_name).await.ok_or_else(|| {
            AppError::ComponentUnavailable(format!("no published delegate for {}", job_name))
        })?;

        let guard = ExecutionGuard::enter(self.clone(), job_name);
        let ctx = JobExecutionContext {
            job_name: detail.name,
            data: detail.data,
            fired_at: Utc::now(),
        };

        let mut executions = self.executions.lock().await;
        while executions.try_join_next().is_some() {}
        executions.spawn(async move {
            let _guard = guard;
            tracing::debug!(job = %ctx.job_name, domain = %ctx.data.domain, "Job started");
            match delegate.execute(&ctx).await {
                Ok(()) => tracing::debug!(job = %ctx.job_name, "Job finished"),
                Err(e) => tracing::error!(job = %ctx.job_name, error = %e, "Job failed"),
            }
        });

        Ok(())
    }

    async fn fire_trigger(self: &Arc<Self>, trigger_name: &str) {
        let job_name = {
            let mut store = self.store.lock().await;
            store.timers.remove(trigger_name);
            // One-shot triggers are spent once fired; the job stays stored.
            match store.triggers.remove(trigger_name) {
                Some(trigger) => trigger.job_name,
                None => return,
            }
        };

        if let Err(e) = self.start_execution(&job_name).await {
            tracing::warn!(job = %job_name, trigger = trigger_name, error = %e, "Trigger misfired");
        }
    }
}

async fn drain(executions: &mut JoinSet<()>) -> usize {
    let mut joined = 0;
    while let Some(result) = executions.join_next().await {
        if let Err(e) = result {
            tracing::warn!(error = %e, "Job execution panicked or was aborted");
        }
        joined += 1;
    }
    joined
}

#[derive(Clone)]
pub struct InMemoryEngine {
    inner: Arc<EngineInner>,
}

impl InMemoryEngine {
    pub fn new(instance_id: impl Into<String>, delegates: Arc<DelegateTable>) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                instance_id: instance_id.into(),
                delegates,
                store: Mutex::new(JobStore::default()),
                executing: std::sync::Mutex::new(HashMap::new()),
                executions: Mutex::new(JoinSet::new()),
                standby: AtomicBool::new(false),
                shut_down: AtomicBool::new(false),
                completed: AtomicUsize::new(0),
            }),
        }
    }

    /// Fires a stored job now, whatever its triggers.
    pub async fn fire(&self, job_name: &str) -> Result<()> {
        self.inner.start_execution(job_name).await
    }

    pub async fn snapshot(&self) -> EngineSnapshot {
        let store = self.inner.store.lock().await;
        EngineSnapshot {
            jobs: store.jobs.clone(),
            triggers: store.triggers.clone(),
        }
    }

    pub async fn trigger_count(&self) -> usize {
        self.inner.store.lock().await.triggers.len()
    }

    pub fn is_standby(&self) -> bool {
        self.inner.standby.load(Ordering::Acquire)
    }

    pub fn completed_executions(&self) -> usize {
        self.inner.completed.load(Ordering::Relaxed)
    }

    fn ensure_running(&self) -> Result<()> {
        if self.inner.shut_down.load(Ordering::Acquire) {
            return Err(AppError::SchedulerShutdown);
        }
        Ok(())
    }

    fn arm_one_shot(&self, store: &mut JobStore, trigger: &TriggerSpec) {
        let Schedule::OneShot { at } = &trigger.schedule else {
            return;
        };

        let delay = (*at - Utc::now()).to_std().unwrap_or(Duration::ZERO);
        let inner = Arc::clone(&self.inner);
        let trigger_name = trigger.name.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            inner.fire_trigger(&trigger_name).await;
        });
        store
            .timers
            .insert(trigger.name.clone(), handle.abort_handle());
    }
}

#[async_trait]
impl SchedulingEngine for InMemoryEngine {
    fn instance_id(&self) -> String {
        self.inner.instance_id.clone()
    }

    async fn add_job(&self, job: JobDetail, replace: bool) -> Result<()> {
        self.ensure_running()?;
        let mut store = self.inner.store.lock().await;
        if !replace && store.jobs.contains_key(&job.name) {
            return Err(AppError::Scheduler(format!("job {} already exists", job.name)));
        }
        store.jobs.insert(job.name.clone(), job);
        Ok(())
    }

    async fn schedule_job(&self, job: JobDetail, trigger: TriggerSpec) -> Result<()> {
        self.ensure_running()?;
        if trigger.job_name != job.name {
            return Err(AppError::InvalidJob(format!(
                "trigger {} targets {} instead of {}",
                trigger.name, trigger.job_name, job.name
            )));
        }
        if trigger.schedule.is_durable() {
            return Err(AppError::InvalidJob(format!(
                "trigger {} has no schedule",
                trigger.name
            )));
        }

        let mut store = self.inner.store.lock().await;
        if store.jobs.contains_key(&job.name) {
            return Err(AppError::Scheduler(format!("job {} already exists", job.name)));
        }
        if store.triggers.contains_key(&trigger.name) {
            return Err(AppError::Scheduler(format!(
                "trigger {} already exists",
                trigger.name
            )));
        }

        self.arm_one_shot(&mut store, &trigger);
        store.jobs.insert(job.name.clone(), job);
        store.triggers.insert(trigger.name.clone(), trigger);
        Ok(())
    }

    async fn unschedule_job(&self, trigger_name: &str) -> Result<bool> {
        Ok(self.inner.store.lock().await.remove_trigger(trigger_name))
    }

    async fn delete_job(&self, job_name: &str) -> Result<bool> {
        let mut store = self.inner.store.lock().await;
        let attached: Vec<String> = store
            .triggers
            .values()
            .filter(|t| t.job_name == job_name)
            .map(|t| t.name.clone())
            .collect();
        for trigger_name in attached {
            store.remove_trigger(&trigger_name);
        }
        Ok(store.jobs.remove(job_name).is_some())
    }

    async fn currently_executing(&self) -> Result<Vec<String>> {
        let executing = self
            .inner
            .executing
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        let mut names: Vec<String> = executing.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn job(&self, job_name: &str) -> Result<Option<JobDetail>> {
        Ok(self.inner.store.lock().await.jobs.get(job_name).cloned())
    }

    async fn triggers_of(&self, job_name: &str) -> Result<Vec<TriggerSpec>> {
        Ok(self
            .inner
            .store
            .lock()
            .await
            .triggers
            .values()
            .filter(|t| t.job_name == job_name)
            .cloned()
            .collect())
    }

    async fn standby(&self) -> Result<()> {
        self.inner.standby.store(true, Ordering::Release);
        tracing::info!(instance = %self.inner.instance_id, "Scheduling engine in standby");
        Ok(())
    }
}

#[async_trait]
impl WorkerPool for InMemoryEngine {
    fn name(&self) -> &'static str {
        "scheduling_engine"
    }

    fn shutdown_priority(&self) -> ShutdownPriority {
        ShutdownPriority::First
    }

    async fn shutdown(&self, timeout: Duration) -> Result<ShutdownResult> {
        self.inner.shut_down.store(true, Ordering::Release);
        {
            let mut store = self.inner.store.lock().await;
            for (_, timer) in store.timers.drain() {
                timer.abort();
            }
        }

        let mut executions = self.inner.executions.lock().await;
        let in_flight = executions.len();
        tracing::info!(in_flight, "Waiting for running jobs");

        match tokio::time::timeout(timeout, drain(&mut executions)).await {
            Ok(joined) => Ok(ShutdownResult::Complete {
                items_processed: joined,
            }),
            Err(_) => {
                let remaining = executions.len();
                executions.abort_all();
                Ok(ShutdownResult::Partial { remaining })
            }
        }
    }
}
