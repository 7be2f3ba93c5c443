use std::future::pending;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::container::{ComponentContainer, DelegateContainer, DynamicComponentFactory, RetryPolicy};
use crate::context::RuntimeContext;
use crate::extension::{ExtensionRegistry, BUILTIN_EXTENSIONS};
use crate::lifecycle::{BootstrapComponent, ShutdownPriority, ShutdownResult, WorkerPool};
use crate::scheduler::jobs::{JobRunner, LoggingJobRunner};
use crate::scheduler::{
    DelegateTable, DomainFixture, FixtureSource, InMemoryEngine, JobDelegate,
    JobExecutionContext, MultiTenantJobScheduler,
};
use crate::types::{AppError, Report, SchedTask, TenantDomain};
use crate::Result;

pub fn random_key() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

pub fn master_context() -> RuntimeContext {
    RuntimeContext::master(Arc::new(ExtensionRegistry::discover(BUILTIN_EXTENSIONS)))
}

/// Ordered record of lifecycle calls shared by test doubles.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

pub struct RecordingComponent {
    name: &'static str,
    priority: i32,
    log: CallLog,
    fail_init: bool,
    fail_teardown: bool,
}

impl RecordingComponent {
    pub fn new(name: &'static str, priority: i32, log: &CallLog) -> Self {
        Self {
            name,
            priority,
            log: log.clone(),
            fail_init: false,
            fail_teardown: false,
        }
    }

    pub fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    pub fn failing_teardown(mut self) -> Self {
        self.fail_teardown = true;
        self
    }
}

#[async_trait]
impl BootstrapComponent for RecordingComponent {
    fn name(&self) -> &'static str {
        self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    async fn init(&self) -> Result<()> {
        self.log.push(format!("init:{}", self.name));
        if self.fail_init {
            return Err(AppError::Internal(format!("{} refused to start", self.name)));
        }
        Ok(())
    }

    async fn teardown(&self) -> Result<()> {
        self.log.push(format!("teardown:{}", self.name));
        if self.fail_teardown {
            return Err(AppError::Internal(format!("{} refused to stop", self.name)));
        }
        Ok(())
    }
}

pub struct RecordingPool {
    name: &'static str,
    log: CallLog,
    priority: ShutdownPriority,
    failing: bool,
    hanging: bool,
}

impl RecordingPool {
    pub fn new(name: &'static str, log: &CallLog) -> Self {
        Self {
            name,
            log: log.clone(),
            priority: ShutdownPriority::default(),
            failing: false,
            hanging: false,
        }
    }

    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn hanging(mut self) -> Self {
        self.hanging = true;
        self
    }

    pub fn with_priority(mut self, priority: ShutdownPriority) -> Self {
        self.priority = priority;
        self
    }
}

#[async_trait]
impl WorkerPool for RecordingPool {
    fn name(&self) -> &'static str {
        self.name
    }

    fn shutdown_priority(&self) -> ShutdownPriority {
        self.priority
    }

    async fn shutdown(&self, _timeout: Duration) -> Result<ShutdownResult> {
        self.log.push(format!("shutdown:{}", self.name));
        if self.hanging {
            pending::<()>().await;
        }
        if self.failing {
            return Err(AppError::Internal(format!("{} failed to stop", self.name)));
        }
        Ok(ShutdownResult::Complete { items_processed: 0 })
    }
}

#[derive(Default)]
pub struct CountingDelegate {
    runs: AtomicUsize,
}

impl CountingDelegate {
    pub fn count(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobDelegate for CountingDelegate {
    fn kind(&self) -> &'static str {
        "Counting"
    }

    async fn execute(&self, _ctx: &JobExecutionContext) -> Result<()> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Delegate that stays executing until released.
pub struct BlockingDelegate {
    gate: Semaphore,
}

impl BlockingDelegate {
    pub fn new() -> Self {
        Self {
            gate: Semaphore::new(0),
        }
    }

    pub fn release(&self) {
        self.gate.add_permits(1);
    }
}

#[async_trait]
impl JobDelegate for BlockingDelegate {
    fn kind(&self) -> &'static str {
        "Blocking"
    }

    async fn execute(&self, _ctx: &JobExecutionContext) -> Result<()> {
        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;
        Ok(())
    }
}

/// Container whose first `n` constructions fail.
pub struct FlakyContainer {
    failures: usize,
    attempts: AtomicUsize,
}

impl FlakyContainer {
    pub fn failing(failures: usize) -> Self {
        Self {
            failures,
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl ComponentContainer for FlakyContainer {
    fn create_autowired(&self, type_id: &str) -> Result<Arc<dyn JobDelegate>> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.failures {
            return Err(AppError::ComponentCreation(format!(
                "{} not ready (attempt {})",
                type_id, attempt
            )));
        }
        Ok(Arc::new(CountingDelegate::default()))
    }
}

/// Runner whose first `n` task runs fail with a transient error.
#[derive(Default)]
pub struct ScriptedRunner {
    task_failures: usize,
    tasks: AtomicUsize,
    reports: AtomicUsize,
}

impl ScriptedRunner {
    pub fn failing_tasks(failures: usize) -> Self {
        Self {
            task_failures: failures,
            ..Default::default()
        }
    }

    pub fn task_calls(&self) -> usize {
        self.tasks.load(Ordering::SeqCst)
    }

    pub fn report_calls(&self) -> usize {
        self.reports.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobRunner for ScriptedRunner {
    async fn run_task(
        &self,
        _domain: &TenantDomain,
        task_key: &str,
        _delegate_implementation: &str,
        _executor: &str,
    ) -> Result<()> {
        let call = self.tasks.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= self.task_failures {
            return Err(AppError::Scheduler(format!("{} interrupted", task_key)));
        }
        Ok(())
    }

    async fn run_report(
        &self,
        _domain: &TenantDomain,
        _report_key: &str,
        _delegate_implementation: Option<&str>,
        _executor: &str,
    ) -> Result<()> {
        self.reports.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn dispatch_notifications(&self) -> Result<usize> {
        Ok(0)
    }

    async fn report_system_load(&self) -> Result<()> {
        Ok(())
    }
}

/// Scheduler wired to an in-memory engine and the built-in job types.
pub struct TestScheduler {
    pub scheduler: Arc<MultiTenantJobScheduler>,
    pub engine: InMemoryEngine,
    pub delegates: Arc<DelegateTable>,
    pub registry: Arc<ExtensionRegistry>,
}

impl TestScheduler {
    pub fn new() -> Self {
        let registry = Arc::new(ExtensionRegistry::discover(BUILTIN_EXTENSIONS));
        let delegates = Arc::new(DelegateTable::new());
        let engine = InMemoryEngine::new(format!("test-{}", random_key()), delegates.clone());
        let container = DelegateContainer::with_builtin_jobs(Arc::new(LoggingJobRunner));
        let factory = DynamicComponentFactory::new(
            Arc::new(container),
            RetryPolicy {
                max_attempts: 2,
                backoff: Duration::from_millis(10),
            },
        );
        let scheduler = Arc::new(MultiTenantJobScheduler::new(
            Arc::new(engine.clone()),
            factory,
            delegates.clone(),
            "admin",
        ));

        Self {
            scheduler,
            engine,
            delegates,
            registry,
        }
    }

    pub fn context(&self, domain: &str) -> RuntimeContext {
        RuntimeContext::new(self.registry.clone(), TenantDomain::new(domain))
    }
}

#[derive(Default)]
pub struct FixtureBuilder {
    source: FixtureSource,
}

impl FixtureBuilder {
    fn entry(&mut self, domain: &str) -> &mut DomainFixture {
        self.source
            .domains
            .entry(TenantDomain::new(domain))
            .or_default()
    }

    pub fn domain(mut self, domain: &str) -> Self {
        self.entry(domain);
        self
    }

    pub fn task(mut self, domain: &str, task: SchedTask) -> Self {
        self.entry(domain).tasks.push(task);
        self
    }

    pub fn report(mut self, domain: &str, report: Report) -> Self {
        self.entry(domain).reports.push(report);
        self
    }

    pub fn build(self) -> FixtureSource {
        self.source
    }
}
