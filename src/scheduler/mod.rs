//! Multi-tenant job scheduling on top of a pluggable engine.

mod delegate;
mod engine;
mod fixture;
pub mod jobs;
mod loader;
mod manager;
mod memory;
mod source;

pub use delegate::{DelegateTable, JobDelegate, JobExecutionContext};
pub use engine::{JobDetail, SchedulingEngine, TriggerSpec};
pub use fixture::{DomainFixture, FixtureConf, FixtureSource};
pub use loader::SchedulerLoader;
pub use manager::{JobStatus, MultiTenantJobScheduler, Registration, ReloadSummary};
pub use memory::{EngineSnapshot, InMemoryEngine};
pub use source::{
    SchedulingConf, SchedulingSource, DEFAULT_NOTIFICATION_CRON, SYSTEM_LOAD_REPORTER_CRON,
};
