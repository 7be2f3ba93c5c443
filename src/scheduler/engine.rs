//! Scheduling engine collaborator contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{JobData, Schedule};
use crate::Result;

/// A job as stored by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDetail {
    pub name: String,
    pub delegate_type: String,
    pub data: JobData,
    /// Durable jobs stay stored without any trigger.
    pub durable: bool,
}

/// A trigger attached to one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerSpec {
    pub name: String,
    pub job_name: String,
    pub schedule: Schedule,
    /// First instant the trigger may fire.
    pub start_at: DateTime<Utc>,
}

impl TriggerSpec {
    pub fn is_recurring(&self) -> bool {
        self.schedule.cron_expression().is_some()
    }
}

#[async_trait]
pub trait SchedulingEngine: Send + Sync {
    fn instance_id(&self) -> String;

    /// Stores a job with no trigger.
    async fn add_job(&self, job: JobDetail, replace: bool) -> Result<()>;

    /// Stores a job together with its trigger.
    async fn schedule_job(&self, job: JobDetail, trigger: TriggerSpec) -> Result<()>;

    /// Returns whether a trigger was removed.
    async fn unschedule_job(&self, trigger_name: &str) -> Result<bool>;

    /// Returns whether a job was removed.
    async fn delete_job(&self, job_name: &str) -> Result<bool>;

    /// Names of jobs executing on this instance right now.
    async fn currently_executing(&self) -> Result<Vec<String>>;

    /// Whether another clustered instance is executing the job.
    async fn is_running_elsewhere(&self, _job_name: &str) -> Result<bool> {
        Ok(false)
    }

    async fn job(&self, job_name: &str) -> Result<Option<JobDetail>>;

    async fn triggers_of(&self, job_name: &str) -> Result<Vec<TriggerSpec>>;

    /// Stops firing triggers on this instance.
    async fn standby(&self) -> Result<()>;
}
