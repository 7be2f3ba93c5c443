use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::TenantDomain;

/// Name of the process-wide notification dispatch job.
pub const NOTIFICATION_JOB_NAME: &str = "notificationJob";
/// Name of the process-wide system load reporter job.
pub const SYSTEM_LOAD_REPORTER_JOB_NAME: &str = "systemLoadReporterJob";

const TASK_JOB_PREFIX: &str = "taskJob";
const REPORT_JOB_PREFIX: &str = "reportJob";
const TRIGGER_PREFIX: &str = "Trigger_";
const ACTIVE_KEY: &str = "active";

pub fn task_job_name(task_key: &str) -> String {
    format!("{}{}", TASK_JOB_PREFIX, task_key)
}

pub fn report_job_name(report_key: &str) -> String {
    format!("{}{}", REPORT_JOB_PREFIX, report_key)
}

pub fn trigger_name(job_name: &str) -> String {
    format!("{}{}", TRIGGER_PREFIX, job_name)
}

/// Extracts the task key from a task job name.
pub fn task_key_of(job_name: &str) -> Option<&str> {
    job_name
        .strip_prefix(TASK_JOB_PREFIX)
        .filter(|key| !key.is_empty())
}

/// Extracts the report key from a report job name.
pub fn report_key_of(job_name: &str) -> Option<&str> {
    job_name
        .strip_prefix(REPORT_JOB_PREFIX)
        .filter(|key| !key.is_empty())
}

/// Data bag handed to a job delegate when it fires.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobData {
    pub domain: TenantDomain,

    pub executor: String,

    /// How many times an interrupted execution may be retried.
    pub interrupt_max_retries: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delegate_implementation: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl JobData {
    pub fn new(domain: TenantDomain, executor: impl Into<String>, interrupt_max_retries: u64) -> Self {
        Self {
            domain,
            executor: executor.into(),
            interrupt_max_retries,
            task_key: None,
            report_key: None,
            delegate_implementation: None,
            extra: BTreeMap::new(),
        }
    }

    /// Inactive tasks and reports stay scheduled but skip their work.
    pub fn is_active(&self) -> bool {
        self.extra
            .get(ACTIVE_KEY)
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(true)
    }

    pub fn set_active(&mut self, active: bool) {
        if active {
            self.extra.remove(ACTIVE_KEY);
        } else {
            self.extra
                .insert(ACTIVE_KEY.to_string(), serde_json::Value::Bool(false));
        }
    }
}

/// When a registered job fires.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Schedule {
    /// No trigger; fired only on demand.
    Durable,
    /// Recurring, starting now.
    Cron { expression: String },
    /// Fires once at the instant.
    OneShot { at: DateTime<Utc> },
    /// Recurring, first fire deferred to the instant.
    CronFrom {
        expression: String,
        start_at: DateTime<Utc>,
    },
}

impl Schedule {
    /// Blank cron expressions count as absent.
    pub fn from_parts(cron: Option<&str>, start_at: Option<DateTime<Utc>>) -> Self {
        let cron = cron.map(str::trim).filter(|c| !c.is_empty());
        match (cron, start_at) {
            (None, None) => Self::Durable,
            (None, Some(at)) => Self::OneShot { at },
            (Some(expression), None) => Self::Cron {
                expression: expression.to_string(),
            },
            (Some(expression), Some(start_at)) => Self::CronFrom {
                expression: expression.to_string(),
                start_at,
            },
        }
    }

    pub fn is_durable(&self) -> bool {
        matches!(self, Self::Durable)
    }

    pub fn cron_expression(&self) -> Option<&str> {
        match self {
            Self::Cron { expression } | Self::CronFrom { expression, .. } => Some(expression),
            _ => None,
        }
    }
}

/// Everything needed to register one job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobDefinition {
    pub name: String,
    pub delegate_type: String,
    pub cron_expression: Option<String>,
    pub start_at: Option<DateTime<Utc>>,
    pub data: JobData,
}

impl JobDefinition {
    pub fn new(name: impl Into<String>, delegate_type: impl Into<String>, data: JobData) -> Self {
        Self {
            name: name.into(),
            delegate_type: delegate_type.into(),
            cron_expression: None,
            start_at: None,
            data,
        }
    }

    pub fn with_cron(mut self, cron: Option<impl Into<String>>) -> Self {
        self.cron_expression = cron.map(Into::into);
        self
    }

    pub fn with_start_at(mut self, start_at: Option<DateTime<Utc>>) -> Self {
        self.start_at = start_at;
        self
    }

    pub fn schedule(&self) -> Schedule {
        Schedule::from_parts(self.cron_expression.as_deref(), self.start_at)
    }
}
