pub mod domain;
pub mod error;
pub mod job;
pub mod task;

pub use domain::{TenantDomain, MASTER_DOMAIN};
pub use error::{AppError, ErrorKind, Result};
pub use job::{
    report_job_name, task_job_name, trigger_name, JobData, JobDefinition, Schedule,
    NOTIFICATION_JOB_NAME, SYSTEM_LOAD_REPORTER_JOB_NAME,
};
pub use task::{Report, SchedTask, TaskKind};
