//! Persistence reads the scheduler reconciles against.

use async_trait::async_trait;

use crate::types::{Report, SchedTask, TenantDomain};
use crate::Result;

/// Cron expression used when no notification schedule is configured.
pub const DEFAULT_NOTIFICATION_CRON: &str = "0 0/2 * * * ?";
/// Fixed schedule of the system load reporter.
pub const SYSTEM_LOAD_REPORTER_CRON: &str = "0 * * * * ?";
const DEFAULT_INTERRUPT_MAX_RETRIES: u64 = 1;

#[async_trait]
pub trait SchedulingSource: Send + Sync {
    async fn domains(&self) -> Result<Vec<TenantDomain>>;

    async fn tasks(&self, domain: &TenantDomain) -> Result<Vec<SchedTask>>;

    async fn reports(&self, domain: &TenantDomain) -> Result<Vec<Report>>;

    /// `None` when unset; `Some("")` when explicitly disabled.
    async fn notification_cron(&self) -> Result<Option<String>>;

    async fn interrupt_max_retries(&self) -> Result<Option<u64>>;
}

/// Process-wide scheduling settings resolved from persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulingConf {
    /// `None` means notifications are not scheduled.
    pub notification_cron: Option<String>,
    pub interrupt_max_retries: u64,
    pub report_system_load: bool,
}

impl Default for SchedulingConf {
    fn default() -> Self {
        Self {
            notification_cron: Some(DEFAULT_NOTIFICATION_CRON.to_string()),
            interrupt_max_retries: DEFAULT_INTERRUPT_MAX_RETRIES,
            report_system_load: true,
        }
    }
}

impl SchedulingConf {
    pub async fn load(source: &dyn SchedulingSource) -> Result<Self> {
        let notification_cron = match source.notification_cron().await? {
            None => Some(DEFAULT_NOTIFICATION_CRON.to_string()),
            Some(cron) if cron.trim().is_empty() => None,
            Some(cron) => Some(cron),
        };
        let interrupt_max_retries = source
            .interrupt_max_retries()
            .await?
            .unwrap_or(DEFAULT_INTERRUPT_MAX_RETRIES);

        Ok(Self {
            notification_cron,
            interrupt_max_retries,
            report_system_load: true,
        })
    }
}
