use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::source::SchedulingSource;
use crate::types::{AppError, Report, SchedTask, TenantDomain};
use crate::Result;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FixtureConf {
    /// Absent means the default schedule, empty means disabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_cron: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interrupt_max_retries: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DomainFixture {
    #[serde(default)]
    pub tasks: Vec<SchedTask>,

    #[serde(default)]
    pub reports: Vec<Report>,
}

/// Scheduling data read from a JSON document:
///
/// ```json
/// { "conf": { "notification_cron": "0 0/5 * * * ?" },
///   "domains": { "Master": { "tasks": [], "reports": [] } } }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FixtureSource {
    #[serde(default)]
    pub conf: FixtureConf,

    #[serde(default)]
    pub domains: BTreeMap<TenantDomain, DomainFixture>,
}

impl FixtureSource {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("cannot read fixture {}: {}", path.display(), e))
        })?;
        let source: Self = serde_json::from_str(&raw)?;
        tracing::debug!(
            path = %path.display(),
            domains = source.domains.len(),
            "Scheduling fixture loaded"
        );
        Ok(source)
    }

    fn domain(&self, domain: &TenantDomain) -> Result<&DomainFixture> {
        self.domains
            .get(domain)
            .ok_or_else(|| AppError::Persistence(format!("unknown domain {}", domain)))
    }
}

#[async_trait]
impl SchedulingSource for FixtureSource {
    async fn domains(&self) -> Result<Vec<TenantDomain>> {
        Ok(self.domains.keys().cloned().collect())
    }

    async fn tasks(&self, domain: &TenantDomain) -> Result<Vec<SchedTask>> {
        Ok(self.domain(domain)?.tasks.clone())
    }

    async fn reports(&self, domain: &TenantDomain) -> Result<Vec<Report>> {
        Ok(self.domain(domain)?.reports.clone())
    }

    async fn notification_cron(&self) -> Result<Option<String>> {
        Ok(self.conf.notification_cron.clone())
    }

    async fn interrupt_max_retries(&self) -> Result<Option<u64>> {
        Ok(self.conf.interrupt_max_retries)
    }
}
