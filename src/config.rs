use std::path::PathBuf;
use std::time::Duration;

use crate::container::RetryPolicy;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// JSON document with domains, tasks, reports and scheduling settings.
    pub fixture_path: PathBuf,
    pub log_level: String,
    /// Identity recorded as executor of jobs registered at boot.
    pub admin_user: String,
    pub disable_scheduler: bool,
    pub report_system_load: bool,
    pub factory_attempts: u32,
    pub factory_backoff_ms: u64,
    pub shutdown_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fixture_path: default_fixture_path(),
            log_level: "info".to_string(),
            admin_user: "admin".to_string(),
            disable_scheduler: false,
            report_system_load: true,
            factory_attempts: 5,
            factory_backoff_ms: 1000,
            shutdown_timeout_ms: 30000,
        }
    }
}

impl AppConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.factory_attempts,
            backoff: Duration::from_millis(self.factory_backoff_ms),
        }
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

pub fn default_fixture_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("idm-runtime")
        .join("scheduling.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_retry_policy_matches_factory_default() {
        let config = AppConfig::default();
        assert_eq!(config.retry_policy(), RetryPolicy::default());
        assert!(config.fixture_path.ends_with("idm-runtime/scheduling.json"));
    }
}
