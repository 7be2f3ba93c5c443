use std::sync::Arc;
use std::time::Duration;

use super::ComponentContainer;
use crate::scheduler::JobDelegate;
use crate::types::AppError;
use crate::Result;

const DEFAULT_MAX_ATTEMPTS: u32 = 5;
const DEFAULT_BACKOFF_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Duration::from_millis(DEFAULT_BACKOFF_MS),
        }
    }
}

/// Creates delegate instances, retrying construction failures that usually
/// clear once concurrent boot activity settles.
pub struct DynamicComponentFactory {
    container: Arc<dyn ComponentContainer>,
    policy: RetryPolicy,
}

impl DynamicComponentFactory {
    pub fn new(container: Arc<dyn ComponentContainer>, policy: RetryPolicy) -> Self {
        Self { container, policy }
    }

    pub fn with_defaults(container: Arc<dyn ComponentContainer>) -> Self {
        Self::new(container, RetryPolicy::default())
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub async fn create(&self, type_id: &str) -> Result<Arc<dyn JobDelegate>> {
        let max_attempts = self.policy.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            tracing::debug!(type_id, attempt, "Attempting to create component");
            match self.container.create_autowired(type_id) {
                Ok(instance) => {
                    tracing::debug!(type_id, attempt, "Component created");
                    return Ok(instance);
                }
                Err(e) => {
                    tracing::error!(type_id, attempt, error = %e, "Could not create component");
                    if attempt < max_attempts {
                        tokio::time::sleep(self.policy.backoff).await;
                    }
                }
            }
        }

        Err(AppError::ComponentUnavailable(type_id.to_string()))
    }
}
