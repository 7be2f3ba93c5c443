use std::sync::Arc;

use tokio::sync::Mutex;

use super::BootstrapComponent;
use crate::types::{AppError, Result};

/// Brings a fixed list of bootstrap components up in priority order and tears
/// them down in the reverse of the order actually used.
pub struct LoaderOrchestrator {
    components: Vec<Arc<dyn BootstrapComponent>>,
    started: Mutex<Vec<Arc<dyn BootstrapComponent>>>,
}

impl LoaderOrchestrator {
    pub fn new(components: Vec<Arc<dyn BootstrapComponent>>) -> Self {
        Self {
            components,
            started: Mutex::new(Vec::new()),
        }
    }

    /// Stable sort, so equal priorities keep registration order.
    pub fn start_order(&self) -> Vec<Arc<dyn BootstrapComponent>> {
        let mut ordered = self.components.clone();
        ordered.sort_by_key(|c| c.priority());
        ordered
    }

    pub async fn start(&self) -> Result<()> {
        let mut started = self.started.lock().await;
        started.clear();

        for component in self.start_order() {
            let name = component.name();
            tracing::info!(name, priority = component.priority(), "Initializing component");

            if let Err(e) = component.init().await {
                tracing::error!(name, error = %e, "Component init failed, aborting startup");
                return Err(AppError::Bootstrap {
                    component: name,
                    reason: e.to_string(),
                });
            }

            started.push(component);
        }

        tracing::info!(count = started.len(), "All components initialized");
        Ok(())
    }

    /// Tears down every component the last `start()` initialized. Failures are
    /// logged and never stop the remaining teardowns.
    pub async fn stop(&self) -> Vec<(&'static str, Result<()>)> {
        let started = std::mem::take(&mut *self.started.lock().await);
        let mut outcomes = Vec::with_capacity(started.len());

        for component in started.iter().rev() {
            let name = component.name();
            tracing::info!(name, "Tearing down component");

            let outcome = component.teardown().await.map_err(|e| {
                tracing::warn!(name, error = %e, "Component teardown failed, continuing");
                AppError::Teardown {
                    component: name,
                    reason: e.to_string(),
                }
            });
            outcomes.push((name, outcome));
        }

        outcomes
    }

    pub async fn started_count(&self) -> usize {
        self.started.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{CallLog, RecordingComponent};
    use crate::types::ErrorKind;

    fn orchestrator(components: Vec<RecordingComponent>) -> LoaderOrchestrator {
        LoaderOrchestrator::new(
            components
                .into_iter()
                .map(|c| Arc::new(c) as Arc<dyn BootstrapComponent>)
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_init_ascending_teardown_reversed() {
        let log = CallLog::default();
        let orchestrator = orchestrator(vec![
            RecordingComponent::new("scheduler", 500, &log),
            RecordingComponent::new("registry", i32::MIN + 1, &log),
            RecordingComponent::new("content", 0, &log),
        ]);

        orchestrator.start().await.unwrap();
        let outcomes = orchestrator.stop().await;

        assert!(outcomes.iter().all(|(_, r)| r.is_ok()));
        assert_eq!(
            log.entries(),
            vec![
                "init:registry",
                "init:content",
                "init:scheduler",
                "teardown:scheduler",
                "teardown:content",
                "teardown:registry",
            ]
        );
    }

    #[tokio::test]
    async fn test_ties_keep_registration_order() {
        let log = CallLog::default();
        let orchestrator = orchestrator(vec![
            RecordingComponent::new("a", 10, &log),
            RecordingComponent::new("b", 10, &log),
            RecordingComponent::new("c", 5, &log),
        ]);

        orchestrator.start().await.unwrap();
        orchestrator.stop().await;

        assert_eq!(
            log.entries(),
            vec![
                "init:c",
                "init:a",
                "init:b",
                "teardown:b",
                "teardown:a",
                "teardown:c",
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_init_stops_startup() {
        let log = CallLog::default();
        let orchestrator = orchestrator(vec![
            RecordingComponent::new("first", 1, &log),
            RecordingComponent::new("broken", 2, &log).failing_init(),
            RecordingComponent::new("never", 3, &log),
        ]);

        let err = orchestrator.start().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Fatal);
        assert!(matches!(err, AppError::Bootstrap { component: "broken", .. }));
        assert_eq!(log.entries(), vec!["init:first", "init:broken"]);
        assert_eq!(orchestrator.started_count().await, 1);

        orchestrator.stop().await;
        assert_eq!(log.entries().last().unwrap(), "teardown:first");
    }

    #[tokio::test]
    async fn test_failed_teardown_does_not_skip_others() {
        let log = CallLog::default();
        let orchestrator = orchestrator(vec![
            RecordingComponent::new("one", 1, &log),
            RecordingComponent::new("two", 2, &log).failing_teardown(),
            RecordingComponent::new("three", 3, &log),
        ]);

        orchestrator.start().await.unwrap();
        let outcomes = orchestrator.stop().await;

        let names: Vec<_> = outcomes.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["three", "two", "one"]);
        assert!(outcomes[1].1.is_err());
        assert!(log.entries().contains(&"teardown:one".to_string()));
    }

    #[tokio::test]
    async fn test_stop_without_start_is_noop() {
        let log = CallLog::default();
        let orchestrator = orchestrator(vec![RecordingComponent::new("idle", 1, &log)]);

        assert!(orchestrator.stop().await.is_empty());
        assert!(log.entries().is_empty());
    }
}
