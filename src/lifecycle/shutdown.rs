use super::{ShutdownResult, WorkerPool, WorkerPoolRegistry};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownPhase {
    Running,
    Draining,
    Complete,
}

/// Stops the worker pools that were known when it was captured.
pub struct GracefulShutdownCoordinator {
    pools: Vec<Arc<dyn WorkerPool>>,
    phase_tx: watch::Sender<ShutdownPhase>,
    phase_rx: watch::Receiver<ShutdownPhase>,
}

impl GracefulShutdownCoordinator {
    pub async fn capture(registry: &WorkerPoolRegistry) -> Self {
        let mut pools = registry.get_all().await;
        pools.sort_by_key(|p| p.shutdown_priority());
        tracing::debug!(count = pools.len(), "Captured worker pools for shutdown");

        let (phase_tx, phase_rx) = watch::channel(ShutdownPhase::Running);
        Self {
            pools,
            phase_tx,
            phase_rx,
        }
    }

    pub fn phase_receiver(&self) -> watch::Receiver<ShutdownPhase> {
        self.phase_rx.clone()
    }

    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    pub async fn shutdown(&self, pool_timeout: Duration) -> Vec<(&'static str, ShutdownResult)> {
        let mut results = Vec::with_capacity(self.pools.len());

        let _ = self.phase_tx.send(ShutdownPhase::Draining);
        tracing::info!(pools = self.pools.len(), "Shutting down worker pools");

        for pool in &self.pools {
            let name = pool.name();
            tracing::info!(name, "Shutting down worker pool");

            let result = match tokio::time::timeout(pool_timeout, pool.shutdown(pool_timeout)).await
            {
                Ok(Ok(r)) => r,
                Ok(Err(e)) => {
                    tracing::warn!(name, error = %e, "Worker pool shutdown failed, continuing");
                    ShutdownResult::Error(e.to_string())
                }
                Err(_) => {
                    tracing::warn!(name, "Worker pool shutdown timed out, continuing");
                    ShutdownResult::TimedOut
                }
            };

            results.push((name, result));
        }

        let _ = self.phase_tx.send(ShutdownPhase::Complete);
        tracing::info!("Worker pool shutdown complete");

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::ShutdownPriority;
    use crate::test_utils::{CallLog, RecordingPool};

    #[tokio::test]
    async fn test_failing_pool_does_not_block_others() {
        let log = CallLog::default();
        let registry = WorkerPoolRegistry::new();
        registry
            .register(Arc::new(RecordingPool::new("connectors", &log).failing()))
            .await;
        registry
            .register(Arc::new(RecordingPool::new("propagation", &log)))
            .await;

        let coordinator = GracefulShutdownCoordinator::capture(&registry).await;
        let results = coordinator.shutdown(Duration::from_secs(1)).await;

        assert_eq!(results.len(), 2);
        assert!(matches!(results[0].1, ShutdownResult::Error(_)));
        assert!(results[1].1.is_complete());
        assert_eq!(
            log.entries(),
            vec!["shutdown:connectors", "shutdown:propagation"]
        );
    }

    #[tokio::test]
    async fn test_pools_registered_after_capture_are_ignored() {
        let log = CallLog::default();
        let registry = WorkerPoolRegistry::new();
        registry
            .register(Arc::new(RecordingPool::new("early", &log)))
            .await;

        let coordinator = GracefulShutdownCoordinator::capture(&registry).await;
        registry
            .register(Arc::new(RecordingPool::new("late", &log)))
            .await;

        coordinator.shutdown(Duration::from_secs(1)).await;

        assert_eq!(coordinator.pool_count(), 1);
        assert_eq!(log.entries(), vec!["shutdown:early"]);
    }

    #[tokio::test]
    async fn test_pools_ordered_by_shutdown_priority() {
        let log = CallLog::default();
        let registry = WorkerPoolRegistry::new();
        registry
            .register(Arc::new(
                RecordingPool::new("last", &log).with_priority(ShutdownPriority::Last),
            ))
            .await;
        registry
            .register(Arc::new(
                RecordingPool::new("first", &log).with_priority(ShutdownPriority::First),
            ))
            .await;

        let coordinator = GracefulShutdownCoordinator::capture(&registry).await;
        coordinator.shutdown(Duration::from_secs(1)).await;

        assert_eq!(log.entries(), vec!["shutdown:first", "shutdown:last"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_pool_times_out() {
        let log = CallLog::default();
        let registry = WorkerPoolRegistry::new();
        registry
            .register(Arc::new(RecordingPool::new("stuck", &log).hanging()))
            .await;
        registry
            .register(Arc::new(RecordingPool::new("healthy", &log)))
            .await;

        let coordinator = GracefulShutdownCoordinator::capture(&registry).await;
        let mut phases = coordinator.phase_receiver();
        let results = coordinator.shutdown(Duration::from_secs(2)).await;

        assert_eq!(results[0].1, ShutdownResult::TimedOut);
        assert!(results[1].1.is_complete());
        assert_eq!(*phases.borrow_and_update(), ShutdownPhase::Complete);
    }
}
