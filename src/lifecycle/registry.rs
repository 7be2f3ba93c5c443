use super::WorkerPool;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Worker pools known to the process, in registration order.
///
/// A pool registered under a name already present replaces the earlier one
/// in place.
#[derive(Default)]
pub struct WorkerPoolRegistry {
    pools: RwLock<Vec<Arc<dyn WorkerPool>>>,
}

impl WorkerPoolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether an earlier pool with the same name was replaced.
    pub async fn register(&self, pool: Arc<dyn WorkerPool>) -> bool {
        let mut pools = self.pools.write().await;
        let name = pool.name();

        if let Some(slot) = pools.iter_mut().find(|p| p.name() == name) {
            tracing::warn!(name, "Replacing worker pool registered under the same name");
            *slot = pool;
            return true;
        }

        tracing::info!(name, "Registering worker pool");
        pools.push(pool);
        false
    }

    /// Snapshot of the pools registered so far.
    pub async fn get_all(&self) -> Vec<Arc<dyn WorkerPool>> {
        self.pools.read().await.clone()
    }

    pub async fn names(&self) -> Vec<&'static str> {
        self.pools.read().await.iter().map(|p| p.name()).collect()
    }
}
