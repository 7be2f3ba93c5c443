use async_trait::async_trait;
use std::time::Duration;

use crate::Result;

/// Init priority of the extension registry loader.
pub const REGISTRY_LOADER_PRIORITY: i32 = i32::MIN + 1;
/// Init priority of the job scheduler loader.
pub const SCHEDULER_LOADER_PRIORITY: i32 = 500;

/// A prioritized bootstrap/teardown-capable component.
///
/// Lower priority values are initialized earlier. Teardown runs in the exact
/// reverse of the order init actually used.
#[async_trait]
pub trait BootstrapComponent: Send + Sync {
    fn name(&self) -> &'static str;

    fn priority(&self) -> i32;

    async fn init(&self) -> Result<()>;

    async fn teardown(&self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ShutdownPriority {
    First = 0,
    #[default]
    Normal = 50,
    Last = 100,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownResult {
    Complete { items_processed: usize },
    Partial { remaining: usize },
    TimedOut,
    Error(String),
}

impl ShutdownResult {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete { .. })
    }
}

/// A managed pool of workers that must be stopped at process exit.
#[async_trait]
pub trait WorkerPool: Send + Sync {
    fn name(&self) -> &'static str;

    fn shutdown_priority(&self) -> ShutdownPriority {
        ShutdownPriority::Normal
    }

    async fn shutdown(&self, timeout: Duration) -> Result<ShutdownResult>;
}
