mod component;
mod orchestrator;
mod registry;
mod shutdown;

pub use component::{
    BootstrapComponent, ShutdownPriority, ShutdownResult, WorkerPool, REGISTRY_LOADER_PRIORITY,
    SCHEDULER_LOADER_PRIORITY,
};
pub use orchestrator::LoaderOrchestrator;
pub use registry::WorkerPoolRegistry;
pub use shutdown::{GracefulShutdownCoordinator, ShutdownPhase};
