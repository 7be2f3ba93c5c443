use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use idm_runtime::config::{default_fixture_path, AppConfig};
use idm_runtime::container::{DelegateContainer, DynamicComponentFactory};
use idm_runtime::extension::{ExtensionRegistryLoader, RegistryHandle, BUILTIN_EXTENSIONS};
use idm_runtime::lifecycle::{
    BootstrapComponent, GracefulShutdownCoordinator, LoaderOrchestrator, WorkerPoolRegistry,
};
use idm_runtime::scheduler::jobs::LoggingJobRunner;
use idm_runtime::scheduler::{
    DelegateTable, FixtureSource, InMemoryEngine, MultiTenantJobScheduler, SchedulerLoader,
    SchedulingEngine,
};

#[derive(Parser)]
#[command(name = "idm-runtime")]
#[command(about = "Bootstrap and multi-tenant job scheduler for identity management")]
struct Cli {
    /// Scheduling fixture (domains, tasks, reports, settings).
    #[arg(long, env, default_value_os_t = default_fixture_path())]
    fixture: PathBuf,

    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[arg(long, env, default_value = "admin")]
    admin_user: String,

    /// Keep the engine in standby on this instance.
    #[arg(long, env)]
    disable_scheduler: bool,

    #[arg(long, env, default_value = "true", action = clap::ArgAction::Set)]
    report_system_load: bool,

    #[arg(long, env, default_value = "5")]
    factory_attempts: u32,

    #[arg(long, env, default_value = "1000")]
    factory_backoff_ms: u64,

    #[arg(long, env = "SHUTDOWN_TIMEOUT_MS", default_value = "30000")]
    shutdown_timeout: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(&cli.log_level)
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig {
        fixture_path: cli.fixture,
        log_level: cli.log_level,
        admin_user: cli.admin_user,
        disable_scheduler: cli.disable_scheduler,
        report_system_load: cli.report_system_load,
        factory_attempts: cli.factory_attempts,
        factory_backoff_ms: cli.factory_backoff_ms,
        shutdown_timeout_ms: cli.shutdown_timeout,
    };

    let source = if config.fixture_path.exists() {
        FixtureSource::load(&config.fixture_path)?
    } else {
        tracing::warn!(
            path = %config.fixture_path.display(),
            "Scheduling fixture not found, starting with no domains"
        );
        FixtureSource::default()
    };

    let registry = RegistryHandle::new();
    let delegates = Arc::new(DelegateTable::new());
    let engine = InMemoryEngine::new(format!("node-{}", std::process::id()), delegates.clone());
    tracing::info!(instance = %engine.instance_id(), "Scheduling engine created");

    let container = DelegateContainer::with_builtin_jobs(Arc::new(LoggingJobRunner));
    let factory = DynamicComponentFactory::new(Arc::new(container), config.retry_policy());
    let scheduler = Arc::new(MultiTenantJobScheduler::new(
        Arc::new(engine.clone()),
        factory,
        delegates,
        config.admin_user.clone(),
    ));

    let components: Vec<Arc<dyn BootstrapComponent>> = vec![
        Arc::new(
            SchedulerLoader::new(scheduler.clone(), registry.clone(), Arc::new(source))
                .disabled(config.disable_scheduler)
                .report_system_load(config.report_system_load),
        ),
        Arc::new(ExtensionRegistryLoader::new(registry, BUILTIN_EXTENSIONS)),
    ];
    let orchestrator = LoaderOrchestrator::new(components);

    let pools = WorkerPoolRegistry::new();
    pools.register(Arc::new(engine)).await;

    if let Err(e) = orchestrator.start().await {
        tracing::error!(error = %e, "Bootstrap failed");
        orchestrator.stop().await;
        return Err(e.into());
    }

    let coordinator = GracefulShutdownCoordinator::capture(&pools).await;
    tracing::info!(
        jobs = scheduler.registered_jobs().await.len(),
        "Runtime started, waiting for signals..."
    );

    #[cfg(unix)]
    let mut terminate = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

    let shutdown_reason: &str;
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down gracefully... (SIGINT)");
            shutdown_reason = "sigint";
        },
        _ = async {
            #[cfg(unix)]
            {
                terminate.recv().await;
            }
            #[cfg(not(unix))]
            {
                std::future::pending::<()>().await;
            }
        } => {
            tracing::info!("Shutting down gracefully... (SIGTERM)");
            shutdown_reason = "sigterm";
        }
    }

    tracing::info!(reason = shutdown_reason, "Initiating graceful shutdown...");

    let (teardowns, pools) = tokio::join!(
        orchestrator.stop(),
        coordinator.shutdown(config.shutdown_timeout())
    );
    for (name, result) in teardowns {
        if let Err(e) = result {
            tracing::warn!(name, error = %e, "Teardown error");
        }
    }
    for (name, result) in pools {
        if !result.is_complete() {
            tracing::warn!(name, ?result, "Worker pool did not stop cleanly");
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
