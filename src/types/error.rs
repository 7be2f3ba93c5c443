use thiserror::Error;

/// Coarse classification carried by every [`AppError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Transient,
    Fatal,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Component unavailable: {0}")]
    ComponentUnavailable(String),

    #[error("Component creation failed: {0}")]
    ComponentCreation(String),

    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Invalid job definition: {0}")]
    InvalidJob(String),

    #[error("Scheduler error: {0}")]
    Scheduler(String),

    #[error("Scheduler is shut down")]
    SchedulerShutdown,

    #[error("Already initialized: {0}")]
    AlreadyInitialized(String),

    #[error("Bootstrap of {component} failed: {reason}")]
    Bootstrap {
        component: &'static str,
        reason: String,
    },

    #[error("Teardown of {component} failed: {reason}")]
    Teardown {
        component: &'static str,
        reason: String,
    },

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ComponentUnavailable(_) | Self::JobNotFound(_) => ErrorKind::NotFound,
            Self::AlreadyInitialized(_) => ErrorKind::Conflict,
            Self::ComponentCreation(_)
            | Self::Scheduler(_)
            | Self::Persistence(_)
            | Self::Io(_) => ErrorKind::Transient,
            Self::InvalidJob(_)
            | Self::SchedulerShutdown
            | Self::Bootstrap { .. }
            | Self::Teardown { .. }
            | Self::Config(_)
            | Self::Internal(_) => ErrorKind::Fatal,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Config(e.to_string())
    }
}
