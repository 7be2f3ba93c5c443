pub mod config;
pub mod container;
pub mod context;
pub mod extension;
pub mod lifecycle;
pub mod scheduler;
pub mod types;

#[cfg(test)]
pub mod test_utils;

pub use config::AppConfig;
pub use context::RuntimeContext;
pub use types::error::{AppError, Result};
