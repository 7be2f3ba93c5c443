use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::types::JobData;
use crate::Result;

/// What a job receives when it fires.
#[derive(Debug, Clone)]
pub struct JobExecutionContext {
    pub job_name: String,
    pub data: JobData,
    pub fired_at: DateTime<Utc>,
}

/// The unit of work executed when a job fires.
#[async_trait]
pub trait JobDelegate: Send + Sync {
    fn kind(&self) -> &'static str;

    async fn execute(&self, ctx: &JobExecutionContext) -> Result<()>;
}

/// Delegate instances published by job name.
///
/// Written only by the scheduler inside its registration critical section;
/// the engine reads it when a job fires.
#[derive(Default)]
pub struct DelegateTable {
    entries: RwLock<HashMap<String, Arc<dyn JobDelegate>>>,
}

impl DelegateTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn publish(&self, name: &str, delegate: Arc<dyn JobDelegate>) {
        self.entries.write().await.insert(name.to_string(), delegate);
    }

    pub(crate) async fn remove(&self, name: &str) -> bool {
        self.entries.write().await.remove(name).is_some()
    }

    pub async fn get(&self, name: &str) -> Option<Arc<dyn JobDelegate>> {
        self.entries.read().await.get(name).cloned()
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.entries.read().await.contains_key(name)
    }

    pub async fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.entries.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
