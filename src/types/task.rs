use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    #[default]
    Scheduled,
    Pull,
    Push,
    LiveSync,
    Macro,
}

impl std::str::FromStr for TaskKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "scheduled" | "sched" => Ok(Self::Scheduled),
            "pull" => Ok(Self::Pull),
            "push" => Ok(Self::Push),
            "live_sync" | "livesync" => Ok(Self::LiveSync),
            "macro" => Ok(Self::Macro),
            _ => Err(format!("Unknown task kind: {}", s)),
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scheduled => write!(f, "scheduled"),
            Self::Pull => write!(f, "pull"),
            Self::Push => write!(f, "push"),
            Self::LiveSync => write!(f, "live_sync"),
            Self::Macro => write!(f, "macro"),
        }
    }
}

/// A schedulable task as read from persistence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchedTask {
    pub key: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub kind: TaskKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron_expression: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_at: Option<DateTime<Utc>>,

    /// Explicitly configured task delegate implementation id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_delegate: Option<String>,

    #[serde(default = "default_active")]
    pub active: bool,
}

impl SchedTask {
    pub fn new(key: impl Into<String>, kind: TaskKind) -> Self {
        let key = key.into();
        Self {
            name: key.clone(),
            key,
            kind,
            cron_expression: None,
            start_at: None,
            job_delegate: None,
            active: true,
        }
    }

    pub fn with_cron(mut self, cron: impl Into<String>) -> Self {
        self.cron_expression = Some(cron.into());
        self
    }

    pub fn with_start_at(mut self, start_at: DateTime<Utc>) -> Self {
        self.start_at = Some(start_at);
        self
    }

    pub fn with_delegate(mut self, delegate: impl Into<String>) -> Self {
        self.job_delegate = Some(delegate.into());
        self
    }
}

/// A report definition as read from persistence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Report {
    pub key: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron_expression: Option<String>,

    /// Configuration type id used to pick the report delegate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conf_type: Option<String>,

    #[serde(default = "default_active")]
    pub active: bool,
}

impl Report {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            name: key.clone(),
            key,
            cron_expression: None,
            conf_type: None,
            active: true,
        }
    }

    pub fn with_cron(mut self, cron: impl Into<String>) -> Self {
        self.cron_expression = Some(cron.into());
        self
    }

    pub fn with_conf_type(mut self, conf_type: impl Into<String>) -> Self {
        self.conf_type = Some(conf_type.into());
        self
    }
}
