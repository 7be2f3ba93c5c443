use serde::{Deserialize, Serialize};

/// Name of the domain that owns process-wide jobs.
pub const MASTER_DOMAIN: &str = "Master";

/// Identifier of an isolated tenant sharing the process.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantDomain(String);

impl TenantDomain {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn master() -> Self {
        Self(MASTER_DOMAIN.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_master(&self) -> bool {
        self.0 == MASTER_DOMAIN
    }
}

impl std::fmt::Display for TenantDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TenantDomain {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
