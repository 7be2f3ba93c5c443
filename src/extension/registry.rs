//! Write-once index of extension implementations.
//!
//! The registry is built by a single [`ExtensionRegistry::discover`] pass over a
//! static table of candidate probes and is immutable afterwards, so shared
//! references can be read from any thread without synchronization.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, OnceLock};

use thiserror::Error;

use super::capability::CapabilityType;
use crate::types::{AppError, Result};

static NO_IMPLEMENTATIONS: BTreeSet<String> = BTreeSet::new();

/// One implementation offered for discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionCandidate {
    pub implementation_id: String,
    /// Every capability the implementation is assignable to.
    pub capabilities: Vec<CapabilityType>,
    pub is_abstract: bool,
    /// Declared configuration type, required by rule and report capabilities.
    pub configuration: Option<String>,
}

impl ExtensionCandidate {
    pub fn concrete(id: impl Into<String>, capabilities: &[CapabilityType]) -> Self {
        Self {
            implementation_id: id.into(),
            capabilities: capabilities.to_vec(),
            is_abstract: false,
            configuration: None,
        }
    }

    pub fn abstract_base(id: impl Into<String>, capabilities: &[CapabilityType]) -> Self {
        Self {
            is_abstract: true,
            ..Self::concrete(id, capabilities)
        }
    }

    pub fn configured_by(mut self, configuration: impl Into<String>) -> Self {
        self.configuration = Some(configuration.into());
        self
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("implementation {0} cannot be resolved")]
    Unresolvable(String),

    #[error("implementation {implementation} is missing dependency {dependency}")]
    MissingDependency {
        implementation: String,
        dependency: String,
    },
}

/// Produces one candidate; a failure skips that candidate only.
pub type CandidateProbe = fn() -> std::result::Result<ExtensionCandidate, DiscoveryError>;

#[derive(Debug)]
pub struct ExtensionRegistry {
    by_capability: BTreeMap<CapabilityType, BTreeSet<String>>,
    by_configuration: HashMap<String, String>,
}

impl ExtensionRegistry {
    pub fn discover(probes: &[CandidateProbe]) -> Self {
        let mut by_capability: BTreeMap<CapabilityType, BTreeSet<String>> = CapabilityType::ALL
            .into_iter()
            .map(|capability| (capability, BTreeSet::new()))
            .collect();
        let mut by_configuration: HashMap<String, String> = HashMap::new();

        for probe in probes {
            let candidate = match probe() {
                Ok(candidate) => candidate,
                Err(e) => {
                    tracing::warn!(error = %e, "Could not inspect extension candidate, skipping");
                    continue;
                }
            };

            if candidate.is_abstract {
                tracing::debug!(id = %candidate.implementation_id, "Skipping abstract candidate");
                continue;
            }

            let id = candidate.implementation_id.as_str();
            for capability in &candidate.capabilities {
                if capability.excluded_specializations().contains(&id) {
                    tracing::debug!(
                        id,
                        capability = %capability,
                        "Built-in specialization kept out of generic bucket"
                    );
                    continue;
                }

                if capability.requires_configuration() {
                    let Some(configuration) = candidate.configuration.as_deref() else {
                        tracing::warn!(
                            id,
                            capability = %capability,
                            "Found implementation without declared configuration"
                        );
                        continue;
                    };

                    if let Some(previous) =
                        by_configuration.insert(configuration.to_string(), id.to_string())
                    {
                        if previous != id {
                            tracing::warn!(
                                configuration,
                                previous = %previous,
                                winner = id,
                                "Duplicate implementation for configuration type, last one wins"
                            );
                        }
                    }
                }

                by_capability
                    .entry(*capability)
                    .or_default()
                    .insert(id.to_string());
            }
        }

        let registry = Self {
            by_capability,
            by_configuration,
        };
        tracing::debug!(
            implementations = registry.len(),
            "Extension implementations discovered"
        );
        registry
    }

    pub fn lookup(&self, capability: CapabilityType) -> &BTreeSet<String> {
        self.by_capability
            .get(&capability)
            .unwrap_or(&NO_IMPLEMENTATIONS)
    }

    pub fn resolve_for(&self, configuration: &str) -> Option<&str> {
        self.by_configuration.get(configuration).map(String::as_str)
    }

    pub fn contains(&self, capability: CapabilityType, implementation_id: &str) -> bool {
        self.lookup(capability).contains(implementation_id)
    }

    /// Number of (capability, implementation) entries.
    pub fn len(&self) -> usize {
        self.by_capability.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-wide slot the registry is published to exactly once.
#[derive(Debug, Clone, Default)]
pub struct RegistryHandle {
    slot: Arc<OnceLock<Arc<ExtensionRegistry>>>,
}

impl RegistryHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, registry: ExtensionRegistry) -> Result<Arc<ExtensionRegistry>> {
        let registry = Arc::new(registry);
        self.slot
            .set(registry.clone())
            .map_err(|_| AppError::AlreadyInitialized("extension registry".to_string()))?;
        Ok(registry)
    }

    pub fn get(&self) -> Option<Arc<ExtensionRegistry>> {
        self.slot.get().cloned()
    }

    pub fn is_published(&self) -> bool {
        self.slot.get().is_some()
    }
}
