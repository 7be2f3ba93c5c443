//! Extension capability registry.
//!
//! Implementations are declared in a static registration table
//! ([`BUILTIN_EXTENSIONS`]) and indexed once at boot by
//! [`ExtensionRegistry::discover`].

pub mod builtin;
mod capability;
mod loader;
mod registry;

pub use builtin::BUILTIN_EXTENSIONS;
pub use capability::CapabilityType;
pub use loader::ExtensionRegistryLoader;
pub use registry::{
    CandidateProbe, DiscoveryError, ExtensionCandidate, ExtensionRegistry, RegistryHandle,
};
