use async_trait::async_trait;

use super::registry::{CandidateProbe, ExtensionRegistry, RegistryHandle};
use crate::lifecycle::{BootstrapComponent, REGISTRY_LOADER_PRIORITY};
use crate::Result;

/// Runs extension discovery at boot and publishes the result.
pub struct ExtensionRegistryLoader {
    handle: RegistryHandle,
    probes: &'static [CandidateProbe],
}

impl ExtensionRegistryLoader {
    pub fn new(handle: RegistryHandle, probes: &'static [CandidateProbe]) -> Self {
        Self { handle, probes }
    }
}

#[async_trait]
impl BootstrapComponent for ExtensionRegistryLoader {
    fn name(&self) -> &'static str {
        "extension_registry"
    }

    fn priority(&self) -> i32 {
        REGISTRY_LOADER_PRIORITY
    }

    async fn init(&self) -> Result<()> {
        let registry = self.handle.publish(ExtensionRegistry::discover(self.probes))?;
        tracing::info!(
            implementations = registry.len(),
            "Extension registry published"
        );
        Ok(())
    }

    async fn teardown(&self) -> Result<()> {
        // Read-only for the rest of the process.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::BUILTIN_EXTENSIONS;

    #[tokio::test]
    async fn test_loader_publishes_registry_once() {
        let handle = RegistryHandle::new();
        let loader = ExtensionRegistryLoader::new(handle.clone(), BUILTIN_EXTENSIONS);

        loader.init().await.unwrap();
        assert!(handle.is_published());
        assert!(loader.init().await.is_err());
    }
}
