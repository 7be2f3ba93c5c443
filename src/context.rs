use std::sync::Arc;

use crate::extension::ExtensionRegistry;
use crate::types::TenantDomain;

/// Explicit execution context handed to every scheduler operation: the
/// discovered registry plus the tenant the operation acts for.
#[derive(Debug, Clone)]
pub struct RuntimeContext {
    registry: Arc<ExtensionRegistry>,
    domain: TenantDomain,
}

impl RuntimeContext {
    pub fn new(registry: Arc<ExtensionRegistry>, domain: TenantDomain) -> Self {
        Self { registry, domain }
    }

    pub fn master(registry: Arc<ExtensionRegistry>) -> Self {
        Self::new(registry, TenantDomain::master())
    }

    /// Same registry, another tenant.
    pub fn for_domain(&self, domain: TenantDomain) -> Self {
        Self {
            registry: self.registry.clone(),
            domain,
        }
    }

    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }

    pub fn domain(&self) -> &TenantDomain {
        &self.domain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_domain_shares_registry() {
        let registry = Arc::new(ExtensionRegistry::discover(&[]));
        let master = RuntimeContext::master(registry.clone());
        let two = master.for_domain(TenantDomain::new("Two"));

        assert!(master.domain().is_master());
        assert_eq!(two.domain().as_str(), "Two");
        assert!(std::ptr::eq(master.registry(), two.registry()));
    }
}
