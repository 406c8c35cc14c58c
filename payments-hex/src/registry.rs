//! Provider Registry
//!
//! Name → provider lookup, built once at startup.

use std::collections::HashMap;
use std::sync::Arc;

use payments_types::{PaymentProvider, RegistryError};

/// Registered payment providers, keyed by canonical name.
///
/// Names are matched exactly and case-sensitively: `"stripe"` does not
/// resolve a provider registered as `"Stripe"`.
#[derive(Clone)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn PaymentProvider>>,
}

impl ProviderRegistry {
    /// Builds the registry from every available provider.
    ///
    /// Fails if two providers share a canonical name.
    pub fn new(
        providers: impl IntoIterator<Item = Arc<dyn PaymentProvider>>,
    ) -> Result<Self, RegistryError> {
        let mut map: HashMap<String, Arc<dyn PaymentProvider>> = HashMap::new();
        for provider in providers {
            let name = provider.name().to_string();
            if map.contains_key(&name) {
                return Err(RegistryError::DuplicateProvider(name));
            }
            map.insert(name, provider);
        }
        Ok(Self { providers: map })
    }

    /// Looks up a provider by its canonical name.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn PaymentProvider>, RegistryError> {
        self.providers
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::ProviderNotFound(name.to_string()))
    }

    /// Registered provider names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.names())
            .finish()
    }
}
