//! Ordered, named collection of integrations.
//!
//! Built once at startup from an explicit registration list and read-only
//! afterwards, so it can be shared across requests behind an `Arc` without
//! locking.

use crate::integrations::Integration;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while assembling the registry at startup.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("integration `{0}` is already registered")]
    Duplicate(String),
}

/// Integrations keyed by unique name, kept in registration order.
#[derive(Default, Clone)]
pub struct IntegrationRegistry {
    entries: Vec<(String, Arc<dyn Integration>)>,
}

impl IntegrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an integration under a unique name.
    pub fn register<I>(
        &mut self,
        name: impl Into<String>,
        integration: I,
    ) -> Result<(), RegistryError>
    where
        I: Integration + 'static,
    {
        let name = name.into();
        if self.entries.iter().any(|(existing, _)| *existing == name) {
            return Err(RegistryError::Duplicate(name));
        }
        self.entries.push((name, Arc::new(integration)));
        Ok(())
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&dyn Integration> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, integration)| integration.as_ref())
    }

    /// Name and integration pairs, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn Integration)> {
        self.entries
            .iter()
            .map(|(name, integration)| (name.as_str(), integration.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for IntegrationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
