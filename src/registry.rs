//! Registry of package descriptors.
//!
//! The host engine owns a [`Registry`] and fills it with explicit
//! [`Registry::register`] calls at startup; recipes never register themselves.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use log::debug;

use crate::error::RegistryError;
use crate::package::PackageDescriptor;
use crate::recipes;

/// Name to descriptor mapping.
///
/// Descriptors are immutable once registered and handed out as
/// `Arc<PackageDescriptor>`, so any number of readers may query them
/// concurrently.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    packages: BTreeMap<String, Arc<PackageDescriptor>>,
}

impl Registry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in recipes.
    pub fn with_builtin() -> Result<Self> {
        let mut registry = Self::new();
        for descriptor in recipes::builtin()? {
            registry.register(descriptor)?;
        }
        Ok(registry)
    }

    /// Register a descriptor under its name.
    ///
    /// Names are unique; registering a second descriptor with the same name fails.
    pub fn register(
        &mut self,
        descriptor: PackageDescriptor,
    ) -> Result<Arc<PackageDescriptor>, RegistryError> {
        let name = descriptor.name().to_string();
        if self.packages.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        debug!("Registering package {}", name);
        let descriptor = Arc::new(descriptor);
        self.packages.insert(name, Arc::clone(&descriptor));
        Ok(descriptor)
    }

    /// Get a registered descriptor by name.
    pub fn get(&self, name: &str) -> Option<&Arc<PackageDescriptor>> {
        self.packages.get(name)
    }

    /// Like [`get`](Self::get), but a missing package is an error.
    pub fn require(&self, name: &str) -> Result<&Arc<PackageDescriptor>, RegistryError> {
        self.get(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.packages.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<PackageDescriptor>> {
        self.packages.values()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}
