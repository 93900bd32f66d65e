//! Named resource registry.
//!
//! Maps symbolic names onto [`Resource`] locators so call sites can resolve
//! secrets by name without carrying URLs and key specifiers around.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::resource::Resource;

#[derive(Default)]
pub struct ResourceRegistry {
    entries: RwLock<HashMap<String, Resource>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `resource` under `name`, replacing any previous binding.
    pub fn register(&self, name: impl Into<String>, resource: Resource) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(name.into(), resource);
    }

    pub fn remove(&self, name: &str) -> Option<Resource> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(name)
    }

    pub fn lookup(&self, name: &str) -> Option<Resource> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(name).cloned()
    }
}
