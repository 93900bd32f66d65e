//! In-memory storage backend.
//!
//! Backs `mem://` URLs; used by tests and as a scratch backend for callers
//! resolving secrets that never touch disk.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{Storage, StorageOption};
use crate::error::{Error, Result};

#[derive(Default)]
pub struct MemStorage {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemStorage {
    async fn download(&self, url: &str, _options: &[StorageOption]) -> Result<Vec<u8>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(url).cloned().ok_or_else(|| Error::Retrieval {
            url: url.to_string(),
            reason: "not found".to_string(),
        })
    }

    async fn upload(
        &self,
        url: &str,
        _mode: u32,
        data: &[u8],
        _options: &[StorageOption],
    ) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(url.to_string(), data.to_vec());
        Ok(())
    }

    async fn exists(&self, url: &str) -> bool {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.contains_key(url)
    }
}
