//! Storage backends.
//!
//! The engine is agnostic to where bytes live; it talks to a [`Storage`]
//! implementation and passes backend-specific options through unchanged.
//! Two backends ship with the crate: the local filesystem and an in-memory
//! map for tests and `mem://` fixtures.

use async_trait::async_trait;

use crate::error::Result;

mod fs;
mod mem;

pub use fs::FsStorage;
pub use mem::MemStorage;

/// Backend-specific option, passed through the engine unchanged.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StorageOption {
    pub name: String,
    pub value: String,
}

/// Byte transfer boundary consumed by the resolution service.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Retrieve the bytes at `url`.
    async fn download(&self, url: &str, options: &[StorageOption]) -> Result<Vec<u8>>;

    /// Write `data` to `url` with the given unix mode.
    async fn upload(&self, url: &str, mode: u32, data: &[u8], options: &[StorageOption])
        -> Result<()>;

    /// Whether `url` exists.
    async fn exists(&self, url: &str) -> bool;
}

/// Map a URL onto a local filesystem path: strips a `file://` scheme and
/// expands a leading `~` to the home directory.
pub(crate) fn local_path(url: &str) -> String {
    let path = url.strip_prefix("file://").unwrap_or(url);
    if let Some(rest) = path.strip_prefix('~') {
        if let Some(home) = dirs::home_dir() {
            return format!("{}/{}", home.display(), rest.trim_start_matches('/'));
        }
    }
    path.to_string()
}
