//! Scheme-to-cipher registry.
//!
//! The registry is an explicit value constructed at startup and handed to the
//! resolution service; there is no process-wide singleton. Lookups take a
//! shared lock so concurrent reads are cheap once registration is done.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use super::{blowfish::Blowfish, Cipher};
use crate::error::{Error, Result};

/// Maps a scheme name to a [`Cipher`] implementation.
pub struct CipherRegistry {
    entries: RwLock<HashMap<String, Arc<dyn Cipher>>>,
}

impl CipherRegistry {
    /// Empty registry, for callers wiring their own schemes.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Registry with the built-in schemes: `blowfish`, and `gcp` when the
    /// feature is enabled.
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.register(super::blowfish::SCHEME, Arc::new(Blowfish));
        #[cfg(feature = "gcp")]
        registry.register(super::gcp::SCHEME, Arc::new(super::gcp::GcpKms));
        registry
    }

    /// Register a cipher under `scheme`, replacing any previous entry.
    pub fn register(&self, scheme: &str, cipher: Arc<dyn Cipher>) {
        debug!(scheme = %scheme, "registering cipher");
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(scheme.to_string(), cipher);
    }

    /// Look up the cipher for `scheme`. An unregistered scheme is a fatal,
    /// reported error.
    pub fn lookup(&self, scheme: &str) -> Result<Arc<dyn Cipher>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries
            .get(scheme)
            .cloned()
            .ok_or_else(|| Error::UnknownScheme(scheme.to_string()))
    }
}

impl Default for CipherRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kms::Key;
    use async_trait::async_trait;

    struct Reverser;

    #[async_trait]
    impl Cipher for Reverser {
        async fn encrypt(&self, _key: &Key, data: &[u8]) -> Result<Vec<u8>> {
            Ok(data.iter().rev().copied().collect())
        }
        async fn decrypt(&self, _key: &Key, data: &[u8]) -> Result<Vec<u8>> {
            Ok(data.iter().rev().copied().collect())
        }
    }

    #[test]
    fn test_defaults_include_blowfish() {
        let registry = CipherRegistry::with_defaults();
        assert!(registry.lookup("blowfish").is_ok());
    }

    #[test]
    fn test_lookup_unregistered_scheme_fails() {
        let registry = CipherRegistry::new();
        let err = registry.lookup("nope").unwrap_err();
        assert!(err.to_string().contains("nope"));
    }

    #[tokio::test]
    async fn test_register_and_lookup() {
        let registry = CipherRegistry::new();
        registry.register("rev", Arc::new(Reverser));
        let cipher = registry.lookup("rev").unwrap();
        let key = Key::parse("rev://default").unwrap();
        let out = cipher.encrypt(&key, b"abc").await.unwrap();
        assert_eq!(out, b"cba");
    }
}
