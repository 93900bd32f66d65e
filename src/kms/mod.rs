//! Key management and encryption schemes.
//!
//! A [`Key`] names a registered cipher scheme and describes how its raw
//! material is obtained. A [`Cipher`] encrypts and decrypts whole byte blobs
//! under a key. [`Securable`] is implemented by credential shapes that know
//! which of their own fields are sensitive and encrypt only those.
//!
//! ## Adding a New Scheme
//!
//! 1. Implement the `Cipher` trait
//! 2. Add the implementation in a new file (e.g., `blowfish.rs`, `gcp.rs`)
//! 3. Feature-gate if appropriate
//! 4. Register it on the [`CipherRegistry`] handed to the service

use async_trait::async_trait;

use crate::error::Result;

mod key;
mod registry;

pub mod blowfish;

#[cfg(feature = "gcp")]
pub mod gcp;

pub use key::{Key, KeyKind};
pub use registry::CipherRegistry;

/// Whole-blob encryption scheme.
///
/// Implementations are registered on a [`CipherRegistry`] under a scheme name
/// and selected by the scheme of the [`Key`] they are invoked with. Calls are
/// treated as atomic units: they are not cancelable mid-operation and are
/// bounded only by the caller's outer timeout.
#[async_trait]
pub trait Cipher: Send + Sync {
    /// Encrypt `data` under `key`.
    async fn encrypt(&self, key: &Key, data: &[u8]) -> Result<Vec<u8>>;

    /// Decrypt `data` under `key`.
    async fn decrypt(&self, key: &Key, data: &[u8]) -> Result<Vec<u8>>;
}

impl std::fmt::Debug for dyn Cipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Cipher")
    }
}

/// Field-level encryption capability of a credential shape.
///
/// `cipher` encrypts the shape's sensitive fields in place, moving cleartext
/// into the `Encrypted<Field>` siblings; `decipher` is the exact inverse and
/// is idempotent on already-decrypted input. The cipher resolved for the
/// key's scheme is passed in by the caller.
#[async_trait]
pub trait Securable: Send {
    async fn cipher(&mut self, cipher: &dyn Cipher, key: &Key) -> Result<()>;
    async fn decipher(&mut self, cipher: &dyn Cipher, key: &Key) -> Result<()>;
}
