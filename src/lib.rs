//! Covert - A secret resolution and credential protection engine.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── resource          # Secret locators: URL, key specifier, fallbacks
//! ├── resources         # Named resource registry
//! ├── secret            # Resolved secrets and template expansion
//! ├── service           # Load/Store resolution engine
//! ├── kms/              # Keys and encryption schemes
//! │   ├── mod           # Cipher and Securable traits
//! │   ├── key           # scheme://kind/path key specifiers
//! │   ├── registry      # Scheme-to-cipher registry
//! │   ├── blowfish      # Blowfish CBC implementation
//! │   └── gcp           # Google Cloud KMS (feature `gcp`)
//! ├── cred/             # Credential shapes with field-level encryption
//! │   ├── basic         # Username/password
//! │   ├── ssh           # SSH with private key material
//! │   ├── aws           # AWS access keys
//! │   ├── generic       # Composite shape with kind dispatch
//! │   └── ...           # sha1, rsa, oauth2, azure, jwt, entry, secret_key
//! └── store/            # Storage backends
//!     ├── mod           # Storage trait
//!     ├── fs            # Local filesystem
//!     └── mem           # In-memory, for tests and fixtures
//! ```
//!
//! # Features
//!
//! - Pluggable encryption schemes selected by key specifier
//! - Field-level credential encryption with `Encrypted<Field>` siblings
//! - JSON and YAML secret documents, auto-detected by extension
//! - Retry, timeout and fallback chains on retrieval
//! - `${name.field}` template expansion over resolved secrets

pub mod cred;
pub mod error;
pub mod kms;
pub mod resource;
pub mod resources;
pub mod secret;
pub mod service;
pub mod store;

pub use cred::{Credential, TargetKind};
pub use error::{Error, Result};
pub use kms::{Cipher, CipherRegistry, Key, Securable};
pub use resource::{EncodedResource, Resource, SecretFormat};
pub use resources::ResourceRegistry;
pub use secret::Secret;
pub use service::Service;
