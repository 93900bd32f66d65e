//! Key specifier parsing and key material resolution.
//!
//! A key specifier follows the `scheme://kind/path` grammar, e.g.
//! `blowfish://default`, `blowfish://env/MY_KEY`, or
//! `gcp://kms/projects/P/locations/L/keyRings/R/cryptoKeys/K`. The scheme
//! selects a registered cipher; the kind selects how raw key material is
//! obtained.

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{Error, Result};

/// How key material is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// The full specifier string is the key material.
    Raw,
    /// Literal bytes embedded in the specifier path.
    Inline,
    /// Caller-supplied default material (zero key management for local dev).
    Default,
    /// Read from the environment variable named by the path.
    Env,
    /// Derived from the host's network interface hardware addresses.
    Mac,
    /// Path is a location key bytes are read from.
    Url,
}

impl KeyKind {
    fn parse(kind: &str) -> KeyKind {
        match kind {
            "raw" => KeyKind::Raw,
            "inline" => KeyKind::Inline,
            "default" => KeyKind::Default,
            "env" => KeyKind::Env,
            "mac" => KeyKind::Mac,
            _ => KeyKind::Url,
        }
    }
}

/// Parsed key specifier. Immutable once parsed; scheme validity is checked
/// against the cipher registry at resolution time, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    pub raw: String,
    pub scheme: String,
    pub kind: KeyKind,
    pub path: String,
}

impl Key {
    /// Parse a `scheme://kind/path` specifier.
    ///
    /// A specifier starting with `projects/` is shorthand for a GCP KMS
    /// resource name. A specifier with no scheme is treated as a plain
    /// location under the `file` scheme.
    pub fn parse(raw: &str) -> Result<Key> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(Error::InvalidKey("empty specifier".to_string()));
        }
        if raw.starts_with("projects/") {
            return Ok(Key {
                raw: raw.to_string(),
                scheme: "gcp".to_string(),
                kind: KeyKind::Url,
                path: raw.to_string(),
            });
        }
        let Some((scheme, rest)) = raw.split_once("://") else {
            return Ok(Key {
                raw: raw.to_string(),
                scheme: "file".to_string(),
                kind: KeyKind::Url,
                path: raw.to_string(),
            });
        };
        if scheme.is_empty() || rest.is_empty() {
            return Err(Error::InvalidKey(raw.to_string()));
        }
        let (kind_str, path) = match rest.split_once('/') {
            Some((kind, path)) => (kind, path),
            None => (rest, ""),
        };
        Ok(Key {
            raw: raw.to_string(),
            scheme: scheme.to_string(),
            kind: KeyKind::parse(kind_str),
            path: path.to_string(),
        })
    }

    /// Resolve raw key material.
    ///
    /// `default` backs the `default` kind. Resolution is deterministic given
    /// the same environment and host.
    pub async fn material(&self, default: &[u8]) -> Result<Vec<u8>> {
        match self.kind {
            KeyKind::Raw => Ok(self.raw.as_bytes().to_vec()),
            KeyKind::Inline => Ok(self.path.as_bytes().to_vec()),
            KeyKind::Default => Ok(default.to_vec()),
            KeyKind::Mac => mac_material(),
            KeyKind::Env => {
                let name = self.path.trim_matches('/');
                let value = std::env::var(name).map_err(|_| {
                    Error::Config(format!("env key {name} was empty"))
                })?;
                if value.len() < 8 {
                    return Err(Error::Config(format!(
                        "invalid key length, expected min: 8 but had {}",
                        value.len()
                    )));
                }
                Ok(value.into_bytes())
            }
            KeyKind::Url => {
                let location = crate::store::local_path(&self.path);
                debug!(location = %location, "reading key material");
                Ok(tokio::fs::read(&location).await?)
            }
        }
    }
}

/// Derive machine-bound key material from the sorted set of local network
/// interface hardware addresses. Fails when no usable interface exists.
fn mac_material() -> Result<Vec<u8>> {
    let networks = sysinfo::Networks::new_with_refreshed_list();
    let mut macs: Vec<String> = networks
        .iter()
        .map(|(_, data)| data.mac_address().to_string())
        .filter(|mac| !mac.is_empty() && mac != "00:00:00:00:00:00")
        .collect();
    if macs.is_empty() {
        return Err(Error::Config(
            "no network interface with a hardware address".to_string(),
        ));
    }
    macs.sort();
    macs.dedup();
    let mut hasher = Sha256::new();
    for mac in &macs {
        hasher.update(mac.as_bytes());
    }
    Ok(hasher.finalize()[..8].to_vec())
}
