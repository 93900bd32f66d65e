//! Secret resolution service.
//!
//! [`Service`] ties the layers together: it fetches bytes through a
//! [`Storage`] backend, resolves the cipher named by a resource's key
//! specifier against a [`CipherRegistry`], and applies field-level or
//! whole-blob protection depending on the decoded credential shape.

use std::sync::Arc;
use std::time::Duration;

use async_recursion::async_recursion;
use tracing::{debug, warn};

use crate::cred::{Credential, TargetKind};
use crate::error::{Error, Result};
use crate::kms::{Cipher, CipherRegistry, Key};
use crate::resource::{Resource, SecretFormat};
use crate::secret::{looks_structured, Secret};
use crate::store::{FsStorage, Storage};

const SECRET_FILE_MODE: u32 = 0o600;

pub struct Service {
    storage: Arc<dyn Storage>,
    ciphers: Arc<CipherRegistry>,
}

impl Service {
    /// Service over the local filesystem with the built-in cipher schemes.
    pub fn new() -> Self {
        Self::with(Arc::new(FsStorage), Arc::new(CipherRegistry::with_defaults()))
    }

    /// Service over explicit storage and cipher wiring.
    pub fn with(storage: Arc<dyn Storage>, ciphers: Arc<CipherRegistry>) -> Self {
        Service { storage, ciphers }
    }

    pub fn ciphers(&self) -> &CipherRegistry {
        &self.ciphers
    }

    /// Resolve a secret: fetch, decrypt, decode.
    ///
    /// On failure, the resource's fallback chain is tried in order; the
    /// first resource that resolves wins. The final error is the one from
    /// the last link of the chain.
    #[async_recursion]
    pub async fn load(&self, resource: &Resource) -> Result<Secret> {
        resource.validate()?;
        match self.load_once(resource).await {
            Ok(secret) => Ok(secret),
            Err(err) => match &resource.fallback {
                Some(fallback) => {
                    warn!(url = %resource.url, error = %err, "load failed, trying fallback");
                    self.load(fallback).await
                }
                None => Err(err),
            },
        }
    }

    async fn load_once(&self, resource: &Resource) -> Result<Secret> {
        let mut payload = self.fetch(resource).await?;
        let cipher_key = self.resolve_cipher(resource)?;
        let format = resource.secret_format();

        let mut structured = is_structured(format, &payload);
        // an unstructured payload under a key is an opaque ciphertext blob
        if let Some((cipher, key)) = &cipher_key {
            if !structured {
                payload = cipher.decrypt(key, &payload).await?;
                structured = is_structured(format, &payload);
            }
        }

        // decoding happens only for structured content; a named resource
        // without an explicit target stays undecoded
        let target = match resource.target {
            Some(kind) if structured => Some(kind),
            None if structured && resource.name.is_empty() => Some(TargetKind::Generic),
            _ => None,
        };
        let Some(kind) = target else {
            debug!(url = %resource.url, "resolved opaque secret");
            return Ok(Secret::with_parts(resource.clone(), None, payload, !structured));
        };

        let mut credential = Credential::decode(kind, &payload, format)?;
        match (credential.as_securable_mut(), &cipher_key) {
            (Some(securable), Some((cipher, key))) => {
                securable.decipher(cipher.as_ref(), key).await?;
            }
            (Some(_), None) => {
                // auto-detected generics tolerate plaintext files; an
                // explicit securable target demands a key
                if resource.target.is_some() && kind != TargetKind::Generic {
                    return Err(Error::KeyRequired(kind.name()));
                }
            }
            (None, _) => {}
        }
        let payload = credential.encode(format)?;
        debug!(url = %resource.url, target = kind.name(), "resolved secret");
        Ok(Secret::with_parts(
            resource.clone(),
            Some(credential),
            payload,
            false,
        ))
    }

    /// Persist a secret at its resource location.
    ///
    /// The caller's secret is not mutated: protection is applied to a copy.
    /// A credential with field-level encryption has its sensitive fields
    /// ciphered and requires a key; anything else is encrypted whole-blob
    /// when the resource carries a key. On upload failure the fallback chain
    /// is walked, re-uploading the same payload.
    pub async fn store(&self, secret: &Secret) -> Result<()> {
        secret.validate()?;
        let resource = &secret.resource;
        let cipher_key = self.resolve_cipher(resource)?;
        let format = resource.secret_format();

        let payload = match &secret.target {
            Some(credential) => {
                let mut outgoing = credential.clone();
                let kind = outgoing.kind();
                let field_level = match outgoing.as_securable_mut() {
                    Some(securable) => {
                        let Some((cipher, key)) = &cipher_key else {
                            return Err(Error::KeyRequired(kind.name()));
                        };
                        securable.cipher(cipher.as_ref(), key).await?;
                        true
                    }
                    None => false,
                };
                let encoded = outgoing.encode(format)?;
                match &cipher_key {
                    Some((cipher, key)) if !field_level => {
                        cipher.encrypt(key, &encoded).await?
                    }
                    _ => encoded,
                }
            }
            None => match &cipher_key {
                Some((cipher, key)) => cipher.encrypt(key, secret.payload()).await?,
                None => secret.payload().to_vec(),
            },
        };

        let mut destination = Some(resource);
        let mut last_err = Error::EmptyUrl;
        while let Some(current) = destination {
            debug!(url = %current.url, bytes = payload.len(), "storing secret");
            match self
                .storage
                .upload(&current.url, SECRET_FILE_MODE, &payload, &current.options)
                .await
            {
                Ok(()) => return Ok(()),
                Err(err) => {
                    warn!(url = %current.url, error = %err, "upload failed");
                    last_err = err;
                }
            }
            destination = current.fallback.as_deref();
        }
        Err(last_err)
    }

    fn resolve_cipher(&self, resource: &Resource) -> Result<Option<(Arc<dyn Cipher>, Key)>> {
        if resource.key.is_empty() {
            return Ok(None);
        }
        let key = Key::parse(&resource.key)?;
        let cipher = self.ciphers.lookup(&key.scheme)?;
        Ok(Some((cipher, key)))
    }

    async fn fetch(&self, resource: &Resource) -> Result<Vec<u8>> {
        if let Some(data) = &resource.data {
            return Ok(data.clone());
        }
        let timeout = resource.timeout();
        let mut last_err = Error::Retrieval {
            url: resource.url.clone(),
            reason: "no attempt made".to_string(),
        };
        for attempt in 0..resource.retries() {
            if attempt > 0 {
                tokio::time::sleep(Duration::from_millis(100 * u64::from(attempt))).await;
            }
            let download = self.storage.download(&resource.url, &resource.options);
            match tokio::time::timeout(timeout, download).await {
                Ok(Ok(data)) => return Ok(data),
                Ok(Err(err)) => {
                    warn!(url = %resource.url, attempt, error = %err, "download failed");
                    last_err = err;
                }
                Err(_) => {
                    warn!(url = %resource.url, attempt, "download timed out");
                    last_err = Error::Timeout {
                        url: resource.url.clone(),
                        timeout_ms: timeout.as_millis() as u64,
                    };
                }
            }
        }
        Err(last_err)
    }
}

impl Default for Service {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether a payload reads as a structured credential document in `format`.
fn is_structured(format: SecretFormat, payload: &[u8]) -> bool {
    match format {
        SecretFormat::Json => looks_structured(payload),
        SecretFormat::Yaml => serde_yaml::from_slice::<serde_yaml::Value>(payload)
            .map(|value| value.is_mapping())
            .unwrap_or(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemStorage;

    fn mem_service() -> (Service, Arc<MemStorage>) {
        let storage = Arc::new(MemStorage::new());
        let service = Service::with(
            storage.clone(),
            Arc::new(CipherRegistry::with_defaults()),
        );
        (service, storage)
    }

    #[tokio::test]
    async fn test_load_plain_secret() {
        let (service, storage) = mem_service();
        storage
            .upload("mem://localhost/token.txt", 0o600, b"abc123", &[])
            .await
            .unwrap();
        let secret = service
            .load(&Resource::new("mem://localhost/token.txt", ""))
            .await
            .unwrap();
        assert!(secret.is_plain());
        assert_eq!(secret.to_string(), "abc123");
    }

    #[tokio::test]
    async fn test_load_missing_resource_fails() {
        let (service, _) = mem_service();
        let err = service
            .load(&Resource::new("mem://localhost/absent.json", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Retrieval { .. }));
    }

    #[tokio::test]
    async fn test_load_uses_fallback() {
        let (service, storage) = mem_service();
        storage
            .upload("mem://localhost/backup.txt", 0o600, b"from-backup", &[])
            .await
            .unwrap();
        let resource = Resource::new("mem://localhost/primary.txt", "")
            .with_max_retry(1)
            .with_fallback(Resource::new("mem://localhost/backup.txt", ""));
        let secret = service.load(&resource).await.unwrap();
        assert_eq!(secret.to_string(), "from-backup");
    }

    #[tokio::test]
    async fn test_load_inline_data_skips_storage() {
        let (service, _) = mem_service();
        let resource = Resource::default().with_data(b"inline".to_vec());
        let secret = service.load(&resource).await.unwrap();
        assert_eq!(secret.to_string(), "inline");
    }

    #[tokio::test]
    async fn test_load_empty_resource_fails() {
        let (service, _) = mem_service();
        let err = service.load(&Resource::default()).await.unwrap_err();
        assert!(matches!(err, Error::EmptyUrl));
    }

    #[tokio::test]
    async fn test_unknown_scheme_fails() {
        let (service, storage) = mem_service();
        storage
            .upload("mem://localhost/a.json", 0o600, b"{}", &[])
            .await
            .unwrap();
        let err = service
            .load(&Resource::new("mem://localhost/a.json", "twofish://default"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnknownScheme(_)));
    }
}
