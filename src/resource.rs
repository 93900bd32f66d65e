//! Declarative secret locators.

use serde::{Deserialize, Serialize};

use crate::cred::TargetKind;
use crate::store::{Storage, StorageOption};

pub(crate) const DEFAULT_MAX_RETRY: u32 = 3;
pub(crate) const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Serialization format of a structured secret at rest.
///
/// When no explicit format is set on a [`Resource`], the URL extension
/// decides: `.yml`/`.yaml` mean YAML, everything else JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretFormat {
    Json,
    Yaml,
}

/// Where and how to fetch and decrypt a secret.
///
/// A resource with a fallback forms a singly linked, acyclic chain of
/// alternative locators tried wholesale on failure. Resources are never
/// mutated by the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Resource {
    /// Symbolic name, also the root key for template expansion.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "URL", skip_serializing_if = "String::is_empty")]
    pub url: String,
    /// Encryption key specifier; empty means no encryption.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub key: String,
    #[serde(skip_serializing_if = "is_zero_u32")]
    pub max_retry: u32,
    #[serde(skip_serializing_if = "is_zero_u64")]
    pub timeout_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<Box<Resource>>,
    /// Inline payload bypassing retrieval.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<u8>>,
    /// Explicit format override for in-memory resources without a real
    /// extension.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<SecretFormat>,
    /// Explicit decode target; None means auto-detect.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetKind>,
    #[serde(skip)]
    pub options: Vec<StorageOption>,
}

fn is_zero_u32(value: &u32) -> bool {
    *value == 0
}

fn is_zero_u64(value: &u64) -> bool {
    *value == 0
}

impl Resource {
    pub fn new(url: impl Into<String>, key: impl Into<String>) -> Self {
        Resource {
            url: url.into(),
            key: key.into(),
            ..Resource::default()
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_target(mut self, target: TargetKind) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_fallback(mut self, fallback: Resource) -> Self {
        self.fallback = Some(Box::new(fallback));
        self
    }

    pub fn with_data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn with_format(mut self, format: SecretFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_max_retry(mut self, max_retry: u32) -> Self {
        self.max_retry = max_retry;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Retry budget for retrieval; unset means 3 attempts.
    pub fn retries(&self) -> u32 {
        if self.max_retry == 0 {
            DEFAULT_MAX_RETRY
        } else {
            self.max_retry
        }
    }

    /// Per-attempt timeout; unset means 5000ms.
    pub fn timeout(&self) -> std::time::Duration {
        let ms = if self.timeout_ms == 0 {
            DEFAULT_TIMEOUT_MS
        } else {
            self.timeout_ms
        };
        std::time::Duration::from_millis(ms)
    }

    /// Serialization format for structured payloads: the explicit override
    /// when set, otherwise decided by the URL extension.
    pub fn secret_format(&self) -> SecretFormat {
        if let Some(format) = self.format {
            return format;
        }
        if self.has_yaml_extension() {
            SecretFormat::Yaml
        } else {
            SecretFormat::Json
        }
    }

    pub(crate) fn has_yaml_extension(&self) -> bool {
        let lower = self.url.to_lowercase();
        lower.ends_with(".yml") || lower.ends_with(".yaml")
    }

    pub fn validate(&self) -> crate::error::Result<()> {
        if self.url.is_empty() && self.data.is_none() {
            return Err(crate::error::Error::EmptyUrl);
        }
        Ok(())
    }
}

/// A resource encoded as a single `url|key` string.
///
/// A relative URL is run through [`discover_location`] before use.
pub struct EncodedResource(pub String);

impl EncodedResource {
    pub async fn decode(&self, storage: &dyn Storage, target: Option<TargetKind>) -> Resource {
        let (url, key) = match self.0.split_once('|') {
            Some((url, key)) => (url.to_string(), key.to_string()),
            None => (self.0.clone(), String::new()),
        };
        let url = discover_location(storage, &url).await;
        let mut resource = Resource::new(url, key);
        resource.target = target;
        resource
    }
}

/// Resolve a relative secret location by probing, in order: the location
/// itself, its `.json` variant when it has no extension, and both under
/// `~/.secret/`. The first candidate that exists in storage wins; with no
/// match the location is returned unchanged. Absolute locations pass
/// through untouched.
pub async fn discover_location(storage: &dyn Storage, location: &str) -> String {
    if !is_relative(location) {
        return location.to_string();
    }
    let bare = std::path::Path::new(location).extension().is_none();
    let mut candidates = vec![location.to_string()];
    if bare {
        candidates.push(format!("{location}.json"));
    }
    if let Some(home) = dirs::home_dir() {
        candidates.push(format!("{}/.secret/{}", home.display(), location));
        if bare {
            candidates.push(format!("{}/.secret/{}.json", home.display(), location));
        }
    }
    for candidate in &candidates {
        if storage.exists(candidate).await {
            return candidate.clone();
        }
    }
    location.to_string()
}

fn is_relative(url: &str) -> bool {
    !url.starts_with('/') && !url.starts_with('~') && !url.contains("://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let resource = Resource::new("/tmp/secret.json", "blowfish://default");
        assert_eq!(resource.retries(), 3);
        assert_eq!(resource.timeout(), std::time::Duration::from_millis(5000));
        assert_eq!(resource.secret_format(), SecretFormat::Json);
    }

    #[test]
    fn test_yaml_extension_selects_yaml() {
        assert_eq!(
            Resource::new("/tmp/secret.yml", "").secret_format(),
            SecretFormat::Yaml
        );
        assert_eq!(
            Resource::new("/tmp/SECRET.YAML", "").secret_format(),
            SecretFormat::Yaml
        );
        assert_eq!(
            Resource::new("/tmp/secret.json", "").secret_format(),
            SecretFormat::Json
        );
    }

    #[test]
    fn test_explicit_format_overrides_extension() {
        let resource = Resource::new("/tmp/secret.json", "").with_format(SecretFormat::Yaml);
        assert_eq!(resource.secret_format(), SecretFormat::Yaml);
    }

    #[test]
    fn test_validate_requires_url_or_data() {
        assert!(Resource::default().validate().is_err());
        assert!(Resource::new("/tmp/a", "").validate().is_ok());
        assert!(Resource::default().with_data(b"x".to_vec()).validate().is_ok());
    }

    #[tokio::test]
    async fn test_encoded_resource_splits_key() {
        let storage = crate::store::MemStorage::new();
        let resource = EncodedResource("/tmp/secret.json|blowfish://default".to_string())
            .decode(&storage, None)
            .await;
        assert_eq!(resource.url, "/tmp/secret.json");
        assert_eq!(resource.key, "blowfish://default");
    }

    #[tokio::test]
    async fn test_discover_adds_json_extension() {
        let storage = crate::store::MemStorage::new();
        storage
            .upload("mycred.json", 0o600, b"{}", &[])
            .await
            .unwrap();
        assert_eq!(discover_location(&storage, "mycred").await, "mycred.json");
    }

    #[tokio::test]
    async fn test_discover_leaves_unmatched_location() {
        let storage = crate::store::MemStorage::new();
        assert_eq!(discover_location(&storage, "absent").await, "absent");
        assert_eq!(
            discover_location(&storage, "/abs/path.json").await,
            "/abs/path.json"
        );
    }

    #[tokio::test]
    async fn test_encoded_resource_without_key() {
        let storage = crate::store::MemStorage::new();
        let resource = EncodedResource("/tmp/secret.json".to_string())
            .decode(&storage, None)
            .await;
        assert_eq!(resource.url, "/tmp/secret.json");
        assert!(resource.key.is_empty());
    }
}
