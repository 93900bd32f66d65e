//! Resolved secret values and template expansion.

use std::fmt;

use zeroize::Zeroize;

use crate::cred::Credential;
use crate::error::{Error, Result};
use crate::resource::Resource;

/// A resolved secret: the locator it came from, the cleartext payload and,
/// for structured payloads, the decoded credential.
///
/// The payload is zeroized on drop.
pub struct Secret {
    pub resource: Resource,
    /// Decoded credential, None for opaque or undecoded payloads.
    pub target: Option<Credential>,
    payload: Vec<u8>,
    is_plain: bool,
}

impl Secret {
    /// A secret from raw payload bytes with no structured target.
    pub fn new(resource: Resource, payload: impl Into<Vec<u8>>) -> Self {
        let payload = payload.into();
        let is_plain = !looks_structured(&payload);
        Secret {
            resource,
            target: None,
            payload,
            is_plain,
        }
    }

    /// A secret from a decoded credential; the payload is the credential
    /// serialized in the resource's format.
    pub fn from_credential(resource: Resource, credential: Credential) -> Result<Self> {
        let payload = credential.encode(resource.secret_format())?;
        Ok(Secret {
            resource,
            target: Some(credential),
            payload,
            is_plain: false,
        })
    }

    pub(crate) fn with_parts(
        resource: Resource,
        target: Option<Credential>,
        payload: Vec<u8>,
        is_plain: bool,
    ) -> Self {
        Secret {
            resource,
            target,
            payload,
            is_plain,
        }
    }

    /// Whether the payload is an opaque scalar rather than a structured
    /// credential document.
    pub fn is_plain(&self) -> bool {
        self.is_plain
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn validate(&self) -> Result<()> {
        if self.payload.is_empty() && self.target.is_none() {
            return Err(Error::EmptyPayload);
        }
        self.resource.validate()
    }

    /// Deserialize the payload into a caller-supplied shape, honoring the
    /// resource's format.
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        match self.resource.secret_format() {
            crate::resource::SecretFormat::Json => Ok(serde_json::from_slice(&self.payload)?),
            crate::resource::SecretFormat::Yaml => Ok(serde_yaml::from_slice(&self.payload)?),
        }
    }

    /// Substitute `${name}` and `${name.field}` placeholders in `template`
    /// with values from this secret.
    ///
    /// A plain secret binds its resource name to the whole payload. A
    /// structured secret binds its resource name to the credential document
    /// and additionally merges the document's top-level fields at the root,
    /// so `${Password}` works alongside `${mydb.Password}`. Placeholders
    /// that resolve to nothing are left untouched.
    pub fn expand(&self, template: &str) -> Result<String> {
        let root = self.expansion_root()?;
        let pattern = regex::Regex::new(r"\$\{([A-Za-z0-9_.]+)\}")
            .map_err(|e| Error::Config(e.to_string()))?;
        let mut out = String::with_capacity(template.len());
        let mut last = 0;
        for captures in pattern.captures_iter(template) {
            let whole = captures.get(0).ok_or_else(placeholder_error)?;
            let path = captures.get(1).ok_or_else(placeholder_error)?.as_str();
            out.push_str(&template[last..whole.start()]);
            match resolve_path(&root, path) {
                Some(value) => out.push_str(&value),
                None => out.push_str(whole.as_str()),
            }
            last = whole.end();
        }
        out.push_str(&template[last..]);
        Ok(out)
    }

    fn expansion_root(&self) -> Result<serde_json::Value> {
        let mut root = serde_json::Map::new();
        if self.is_plain || self.target.is_none() {
            let text = String::from_utf8_lossy(&self.payload).into_owned();
            if !self.resource.name.is_empty() {
                root.insert(self.resource.name.clone(), serde_json::Value::String(text));
            }
            return Ok(serde_json::Value::Object(root));
        }
        let document = match &self.target {
            Some(credential) => credential.to_value()?,
            None => serde_json::Value::Null,
        };
        if let serde_json::Value::Object(fields) = &document {
            for (name, value) in fields {
                root.insert(name.clone(), value.clone());
            }
        }
        if !self.resource.name.is_empty() {
            root.insert(self.resource.name.clone(), document);
        }
        Ok(serde_json::Value::Object(root))
    }
}

fn placeholder_error() -> Error {
    Error::Config("malformed expansion placeholder".to_string())
}

/// Walk a dotted path through a JSON document, rendering the leaf as text.
fn resolve_path(root: &serde_json::Value, path: &str) -> Option<String> {
    let mut current = root;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    match current {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Whether a payload is a structured JSON document rather than an opaque
/// scalar. YAML payloads are classified by the resource extension upstream.
pub(crate) fn looks_structured(payload: &[u8]) -> bool {
    let trimmed = match std::str::from_utf8(payload) {
        Ok(text) => text.trim_start(),
        Err(_) => return false,
    };
    if !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
        return false;
    }
    serde_json::from_str::<serde_json::Value>(trimmed).is_ok()
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.payload))
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secret")
            .field("resource", &self.resource.url)
            .field("is_plain", &self.is_plain)
            .field("payload", &"***")
            .finish()
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        self.payload.zeroize();
    }
}
