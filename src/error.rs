use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("resource url was empty")]
    EmptyUrl,

    #[error("secret payload was empty")]
    EmptyPayload,

    #[error("download failed for {url}: {reason}")]
    Retrieval { url: String, reason: String },

    #[error("download timed out after {timeout_ms}ms: {url}")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("upload failed for {url}: {reason}")]
    Upload { url: String, reason: String },

    #[error("no cipher registered for scheme: {0}")]
    UnknownScheme(String),

    #[error("invalid key specifier: {0}")]
    InvalidKey(String),

    #[error("encryption key is required by target type {0}")]
    KeyRequired(&'static str),

    #[error("{0} was empty")]
    MissingField(&'static str),

    #[error("config error: {0}")]
    Config(String),

    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("unknown secret target: {0}, avail: [aws, azure, basic, jwt, oauth2, rsa, secret_key, sha1, entry, ssh, generic]")]
    UnknownTarget(String),

    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
