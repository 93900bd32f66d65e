use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::error::{Error, Result};
use crate::kms::{Cipher, Key, Securable};

/// SHA1 signing secrets: a key and an integrity key, both required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Sha1 {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub encrypted_key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub integrity_key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub encrypted_integrity_key: String,
}

#[async_trait]
impl Securable for Sha1 {
    /// Both ciphertexts are computed before either field is mutated, so a
    /// failure never leaves a half-encrypted record.
    async fn cipher(&mut self, cipher: &dyn Cipher, key: &Key) -> Result<()> {
        if self.key.is_empty() {
            return Err(Error::MissingField("Key"));
        }
        if self.integrity_key.is_empty() {
            return Err(Error::MissingField("IntegrityKey"));
        }
        let encrypted_key = cipher
            .encrypt(key, self.key.as_bytes())
            .await
            .map_err(|e| Error::EncryptionFailed(format!("failed to encrypt key: {e}")))?;
        let encrypted_integrity = cipher
            .encrypt(key, self.integrity_key.as_bytes())
            .await
            .map_err(|e| Error::EncryptionFailed(format!("failed to encrypt integrityKey: {e}")))?;
        self.encrypted_key = STANDARD.encode(encrypted_key);
        self.encrypted_integrity_key = STANDARD.encode(encrypted_integrity);
        self.key.zeroize();
        self.integrity_key.zeroize();
        Ok(())
    }

    async fn decipher(&mut self, cipher: &dyn Cipher, key: &Key) -> Result<()> {
        if self.encrypted_key.is_empty() && self.encrypted_integrity_key.is_empty() {
            if !self.key.is_empty() && !self.integrity_key.is_empty() {
                return Ok(());
            }
            return Err(Error::MissingField("EncryptedKey"));
        }
        if self.encrypted_key.is_empty() {
            return Err(Error::MissingField("EncryptedKey"));
        }
        if self.encrypted_integrity_key.is_empty() {
            return Err(Error::MissingField("EncryptedIntegrityKey"));
        }
        let decrypted_key = cipher
            .decrypt(key, &STANDARD.decode(self.encrypted_key.as_bytes())?)
            .await
            .map_err(|e| Error::DecryptionFailed(format!("failed to decrypt key: {e}")))?;
        let decrypted_integrity = cipher
            .decrypt(key, &STANDARD.decode(self.encrypted_integrity_key.as_bytes())?)
            .await
            .map_err(|e| Error::DecryptionFailed(format!("failed to decrypt integrityKey: {e}")))?;
        self.key = String::from_utf8(decrypted_key)
            .map_err(|e| Error::DecryptionFailed(e.to_string()))?;
        self.integrity_key = String::from_utf8(decrypted_integrity)
            .map_err(|e| Error::DecryptionFailed(e.to_string()))?;
        self.encrypted_key.clear();
        self.encrypted_integrity_key.clear();
        Ok(())
    }
}
