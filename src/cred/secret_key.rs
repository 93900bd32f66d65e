use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::crypt::{decrypt_field, encrypt_field};
use crate::error::{Error, Result};
use crate::kms::{Cipher, Key, Securable};

/// Named key/secret pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct SecretKey {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub secret: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub encrypted_secret: String,
}

impl SecretKey {
    /// Export the secret into the process environment under the key name.
    pub fn set_env(&self) -> Result<()> {
        if self.key.is_empty() {
            return Err(Error::MissingField("Key"));
        }
        std::env::set_var(&self.key, &self.secret);
        Ok(())
    }
}

#[async_trait]
impl Securable for SecretKey {
    async fn cipher(&mut self, cipher: &dyn Cipher, key: &Key) -> Result<()> {
        if self.secret.is_empty() {
            if !self.encrypted_secret.is_empty() {
                return Ok(());
            }
            return Err(Error::MissingField("Secret"));
        }
        encrypt_field(cipher, key, &mut self.secret, &mut self.encrypted_secret).await
    }

    async fn decipher(&mut self, cipher: &dyn Cipher, key: &Key) -> Result<()> {
        if self.encrypted_secret.is_empty() {
            if !self.secret.is_empty() {
                return Ok(());
            }
            return Err(Error::MissingField("EncryptedSecret"));
        }
        decrypt_field(cipher, key, &mut self.encrypted_secret, &mut self.secret).await
    }
}
