use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::crypt::{decrypt_field, encrypt_field};
use crate::error::{Error, Result};
use crate::kms::{Cipher, Key, Securable};

/// Free-form key/value entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Entry {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub encrypted_value: String,
}

impl Entry {
    /// Export the value into the process environment under the key name.
    pub fn set_env(&self) -> Result<()> {
        if self.key.is_empty() {
            return Err(Error::MissingField("Key"));
        }
        std::env::set_var(&self.key, &self.value);
        Ok(())
    }
}

#[async_trait]
impl Securable for Entry {
    async fn cipher(&mut self, cipher: &dyn Cipher, key: &Key) -> Result<()> {
        if self.value.is_empty() {
            if !self.encrypted_value.is_empty() {
                return Ok(());
            }
            return Err(Error::MissingField("Value"));
        }
        encrypt_field(cipher, key, &mut self.value, &mut self.encrypted_value).await
    }

    async fn decipher(&mut self, cipher: &dyn Cipher, key: &Key) -> Result<()> {
        if self.encrypted_value.is_empty() {
            if !self.value.is_empty() {
                return Ok(());
            }
            return Err(Error::MissingField("EncryptedValue"));
        }
        decrypt_field(cipher, key, &mut self.encrypted_value, &mut self.value).await
    }
}
