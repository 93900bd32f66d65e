use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::crypt::{decrypt_field, encrypt_field};
use crate::error::{Error, Result};
use crate::kms::{Cipher, Key, Securable};

/// Basic username/password credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Basic {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub endpoint: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub password: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub encrypted_password: String,
}

#[async_trait]
impl Securable for Basic {
    async fn cipher(&mut self, cipher: &dyn Cipher, key: &Key) -> Result<()> {
        if self.password.is_empty() {
            if !self.encrypted_password.is_empty() {
                return Ok(());
            }
            return Err(Error::MissingField("Password"));
        }
        encrypt_field(cipher, key, &mut self.password, &mut self.encrypted_password).await
    }

    async fn decipher(&mut self, cipher: &dyn Cipher, key: &Key) -> Result<()> {
        if self.encrypted_password.is_empty() {
            if !self.password.is_empty() {
                return Ok(());
            }
            return Err(Error::MissingField("EncryptedPassword"));
        }
        decrypt_field(cipher, key, &mut self.encrypted_password, &mut self.password).await
    }
}
