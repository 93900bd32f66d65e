use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::crypt::{decrypt_field, encrypt_field};
use crate::error::{Error, Result};
use crate::kms::{Cipher, Key, Securable};

/// OAuth2 client configuration with a protected client secret.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Oauth2Config {
    #[serde(rename = "ClientID", skip_serializing_if = "String::is_empty")]
    pub client_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub client_secret: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub encrypted_client_secret: String,
    #[serde(rename = "AuthURL", skip_serializing_if = "String::is_empty")]
    pub auth_url: String,
    #[serde(rename = "TokenURL", skip_serializing_if = "String::is_empty")]
    pub token_url: String,
    #[serde(rename = "RedirectURL", skip_serializing_if = "String::is_empty")]
    pub redirect_url: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
}

#[async_trait]
impl Securable for Oauth2Config {
    async fn cipher(&mut self, cipher: &dyn Cipher, key: &Key) -> Result<()> {
        if self.client_secret.is_empty() {
            if !self.encrypted_client_secret.is_empty() {
                return Ok(());
            }
            return Err(Error::MissingField("ClientSecret"));
        }
        encrypt_field(
            cipher,
            key,
            &mut self.client_secret,
            &mut self.encrypted_client_secret,
        )
        .await
    }

    async fn decipher(&mut self, cipher: &dyn Cipher, key: &Key) -> Result<()> {
        if self.encrypted_client_secret.is_empty() {
            if !self.client_secret.is_empty() {
                return Ok(());
            }
            return Err(Error::MissingField("EncryptedClientSecret"));
        }
        decrypt_field(
            cipher,
            key,
            &mut self.encrypted_client_secret,
            &mut self.client_secret,
        )
        .await
    }
}
