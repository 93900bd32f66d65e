use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::Oauth2Config;
use crate::error::Result;
use crate::kms::{Cipher, Key, Securable};

/// Azure OAuth2 configuration. The client secret is optional for public
/// clients; with no secret present, cipher and decipher are no-ops.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Azure {
    #[serde(flatten)]
    pub oauth2: Oauth2Config,
    #[serde(rename = "tenantId", skip_serializing_if = "String::is_empty")]
    pub tenant_id: String,
}

#[async_trait]
impl Securable for Azure {
    async fn cipher(&mut self, cipher: &dyn Cipher, key: &Key) -> Result<()> {
        if self.oauth2.client_secret.is_empty() {
            return Ok(());
        }
        self.oauth2.cipher(cipher, key).await
    }

    async fn decipher(&mut self, cipher: &dyn Cipher, key: &Key) -> Result<()> {
        if self.oauth2.encrypted_client_secret.is_empty() {
            return Ok(());
        }
        self.oauth2.decipher(cipher, key).await
    }
}
