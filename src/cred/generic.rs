use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{Aws, Entry, JwtConfig, Ssh};
use crate::error::{Error, Result};
use crate::kms::{Cipher, Key, Securable};

/// Which embedded part of a [`Generic`] credential carries the sensitive
/// material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenericKind {
    Basic,
    Ssh,
    Entry,
}

/// Catch-all credential used as the default decode target.
///
/// Composes SSH (which embeds Basic), a JWT config, AWS credentials and a
/// free-form entry, all flattened into one record. The optional `Kind`
/// discriminant selects which embedded part cipher/decipher operate on; when
/// absent, dispatch falls back to field presence, and an ambiguous state
/// (both a password and an entry value populated) is a hard error rather
/// than a guess.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Generic {
    #[serde(rename = "Kind", skip_serializing_if = "Option::is_none")]
    pub kind: Option<GenericKind>,
    #[serde(flatten)]
    pub ssh: Ssh,
    #[serde(flatten)]
    pub jwt: JwtConfig,
    #[serde(flatten)]
    pub aws: Aws,
    #[serde(flatten)]
    pub entry: Entry,
}

impl Generic {
    fn cipher_kind(&self) -> Result<Option<GenericKind>> {
        if self.kind.is_some() {
            return Ok(self.kind);
        }
        let has_password = !self.ssh.basic.password.is_empty();
        let has_value = !self.entry.value.is_empty();
        match (has_password, has_value) {
            (true, true) => Err(Error::Config(
                "ambiguous generic credential: both Password and Value are set, set Kind to disambiguate".to_string(),
            )),
            (true, false) => {
                if self.ssh.private_key_password.is_empty() {
                    Ok(Some(GenericKind::Basic))
                } else {
                    Ok(Some(GenericKind::Ssh))
                }
            }
            (false, true) => Ok(Some(GenericKind::Entry)),
            (false, false) => Ok(None),
        }
    }

    fn decipher_kind(&self) -> Result<Option<GenericKind>> {
        if self.kind.is_some() {
            return Ok(self.kind);
        }
        let has_password = !self.ssh.basic.encrypted_password.is_empty();
        let has_value = !self.entry.encrypted_value.is_empty();
        match (has_password, has_value) {
            (true, true) => Err(Error::Config(
                "ambiguous generic credential: both EncryptedPassword and EncryptedValue are set, set Kind to disambiguate".to_string(),
            )),
            (true, false) => {
                if self.ssh.encrypted_private_key_password.is_empty() {
                    Ok(Some(GenericKind::Basic))
                } else {
                    Ok(Some(GenericKind::Ssh))
                }
            }
            (false, true) => Ok(Some(GenericKind::Entry)),
            (false, false) => Ok(None),
        }
    }
}

#[async_trait]
impl Securable for Generic {
    /// No-op when no sensitive field is populated: a generic credential may
    /// legitimately hold cleartext only.
    async fn cipher(&mut self, cipher: &dyn Cipher, key: &Key) -> Result<()> {
        match self.cipher_kind()? {
            Some(GenericKind::Basic) => self.ssh.basic.cipher(cipher, key).await,
            Some(GenericKind::Ssh) => self.ssh.cipher(cipher, key).await,
            Some(GenericKind::Entry) => self.entry.cipher(cipher, key).await,
            None => Ok(()),
        }
    }

    async fn decipher(&mut self, cipher: &dyn Cipher, key: &Key) -> Result<()> {
        match self.decipher_kind()? {
            Some(GenericKind::Basic) => self.ssh.basic.decipher(cipher, key).await,
            Some(GenericKind::Ssh) => self.ssh.decipher(cipher, key).await,
            Some(GenericKind::Entry) => self.entry.decipher(cipher, key).await,
            None => Ok(()),
        }
    }
}
