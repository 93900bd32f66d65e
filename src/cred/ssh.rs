use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::crypt::{decrypt_field, encrypt_field};
use super::Basic;
use crate::error::Result;
use crate::kms::{Cipher, Key, Securable};
use crate::store::local_path;

/// SSH credentials: basic auth plus an optional private key with passphrase.
///
/// A private key referenced by path (not inline) is left on disk and is not
/// encrypted into the record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Ssh {
    #[serde(flatten)]
    pub basic: Basic,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub private_key_path: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub private_key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub private_key_password: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub encrypted_private_key_password: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub encrypted_private_key: String,
}

impl Ssh {
    /// Read the private key from `private_key_path` when only the path is
    /// set. No-op when the key is already inline or no path was given.
    pub async fn load_private_key(&mut self) -> Result<()> {
        if !self.private_key.is_empty() || self.private_key_path.is_empty() {
            return Ok(());
        }
        self.private_key = tokio::fs::read_to_string(local_path(&self.private_key_path)).await?;
        Ok(())
    }
}

#[async_trait]
impl Securable for Ssh {
    /// Ciphers embedded parts in a fixed order: basic password, private-key
    /// password, private key. Fields already in ciphertext form are skipped.
    async fn cipher(&mut self, cipher: &dyn Cipher, key: &Key) -> Result<()> {
        self.basic.cipher(cipher, key).await?;
        // a key referenced by path stays external, its password stays usable
        if !self.private_key_password.is_empty()
            && self.private_key_path.is_empty()
            && self.encrypted_private_key_password.is_empty()
        {
            encrypt_field(
                cipher,
                key,
                &mut self.private_key_password,
                &mut self.encrypted_private_key_password,
            )
            .await?;
        }
        if !self.private_key.is_empty() && self.encrypted_private_key.is_empty() {
            encrypt_field(cipher, key, &mut self.private_key, &mut self.encrypted_private_key)
                .await?;
        }
        Ok(())
    }

    async fn decipher(&mut self, cipher: &dyn Cipher, key: &Key) -> Result<()> {
        self.basic.decipher(cipher, key).await?;
        if self.private_key_password.is_empty() && !self.encrypted_private_key_password.is_empty()
        {
            decrypt_field(
                cipher,
                key,
                &mut self.encrypted_private_key_password,
                &mut self.private_key_password,
            )
            .await?;
        }
        if self.private_key.is_empty() && !self.encrypted_private_key.is_empty() {
            decrypt_field(cipher, key, &mut self.encrypted_private_key, &mut self.private_key)
                .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kms::blowfish::Blowfish;

    fn key() -> Key {
        Key::parse("blowfish://default").unwrap()
    }

    #[tokio::test]
    async fn test_cipher_decipher_roundtrip() {
        let cipher = Blowfish;
        let mut ssh = Ssh {
            basic: Basic {
                username: "deploy".to_string(),
                password: "pw".to_string(),
                ..Basic::default()
            },
            private_key: "-----BEGIN KEY-----".to_string(),
            private_key_password: "passphrase".to_string(),
            ..Ssh::default()
        };
        let expected = ssh.clone();

        ssh.cipher(&cipher, &key()).await.unwrap();
        assert!(ssh.basic.password.is_empty());
        assert!(ssh.private_key.is_empty());
        assert!(ssh.private_key_password.is_empty());
        assert!(!ssh.encrypted_private_key.is_empty());

        ssh.decipher(&cipher, &key()).await.unwrap();
        assert_eq!(ssh, expected);
    }

    #[tokio::test]
    async fn test_cipher_skips_key_referenced_by_path() {
        let cipher = Blowfish;
        let mut ssh = Ssh {
            basic: Basic {
                password: "pw".to_string(),
                ..Basic::default()
            },
            private_key_path: "/home/u/.ssh/id_ed25519".to_string(),
            private_key_password: "passphrase".to_string(),
            ..Ssh::default()
        };
        ssh.cipher(&cipher, &key()).await.unwrap();
        assert_eq!(ssh.private_key_password, "passphrase");
        assert!(ssh.encrypted_private_key_password.is_empty());
    }

    #[tokio::test]
    async fn test_cipher_does_not_double_encrypt() {
        let cipher = Blowfish;
        let mut ssh = Ssh {
            basic: Basic {
                password: "pw".to_string(),
                ..Basic::default()
            },
            encrypted_private_key: "already-ciphertext".to_string(),
            ..Ssh::default()
        };
        ssh.cipher(&cipher, &key()).await.unwrap();
        assert_eq!(ssh.encrypted_private_key, "already-ciphertext");
    }

    #[tokio::test]
    async fn test_load_private_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("id_rsa");
        std::fs::write(&path, "key material").unwrap();
        let mut ssh = Ssh {
            private_key_path: path.display().to_string(),
            ..Ssh::default()
        };
        ssh.load_private_key().await.unwrap();
        assert_eq!(ssh.private_key, "key material");
    }

    #[test]
    fn test_flattened_serialization() {
        let ssh = Ssh {
            basic: Basic {
                username: "u".to_string(),
                ..Basic::default()
            },
            private_key_path: "/k".to_string(),
            ..Ssh::default()
        };
        let json = serde_json::to_value(&ssh).unwrap();
        assert_eq!(json["Username"], "u");
        assert_eq!(json["PrivateKeyPath"], "/k");
    }
}
