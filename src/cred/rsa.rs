use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::error::{Error, Result};
use crate::kms::{Cipher, Key, Securable};

/// RSA key pair secrets: private and public key (base64-encoded PEM) plus an
/// optional passphrase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Rsa {
    #[serde(rename = "KeyID", skip_serializing_if = "String::is_empty")]
    pub key_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub password: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub encrypted_password: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub private_key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub public_key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub encrypted_private_key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub encrypted_public_key: String,
}

#[async_trait]
impl Securable for Rsa {
    /// All ciphertexts are computed before any field is mutated.
    async fn cipher(&mut self, cipher: &dyn Cipher, key: &Key) -> Result<()> {
        if self.private_key.is_empty() {
            return Err(Error::MissingField("PrivateKey"));
        }
        if self.public_key.is_empty() {
            return Err(Error::MissingField("PublicKey"));
        }
        let encrypted_private = cipher
            .encrypt(key, self.private_key.as_bytes())
            .await
            .map_err(|e| Error::EncryptionFailed(format!("failed to encrypt private key: {e}")))?;
        let encrypted_public = cipher
            .encrypt(key, self.public_key.as_bytes())
            .await
            .map_err(|e| Error::EncryptionFailed(format!("failed to encrypt public key: {e}")))?;
        let encrypted_password = if self.password.is_empty() {
            None
        } else {
            Some(
                cipher
                    .encrypt(key, self.password.as_bytes())
                    .await
                    .map_err(|e| {
                        Error::EncryptionFailed(format!("failed to encrypt password: {e}"))
                    })?,
            )
        };
        self.encrypted_private_key = STANDARD.encode(encrypted_private);
        self.encrypted_public_key = STANDARD.encode(encrypted_public);
        self.private_key.zeroize();
        self.public_key.zeroize();
        if let Some(encrypted) = encrypted_password {
            self.encrypted_password = STANDARD.encode(encrypted);
            self.password.zeroize();
        }
        Ok(())
    }

    async fn decipher(&mut self, cipher: &dyn Cipher, key: &Key) -> Result<()> {
        if self.encrypted_private_key.is_empty() && self.encrypted_public_key.is_empty() {
            if !self.private_key.is_empty() && !self.public_key.is_empty() {
                return Ok(());
            }
            return Err(Error::MissingField("EncryptedPrivateKey"));
        }
        if self.encrypted_private_key.is_empty() {
            return Err(Error::MissingField("EncryptedPrivateKey"));
        }
        if self.encrypted_public_key.is_empty() {
            return Err(Error::MissingField("EncryptedPublicKey"));
        }
        let private = cipher
            .decrypt(key, &STANDARD.decode(self.encrypted_private_key.as_bytes())?)
            .await
            .map_err(|e| Error::DecryptionFailed(format!("failed to decrypt private key: {e}")))?;
        let public = cipher
            .decrypt(key, &STANDARD.decode(self.encrypted_public_key.as_bytes())?)
            .await
            .map_err(|e| Error::DecryptionFailed(format!("failed to decrypt public key: {e}")))?;
        let password = if self.encrypted_password.is_empty() {
            None
        } else {
            Some(
                cipher
                    .decrypt(key, &STANDARD.decode(self.encrypted_password.as_bytes())?)
                    .await
                    .map_err(|e| {
                        Error::DecryptionFailed(format!("failed to decrypt password: {e}"))
                    })?,
            )
        };
        self.private_key =
            String::from_utf8(private).map_err(|e| Error::DecryptionFailed(e.to_string()))?;
        self.public_key =
            String::from_utf8(public).map_err(|e| Error::DecryptionFailed(e.to_string()))?;
        self.encrypted_private_key.clear();
        self.encrypted_public_key.clear();
        if let Some(password) = password {
            self.password =
                String::from_utf8(password).map_err(|e| Error::DecryptionFailed(e.to_string()))?;
            self.encrypted_password.clear();
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
    async fn test_cipher_decipher_roundtrip_with_password() {
        let cipher = Blowfish;
        let mut rsa = Rsa {
            key_id: "kid-1".to_string(),
            private_key: "private-pem".to_string(),
            public_key: "public-pem".to_string(),
            password: "passphrase".to_string(),
            ..Rsa::default()
        };
        let expected = rsa.clone();

        rsa.cipher(&cipher, &key()).await.unwrap();
        assert!(rsa.private_key.is_empty());
        assert!(rsa.public_key.is_empty());
        assert!(rsa.password.is_empty());

        rsa.decipher(&cipher, &key()).await.unwrap();
        assert_eq!(rsa, expected);
    }

    #[tokio::test]
    async fn test_cipher_password_is_optional() {
        let cipher = Blowfish;
        let mut rsa = Rsa {
            private_key: "private-pem".to_string(),
            public_key: "public-pem".to_string(),
            ..Rsa::default()
        };
        rsa.cipher(&cipher, &key()).await.unwrap();
        assert!(rsa.encrypted_password.is_empty());
        rsa.decipher(&cipher, &key()).await.unwrap();
        assert_eq!(rsa.private_key, "private-pem");
    }

    #[tokio::test]
    async fn test_cipher_requires_key_pair() {
        let cipher = Blowfish;
        let mut rsa = Rsa {
            private_key: "private-pem".to_string(),
            ..Rsa::default()
        };
        assert!(rsa.cipher(&cipher, &key()).await.is_err());
        // validation failed before any mutation
        assert_eq!(rsa.private_key, "private-pem");
    }
}
