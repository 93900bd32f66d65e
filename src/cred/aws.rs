use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::SecretKey;
use crate::error::Result;
use crate::kms::{Cipher, Key, Securable};

/// AWS credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Aws {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub endpoint: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub region: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<AwsSession>,
    #[serde(flatten)]
    pub secret_key: SecretKey,
}

/// Assumed-role session settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct AwsSession {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub role_arn: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
}

#[async_trait]
impl Securable for Aws {
    async fn cipher(&mut self, cipher: &dyn Cipher, key: &Key) -> Result<()> {
        self.secret_key.cipher(cipher, key).await
    }

    async fn decipher(&mut self, cipher: &dyn Cipher, key: &Key) -> Result<()> {
        self.secret_key.decipher(cipher, key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kms::blowfish::Blowfish;

    #[tokio::test]
    async fn test_cipher_delegates_to_secret_key() {
        let cipher = Blowfish;
        let key = Key::parse("blowfish://default").unwrap();
        let mut aws = Aws {
            id: "AKIA123".to_string(),
            region: "us-east-1".to_string(),
            secret_key: SecretKey {
                secret: "aws-secret".to_string(),
                ..SecretKey::default()
            },
            ..Aws::default()
        };
        aws.cipher(&cipher, &key).await.unwrap();
        assert!(aws.secret_key.secret.is_empty());
        aws.decipher(&cipher, &key).await.unwrap();
        assert_eq!(aws.secret_key.secret, "aws-secret");
    }

    #[test]
    fn test_flattened_serialization() {
        let aws = Aws {
            id: "AKIA123".to_string(),
            secret_key: SecretKey {
                secret: "s".to_string(),
                ..SecretKey::default()
            },
            ..Aws::default()
        };
        let json = serde_json::to_value(&aws).unwrap();
        assert_eq!(json["Id"], "AKIA123");
        assert_eq!(json["Secret"], "s");
    }
}
