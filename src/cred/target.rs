use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{Aws, Azure, Basic, Entry, Generic, JwtConfig, Oauth2Config, Rsa, SecretKey, Sha1, Ssh};
use crate::error::{Error, Result};
use crate::kms::Securable;
use crate::resource::SecretFormat;

/// Names a credential shape a payload decodes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Aws,
    Azure,
    Basic,
    Jwt,
    Oauth2,
    Rsa,
    SecretKey,
    Sha1,
    Entry,
    Ssh,
    Generic,
}

impl TargetKind {
    /// Parse a target name. Empty and `raw` mean "no target" (an opaque
    /// payload); unknown names are an error.
    pub fn parse(name: &str) -> Result<Option<TargetKind>> {
        let kind = match name {
            "" | "raw" => return Ok(None),
            "aws" => TargetKind::Aws,
            "azure" => TargetKind::Azure,
            "basic" => TargetKind::Basic,
            "jwt" => TargetKind::Jwt,
            "oauth2" => TargetKind::Oauth2,
            "rsa" => TargetKind::Rsa,
            "secret_key" => TargetKind::SecretKey,
            "sha1" => TargetKind::Sha1,
            "entry" => TargetKind::Entry,
            "ssh" => TargetKind::Ssh,
            "generic" => TargetKind::Generic,
            other => return Err(Error::UnknownTarget(other.to_string())),
        };
        Ok(Some(kind))
    }

    pub fn name(&self) -> &'static str {
        match self {
            TargetKind::Aws => "aws",
            TargetKind::Azure => "azure",
            TargetKind::Basic => "basic",
            TargetKind::Jwt => "jwt",
            TargetKind::Oauth2 => "oauth2",
            TargetKind::Rsa => "rsa",
            TargetKind::SecretKey => "secret_key",
            TargetKind::Sha1 => "sha1",
            TargetKind::Entry => "entry",
            TargetKind::Ssh => "ssh",
            TargetKind::Generic => "generic",
        }
    }
}

/// A decoded credential of any shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Credential {
    Aws(Aws),
    Azure(Azure),
    Basic(Basic),
    Jwt(JwtConfig),
    Oauth2(Oauth2Config),
    Rsa(Rsa),
    SecretKey(SecretKey),
    Sha1(Sha1),
    Entry(Entry),
    Ssh(Ssh),
    Generic(Generic),
}

fn decode_value<T: DeserializeOwned>(data: &[u8], format: SecretFormat) -> Result<T> {
    match format {
        SecretFormat::Json => Ok(serde_json::from_slice(data)?),
        SecretFormat::Yaml => Ok(serde_yaml::from_slice(data)?),
    }
}

fn encode_value<T: Serialize>(value: &T, format: SecretFormat) -> Result<Vec<u8>> {
    match format {
        SecretFormat::Json => Ok(serde_json::to_vec(value)?),
        SecretFormat::Yaml => Ok(serde_yaml::to_string(value)?.into_bytes()),
    }
}

impl Credential {
    /// Decode `data` into a fresh instance of the `kind` shape.
    pub fn decode(kind: TargetKind, data: &[u8], format: SecretFormat) -> Result<Credential> {
        Ok(match kind {
            TargetKind::Aws => Credential::Aws(decode_value(data, format)?),
            TargetKind::Azure => Credential::Azure(decode_value(data, format)?),
            TargetKind::Basic => Credential::Basic(decode_value(data, format)?),
            TargetKind::Jwt => Credential::Jwt(decode_value(data, format)?),
            TargetKind::Oauth2 => Credential::Oauth2(decode_value(data, format)?),
            TargetKind::Rsa => Credential::Rsa(decode_value(data, format)?),
            TargetKind::SecretKey => Credential::SecretKey(decode_value(data, format)?),
            TargetKind::Sha1 => Credential::Sha1(decode_value(data, format)?),
            TargetKind::Entry => Credential::Entry(decode_value(data, format)?),
            TargetKind::Ssh => Credential::Ssh(decode_value(data, format)?),
            TargetKind::Generic => Credential::Generic(decode_value(data, format)?),
        })
    }

    /// Serialize the credential in `format`.
    pub fn encode(&self, format: SecretFormat) -> Result<Vec<u8>> {
        match self {
            Credential::Aws(v) => encode_value(v, format),
            Credential::Azure(v) => encode_value(v, format),
            Credential::Basic(v) => encode_value(v, format),
            Credential::Jwt(v) => encode_value(v, format),
            Credential::Oauth2(v) => encode_value(v, format),
            Credential::Rsa(v) => encode_value(v, format),
            Credential::SecretKey(v) => encode_value(v, format),
            Credential::Sha1(v) => encode_value(v, format),
            Credential::Entry(v) => encode_value(v, format),
            Credential::Ssh(v) => encode_value(v, format),
            Credential::Generic(v) => encode_value(v, format),
        }
    }

    pub fn kind(&self) -> TargetKind {
        match self {
            Credential::Aws(_) => TargetKind::Aws,
            Credential::Azure(_) => TargetKind::Azure,
            Credential::Basic(_) => TargetKind::Basic,
            Credential::Jwt(_) => TargetKind::Jwt,
            Credential::Oauth2(_) => TargetKind::Oauth2,
            Credential::Rsa(_) => TargetKind::Rsa,
            Credential::SecretKey(_) => TargetKind::SecretKey,
            Credential::Sha1(_) => TargetKind::Sha1,
            Credential::Entry(_) => TargetKind::Entry,
            Credential::Ssh(_) => TargetKind::Ssh,
            Credential::Generic(_) => TargetKind::Generic,
        }
    }

    /// The field-level encryption capability, when the shape has one.
    /// JWT configs carry no encrypted siblings and are protected whole-blob.
    pub fn as_securable_mut(&mut self) -> Option<&mut dyn Securable> {
        match self {
            Credential::Aws(v) => Some(v),
            Credential::Azure(v) => Some(v),
            Credential::Basic(v) => Some(v),
            Credential::Jwt(_) => None,
            Credential::Oauth2(v) => Some(v),
            Credential::Rsa(v) => Some(v),
            Credential::SecretKey(v) => Some(v),
            Credential::Sha1(v) => Some(v),
            Credential::Entry(v) => Some(v),
            Credential::Ssh(v) => Some(v),
            Credential::Generic(v) => Some(v),
        }
    }

    /// The credential as a JSON value, for template expansion.
    pub fn to_value(&self) -> Result<serde_json::Value> {
        match self {
            Credential::Aws(v) => Ok(serde_json::to_value(v)?),
            Credential::Azure(v) => Ok(serde_json::to_value(v)?),
            Credential::Basic(v) => Ok(serde_json::to_value(v)?),
            Credential::Jwt(v) => Ok(serde_json::to_value(v)?),
            Credential::Oauth2(v) => Ok(serde_json::to_value(v)?),
            Credential::Rsa(v) => Ok(serde_json::to_value(v)?),
            Credential::SecretKey(v) => Ok(serde_json::to_value(v)?),
            Credential::Sha1(v) => Ok(serde_json::to_value(v)?),
            Credential::Entry(v) => Ok(serde_json::to_value(v)?),
            Credential::Ssh(v) => Ok(serde_json::to_value(v)?),
            Credential::Generic(v) => Ok(serde_json::to_value(v)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_targets() {
        assert_eq!(TargetKind::parse("basic").unwrap(), Some(TargetKind::Basic));
        assert_eq!(TargetKind::parse("ssh").unwrap(), Some(TargetKind::Ssh));
        assert_eq!(
            TargetKind::parse("generic").unwrap(),
            Some(TargetKind::Generic)
        );
    }

    #[test]
    fn test_parse_raw_means_no_target() {
        assert_eq!(TargetKind::parse("").unwrap(), None);
        assert_eq!(TargetKind::parse("raw").unwrap(), None);
    }

    #[test]
    fn test_parse_unknown_target_fails() {
        assert!(TargetKind::parse("certificate").is_err());
    }

    #[test]
    fn test_decode_encode_json() {
        let data = br#"{"Username":"u","Password":"p"}"#;
        let credential =
            Credential::decode(TargetKind::Basic, data, SecretFormat::Json).unwrap();
        let Credential::Basic(basic) = &credential else {
            panic!("expected basic credential");
        };
        assert_eq!(basic.username, "u");
        let encoded = credential.encode(SecretFormat::Json).unwrap();
        assert_eq!(encoded, data);
    }

    #[test]
    fn test_decode_yaml() {
        let data = b"Username: alice\nPassword: sEcReT\n";
        let credential =
            Credential::decode(TargetKind::Generic, data, SecretFormat::Yaml).unwrap();
        let Credential::Generic(generic) = credential else {
            panic!("expected generic credential");
        };
        assert_eq!(generic.ssh.basic.username, "alice");
        assert_eq!(generic.ssh.basic.password, "sEcReT");
    }

    #[test]
    fn test_jwt_is_not_securable() {
        let mut credential = Credential::Jwt(JwtConfig::default());
        assert!(credential.as_securable_mut().is_none());
        let mut credential = Credential::Basic(Basic::default());
        assert!(credential.as_securable_mut().is_some());
    }
}
