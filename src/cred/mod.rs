//! Credential shapes.
//!
//! Plain data records pairing a cleartext field with an `Encrypted<Field>`
//! sibling; at most one of the pair is populated at any time. Shapes that
//! carry sensitive material implement [`crate::kms::Securable`] and encrypt
//! only their own fields. [`Generic`] is the catch-all decode target used
//! when a resource does not name an explicit shape.

mod aws;
mod azure;
mod basic;
pub(crate) mod crypt;
mod entry;
mod generic;
mod jwt;
mod oauth;
mod rsa;
mod secret_key;
mod sha1;
mod ssh;
mod target;

pub use aws::{Aws, AwsSession};
pub use azure::Azure;
pub use basic::Basic;
pub use entry::Entry;
pub use generic::{Generic, GenericKind};
pub use jwt::JwtConfig;
pub use oauth::Oauth2Config;
pub use rsa::Rsa;
pub use secret_key::SecretKey;
pub use sha1::Sha1;
pub use ssh::Ssh;
pub use target::{Credential, TargetKind};
