//! Google Cloud KMS cipher scheme.
//!
//! Encrypts blobs with Cloud KMS via the gcloud CLI. Enable with
//! `--features gcp`.
//!
//! ## Requirements
//!
//! - `gcloud` CLI must be installed and authenticated
//! - The caller must have cloudkms.cryptoKeyVersions.useToEncrypt and
//!   useToDecrypt permissions
//!
//! Keys use the `gcp://kms/projects/P/locations/L/keyRings/R/cryptoKeys/K`
//! grammar; a bare `projects/...` resource name is accepted as shorthand.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::trace;

use super::{Cipher, Key};
use crate::error::{Error, Result};

pub const SCHEME: &str = "gcp";

/// Cloud KMS cipher backed by the gcloud CLI.
pub struct GcpKms;

/// Split a `projects/*/locations/*/keyRings/*/cryptoKeys/*` resource name
/// into the components the gcloud command wants.
fn parse_resource_name(path: &str) -> Result<(String, String, String, String)> {
    let path = path.trim_start_matches('/');
    let path = path.strip_prefix("kms/").unwrap_or(path);
    let parts: Vec<&str> = path.split('/').collect();
    if parts.len() != 8
        || parts[0] != "projects"
        || parts[2] != "locations"
        || parts[4] != "keyRings"
        || parts[6] != "cryptoKeys"
    {
        return Err(Error::Config(format!(
            "invalid GCP KMS resource name format: {path}"
        )));
    }
    Ok((
        parts[1].to_string(),
        parts[3].to_string(),
        parts[5].to_string(),
        parts[7].to_string(),
    ))
}

async fn run_gcloud(action: &str, key: &Key, input: &[u8]) -> Result<Vec<u8>> {
    let (project, location, keyring, name) = parse_resource_name(&key.path)?;
    let (input_flag, output_flag) = match action {
        "encrypt" => ("--plaintext-file", "--ciphertext-file"),
        _ => ("--ciphertext-file", "--plaintext-file"),
    };
    let mut child = Command::new("gcloud")
        .args([
            "kms", action,
            "--project", &project,
            "--location", &location,
            "--keyring", &keyring,
            "--key", &name,
            input_flag, "-",
            output_flag, "-",
        ])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| Error::Config(format!("failed to spawn gcloud: {e}")))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(input)
            .await
            .map_err(|e| Error::Config(format!("failed to write to gcloud: {e}")))?;
    }
    let output = child
        .wait_with_output()
        .await
        .map_err(|e| Error::Config(format!("gcloud command failed: {e}")))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Config(format!("gcloud kms {action} failed: {stderr}")));
    }
    Ok(output.stdout)
}

#[async_trait]
impl Cipher for GcpKms {
    async fn encrypt(&self, key: &Key, data: &[u8]) -> Result<Vec<u8>> {
        trace!(key = %key.path, plaintext_len = data.len(), "encrypting with Cloud KMS");
        run_gcloud("encrypt", key, data)
            .await
            .map_err(|e| Error::EncryptionFailed(e.to_string()))
    }

    async fn decrypt(&self, key: &Key, data: &[u8]) -> Result<Vec<u8>> {
        trace!(key = %key.path, ciphertext_len = data.len(), "decrypting with Cloud KMS");
        run_gcloud("decrypt", key, data)
            .await
            .map_err(|e| Error::DecryptionFailed(e.to_string()))
    }
}
