//! Shared field-level encryption helpers.
//!
//! Every credential shape stores ciphertext base64-encoded in the
//! `Encrypted<Field>` sibling and clears the cleartext field afterwards;
//! decryption is the exact inverse.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use zeroize::Zeroize;

use crate::error::{Error, Result};
use crate::kms::{Cipher, Key};

/// Encrypt `value`, store it base64-encoded in `encrypted`, zeroize and clear
/// the cleartext.
pub(crate) async fn encrypt_field(
    cipher: &dyn Cipher,
    key: &Key,
    value: &mut String,
    encrypted: &mut String,
) -> Result<()> {
    let ciphertext = cipher.encrypt(key, value.as_bytes()).await?;
    *encrypted = STANDARD.encode(ciphertext);
    value.zeroize();
    Ok(())
}

/// Decode and decrypt `encrypted` into `value`, clearing the ciphertext.
pub(crate) async fn decrypt_field(
    cipher: &dyn Cipher,
    key: &Key,
    encrypted: &mut String,
    value: &mut String,
) -> Result<()> {
    let ciphertext = STANDARD.decode(encrypted.as_bytes())?;
    let plaintext = cipher.decrypt(key, &ciphertext).await?;
    *value = String::from_utf8(plaintext)
        .map_err(|e| Error::DecryptionFailed(format!("recovered plaintext was not utf-8: {e}")))?;
    encrypted.clear();
    Ok(())
}
