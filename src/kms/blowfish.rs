//! Blowfish CBC cipher scheme.
//!
//! Ciphertext layout is `IV || CBC(ciphertext)` with a freshly generated
//! random IV of one block. Plaintext is padded with PKCS#7, so arbitrary
//! binary payloads round-trip. Key material is used verbatim when it fits
//! the cipher's 56-byte limit and is otherwise reduced to a SHA-256 digest.
//! A compiled-in default key backs the `default` kind so local development
//! can encrypt at rest with zero key management.

use async_trait::async_trait;
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use super::{Cipher, Key};
use crate::error::{Error, Result};

pub const SCHEME: &str = "blowfish";

const BLOCK_SIZE: usize = 8;

const DEFAULT_KEY: [u8; 8] = [0x24, 0x66, 0xDD, 0x87, 0x8B, 0x96, 0x3C, 0x9D];

type CbcEncryptor = cbc::Encryptor<blowfish::Blowfish>;
type CbcDecryptor = cbc::Decryptor<blowfish::Blowfish>;

/// Reduce key material to a length blowfish accepts: verbatim when ≤ 56
/// bytes, otherwise a 32-byte SHA-256 digest.
fn ensure_key(src: &[u8]) -> Vec<u8> {
    if src.len() <= 56 {
        return src.to_vec();
    }
    Sha256::digest(src).to_vec()
}

fn encrypt_blocks(material: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let mut iv = [0u8; BLOCK_SIZE];
    OsRng.fill_bytes(&mut iv);
    let encryptor = CbcEncryptor::new_from_slices(material, &iv)
        .map_err(|e| Error::EncryptionFailed(format!("invalid blowfish key: {e}")))?;
    let mut ciphertext = Vec::with_capacity(BLOCK_SIZE + data.len() + BLOCK_SIZE);
    ciphertext.extend_from_slice(&iv);
    ciphertext.extend_from_slice(&encryptor.encrypt_padded_vec_mut::<Pkcs7>(data));
    Ok(ciphertext)
}

fn decrypt_blocks(material: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    if data.len() < 2 * BLOCK_SIZE || data.len() % BLOCK_SIZE != 0 {
        return Err(Error::DecryptionFailed(
            "ciphertext is not a multiple of the cipher block size".to_string(),
        ));
    }
    let (iv, body) = data.split_at(BLOCK_SIZE);
    let decryptor = CbcDecryptor::new_from_slices(material, iv)
        .map_err(|e| Error::DecryptionFailed(format!("invalid blowfish key: {e}")))?;
    decryptor
        .decrypt_padded_vec_mut::<Pkcs7>(body)
        .map_err(|_| Error::DecryptionFailed("invalid padding".to_string()))
}

/// Blowfish CBC [`Cipher`], registered under the `blowfish` scheme.
pub struct Blowfish;

#[async_trait]
impl Cipher for Blowfish {
    async fn encrypt(&self, key: &Key, data: &[u8]) -> Result<Vec<u8>> {
        let mut material = ensure_key(&key.material(&DEFAULT_KEY).await?);
        let result = encrypt_blocks(&material, data);
        material.zeroize();
        result
    }

    async fn decrypt(&self, key: &Key, data: &[u8]) -> Result<Vec<u8>> {
        let mut material = ensure_key(&key.material(&DEFAULT_KEY).await?);
        let result = decrypt_blocks(&material, data);
        material.zeroize();
        result
    }
}
