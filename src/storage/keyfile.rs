//! Encrypted storage for the blockchain secret key
//!
//! The master key never has to sit on disk in the clear: it is sealed with
//! AES-256-GCM under a key derived from a passphrase with Argon2id. The
//! file is small JSON holding hex salt, nonce and ciphertext.

use crate::cipher::SecretKey;
use crate::error::{BlockchainError, Result};
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use zeroize::Zeroizing;

/// Environment variable holding the key file passphrase
pub const KEY_PASSWORD_ENV: &str = "SPO_KEY_PASSWORD";

const KEY_FILE_VERSION: u8 = 1;
const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Serialize, Deserialize)]
struct EncryptedKeyFile {
    version: u8,
    salt: String,
    nonce: String,
    ciphertext: String,
}

fn derive_key(password: &str, salt: &[u8]) -> Result<Zeroizing<[u8; 32]>> {
    use argon2::{Algorithm, Argon2, Params, Version};

    let params = Params::new(65536, 3, 1, Some(32))
        .map_err(|e| BlockchainError::Encryption(format!("Invalid Argon2 parameters: {e}")))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = Zeroizing::new([0u8; 32]);
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut key[..])
        .map_err(|e| BlockchainError::Encryption(format!("Key derivation failed: {e}")))?;
    Ok(key)
}

fn decode_field(name: &str, value: &str) -> Result<Vec<u8>> {
    hex::decode(value)
        .map_err(|e| BlockchainError::Encryption(format!("Invalid {name} in key file: {e}")))
}

pub fn write_encrypted_key(path: &Path, seckey: &SecretKey, password: &str) -> Result<()> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(BlockchainError::Encryption(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    let mut salt = [0u8; SALT_LEN];
    let mut nonce = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    rand::thread_rng().fill_bytes(&mut nonce);

    let key = derive_key(password, &salt)?;
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key[..]));
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), seckey.as_bytes().as_slice())
        .map_err(|e| BlockchainError::Encryption(format!("AES-256-GCM encryption failed: {e}")))?;

    let file = EncryptedKeyFile {
        version: KEY_FILE_VERSION,
        salt: hex::encode(salt),
        nonce: hex::encode(nonce),
        ciphertext: hex::encode(ciphertext),
    };
    let json = serde_json::to_string_pretty(&file)
        .map_err(|e| BlockchainError::Encryption(format!("Failed to encode key file: {e}")))?;
    fs::write(path, json)?;
    log::info!("Wrote encrypted key file {}", path.display());
    Ok(())
}

pub fn read_encrypted_key(path: &Path, password: &str) -> Result<SecretKey> {
    let json = fs::read_to_string(path)?;
    let file: EncryptedKeyFile = serde_json::from_str(&json)
        .map_err(|e| BlockchainError::Encryption(format!("Failed to parse key file: {e}")))?;
    if file.version != KEY_FILE_VERSION {
        return Err(BlockchainError::Encryption(format!(
            "Unsupported key file version {}",
            file.version
        )));
    }
    let salt = decode_field("salt", &file.salt)?;
    let nonce = decode_field("nonce", &file.nonce)?;
    if nonce.len() != NONCE_LEN {
        return Err(BlockchainError::Encryption(
            "AES-256-GCM requires a 12-byte nonce".to_string(),
        ));
    }
    let ciphertext = decode_field("ciphertext", &file.ciphertext)?;

    let key = derive_key(password, &salt)?;
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key[..]));
    let plaintext = Zeroizing::new(
        cipher
            .decrypt(Nonce::from_slice(&nonce), ciphertext.as_slice())
            .map_err(|_| {
                BlockchainError::Encryption("Wrong password or corrupted key file".to_string())
            })?,
    );
    SecretKey::from_bytes(&plaintext)
}
