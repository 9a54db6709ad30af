//! Symmetric encryption for configuration files using AES-256-GCM
//!
//! Encrypted files carry the `.fer` suffix and hold a JSON envelope with a
//! base64 nonce and ciphertext. Keys are 32 raw bytes, stored on disk as
//! base64 text.

use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{Aead, AeadCore, KeyInit, OsRng}
};
use base64::{Engine as _, engine::general_purpose};
use errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Suffix appended to the name of an encrypted configuration file.
pub const ENCRYPTED_SUFFIX: &str = ".fer";

const ALGORITHM: &str = "AES-256-GCM";
const KEY_LEN: usize = 32;

#[derive(Error, Debug)]
pub enum EncryptionError {
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Invalid encrypted data format: {0}")]
    InvalidFormat(String),

    #[error("I/O error: {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error
    }
}

impl From<EncryptionError> for ConfigError {
    fn from(error: EncryptionError) -> Self {
        ConfigError::Decryption {
            reason: error.to_string()
        }
    }
}

/// Encrypted payload as written to a `.fer` file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedData {
    /// Base64-encoded ciphertext
    pub ciphertext: String,

    /// Base64-encoded nonce
    pub nonce: String,

    pub algorithm: String
}

/// A 256-bit key, wiped from memory on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey {
    bytes: [u8; KEY_LEN]
}

impl EncryptionKey {
    /// Accepts either exactly 32 raw bytes or base64 text encoding them.
    pub fn from_bytes(raw: &[u8]) -> Result<Self, EncryptionError> {
        if raw.len() == KEY_LEN {
            if let Ok(key) = Self::from_base64_text(raw) {
                return Ok(key);
            }
            let mut bytes = [0u8; KEY_LEN];
            bytes.copy_from_slice(raw);
            return Ok(Self { bytes });
        }
        Self::from_base64_text(raw)
    }

    fn from_base64_text(raw: &[u8]) -> Result<Self, EncryptionError> {
        let text = std::str::from_utf8(raw)
            .map_err(|_| EncryptionError::InvalidKey("Key is neither 32 bytes nor base64 text".to_string()))?;
        let mut decoded = general_purpose::STANDARD
            .decode(text.trim())
            .map_err(|e| EncryptionError::InvalidKey(format!("Invalid base64 key: {e}")))?;

        if decoded.len() != KEY_LEN {
            let len = decoded.len();
            decoded.zeroize();
            return Err(EncryptionError::InvalidKey(format!(
                "Key must be 32 bytes (256 bits), got {len}"
            )));
        }

        let mut bytes = [0u8; KEY_LEN];
        bytes.copy_from_slice(&decoded);
        decoded.zeroize();
        Ok(Self { bytes })
    }

    pub fn generate() -> Self {
        let generated = Aes256Gcm::generate_key(&mut OsRng);
        let mut bytes = [0u8; KEY_LEN];
        bytes.copy_from_slice(generated.as_slice());
        Self { bytes }
    }

    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(self.bytes)
    }

    pub fn read_from(path: &Path) -> Result<Self, EncryptionError> {
        let raw = std::fs::read(path).map_err(|source| EncryptionError::Io {
            path: path.display().to_string(),
            source
        })?;
        Self::from_bytes(&raw)
    }

    /// Writes the key as base64 text.
    pub fn write_to(&self, path: &Path) -> Result<(), EncryptionError> {
        std::fs::write(path, self.to_base64()).map_err(|source| EncryptionError::Io {
            path: path.display().to_string(),
            source
        })
    }

    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.bytes))
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncryptionKey(<redacted>)")
    }
}

/// Generates a fresh key and writes it to `path`.
pub fn generate_key(path: &Path) -> Result<EncryptionKey, EncryptionError> {
    let key = EncryptionKey::generate();
    key.write_to(path)?;
    Ok(key)
}

/// Encrypts `plaintext` into a serialized envelope.
pub fn encrypt(key: &EncryptionKey, plaintext: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let ciphertext = key
        .cipher()
        .encrypt(&nonce, plaintext)
        .map_err(|e| EncryptionError::EncryptionFailed(e.to_string()))?;

    let envelope = EncryptedData {
        ciphertext: general_purpose::STANDARD.encode(&ciphertext),
        nonce: general_purpose::STANDARD.encode(nonce),
        algorithm: ALGORITHM.to_string()
    };

    serde_json::to_vec(&envelope).map_err(|e| EncryptionError::EncryptionFailed(e.to_string()))
}

/// Decrypts an envelope produced by [`encrypt`].
pub fn decrypt(key: &EncryptionKey, data: &[u8]) -> Result<Vec<u8>, EncryptionError> {
    let envelope: EncryptedData =
        serde_json::from_slice(data).map_err(|e| EncryptionError::InvalidFormat(e.to_string()))?;

    if envelope.algorithm != ALGORITHM {
        return Err(EncryptionError::InvalidFormat(format!(
            "Unsupported algorithm: {}",
            envelope.algorithm
        )));
    }

    let ciphertext = general_purpose::STANDARD
        .decode(&envelope.ciphertext)
        .map_err(|e| EncryptionError::InvalidFormat(format!("Invalid ciphertext: {e}")))?;
    let nonce_bytes = general_purpose::STANDARD
        .decode(&envelope.nonce)
        .map_err(|e| EncryptionError::InvalidFormat(format!("Invalid nonce: {e}")))?;

    if nonce_bytes.len() != 12 {
        return Err(EncryptionError::InvalidFormat(format!(
            "Nonce must be 12 bytes, got {}",
            nonce_bytes.len()
        )));
    }
    let nonce = Nonce::from_slice(&nonce_bytes);

    key.cipher()
        .decrypt(nonce, ciphertext.as_ref())
        .map_err(|e| EncryptionError::DecryptionFailed(e.to_string()))
}

/// Encrypts the file at `path` into `<path>.fer` and returns the new path.
pub fn encrypt_file(path: &Path, key: &EncryptionKey) -> Result<PathBuf, EncryptionError> {
    let plaintext = std::fs::read(path).map_err(|source| EncryptionError::Io {
        path: path.display().to_string(),
        source
    })?;
    let target = with_encrypted_suffix(path);
    std::fs::write(&target, encrypt(key, &plaintext)?).map_err(|source| EncryptionError::Io {
        path: target.display().to_string(),
        source
    })?;
    Ok(target)
}

pub fn with_encrypted_suffix(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(ENCRYPTED_SUFFIX);
    PathBuf::from(name)
}

/// `config.toml.fer` becomes `config.toml`; other paths are returned unchanged.
pub fn strip_encrypted_suffix(path: &Path) -> PathBuf {
    match path.to_str().and_then(|s| s.strip_suffix(ENCRYPTED_SUFFIX)) {
        Some(stripped) => PathBuf::from(stripped),
        None => path.to_path_buf()
    }
}
