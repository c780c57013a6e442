//! Authenticated encryption of message payloads.
//!
//! Payload layout: nonce (12 bytes) || ciphertext || tag (16 bytes).
//! Both supported suites share that layout, so the choice of suite never
//! shows up in the word rendering.
//!
//! Nonces are random. Keep well below 2^32 messages per key.

use aes_gcm::Aes256Gcm;
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::keys::KEY_SIZE;

/// Nonce size shared by both suites.
pub const NONCE_SIZE: usize = 12;

/// Authentication tag size shared by both suites.
pub const TAG_SIZE: usize = 16;

/// Smallest possible payload (empty plaintext).
pub const MIN_PAYLOAD_SIZE: usize = NONCE_SIZE + TAG_SIZE;

/// Errors that can occur during payload encryption.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CipherError {
    /// Wrong key, truncated payload or tampering. Carries no detail on purpose.
    #[error("Authentication failed")]
    AuthenticationFailure,

    #[error("Encryption failed")]
    EncryptionFailed,

    #[error("Decrypted payload is not valid UTF-8")]
    InvalidUtf8,
}

/// AEAD algorithm used for payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CipherSuite {
    /// AES-256-GCM, the suite existing peers post with.
    #[default]
    #[serde(rename = "aes-256-gcm")]
    Aes256Gcm,
    #[serde(rename = "chacha20-poly1305")]
    ChaCha20Poly1305,
}

impl std::str::FromStr for CipherSuite {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "aes" | "aes-256-gcm" | "aes256gcm" => Ok(CipherSuite::Aes256Gcm),
            "chacha" | "chacha20-poly1305" | "chacha20poly1305" => {
                Ok(CipherSuite::ChaCha20Poly1305)
            }
            other => Err(format!("unknown cipher suite '{}'", other)),
        }
    }
}

/// Stateless AEAD transform over 32-byte session keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct AeadCipher {
    suite: CipherSuite,
}

impl AeadCipher {
    pub fn new(suite: CipherSuite) -> Self {
        Self { suite }
    }

    pub fn suite(&self) -> CipherSuite {
        self.suite
    }

    /// Encrypts UTF-8 text under `key` with a fresh random nonce.
    pub fn encrypt(&self, key: &[u8; KEY_SIZE], plaintext: &str) -> Result<Vec<u8>, CipherError> {
        self.encrypt_bytes(key, plaintext.as_bytes())
    }

    /// Encrypts raw bytes under `key` with a fresh random nonce.
    pub fn encrypt_bytes(
        &self,
        key: &[u8; KEY_SIZE],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, CipherError> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = match self.suite {
            CipherSuite::Aes256Gcm => Aes256Gcm::new_from_slice(key)
                .map_err(|_| CipherError::EncryptionFailed)?
                .encrypt(nonce, plaintext),
            CipherSuite::ChaCha20Poly1305 => ChaCha20Poly1305::new_from_slice(key)
                .map_err(|_| CipherError::EncryptionFailed)?
                .encrypt(nonce, plaintext),
        }
        .map_err(|_| CipherError::EncryptionFailed)?;

        let mut result = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        result.extend_from_slice(&nonce_bytes);
        result.extend(ciphertext);

        Ok(result)
    }

    /// Decrypts a payload and returns the UTF-8 plaintext.
    pub fn decrypt(&self, key: &[u8; KEY_SIZE], payload: &[u8]) -> Result<String, CipherError> {
        let plaintext = self.decrypt_bytes(key, payload)?;
        String::from_utf8(plaintext).map_err(|_| CipherError::InvalidUtf8)
    }

    /// Decrypts a payload and returns the raw plaintext.
    pub fn decrypt_bytes(&self, key: &[u8; KEY_SIZE], payload: &[u8]) -> Result<Vec<u8>, CipherError> {
        if payload.len() < MIN_PAYLOAD_SIZE {
            return Err(CipherError::AuthenticationFailure);
        }

        let nonce = Nonce::from_slice(&payload[..NONCE_SIZE]);
        let ciphertext = &payload[NONCE_SIZE..];

        match self.suite {
            CipherSuite::Aes256Gcm => Aes256Gcm::new_from_slice(key)
                .map_err(|_| CipherError::AuthenticationFailure)?
                .decrypt(nonce, ciphertext),
            CipherSuite::ChaCha20Poly1305 => ChaCha20Poly1305::new_from_slice(key)
                .map_err(|_| CipherError::AuthenticationFailure)?
                .decrypt(nonce, ciphertext),
        }
        .map_err(|_| CipherError::AuthenticationFailure)
    }
}

/// Generates a random symmetric key for a one-to-many broadcast channel.
pub fn generate_channel_key() -> [u8; KEY_SIZE] {
    let mut key = [0u8; KEY_SIZE];
    OsRng.fill_bytes(&mut key);
    key
}
