//! X25519 identity keys.
//!
//! An identity is a long-term Diffie-Hellman key pair. The public half is
//! posted in the clear as 32 codewords; the private half never leaves the
//! process except through [`IdentityKeyPair::private_bytes`].

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::rngs::OsRng;
use thiserror::Error;
use x25519_dalek::{PublicKey, StaticSecret};

/// Size of X25519 private scalars and public points.
pub const KEY_SIZE: usize = 32;

/// Errors that can occur during key operations.
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Invalid key length: expected {expected}, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },

    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),
}

/// Checks a byte slice is exactly [`KEY_SIZE`] long and copies it out.
pub(crate) fn to_key_array(bytes: &[u8]) -> Result<[u8; KEY_SIZE], KeyError> {
    if bytes.len() != KEY_SIZE {
        return Err(KeyError::InvalidKeyLength {
            expected: KEY_SIZE,
            got: bytes.len(),
        });
    }

    let mut key = [0u8; KEY_SIZE];
    key.copy_from_slice(bytes);
    Ok(key)
}

/// A long-term X25519 identity.
#[derive(Clone)]
pub struct IdentityKeyPair {
    secret: StaticSecret,
    public: PublicKey,
}

impl std::fmt::Debug for IdentityKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Don't expose private key in debug output
        f.debug_struct("IdentityKeyPair")
            .field("public", &BASE64.encode(self.public.as_bytes()))
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl IdentityKeyPair {
    /// Generates a new identity from the OS CSPRNG.
    pub fn generate() -> Self {
        let secret = StaticSecret::random_from_rng(OsRng);
        let public = PublicKey::from(&secret);
        Self { secret, public }
    }

    /// Loads an identity from raw private scalar bytes.
    pub fn load(private_bytes: &[u8]) -> Result<Self, KeyError> {
        let secret = StaticSecret::from(to_key_array(private_bytes)?);
        let public = PublicKey::from(&secret);
        Ok(Self { secret, public })
    }

    /// Loads an identity from a base64-encoded private scalar.
    pub fn load_base64(encoded: &str) -> Result<Self, KeyError> {
        let bytes = BASE64.decode(encoded.trim())?;
        Self::load(&bytes)
    }

    /// The shareable public point.
    pub fn public_bytes(&self) -> [u8; KEY_SIZE] {
        *self.public.as_bytes()
    }

    /// Raw private scalar export. The caller is responsible for storing it safely.
    pub fn private_bytes(&self) -> [u8; KEY_SIZE] {
        self.secret.to_bytes()
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    pub(crate) fn secret_key(&self) -> &StaticSecret {
        &self.secret
    }
}
