//! Cryptographic operations.
//!
//! This module provides:
//! - Identity keys (X25519)
//! - Session key agreement (X25519 + HKDF-SHA256, shared or directional)
//! - Payload encryption (AES-256-GCM or ChaCha20-Poly1305)
//! - Session fingerprints for out-of-band verification

pub mod cipher;
pub mod fingerprint;
pub mod keys;
pub mod session;

pub use cipher::{generate_channel_key, AeadCipher, CipherError, CipherSuite};
pub use fingerprint::{fingerprint, fingerprint_symbols};
pub use keys::{IdentityKeyPair, KeyError, KEY_SIZE};
pub use session::{ProtocolVersion, SessionError, SessionKeyDeriver, SessionKeys, SessionRecord};
