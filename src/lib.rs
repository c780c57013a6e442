//! # Shitposter - encrypted messages that look like tech chatter
//!
//! Shitposter lets two people hold an end-to-end encrypted conversation on a
//! public forum. Ciphertext is rendered as words from a 256-word tech-jargon
//! vocabulary (one word per byte), optionally wrapped in filler sentences, so
//! a thread reads as ordinary complaining about infrastructure.
//!
//! ## Overview
//!
//! - Each participant has a long-term X25519 identity and posts the public
//!   half as 32 codewords
//! - Two identities derive session keys with X25519 + HKDF-SHA256; in the
//!   directional protocol each side gets its own send key
//! - Messages are sealed with AES-256-GCM (or ChaCha20-Poly1305) and
//!   rendered as codewords or stealth prose
//! - A scanner pulls codeword sequences out of arbitrary threads and
//!   trial-decrypts them
//! - Four-symbol fingerprints let peers detect key substitution out of band
//!
//! ## Example Usage
//!
//! ```rust
//! use shitposter::{CipherConfig, IdentityKeyPair, Pipeline, Rendering};
//!
//! let pipeline = Pipeline::new(CipherConfig::default()).unwrap();
//! let alice = IdentityKeyPair::generate();
//! let bob = IdentityKeyPair::generate();
//!
//! let post = pipeline
//!     .seal_message(&alice, &bob.public_bytes(), "hi bob", Rendering::Stealth)
//!     .unwrap();
//!
//! let opened = pipeline.open_message(&bob, &alice.public_bytes(), &post).unwrap();
//! assert_eq!(opened, "hi bob");
//! ```
//!
//! ## Modules
//!
//! - [`crypto`]: Identity keys, session derivation, AEAD, fingerprints
//! - [`text`]: Vocabulary, codec, stealth prose, scanner
//! - [`pipeline`]: Seal/open/auto-reply flows
//! - [`config`]: TOML configuration

pub mod config;
pub mod crypto;
pub mod error;
pub mod pipeline;
pub mod text;

// Re-export commonly used types at the crate root
pub use config::{CipherConfig, ConfigError, StealthConfig};
pub use crypto::{
    fingerprint, generate_channel_key, AeadCipher, CipherError, CipherSuite, IdentityKeyPair,
    KeyError, ProtocolVersion, SessionError, SessionKeyDeriver, SessionKeys,
};
pub use error::{Error, Result};
pub use pipeline::{Pipeline, Rendering, Reply, DEFAULT_WELCOME};
pub use text::{
    CandidateKind, CodecError, ScanReport, ScannerConfig, SequenceScanner, StealthEncoder,
    StealthError, TemplateCatalog, Vocabulary, WordCodec,
};
