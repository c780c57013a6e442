//! End-to-end message flows.
//!
//! [`Pipeline`] owns the vocabulary and template catalog built from a
//! [`CipherConfig`] and ties the lower layers together:
//!
//! ```text
//! seal:  plaintext -> AEAD(tx) -> words -> [stealth prose]
//! open:  text -> decode -> AEAD(rx) -> plaintext
//! ```

use rand::Rng;
use tracing::{debug, info};

use crate::config::CipherConfig;
use crate::crypto::cipher::AeadCipher;
use crate::crypto::keys::{to_key_array, IdentityKeyPair, KEY_SIZE};
use crate::crypto::session::{SessionKeyDeriver, SessionKeys};
use crate::error::Result;
use crate::text::codec::WordCodec;
use crate::text::scanner::{CandidateOrigin, SequenceScanner};
use crate::text::stealth::{StealthEncoder, TemplateCatalog};
use crate::text::vocabulary::Vocabulary;

/// Default greeting sent by [`Pipeline::auto_reply`].
pub const DEFAULT_WELCOME: &str = "Hello! I saw your key. This is an automated secure handshake.";

/// Output rendering for sealed messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rendering {
    /// Space-separated codewords.
    #[default]
    Words,
    /// Codewords wrapped in filler sentences.
    Stealth,
}

/// A prepared reply to a public key found in a thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// `"first...last"` word of the peer's key rendering.
    pub peer_prefix: String,
    pub peer_public: [u8; KEY_SIZE],
    pub text: String,
}

/// Configured bundle of vocabulary, catalog and algorithm choices.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: CipherConfig,
    vocab: Vocabulary,
    catalog: TemplateCatalog,
}

impl Pipeline {
    /// Builds a pipeline over the standard vocabulary.
    pub fn new(config: CipherConfig) -> Result<Self> {
        Self::with_vocabulary(config, Vocabulary::standard())
    }

    /// Builds a pipeline over a custom vocabulary.
    ///
    /// Fails if any stealth filler word is a codeword of `vocab`.
    pub fn with_vocabulary(config: CipherConfig, vocab: Vocabulary) -> Result<Self> {
        config.validate()?;
        let catalog = config.build_catalog(&vocab)?;
        Ok(Self {
            config,
            vocab,
            catalog,
        })
    }

    pub fn config(&self) -> &CipherConfig {
        &self.config
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    pub fn codec(&self) -> WordCodec<'_> {
        WordCodec::new(&self.vocab)
    }

    pub fn cipher(&self) -> AeadCipher {
        AeadCipher::new(self.config.suite)
    }

    pub fn deriver(&self) -> SessionKeyDeriver {
        SessionKeyDeriver::new(self.config.protocol)
    }

    pub fn scanner(&self) -> SequenceScanner<'_> {
        SequenceScanner::new(&self.vocab, self.config.scanner)
    }

    pub fn stealth(&self) -> Result<StealthEncoder<'_>> {
        Ok(StealthEncoder::new(
            &self.catalog,
            self.config.stealth.connector_probability,
        )?)
    }

    /// Derives session keys with the configured protocol.
    pub fn derive(&self, identity: &IdentityKeyPair, peer_public: &[u8]) -> Result<SessionKeys> {
        Ok(self.deriver().derive(identity, peer_public)?)
    }

    /// Encrypts under `keys.tx` and renders the payload.
    pub fn seal_with_keys<R: Rng + ?Sized>(
        &self,
        keys: &SessionKeys,
        plaintext: &str,
        rendering: Rendering,
        rng: &mut R,
    ) -> Result<String> {
        let payload = self.cipher().encrypt(&keys.tx, plaintext)?;
        self.render(&payload, rendering, rng)
    }

    /// Decodes every codeword in `text` and decrypts under `keys.rx`.
    pub fn open_with_keys(&self, keys: &SessionKeys, text: &str) -> Result<String> {
        let payload = self.codec().decode_strict(text)?;
        Ok(self.cipher().decrypt(&keys.rx, &payload)?)
    }

    /// Derives the session with `peer_public` and seals `plaintext` for it.
    pub fn seal_message_with_rng<R: Rng + ?Sized>(
        &self,
        identity: &IdentityKeyPair,
        peer_public: &[u8],
        plaintext: &str,
        rendering: Rendering,
        rng: &mut R,
    ) -> Result<String> {
        let keys = self.derive(identity, peer_public)?;
        self.seal_with_keys(&keys, plaintext, rendering, rng)
    }

    pub fn seal_message(
        &self,
        identity: &IdentityKeyPair,
        peer_public: &[u8],
        plaintext: &str,
        rendering: Rendering,
    ) -> Result<String> {
        self.seal_message_with_rng(
            identity,
            peer_public,
            plaintext,
            rendering,
            &mut rand::thread_rng(),
        )
    }

    /// Derives the session with `peer_public` and opens a message from it.
    pub fn open_message(
        &self,
        identity: &IdentityKeyPair,
        peer_public: &[u8],
        text: &str,
    ) -> Result<String> {
        let keys = self.derive(identity, peer_public)?;
        self.open_with_keys(&keys, text)
    }

    /// Answers every public key posted contiguously in `text` with an encrypted welcome.
    ///
    /// Keys equal to `identity`'s own are skipped.
    pub fn auto_reply_with_rng<R: Rng + ?Sized>(
        &self,
        identity: &IdentityKeyPair,
        text: &str,
        welcome: &str,
        rendering: Rendering,
        rng: &mut R,
    ) -> Result<Vec<Reply>> {
        let report = self.scanner().scan(text);
        let own = identity.public_bytes();
        let mut replies = Vec::new();

        for candidate in report
            .public_keys()
            .filter(|c| c.origin == CandidateOrigin::Contiguous)
        {
            let peer_public = to_key_array(&candidate.bytes(&self.vocab))?;
            if peer_public == own {
                debug!("Skipping own public key");
                continue;
            }

            let text = self.seal_message_with_rng(identity, &peer_public, welcome, rendering, rng)?;
            let peer_prefix = format!(
                "{}...{}",
                candidate.words.first().map(String::as_str).unwrap_or_default(),
                candidate.words.last().map(String::as_str).unwrap_or_default()
            );
            replies.push(Reply {
                peer_prefix,
                peer_public,
                text,
            });
        }

        info!(replies = replies.len(), "Prepared auto-replies");
        Ok(replies)
    }

    pub fn auto_reply(
        &self,
        identity: &IdentityKeyPair,
        text: &str,
        welcome: &str,
        rendering: Rendering,
    ) -> Result<Vec<Reply>> {
        self.auto_reply_with_rng(identity, text, welcome, rendering, &mut rand::thread_rng())
    }

    fn render<R: Rng + ?Sized>(
        &self,
        payload: &[u8],
        rendering: Rendering,
        rng: &mut R,
    ) -> Result<String> {
        let codec = self.codec();
        Ok(match rendering {
            Rendering::Words => codec.encode(payload),
            Rendering::Stealth => self
                .stealth()?
                .wrap_with_rng(&codec.encode_words(payload), rng),
        })
    }
}
