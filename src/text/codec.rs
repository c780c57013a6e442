//! Byte <-> word codec.
//!
//! Encoding emits one vocabulary word per byte. Decoding is deliberately
//! tolerant: anything that is not a codeword is skipped, which is what lets
//! stealth prose and scanned forum posts decode without an unwrap step.

use thiserror::Error;

use crate::crypto::keys::{to_key_array, KeyError, KEY_SIZE};

use super::vocabulary::Vocabulary;

/// Errors that can occur in the codec layer.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CodecError {
    #[error("No vocabulary words found in input")]
    EmptyDecode,

    #[error("Invalid vocabulary: {0}")]
    InvalidVocabulary(String),
}

/// Splits free text into lowercase tokens.
///
/// Every character outside `[a-zA-Z]` acts as a separator, so punctuation,
/// digits, emoji and non-ASCII letters never glue two words together.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_ascii_alphabetic())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_ascii_lowercase())
        .collect()
}

/// Bijective byte <-> word mapping over a borrowed vocabulary.
#[derive(Debug, Clone, Copy)]
pub struct WordCodec<'v> {
    vocab: &'v Vocabulary,
}

impl<'v> WordCodec<'v> {
    pub fn new(vocab: &'v Vocabulary) -> Self {
        Self { vocab }
    }

    /// The vocabulary this codec maps through.
    pub fn vocabulary(&self) -> &'v Vocabulary {
        self.vocab
    }

    /// Maps each byte to its word, preserving order and length.
    pub fn encode_words(&self, data: &[u8]) -> Vec<&'v str> {
        data.iter().map(|&b| self.vocab.word(b)).collect()
    }

    /// Encodes bytes as space-joined words.
    pub fn encode(&self, data: &[u8]) -> String {
        self.encode_words(data).join(" ")
    }

    /// Decodes every codeword in `text`, silently skipping everything else.
    pub fn decode(&self, text: &str) -> Vec<u8> {
        tokenize(text)
            .iter()
            .filter_map(|token| self.vocab.index(token))
            .collect()
    }

    /// Like [`decode`](Self::decode), but an input with no codewords is an error.
    pub fn decode_strict(&self, text: &str) -> Result<Vec<u8>, CodecError> {
        let bytes = self.decode(text);
        if bytes.is_empty() {
            return Err(CodecError::EmptyDecode);
        }
        Ok(bytes)
    }

    /// Decodes a 32-word public key rendering.
    pub fn decode_public_key(&self, text: &str) -> Result<[u8; KEY_SIZE], KeyError> {
        to_key_array(&self.decode(text))
    }
}
