//! Finding codeword sequences in arbitrary text.
//!
//! Forum threads mix codewords with ordinary chatter. The scanner pulls out
//! every plausible sequence and, given a session key, tries to open each one.
//!
//! Two kinds of candidate are produced:
//! - contiguous: every maximal run of adjacent codewords
//! - sparse: all codewords in the text concatenated, kept only when there are
//!   enough of them to be worth a try (prose-wrapped messages land here)
//!
//! A failed trial decryption is a normal outcome, not an error.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::codec::tokenize;
use super::vocabulary::Vocabulary;
use crate::crypto::cipher::AeadCipher;
use crate::crypto::keys::KEY_SIZE;

/// Shortest sequence worth reporting.
pub const DEFAULT_MIN_CANDIDATE_LEN: usize = 12;

/// The sparse candidate needs strictly more codewords than this.
pub const DEFAULT_SPARSE_FLOOR: usize = 16;

/// A sequence of exactly this many codewords is classified as a public key.
pub const PUBLIC_KEY_WORDS: usize = KEY_SIZE;

/// Scanner thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Candidates shorter than this are dropped.
    pub min_candidate_len: usize,

    /// Sparse candidate is emitted only above this many codewords.
    pub sparse_floor: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            min_candidate_len: DEFAULT_MIN_CANDIDATE_LEN,
            sparse_floor: DEFAULT_SPARSE_FLOOR,
        }
    }
}

/// What a candidate looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    PublicKey,
    Message,
}

impl std::fmt::Display for CandidateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CandidateKind::PublicKey => write!(f, "public_key"),
            CandidateKind::Message => write!(f, "message"),
        }
    }
}

/// How a candidate was extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateOrigin {
    Contiguous,
    Sparse,
}

/// Outcome of trying a session key on a message candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrialDecryption {
    Decrypted(String),
    Failed,
}

/// A sequence of codewords found in the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub kind: CandidateKind,
    pub words: Vec<String>,
    pub origin: CandidateOrigin,
    /// `None` unless a key was supplied and the candidate is a message.
    pub decryption: Option<TrialDecryption>,
}

impl Candidate {
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Byte values of the words. Every word came from `vocab`, so nothing is skipped.
    pub fn bytes(&self, vocab: &Vocabulary) -> Vec<u8> {
        self.words.iter().filter_map(|w| vocab.index(w)).collect()
    }

    /// First `n` words joined with spaces, with "..." if truncated.
    pub fn preview(&self, n: usize) -> String {
        let shown = self.words.iter().take(n).map(String::as_str).collect::<Vec<_>>().join(" ");
        if self.words.len() > n {
            format!("{}...", shown)
        } else {
            shown
        }
    }

    pub fn decrypted(&self) -> Option<&str> {
        match &self.decryption {
            Some(TrialDecryption::Decrypted(text)) => Some(text),
            _ => None,
        }
    }
}

/// Everything a scan found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub tokens_scanned: usize,
    pub candidates: Vec<Candidate>,
}

impl ScanReport {
    pub fn public_keys(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter().filter(|c| c.kind == CandidateKind::PublicKey)
    }

    pub fn messages(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter().filter(|c| c.kind == CandidateKind::Message)
    }

    /// Plaintexts of all candidates that opened under the supplied key.
    pub fn decrypted(&self) -> impl Iterator<Item = &str> {
        self.candidates.iter().filter_map(Candidate::decrypted)
    }
}

/// Heuristic codeword sequence extractor.
#[derive(Debug, Clone, Copy)]
pub struct SequenceScanner<'v> {
    vocab: &'v Vocabulary,
    config: ScannerConfig,
}

impl<'v> SequenceScanner<'v> {
    pub fn new(vocab: &'v Vocabulary, config: ScannerConfig) -> Self {
        Self { vocab, config }
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Extracts and classifies candidates without trying to decrypt them.
    pub fn scan(&self, text: &str) -> ScanReport {
        let tokens = tokenize(text);
        let candidates = self
            .extract(&tokens)
            .into_iter()
            .map(|(words, origin)| Candidate {
                kind: classify(&words),
                words,
                origin,
                decryption: None,
            })
            .collect::<Vec<_>>();

        debug!(
            tokens = tokens.len(),
            candidates = candidates.len(),
            "Scanned text"
        );
        ScanReport {
            tokens_scanned: tokens.len(),
            candidates,
        }
    }

    /// Like [`scan`](Self::scan), then tries `key` on every message candidate.
    pub fn scan_with_key(
        &self,
        text: &str,
        key: &[u8; KEY_SIZE],
        cipher: &AeadCipher,
    ) -> ScanReport {
        let mut report = self.scan(text);
        for candidate in report
            .candidates
            .iter_mut()
            .filter(|c| c.kind == CandidateKind::Message)
        {
            let payload = candidate.bytes(self.vocab);
            let outcome = match cipher.decrypt(key, &payload) {
                Ok(plaintext) => TrialDecryption::Decrypted(plaintext),
                Err(e) => {
                    debug!(words = candidate.len(), origin = ?candidate.origin, error = %e, "Trial decryption failed");
                    TrialDecryption::Failed
                }
            };
            candidate.decryption = Some(outcome);
        }
        report
    }

    /// Contiguous runs first, then the sparse sequence, deduplicated and length-filtered.
    fn extract(&self, tokens: &[String]) -> Vec<(Vec<String>, CandidateOrigin)> {
        let mut found = Vec::new();
        let mut run: Vec<String> = Vec::new();
        let mut sparse: Vec<String> = Vec::new();

        for token in tokens {
            if self.vocab.contains(token) {
                run.push(token.clone());
                sparse.push(token.clone());
            } else if !run.is_empty() {
                found.push((std::mem::take(&mut run), CandidateOrigin::Contiguous));
            }
        }
        if !run.is_empty() {
            found.push((run, CandidateOrigin::Contiguous));
        }
        if sparse.len() > self.config.sparse_floor {
            found.push((sparse, CandidateOrigin::Sparse));
        }

        let mut seen = HashSet::new();
        found
            .into_iter()
            .filter(|(words, _)| words.len() >= self.config.min_candidate_len)
            .filter(|(words, _)| seen.insert(words.clone()))
            .collect()
    }
}

fn classify(words: &[String]) -> CandidateKind {
    if words.len() == PUBLIC_KEY_WORDS {
        CandidateKind::PublicKey
    } else {
        CandidateKind::Message
    }
}
