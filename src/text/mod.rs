//! Text layer: codewords, prose wrapping and scanning.
//!
//! This module provides:
//! - The 256-word vocabulary
//! - Byte <-> word encoding with tolerant decoding
//! - Stealth prose templates
//! - Candidate extraction from forum text

pub mod codec;
pub mod scanner;
pub mod stealth;
pub mod vocabulary;

pub use codec::{tokenize, CodecError, WordCodec};
pub use scanner::{
    Candidate, CandidateKind, CandidateOrigin, ScanReport, ScannerConfig, SequenceScanner,
    TrialDecryption,
};
pub use stealth::{StealthEncoder, StealthError, Template, TemplateCatalog};
pub use vocabulary::{Vocabulary, STANDARD_WORDS, VOCABULARY_SIZE};
