//! The 256-word codeword table.
//!
//! Each byte value maps to exactly one lowercase word. The table is built once
//! at startup and handed by reference to the codec, the stealth encoder and the
//! scanner, so no component reaches for hidden global state.

use std::collections::HashMap;

use super::codec::CodecError;

/// Number of entries in a vocabulary (one per byte value).
pub const VOCABULARY_SIZE: usize = 256;

/// Standard vocabulary. Index = byte value. Theme: AI, tech, startups, crypto.
///
/// Changing the order of this table breaks every message already posted.
pub const STANDARD_WORDS: [&str; VOCABULARY_SIZE] = [
    "agent", "alignment", "algorithm", "api", "architecture", "array", "artifact", "asset",
    "autonomous", "backend", "bandwidth", "baseline", "batch", "benchmark", "bias", "binary",
    "bitcoin", "block", "bot", "buffer", "bug", "build", "byte", "cache",
    "canvas", "cap", "chain", "channel", "chat", "checkpoint", "chip", "cipher",
    "circuit", "cloud", "cluster", "code", "cognitive", "commit", "compile", "compute",
    "config", "connect", "console", "constant", "context", "contract", "control", "core",
    "crypto", "cuda", "cycle", "daemon", "data", "database", "debug", "decimal",
    "decode", "deep", "default", "define", "deploy", "depth", "design", "device",
    "digital", "dimension", "disk", "distributed", "dns", "docker", "domain", "drive",
    "driver", "dump", "dynamic", "edge", "editor", "effect", "element", "embedding",
    "encode", "engine", "entropy", "epoch", "error", "ether", "event", "execution",
    "expert", "exploit", "export", "extension", "feature", "field", "file", "filter",
    "firewall", "firmware", "flag", "flash", "float", "flow", "flux", "folder",
    "fork", "form", "frame", "framework", "function", "future", "game", "gateway",
    "generate", "generator", "git", "glitch", "global", "goal", "gpu", "gradient",
    "graph", "grid", "hack", "hardware", "hash", "head", "heap", "host",
    "hugging", "hyper", "image", "import", "index", "inference", "info", "input",
    "install", "instance", "integer", "integration", "interface", "internet", "interpreter", "interrupt",
    "ip", "iteration", "java", "job", "json", "kernel", "key", "keyboard",
    "keyword", "label", "language", "latency", "layer", "layout", "learning", "ledger",
    "library", "license", "limit", "link", "linux", "list", "load", "local",
    "lock", "log", "logic", "login", "loop", "loss", "machine", "macro",
    "main", "map", "mask", "matrix", "memory", "merge", "mesh", "meta",
    "method", "metric", "micro", "miner", "model", "mode", "module", "monitor",
    "mouse", "move", "net", "network", "neural", "node", "noise", "nonce",
    "norm", "null", "number", "object", "offset", "open", "operator", "optimize",
    "option", "oracle", "output", "overflow", "overlay", "packet", "page", "panel",
    "parameter", "parse", "patch", "path", "pattern", "peer", "performance", "perl",
    "permission", "phone", "pipeline", "pixel", "platform", "plugin", "pointer", "policy",
    "pool", "port", "post", "power", "precision", "predict", "prefix", "process",
    "profile", "program", "prompt", "protocol", "proxy", "public", "push", "python",
    "query", "queue", "ram", "random", "range", "rank", "rate", "raw",
];

/// An immutable byte <-> word table.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    words: Vec<String>,
    index: HashMap<String, u8>,
}

impl Vocabulary {
    /// Builds the standard table used on the wire.
    pub fn standard() -> Self {
        let words: Vec<String> = STANDARD_WORDS.iter().map(|w| w.to_string()).collect();
        let index = words
            .iter()
            .enumerate()
            .map(|(i, w)| (w.clone(), i as u8))
            .collect();
        Self { words, index }
    }

    /// Builds a custom table, validating size, charset and uniqueness.
    pub fn new(words: Vec<String>) -> Result<Self, CodecError> {
        if words.len() != VOCABULARY_SIZE {
            return Err(CodecError::InvalidVocabulary(format!(
                "expected {} words, got {}",
                VOCABULARY_SIZE,
                words.len()
            )));
        }

        let mut index = HashMap::with_capacity(VOCABULARY_SIZE);
        for (i, word) in words.iter().enumerate() {
            if word.is_empty() || !word.bytes().all(|b| b.is_ascii_lowercase()) {
                return Err(CodecError::InvalidVocabulary(format!(
                    "'{}' is not a single lowercase ASCII word",
                    word
                )));
            }
            if index.insert(word.clone(), i as u8).is_some() {
                return Err(CodecError::InvalidVocabulary(format!(
                    "duplicate word '{}'",
                    word
                )));
            }
        }

        Ok(Self { words, index })
    }

    /// Word for a byte value.
    pub fn word(&self, byte: u8) -> &str {
        &self.words[byte as usize]
    }

    /// Byte value for a normalized (lowercase) token.
    pub fn index(&self, token: &str) -> Option<u8> {
        self.index.get(token).copied()
    }

    /// Returns true if the normalized token is a codeword.
    pub fn contains(&self, token: &str) -> bool {
        self.index.contains_key(token)
    }

    /// All words in byte order.
    pub fn words(&self) -> &[String] {
        &self.words
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_standard_table_is_complete_and_distinct() {
        let vocab = Vocabulary::standard();
        let unique: HashSet<&String> = vocab.words().iter().collect();
        assert_eq!(vocab.words().len(), VOCABULARY_SIZE);
        assert_eq!(unique.len(), VOCABULARY_SIZE);
    }

    #[test]
    fn test_standard_table_anchors() {
        let vocab = Vocabulary::standard();
        assert_eq!(vocab.word(0), "agent");
        assert_eq!(vocab.word(0x1F), "cipher");
        assert_eq!(vocab.word(0xFF), "raw");
        assert_eq!(vocab.index("raw"), Some(0xFF));
        assert_eq!(vocab.index("set"), None);
    }

    #[test]
    fn test_standard_words_pass_validation() {
        let words = STANDARD_WORDS.iter().map(|w| w.to_string()).collect();
        assert!(Vocabulary::new(words).is_ok());
    }

    #[test]
    fn test_rejects_wrong_size() {
        let words = vec!["alpha".to_string(); 10];
        assert!(matches!(
            Vocabulary::new(words),
            Err(CodecError::InvalidVocabulary(_))
        ));
    }

    #[test]
    fn test_rejects_duplicates() {
        let mut words: Vec<String> = STANDARD_WORDS.iter().map(|w| w.to_string()).collect();
        words[1] = "agent".to_string();
        let err = Vocabulary::new(words).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_rejects_punctuation_and_uppercase() {
        let mut words: Vec<String> = STANDARD_WORDS.iter().map(|w| w.to_string()).collect();
        words[5] = "Array".to_string();
        assert!(Vocabulary::new(words.clone()).is_err());

        words[5] = "ar-ray".to_string();
        assert!(Vocabulary::new(words).is_err());
    }
}
