//! Session fingerprints for out-of-band verification.
//!
//! Both peers read their four symbols to each other over another channel
//! (voice, in person). Matching symbols mean both sides derived the same
//! session, so no one swapped a public key in transit.

use sha2::{Digest, Sha256};

use super::session::SessionKeys;

/// Number of symbols in a fingerprint.
pub const FINGERPRINT_LEN: usize = 4;

/// 64 animal symbols, indexed by `byte % 64`.
pub const SYMBOLS: [&str; 64] = [
    "🐶", "🐱", "🐭", "🐹", "🐰", "🦊", "🐻", "🐼",
    "🐨", "🐯", "🦁", "🐮", "🐷", "🐽", "🐸", "🐵",
    "🐔", "🐧", "🐦", "🐤", "🐣", "🐥", "🦆", "🦅",
    "🦉", "🦇", "🐺", "🐗", "🐴", "🦄", "🐝", "🐛",
    "🦋", "🐌", "🐞", "🐜", "🦗", "🕷", "🕸", "🦂",
    "🐢", "🐍", "🦎", "🦖", "🦕", "🐙", "🦑", "🦐",
    "🦞", "🦀", "🐡", "🐠", "🐟", "🐬", "🐳", "🐋",
    "🦈", "🐊", "🐅", "🐆", "🦓", "🦍", "🦧", "🐘",
];

/// Computes the fingerprint symbols for a session.
///
/// The two keys are hashed in canonical order (smaller first) so that both
/// peers, whose `tx`/`rx` are mirrored, display the same result.
pub fn fingerprint_symbols(keys: &SessionKeys) -> [&'static str; FINGERPRINT_LEN] {
    let (first, second) = if keys.tx <= keys.rx {
        (&keys.tx, &keys.rx)
    } else {
        (&keys.rx, &keys.tx)
    };

    let mut hasher = Sha256::new();
    hasher.update(first);
    hasher.update(second);
    let hash = hasher.finalize();

    let mut symbols = [""; FINGERPRINT_LEN];
    for (slot, byte) in symbols.iter_mut().zip(hash.iter()) {
        *slot = SYMBOLS[(*byte as usize) % SYMBOLS.len()];
    }
    symbols
}

/// Space-separated fingerprint string.
pub fn fingerprint(keys: &SessionKeys) -> String {
    fingerprint_symbols(keys).join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::IdentityKeyPair;
    use crate::crypto::session::{ProtocolVersion, SessionKeyDeriver};
    use std::collections::HashSet;

    #[test]
    fn test_symbol_table_distinct() {
        let unique: HashSet<&str> = SYMBOLS.iter().copied().collect();
        assert_eq!(unique.len(), 64);
    }

    #[test]
    fn test_peers_see_same_fingerprint() {
        let alice = IdentityKeyPair::generate();
        let bob = IdentityKeyPair::generate();
        let deriver = SessionKeyDeriver::new(ProtocolVersion::V2Directional);

        let a = deriver.derive(&alice, &bob.public_bytes()).unwrap();
        let b = deriver.derive(&bob, &alice.public_bytes()).unwrap();

        assert_eq!(fingerprint(&a), fingerprint(&b));
        assert_eq!(fingerprint(&a).split(' ').count(), FINGERPRINT_LEN);
    }

    #[test]
    fn test_fingerprint_matches_hash_of_ordered_keys() {
        let keys = SessionKeys::directional([0x10; 32], [0x01; 32]);

        let mut hasher = Sha256::new();
        hasher.update([0x01; 32]);
        hasher.update([0x10; 32]);
        let hash = hasher.finalize();

        let expected: Vec<&str> = hash[..4].iter().map(|b| SYMBOLS[*b as usize % 64]).collect();
        assert_eq!(fingerprint(&keys), expected.join(" "));
    }

    #[test]
    fn test_substituted_key_changes_fingerprint() {
        let alice = IdentityKeyPair::generate();
        let bob = IdentityKeyPair::generate();
        let mallory = IdentityKeyPair::generate();
        let deriver = SessionKeyDeriver::new(ProtocolVersion::V2Directional);

        // Alice thinks Mallory's key is Bob's
        let alice_view = deriver.derive(&alice, &mallory.public_bytes()).unwrap();
        let bob_view = deriver.derive(&bob, &alice.public_bytes()).unwrap();

        assert_ne!(fingerprint(&alice_view), fingerprint(&bob_view));
    }
}
