//! Session key agreement.
//!
//! Two identities agree on session keys with X25519 followed by an
//! HKDF-SHA256 expansion. The HKDF context is the two public keys in sorted
//! order, so both peers expand the exact same material and only the role
//! assignment (which half is `tx`) differs.
//!
//! Two protocol generations exist on the wire and neither is assumed:
//!
//! - [`ProtocolVersion::V1Shared`]: one symmetric key used in both directions.
//! - [`ProtocolVersion::V2Directional`]: 64 bytes split into one key per direction.
//!
//! Public keys are not authenticated here. A malicious key still yields a
//! valid-looking session; peers must compare [`fingerprint`](super::fingerprint)s
//! out of band to detect substitution.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hkdf::Hkdf;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use tracing::{debug, warn};
use x25519_dalek::PublicKey;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::keys::{to_key_array, IdentityKeyPair, KeyError, KEY_SIZE};

/// HKDF info label for the single-key generation.
const LABEL_V1_SHARED: &[u8] = b"shitposter-v1-shared";

/// HKDF info label for the directional generation.
const LABEL_V2_DIRECTIONAL: &[u8] = b"shitposter-v2-directional";

/// Errors that can occur while establishing or importing a session.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Key error: {0}")]
    Key(#[from] KeyError),

    #[error("Invalid session record: {0}")]
    InvalidRecord(#[from] serde_json::Error),
}

/// Key-agreement protocol generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProtocolVersion {
    /// One shared key, `tx == rx`.
    V1Shared,
    /// Separate keys per direction.
    V2Directional,
}

impl ProtocolVersion {
    fn label(self) -> &'static [u8] {
        match self {
            ProtocolVersion::V1Shared => LABEL_V1_SHARED,
            ProtocolVersion::V2Directional => LABEL_V2_DIRECTIONAL,
        }
    }
}

impl std::fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProtocolVersion::V1Shared => write!(f, "v1-shared"),
            ProtocolVersion::V2Directional => write!(f, "v2-directional"),
        }
    }
}

impl std::str::FromStr for ProtocolVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "v1" | "v1-shared" => Ok(ProtocolVersion::V1Shared),
            "v2" | "v2-directional" => Ok(ProtocolVersion::V2Directional),
            other => Err(format!("unknown protocol version '{}'", other)),
        }
    }
}

/// Keys for one peer pairing, seen from one side.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SessionKeys {
    /// Encrypts outbound traffic.
    pub tx: [u8; KEY_SIZE],
    /// Decrypts inbound traffic.
    pub rx: [u8; KEY_SIZE],
    #[zeroize(skip)]
    protocol: ProtocolVersion,
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys")
            .field("protocol", &self.protocol)
            .field("tx", &"[REDACTED]")
            .field("rx", &"[REDACTED]")
            .finish()
    }
}

/// Structured establishment output for directional sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Base64 of the outbound key.
    pub tx: String,
    /// Base64 of the inbound key.
    pub rx: String,
}

impl SessionKeys {
    /// Builds directional keys from explicit halves.
    pub fn directional(tx: [u8; KEY_SIZE], rx: [u8; KEY_SIZE]) -> Self {
        Self {
            tx,
            rx,
            protocol: ProtocolVersion::V2Directional,
        }
    }

    /// Builds a single-key session (also used for broadcast channel keys).
    pub fn shared(key: [u8; KEY_SIZE]) -> Self {
        Self {
            tx: key,
            rx: key,
            protocol: ProtocolVersion::V1Shared,
        }
    }

    pub fn protocol(&self) -> ProtocolVersion {
        self.protocol
    }

    /// The establishment output for this session's protocol:
    /// raw 32 bytes for V1, a JSON [`SessionRecord`] for V2.
    pub fn export(&self) -> Vec<u8> {
        match self.protocol {
            ProtocolVersion::V1Shared => self.tx.to_vec(),
            ProtocolVersion::V2Directional => {
                let record = self.to_record();
                // Serializing two strings cannot fail.
                serde_json::to_vec_pretty(&record).unwrap_or_default()
            }
        }
    }

    /// Parses either establishment output format.
    pub fn import(bytes: &[u8]) -> Result<Self, SessionError> {
        if bytes.len() == KEY_SIZE {
            return Ok(Self::shared(to_key_array(bytes)?));
        }

        let record: SessionRecord = serde_json::from_slice(bytes)?;
        Self::from_record(&record)
    }

    pub fn to_record(&self) -> SessionRecord {
        SessionRecord {
            tx: BASE64.encode(self.tx),
            rx: BASE64.encode(self.rx),
        }
    }

    pub fn from_record(record: &SessionRecord) -> Result<Self, SessionError> {
        let tx = BASE64.decode(record.tx.trim()).map_err(KeyError::from)?;
        let rx = BASE64.decode(record.rx.trim()).map_err(KeyError::from)?;
        Ok(Self::directional(to_key_array(&tx)?, to_key_array(&rx)?))
    }
}

/// Turns (own identity, peer public key) into session keys.
#[derive(Debug, Clone, Copy)]
pub struct SessionKeyDeriver {
    protocol: ProtocolVersion,
}

impl SessionKeyDeriver {
    pub fn new(protocol: ProtocolVersion) -> Self {
        Self { protocol }
    }

    pub fn protocol(&self) -> ProtocolVersion {
        self.protocol
    }

    /// Derives the session keys for this identity talking to `peer_public`.
    ///
    /// The peer key length is checked before any curve arithmetic runs.
    pub fn derive(
        &self,
        identity: &IdentityKeyPair,
        peer_public: &[u8],
    ) -> Result<SessionKeys, SessionError> {
        let peer_bytes = to_key_array(peer_public)?;
        let own_bytes = identity.public_bytes();

        let shared = identity
            .secret_key()
            .diffie_hellman(&PublicKey::from(peer_bytes));
        if !shared.was_contributory() {
            warn!("Peer public key produced a non-contributory shared secret");
        }

        let own_is_first = own_bytes <= peer_bytes;
        let (first, second) = if own_is_first {
            (own_bytes, peer_bytes)
        } else {
            (peer_bytes, own_bytes)
        };

        let label = self.protocol.label();
        let mut info = Vec::with_capacity(label.len() + 2 * KEY_SIZE);
        info.extend_from_slice(label);
        info.extend_from_slice(&first);
        info.extend_from_slice(&second);

        let hk = Hkdf::<Sha256>::new(None, shared.as_bytes());

        let keys = match self.protocol {
            ProtocolVersion::V1Shared => {
                let mut key = [0u8; KEY_SIZE];
                hk.expand(&info, &mut key)
                    .expect("32 bytes is valid output length");
                SessionKeys::shared(key)
            }
            ProtocolVersion::V2Directional => {
                let mut okm = [0u8; 2 * KEY_SIZE];
                hk.expand(&info, &mut okm)
                    .expect("64 bytes is valid output length");

                let mut key_a = [0u8; KEY_SIZE];
                let mut key_b = [0u8; KEY_SIZE];
                key_a.copy_from_slice(&okm[..KEY_SIZE]);
                key_b.copy_from_slice(&okm[KEY_SIZE..]);
                okm.zeroize();

                if own_is_first {
                    SessionKeys::directional(key_a, key_b)
                } else {
                    SessionKeys::directional(key_b, key_a)
                }
            }
        };

        debug!(protocol = %self.protocol, own_is_first, "Derived session keys");
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directional_keys_mirror() {
        let alice = IdentityKeyPair::generate();
        let bob = IdentityKeyPair::generate();
        let deriver = SessionKeyDeriver::new(ProtocolVersion::V2Directional);

        let a = deriver.derive(&alice, &bob.public_bytes()).unwrap();
        let b = deriver.derive(&bob, &alice.public_bytes()).unwrap();

        assert_eq!(a.tx, b.rx);
        assert_eq!(a.rx, b.tx);
        assert_ne!(a.tx, a.rx);
    }

    #[test]
    fn test_role_follows_key_order() {
        let alice = IdentityKeyPair::generate();
        let bob = IdentityKeyPair::generate();
        let deriver = SessionKeyDeriver::new(ProtocolVersion::V2Directional);

        let (low, high) = if alice.public_bytes() < bob.public_bytes() {
            (&alice, &bob)
        } else {
            (&bob, &alice)
        };

        let low_keys = deriver.derive(low, &high.public_bytes()).unwrap();

        // Recompute key A by hand: the smaller key's tx is always the first half.
        let shared = low
            .secret_key()
            .diffie_hellman(&PublicKey::from(high.public_bytes()));
        let mut info = LABEL_V2_DIRECTIONAL.to_vec();
        info.extend_from_slice(&low.public_bytes());
        info.extend_from_slice(&high.public_bytes());
        let mut okm = [0u8; 64];
        Hkdf::<Sha256>::new(None, shared.as_bytes())
            .expand(&info, &mut okm)
            .unwrap();

        assert_eq!(&low_keys.tx[..], &okm[..32]);
        assert_eq!(&low_keys.rx[..], &okm[32..]);
    }

    #[test]
    fn test_shared_protocol_single_key() {
        let alice = IdentityKeyPair::generate();
        let bob = IdentityKeyPair::generate();
        let deriver = SessionKeyDeriver::new(ProtocolVersion::V1Shared);

        let a = deriver.derive(&alice, &bob.public_bytes()).unwrap();
        let b = deriver.derive(&bob, &alice.public_bytes()).unwrap();

        assert_eq!(a.tx, a.rx);
        assert_eq!(a.tx, b.tx);
        assert_eq!(a.protocol(), ProtocolVersion::V1Shared);
    }

    #[test]
    fn test_protocol_versions_diverge() {
        let alice = IdentityKeyPair::generate();
        let bob = IdentityKeyPair::generate();

        let v1 = SessionKeyDeriver::new(ProtocolVersion::V1Shared)
            .derive(&alice, &bob.public_bytes())
            .unwrap();
        let v2 = SessionKeyDeriver::new(ProtocolVersion::V2Directional)
            .derive(&alice, &bob.public_bytes())
            .unwrap();

        assert_ne!(v1.tx, v2.tx);
        assert_ne!(v1.tx, v2.rx);
    }

    #[test]
    fn test_rejects_wrong_peer_length() {
        let alice = IdentityKeyPair::generate();
        let deriver = SessionKeyDeriver::new(ProtocolVersion::V2Directional);

        let result = deriver.derive(&alice, &[0u8; 33]);
        assert!(matches!(
            result,
            Err(SessionError::Key(KeyError::InvalidKeyLength { expected: 32, got: 33 }))
        ));
    }

    #[test]
    fn test_export_import_directional() {
        let keys = SessionKeys::directional([1u8; 32], [2u8; 32]);
        let exported = keys.export();

        let record: SessionRecord = serde_json::from_slice(&exported).unwrap();
        assert_eq!(record.tx, BASE64.encode([1u8; 32]));

        let imported = SessionKeys::import(&exported).unwrap();
        assert_eq!(imported, keys);
    }

    #[test]
    fn test_export_import_shared() {
        let keys = SessionKeys::shared([7u8; 32]);
        let exported = keys.export();
        assert_eq!(exported, vec![7u8; 32]);

        let imported = SessionKeys::import(&exported).unwrap();
        assert_eq!(imported.protocol(), ProtocolVersion::V1Shared);
        assert_eq!(imported.rx, [7u8; 32]);
    }

    #[test]
    fn test_import_rejects_short_record_fields() {
        let record = SessionRecord {
            tx: BASE64.encode([1u8; 16]),
            rx: BASE64.encode([2u8; 32]),
        };
        let json = serde_json::to_vec(&record).unwrap();

        assert!(matches!(
            SessionKeys::import(&json),
            Err(SessionError::Key(KeyError::InvalidKeyLength { .. }))
        ));
        assert!(matches!(
            SessionKeys::import(b"not json"),
            Err(SessionError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_protocol_version_parse() {
        assert_eq!("v1".parse::<ProtocolVersion>(), Ok(ProtocolVersion::V1Shared));
        assert_eq!(
            "V2-Directional".parse::<ProtocolVersion>(),
            Ok(ProtocolVersion::V2Directional)
        );
        assert!("v3".parse::<ProtocolVersion>().is_err());
    }

    #[test]
    fn test_debug_redacts_keys() {
        let keys = SessionKeys::directional([0xAB; 32], [0xCD; 32]);
        let debug = format!("{:?}", keys);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("171"));
    }

    #[test]
    fn test_low_order_peer_key_is_accepted() {
        // Zero and the order-4 point u = 1 both force an all-zero shared secret
        let mut low_order = [0u8; KEY_SIZE];
        low_order[0] = 1;
        let identity = IdentityKeyPair::generate();

        for protocol in [ProtocolVersion::V1Shared, ProtocolVersion::V2Directional] {
            let deriver = SessionKeyDeriver::new(protocol);
            for peer in [[0u8; KEY_SIZE], low_order] {
                let keys = deriver.derive(&identity, &peer).unwrap();
                assert_eq!(deriver.derive(&identity, &peer).unwrap(), keys);
            }
        }
    }
}
