//! Ed25519 Detached Signatures
//!
//! The platform signs `timestamp ‖ body` and ships the signature as hex in a
//! request header. Verification fails closed on any malformed input.

use std::fmt;

use ed25519_dalek::{Signature, VerifyingKey, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};

use crate::{CryptoError, Result};

/// Application public key used to authenticate inbound requests.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(VerifyingKey);

impl PublicKey {
    /// Decode a key from its hex form (as shown in the developer portal).
    pub fn from_hex(hex_key: &str) -> Result<Self> {
        let bytes = hex::decode(hex_key.trim())?;
        let bytes: [u8; PUBLIC_KEY_LENGTH] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| CryptoError::InvalidKeyLength(b.len()))?;
        Self::from_bytes(&bytes)
    }

    /// Build a key from raw bytes, rejecting invalid curve points.
    pub fn from_bytes(bytes: &[u8; PUBLIC_KEY_LENGTH]) -> Result<Self> {
        VerifyingKey::from_bytes(bytes)
            .map(Self)
            .map_err(|_| CryptoError::InvalidPublicKey)
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        self.0.as_bytes()
    }

    /// Lowercase hex encoding of the key.
    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }
}

impl From<VerifyingKey> for PublicKey {
    fn from(key: VerifyingKey) -> Self {
        Self(key)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PublicKey").field(&self.to_hex()).finish()
    }
}

/// Verify a hex-encoded signature over `message`.
///
/// Returns `false` for undecodable hex, a signature of the wrong length, or a
/// signature that does not match. Never panics.
pub fn verify(message: &[u8], signature_hex: &str, public_key: &PublicKey) -> bool {
    let Ok(bytes) = hex::decode(signature_hex) else {
        return false;
    };
    let Ok(bytes) = <[u8; SIGNATURE_LENGTH]>::try_from(bytes.as_slice()) else {
        return false;
    };

    let signature = Signature::from_bytes(&bytes);
    // Strict mode also rejects small-order keys and R values, unlike plain RFC 8032 verification.
    public_key.0.verify_strict(message, &signature).is_ok()
}

/// Verify a request signature. The signed message is `timestamp ‖ body`.
pub fn verify_request(
    timestamp: &[u8],
    body: &[u8],
    signature_hex: &str,
    public_key: &PublicKey,
) -> bool {
    let mut message = Vec::with_capacity(timestamp.len() + body.len());
    message.extend_from_slice(timestamp);
    message.extend_from_slice(body);
    verify(&message, signature_hex, public_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signer, SigningKey};

    fn keypair() -> (SigningKey, PublicKey) {
        let signing = SigningKey::generate(&mut rand::thread_rng());
        let public = PublicKey::from(signing.verifying_key());
        (signing, public)
    }

    fn sign_hex(key: &SigningKey, message: &[u8]) -> String {
        hex::encode(key.sign(message).to_bytes())
    }

    #[test]
    fn valid_signature_verifies() {
        let (signing, public) = keypair();
        let sig = sign_hex(&signing, b"1700000000{\"type\":1}");

        assert!(verify(b"1700000000{\"type\":1}", &sig, &public));
    }

    #[test]
    fn rfc8032_test_vector_1() {
        let public = PublicKey::from_hex(
            "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a",
        )
        .unwrap();
        let sig = "e5564300c360ac729086e2cc806e828a84877f1eb8e5d974d873e065224901555fb8821590a33bacc61e39701cf9b46bd25bf5f0595bbe24655141438e7a100b";

        assert!(verify(b"", sig, &public));
        assert!(verify_request(b"", b"", sig, &public));
        assert!(!verify(b"x", sig, &public));
    }

    #[test]
    fn small_order_key_is_rejected() {
        // Identity point as key, R = identity and s = 0: satisfies the plain
        // verification equation for every message.
        let public = PublicKey::from_hex(&format!("01{}", "00".repeat(31))).unwrap();
        let sig = format!("01{}", "00".repeat(63));

        assert!(!verify(b"any message", &sig, &public));
        assert!(!verify(b"", &sig, &public));
    }

    #[test]
    fn request_message_is_timestamp_then_body() {
        let (signing, public) = keypair();
        let sig = sign_hex(&signing, b"1700000000{\"type\":1}");

        assert!(verify_request(b"1700000000", b"{\"type\":1}", &sig, &public));
        // Swapped order is a different message.
        assert!(!verify_request(b"{\"type\":1}", b"1700000000", &sig, &public));
    }

    #[test]
    fn tampered_body_fails() {
        let (signing, public) = keypair();
        let sig = sign_hex(&signing, b"123{\"type\":2}");

        assert!(!verify_request(b"123", b"{\"type\":1}", &sig, &public));
        assert!(!verify_request(b"124", b"{\"type\":2}", &sig, &public));
    }

    #[test]
    fn wrong_key_fails() {
        let (signing, _) = keypair();
        let (_, other) = keypair();
        let sig = sign_hex(&signing, b"payload");

        assert!(!verify(b"payload", &sig, &other));
    }

    #[test]
    fn malformed_signatures_fail_closed() {
        let (_, public) = keypair();

        assert!(!verify(b"payload", "zz", &public));
        assert!(!verify(b"payload", "", &public));
        assert!(!verify(b"payload", "abc", &public));
        // Valid hex, wrong length.
        assert!(!verify(b"payload", &"ab".repeat(63), &public));
        assert!(!verify(b"payload", &"00".repeat(64), &public));
    }

    #[test]
    fn key_hex_round_trip() {
        let (_, public) = keypair();
        let parsed = PublicKey::from_hex(&public.to_hex()).unwrap();
        assert_eq!(parsed, public);
    }

    #[test]
    fn key_from_hex_rejects_bad_input() {
        assert!(matches!(
            PublicKey::from_hex("not-hex"),
            Err(CryptoError::InvalidHex(_))
        ));
        assert!(matches!(
            PublicKey::from_hex("abcd"),
            Err(CryptoError::InvalidKeyLength(2))
        ));
    }

    #[test]
    fn key_from_hex_ignores_surrounding_whitespace() {
        let (_, public) = keypair();
        let padded = format!("  {}\n", public.to_hex());
        assert_eq!(PublicKey::from_hex(&padded).unwrap(), public);
    }
}
