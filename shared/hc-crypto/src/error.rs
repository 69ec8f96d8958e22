//! Crypto Errors

use thiserror::Error;

/// Result alias for key handling.
pub type Result<T> = std::result::Result<T, CryptoError>;

/// Errors raised while loading verification keys.
///
/// Signature checks never produce these: a malformed signature simply fails
/// verification.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Key is not valid hex.
    #[error("Public key is not valid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    /// Key decoded to the wrong number of bytes.
    #[error("Public key must be 32 bytes, got {0}")]
    InvalidKeyLength(usize),
    /// Bytes do not describe a point on the curve.
    #[error("Public key is not a valid Ed25519 point")]
    InvalidPublicKey,
}
