//! httpcord Request Signatures
//!
//! Ed25519 verification of the detached signatures the platform attaches to
//! every interaction request.

pub mod error;
pub mod signature;

pub use error::{CryptoError, Result};
pub use signature::{verify, verify_request, PublicKey};
