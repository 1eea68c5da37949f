//! Sigil Crypto
//!
//! Hashing and signature wire-format primitives for the Sigil credential
//! layer. Keccak-256 matches the hash used by the registry ledger; the
//! RSV codec validates secp256k1 signature triples without performing any
//! curve math itself.

pub mod hash;
pub mod salt;
pub mod signature;

pub use hash::{keccak256, keccak256_multi};
pub use salt::{generate_salt, generate_salts};
pub use signature::{RsvSignature, SignatureError};
