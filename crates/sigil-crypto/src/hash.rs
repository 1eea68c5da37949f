//! Hash functions for Sigil
//!
//! Keccak-256 (the Ethereum variant of SHA-3) is used everywhere a hash
//! crosses the ledger boundary, so per-claim hashes computed off-chain
//! line up with what the registry contract would compute on-chain.

use sha3::{Digest, Keccak256};

/// Compute Keccak-256 hash
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute Keccak-256 hash of multiple byte slices
pub fn keccak256_multi(data: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    for d in data {
        hasher.update(d);
    }
    hasher.finalize().into()
}

/// Hex-encode a hash with the conventional `0x` prefix
pub fn to_hex(hash: &[u8; 32]) -> String {
    format!("0x{}", hex::encode(hash))
}

/// Parse a `0x`-prefixed hex hash back into bytes
pub fn from_hex(s: &str) -> Option<[u8; 32]> {
    let raw = s.strip_prefix("0x")?;
    let bytes = hex::decode(raw).ok()?;
    bytes.try_into().ok()
}
