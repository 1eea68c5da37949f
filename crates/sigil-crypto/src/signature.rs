//! RSV signature wire codec
//!
//! Represents a secp256k1 signature as the (v, r, s) triple the registry
//! contract expects. This module only validates the wire format; signing
//! and recovery are the caller's concern.

use base64::prelude::{Engine, BASE64_STANDARD};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Byte length of the serialized form: v || r || s
pub const SIGNATURE_LENGTH: usize = 65;

/// Errors from signature encoding/decoding
#[derive(Error, Debug)]
pub enum SignatureError {
    #[error("Invalid signature encoding: {reason}")]
    InvalidEncoding { reason: String },
}

impl SignatureError {
    fn invalid(reason: impl Into<String>) -> Self {
        SignatureError::InvalidEncoding {
            reason: reason.into(),
        }
    }
}

/// A secp256k1 signature triple in Ethereum form.
///
/// `v` is the recovery id in the Ethereum convention: canonical values
/// are 27 and 28. [`RsvSignature::from_bytes`] also accepts raw recovery
/// ids 0 and 1 and normalizes them by adding 27.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsvSignature {
    v: u8,
    r: [u8; 32],
    s: [u8; 32],
}

impl RsvSignature {
    /// Construct from components, validating the recovery id
    pub fn new(v: u8, r: [u8; 32], s: [u8; 32]) -> Result<Self, SignatureError> {
        let v = normalize_recovery_id(v)?;
        Ok(Self { v, r, s })
    }

    /// The recovery id (always 27 or 28)
    pub fn v(&self) -> u8 {
        self.v
    }

    /// The r component
    pub fn r(&self) -> &[u8; 32] {
        &self.r
    }

    /// The s component
    pub fn s(&self) -> &[u8; 32] {
        &self.s
    }

    /// Serialize as the 65-byte wire form: v || r || s
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LENGTH] {
        let mut out = [0u8; SIGNATURE_LENGTH];
        out[0] = self.v;
        out[1..33].copy_from_slice(&self.r);
        out[33..65].copy_from_slice(&self.s);
        out
    }

    /// Parse the 65-byte wire form produced by [`RsvSignature::to_bytes`]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignatureError> {
        if bytes.len() != SIGNATURE_LENGTH {
            return Err(SignatureError::invalid(format!(
                "expected {} bytes, got {}",
                SIGNATURE_LENGTH,
                bytes.len()
            )));
        }
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[1..33]);
        s.copy_from_slice(&bytes[33..65]);
        Self::new(bytes[0], r, s)
    }

    /// Base64 form used in the credential proof on the wire
    pub fn to_base64(&self) -> String {
        BASE64_STANDARD.encode(self.to_bytes())
    }

    /// Parse the base64 proof form
    pub fn from_base64(encoded: &str) -> Result<Self, SignatureError> {
        let bytes = BASE64_STANDARD
            .decode(encoded)
            .map_err(|e| SignatureError::invalid(format!("bad base64: {e}")))?;
        Self::from_bytes(&bytes)
    }
}

fn normalize_recovery_id(v: u8) -> Result<u8, SignatureError> {
    match v {
        27 | 28 => Ok(v),
        0 | 1 => Ok(v + 27),
        other => Err(SignatureError::invalid(format!(
            "recovery id {other} outside 27/28 (or raw 0/1)"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_round_trip() {
        let sig = RsvSignature::new(27, [0xAA; 32], [0xBB; 32]).unwrap();
        let bytes = sig.to_bytes();
        assert_eq!(bytes[0], 27);
        assert_eq!(RsvSignature::from_bytes(&bytes).unwrap(), sig);
    }

    #[test]
    fn test_raw_recovery_id_normalized() {
        let sig = RsvSignature::new(1, [1; 32], [2; 32]).unwrap();
        assert_eq!(sig.v(), 28);
    }

    #[test]
    fn test_rejects_bad_recovery_id() {
        assert!(RsvSignature::new(29, [0; 32], [0; 32]).is_err());
        assert!(RsvSignature::new(2, [0; 32], [0; 32]).is_err());
    }

    #[test]
    fn test_rejects_bad_length() {
        assert!(RsvSignature::from_bytes(&[0u8; 64]).is_err());
        assert!(RsvSignature::from_bytes(&[0u8; 66]).is_err());
    }

    #[test]
    fn test_base64_round_trip() {
        let sig = RsvSignature::new(28, [7; 32], [9; 32]).unwrap();
        let encoded = sig.to_base64();
        assert_eq!(RsvSignature::from_base64(&encoded).unwrap(), sig);
        assert!(RsvSignature::from_base64("not base64!!").is_err());
    }
}
