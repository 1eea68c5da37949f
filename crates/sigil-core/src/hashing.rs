//! Canonical serialization and salted-claim hashing
//!
//! Every function here is a pure computation over an immutable
//! [`Credential`] value. The byte encoding must stay reproducible across
//! independent implementations: strings are length-prefixed UTF-8, all
//! integers are fixed-width big-endian, and map keys are visited in
//! lexicographic order (serde_json's default map is BTree-backed, so
//! claim iteration is already sorted).
//!
//! Per-claim hashes are computed independently of each other, and the
//! credential hash folds only over those hash values. That independence
//! is what makes selective disclosure work: a hidden claim's plaintext
//! can be swapped for its precomputed hash without changing the fold.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use sigil_crypto::hash::{self, keccak256, keccak256_multi};
use sigil_crypto::salt::HIDDEN_SALT;

use crate::credential::Credential;
use crate::error::CredentialError;
use crate::validate;

/// Canonical string form of a claim value: compact JSON with sorted keys
pub(crate) fn value_repr(value: &Value) -> String {
    // serde_json::Value serializes objects in key order already
    value.to_string()
}

/// Hash one claim with its salt.
///
/// A salt equal to [`HIDDEN_SALT`] marks a hidden claim: its stored value
/// is already the hex per-claim hash and is decoded directly instead of
/// being rehashed.
pub fn per_claim_hash(value: &Value, salt: &str) -> Result<[u8; 32], CredentialError> {
    if salt == HIDDEN_SALT {
        let hex = value.as_str().ok_or_else(|| {
            CredentialError::DataTypeCast("hidden claim value is not a hash string".to_string())
        })?;
        return hash::from_hex(hex).ok_or_else(|| {
            CredentialError::DataTypeCast(format!("hidden claim value is not a valid hash: {hex}"))
        });
    }
    Ok(keccak256_multi(&[
        value_repr(value).as_bytes(),
        salt.as_bytes(),
    ]))
}

/// Fold the ordered per-claim hashes into one claim root
pub fn claim_root(
    claim: &Map<String, Value>,
    salt: &BTreeMap<String, String>,
) -> Result<[u8; 32], CredentialError> {
    // Sorted explicitly rather than relying on the map's iteration order
    let mut keys: Vec<&String> = claim.keys().collect();
    keys.sort();

    let mut input = Vec::with_capacity(claim.len() * 64);
    for key in keys {
        let value = &claim[key.as_str()];
        let key_salt = salt.get(key).ok_or(CredentialError::ClaimSaltMismatch)?;
        input.extend_from_slice(key.as_bytes());
        input.push(0x00);
        input.extend_from_slice(&per_claim_hash(value, key_salt)?);
    }
    Ok(keccak256(&input))
}

/// Deterministic byte encoding of every field except the signature value.
///
/// The claim map and salts enter through the claim root, so disclosed
/// and original variants of the same credential serialize identically.
pub fn canonical_serialize(credential: &Credential) -> Result<Vec<u8>, CredentialError> {
    let mut out = Vec::new();
    write_str(&mut out, &credential.context);
    write_str(&mut out, &credential.id);
    out.extend_from_slice(&credential.cpt_id.to_be_bytes());
    write_str(&mut out, &credential.issuer);
    out.extend_from_slice(&credential.issuance_date.to_be_bytes());
    out.extend_from_slice(&credential.expiration_date.to_be_bytes());
    out.extend_from_slice(&(credential.types.len() as u32).to_be_bytes());
    for tag in &credential.types {
        write_str(&mut out, tag);
    }
    out.extend_from_slice(&claim_root(&credential.claim, &credential.proof.salt)?);
    write_str(&mut out, &credential.proof.creator);
    out.extend_from_slice(&credential.proof.created.to_be_bytes());
    write_str(&mut out, &credential.proof.proof_type);
    Ok(out)
}

fn write_str(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(&(s.len() as u32).to_be_bytes());
    out.extend_from_slice(s.as_bytes());
}

/// The exact payload a signature is computed over.
///
/// Independent of `proof.signature_value` by construction, so the
/// signature never signs itself. Works on unsigned credentials.
pub fn thumbprint_without_signature(credential: &Credential) -> Result<[u8; 32], CredentialError> {
    validate::validate_unsigned(credential)?;
    Ok(keccak256(&canonical_serialize(credential)?))
}

/// The unique hash of a signed credential
pub fn compute_hash(credential: &Credential) -> Result<[u8; 32], CredentialError> {
    validate::validate(credential)?;
    Ok(keccak256_multi(&[
        &canonical_serialize(credential)?,
        credential.proof.signature_value.as_bytes(),
    ]))
}
