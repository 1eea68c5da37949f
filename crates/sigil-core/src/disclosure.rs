//! Selective disclosure
//!
//! A holder derives a disclosed variant of a credential by replacing each
//! non-disclosed claim value with its precomputed per-claim hash and its
//! salt with the hidden marker. Keys are never removed, so the credential
//! hash stays computable and the issuer's signature stays verifiable.

use serde_json::Value;
use std::collections::BTreeSet;
use tracing::debug;

use sigil_crypto::hash;
use sigil_crypto::salt::HIDDEN_SALT;

use crate::credential::Credential;
use crate::error::CredentialError;
use crate::hashing::per_claim_hash;
use crate::validate;

/// Derive a variant that reveals only the given claim keys.
///
/// Claims already hidden stay hidden. Revealing a key that was hidden in
/// the input is impossible (the plaintext is gone) and is not attempted.
pub fn disclose(
    credential: &Credential,
    reveal: &BTreeSet<String>,
) -> Result<Credential, CredentialError> {
    validate::validate(credential)?;

    let mut disclosed = credential.clone();
    for (key, value) in &credential.claim {
        if reveal.contains(key) {
            continue;
        }
        let salt = &credential.proof.salt[key];
        let hashed = per_claim_hash(value, salt)?;
        disclosed
            .claim
            .insert(key.clone(), Value::String(hash::to_hex(&hashed)));
        disclosed
            .proof
            .salt
            .insert(key.clone(), HIDDEN_SALT.to_string());
    }
    let hidden = hidden_keys(&disclosed).len();
    debug!(
        id = %credential.id,
        hidden,
        total = disclosed.claim.len(),
        "derived disclosed credential"
    );
    Ok(disclosed)
}

/// Whether a claim key is hidden in this credential
pub fn is_claim_hidden(credential: &Credential, key: &str) -> bool {
    credential
        .proof
        .salt
        .get(key)
        .is_some_and(|s| s == HIDDEN_SALT)
}

/// The set of hidden claim keys
pub fn hidden_keys(credential: &Credential) -> BTreeSet<String> {
    credential
        .proof
        .salt
        .iter()
        .filter(|(_, salt)| salt.as_str() == HIDDEN_SALT)
        .map(|(key, _)| key.clone())
        .collect()
}
