//! Credential validation
//!
//! Validation is always explicit and never auto-corrects: a credential
//! that fails any check is rejected with the offending field named.

use std::collections::BTreeSet;
use tracing::warn;

use crate::credential::Credential;
use crate::error::CredentialError;

/// Validate a signed credential.
///
/// Checks required fields, claim/salt key-set equality, the date range,
/// and that the proof carries a non-empty signature.
pub fn validate(credential: &Credential) -> Result<(), CredentialError> {
    validate_unsigned(credential)?;
    if credential.proof.signature_value.is_empty() {
        warn!(id = %credential.id, "credential proof has no signature");
        return Err(CredentialError::missing("proof.signature"));
    }
    Ok(())
}

/// Structural validation that does not require a signature yet.
///
/// Used on the signing path: the thumbprint is computed over a credential
/// whose proof is otherwise complete but not yet signed.
pub(crate) fn validate_unsigned(credential: &Credential) -> Result<(), CredentialError> {
    require(&credential.context, "@context")?;
    require(&credential.id, "id")?;
    require(&credential.issuer, "issuer")?;
    require(&credential.proof.creator, "proof.creator")?;
    require(&credential.proof.proof_type, "proof.type")?;
    if credential.cpt_id == 0 {
        return Err(CredentialError::missing("cptId"));
    }
    if credential.types.is_empty() {
        return Err(CredentialError::missing("type"));
    }
    if credential.expiration_date <= credential.issuance_date {
        return Err(CredentialError::DateRangeInvalid {
            issued: credential.issuance_date,
            expires: credential.expiration_date,
        });
    }
    if !claim_salt_keys_match(credential) {
        warn!(id = %credential.id, "claim and salt key sets differ");
        return Err(CredentialError::ClaimSaltMismatch);
    }
    Ok(())
}

/// Check the credential's claim keys against the field set of its
/// registered schema.
///
/// The field set comes from the registry via the calling application;
/// the credential model itself never talks to the ledger. An empty claim
/// map is valid only against an empty field set, which this check gives
/// for free.
pub fn validate_against_schema(
    credential: &Credential,
    allowed_fields: &BTreeSet<String>,
) -> Result<(), CredentialError> {
    for field in credential.claim.keys() {
        if !allowed_fields.contains(field) {
            return Err(CredentialError::UnknownClaimField {
                field: field.clone(),
            });
        }
    }
    Ok(())
}

fn claim_salt_keys_match(credential: &Credential) -> bool {
    credential.claim.len() == credential.proof.salt.len()
        && credential
            .claim
            .keys()
            .all(|k| credential.proof.salt.contains_key(k))
}

fn require(value: &str, field: &'static str) -> Result<(), CredentialError> {
    if value.is_empty() {
        Err(CredentialError::missing(field))
    } else {
        Ok(())
    }
}
