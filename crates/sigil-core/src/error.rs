//! Error types for the credential model

use thiserror::Error;

/// Errors from credential validation, hashing, and (de)serialization
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Missing or empty required field: {field}")]
    MissingField { field: String },

    #[error("Claim and salt key sets do not match")]
    ClaimSaltMismatch,

    #[error("Expiration {expires} is not after issuance {issued}")]
    DateRangeInvalid { issued: i64, expires: i64 },

    #[error("Claim field not in registered schema: {field}")]
    UnknownClaimField { field: String },

    #[error("Data type cast failed: {0}")]
    DataTypeCast(String),
}

impl CredentialError {
    pub(crate) fn missing(field: impl Into<String>) -> Self {
        CredentialError::MissingField {
            field: field.into(),
        }
    }
}

impl From<serde_json::Error> for CredentialError {
    fn from(err: serde_json::Error) -> Self {
        CredentialError::DataTypeCast(err.to_string())
    }
}

impl From<chrono::ParseError> for CredentialError {
    fn from(err: chrono::ParseError) -> Self {
        CredentialError::DataTypeCast(err.to_string())
    }
}
