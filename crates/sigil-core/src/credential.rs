//! Credential entity and JSON wire form
//!
//! The wire form follows the W3C VC vocabulary: `@context`, camelCase
//! keys, timestamps as UTC strings. Internally timestamps are epoch
//! seconds so hashing never touches a locale- or format-dependent
//! representation; the conversion is lossless both ways.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::error::CredentialError;
use crate::validate;

/// Default JSON-LD context for issued credentials
pub const DEFAULT_CONTEXT: &str = "https://www.w3.org/2018/credentials/v1";

/// Base type tag carried by every originally issued, unaltered credential
pub const BASE_CREDENTIAL_TYPE: &str = "VerifiableCredential";

/// Default signature algorithm tag for the proof
pub const DEFAULT_PROOF_TYPE: &str = "Secp256k1";

/// Signature metadata attached to a credential at issuance.
///
/// The per-claim salts live here rather than next to the claim map, so a
/// credential's claim object stays exactly what the issuer attested to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proof {
    /// DID of the signing party
    pub creator: String,

    /// When the signature was created (epoch seconds; UTC string on the wire)
    #[serde(with = "utc_seconds")]
    pub created: i64,

    /// Signature algorithm tag
    #[serde(rename = "type")]
    pub proof_type: String,

    /// Base64 signature over the credential thumbprint
    #[serde(rename = "signature")]
    pub signature_value: String,

    /// Per-claim salts, same key set as the claim map
    pub salt: BTreeMap<String, String>,
}

/// A salted-claim verifiable credential.
///
/// Created once by an issuer, signed once, and immutable afterwards
/// except for the disclosed/hidden representation swap performed by
/// [`crate::disclosure::disclose`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    /// Credential vocabulary version tag
    #[serde(rename = "@context")]
    pub context: String,

    /// Globally unique identifier (UUID)
    pub id: String,

    /// Registered Claim Protocol Template this credential conforms to
    #[serde(rename = "cptId")]
    pub cpt_id: u32,

    /// DID of the issuing party
    pub issuer: String,

    /// Issuance time (epoch seconds; UTC string on the wire)
    #[serde(rename = "issuanceDate", with = "utc_seconds")]
    pub issuance_date: i64,

    /// Expiration time; must be after the issuance time
    #[serde(rename = "expirationDate", with = "utc_seconds")]
    pub expiration_date: i64,

    /// Claim name to claim value
    pub claim: Map<String, Value>,

    /// Signature metadata and per-claim salts
    pub proof: Proof,

    /// Ordered credential-type tags; always includes the base tag
    #[serde(rename = "type")]
    pub types: Vec<String>,
}

impl Credential {
    /// Parse a credential from its JSON wire form and re-validate it
    pub fn from_json(json: &str) -> Result<Self, CredentialError> {
        if json.trim().is_empty() {
            return Err(CredentialError::DataTypeCast(
                "credential JSON is empty".to_string(),
            ));
        }
        let credential: Credential = serde_json::from_str(json)?;
        validate::validate(&credential)?;
        Ok(credential)
    }

    /// Serialize to the JSON wire form
    pub fn to_json(&self) -> Result<String, CredentialError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Directly extract the signature value
    pub fn signature(&self) -> &str {
        &self.proof.signature_value
    }

    /// Whether this credential still carries the base "originally issued"
    /// type tag
    pub fn is_original(&self) -> bool {
        self.types.iter().any(|t| t == BASE_CREDENTIAL_TYPE)
    }

    /// Append a credential-type tag
    pub fn add_type(&mut self, tag: impl Into<String>) {
        self.types.push(tag.into());
    }

    /// Attach the issuer's signature over the thumbprint.
    ///
    /// This is the final issuance step; the credential is immutable
    /// afterwards.
    pub fn attach_signature(&mut self, signature_base64: impl Into<String>) {
        self.proof.signature_value = signature_base64.into();
    }
}

/// Builder for issuing a new credential.
///
/// Generates the id, issuance timestamp, and one random salt per claim
/// key. Signing stays external: build the credential, compute its
/// thumbprint, sign it with the issuer key, then call
/// [`Credential::attach_signature`].
pub struct CredentialBuilder {
    cpt_id: u32,
    issuer: String,
    claim: Map<String, Value>,
    context: String,
    proof_type: String,
    validity_seconds: i64,
}

impl CredentialBuilder {
    pub fn new(cpt_id: u32, issuer: impl Into<String>, claim: Map<String, Value>) -> Self {
        Self {
            cpt_id,
            issuer: issuer.into(),
            claim,
            context: DEFAULT_CONTEXT.to_string(),
            proof_type: DEFAULT_PROOF_TYPE.to_string(),
            validity_seconds: 365 * 24 * 3600,
        }
    }

    /// Override the default context tag
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    /// Override the default signature algorithm tag
    pub fn proof_type(mut self, proof_type: impl Into<String>) -> Self {
        self.proof_type = proof_type.into();
        self
    }

    /// Override the default one-year validity window
    pub fn validity_seconds(mut self, seconds: i64) -> Self {
        self.validity_seconds = seconds;
        self
    }

    /// Build the unsigned credential
    pub fn build(self) -> Credential {
        let now = chrono::Utc::now().timestamp();
        let salt = sigil_crypto::generate_salts(self.claim.keys().map(String::as_str));

        Credential {
            context: self.context,
            id: uuid::Uuid::new_v4().to_string(),
            cpt_id: self.cpt_id,
            issuer: self.issuer.clone(),
            issuance_date: now,
            expiration_date: now + self.validity_seconds,
            claim: self.claim,
            proof: Proof {
                creator: self.issuer,
                created: now,
                proof_type: self.proof_type,
                signature_value: String::new(),
                salt,
            },
            types: vec![BASE_CREDENTIAL_TYPE.to_string()],
        }
    }
}

/// Lossless UTC-string <-> epoch-seconds conversion for wire timestamps
mod utc_seconds {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(ts: &i64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let dt = DateTime::<Utc>::from_timestamp(*ts, 0)
            .ok_or_else(|| serde::ser::Error::custom(format!("timestamp {ts} out of range")))?;
        serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let dt = DateTime::parse_from_rfc3339(&s).map_err(serde::de::Error::custom)?;
        Ok(dt.timestamp())
    }
}
