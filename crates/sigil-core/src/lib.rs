//! Sigil Core
//!
//! The salted-claim verifiable credential model. A credential carries a
//! per-claim salt next to every claim value; each claim is hashed
//! independently with its salt, and the credential hash is a fold over
//! the ordered per-claim hashes. Because the fold only sees hash values,
//! a holder can replace any claim's plaintext with its precomputed hash
//! (selective disclosure) without breaking the issuer's signature.

pub mod credential;
pub mod disclosure;
pub mod error;
pub mod hashing;
pub mod validate;

pub use credential::{Credential, CredentialBuilder, Proof, BASE_CREDENTIAL_TYPE};
pub use disclosure::{disclose, hidden_keys, is_claim_hidden};
pub use error::CredentialError;
pub use hashing::{
    canonical_serialize, claim_root, compute_hash, per_claim_hash, thumbprint_without_signature,
};
pub use validate::{validate, validate_against_schema};
