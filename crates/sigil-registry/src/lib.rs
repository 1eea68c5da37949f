//! Sigil Registry
//!
//! Client for the on-chain Claim Protocol Template (CPT) registry. A CPT
//! is a registered credential schema; this crate encodes the fixed-shape
//! registration calls the registry contract expects, submits them through
//! an external [`LedgerClient`], and interprets the asynchronous outcome
//! from the event logs in the transaction receipt — the ledger reports
//! results only through emitted events, never through return values.
//!
//! The registry deliberately knows nothing about the credential model in
//! `sigil-core`; registered schemas constrain credentials only through
//! the calling application.

pub mod abi;
pub mod cpt;
pub mod error;
pub mod events;
pub mod ledger;

pub use abi::{CallPayload, SchemaRecord, CHUNK_SIZE, MAX_FIELD_VALUES, MAX_SCHEMA_CHUNKS};
pub use cpt::{interpret_receipt, CallStatus, CptRegistry, RegistryCallResult};
pub use error::RegistryError;
pub use events::{CptRetLog, CredentialTemplateLog, DecodedEvent};
pub use ledger::{LedgerClient, LogEntry, TransactionReceipt};
