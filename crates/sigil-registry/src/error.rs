//! Error types for registry operations

use thiserror::Error;

/// Errors from ABI encoding, event decoding, and registry calls
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Event log decode failed: {0}")]
    EventDecode(String),

    #[error("ABI result decode failed: {0}")]
    AbiDecode(String),

    #[error("Schema too large: {actual} entries, fixed width is {max}")]
    SchemaTooLarge { actual: usize, max: usize },

    #[error("Schema not found: {schema_id}")]
    SchemaNotFound { schema_id: u64 },

    #[error("Receipt contains no result event")]
    NoResultEvent,

    #[error("Receipt contains {count} result events, expected exactly one")]
    AmbiguousResultEvent { count: usize },

    #[error("Registry unavailable: {0}")]
    Unavailable(String),
}
