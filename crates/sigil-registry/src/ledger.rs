//! The external ledger collaborator boundary
//!
//! The registry client never manages connections, broadcasts
//! transactions, or polls for receipts itself; all of that lives behind
//! [`LedgerClient`]. Timeouts and cancellation are the collaborator's
//! concern — a failure from it must be accepted without assuming any
//! partial state was persisted on-ledger.

use async_trait::async_trait;
use ethers_core::types::{Bytes, H256};
use serde::{Deserialize, Serialize};

use crate::abi::CallPayload;
use crate::error::RegistryError;

/// One event log emitted by a transaction.
///
/// `topics[0]` is the hash of the event's declared signature; `data`
/// holds the ABI-encoded non-indexed parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub topics: Vec<H256>,
    pub data: Bytes,
}

/// A mined transaction's receipt: the ordered sequence of logs it
/// emitted, in the ledger's natural emission order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub transaction_hash: H256,
    pub block_number: u64,
    pub logs: Vec<LogEntry>,
}

/// Backend that broadcasts payloads to the ledger.
///
/// `submit` is a state-changing write that resolves to the mined
/// transaction's receipt; `call` is a read-only execution returning the
/// raw ABI-encoded result. Transport failures surface as
/// [`RegistryError::Unavailable`].
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Broadcast a state-changing call and wait for its receipt
    async fn submit(&self, payload: &CallPayload) -> Result<TransactionReceipt, RegistryError>;

    /// Execute a read-only call
    async fn call(&self, payload: &CallPayload) -> Result<Bytes, RegistryError>;
}

#[async_trait]
impl<T: LedgerClient + ?Sized> LedgerClient for std::sync::Arc<T> {
    async fn submit(&self, payload: &CallPayload) -> Result<TransactionReceipt, RegistryError> {
        (**self).submit(payload).await
    }

    async fn call(&self, payload: &CallPayload) -> Result<Bytes, RegistryError> {
        (**self).call(payload).await
    }
}
