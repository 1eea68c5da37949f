//! CPT registry client
//!
//! A registration call moves through `Building -> Signed -> Submitted ->
//! Confirmed | Failed`. The phases map onto types rather than a mutable
//! field: [`crate::abi::build_cpt_call`] produces the `Signed` artifact
//! (a [`crate::abi::CallPayload`] with the authorization baked in), submission hands
//! it to the [`LedgerClient`], and [`interpret_receipt`] performs the
//! one-shot terminal transition. Nothing here ever resubmits a payload —
//! replaying a signed payload against a ledger that already applied it
//! risks double registration, so retries are a caller decision made with
//! a fresh call.

use ethers_core::abi::Event;
use ethers_core::types::Address;
use tracing::{debug, warn};

use sigil_crypto::RsvSignature;

use crate::abi::{self, SchemaRecord};
use crate::error::RegistryError;
use crate::events::{self, CptRetLog, CredentialTemplateLog, DecodedEvent};
use crate::ledger::{LedgerClient, TransactionReceipt};

/// Terminal state of a registration call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStatus {
    /// The registry accepted the call
    Confirmed,
    /// The registry rejected the call; the code is the registry's own
    /// and is surfaced untranslated
    Failed { ret_code: i64 },
}

/// Outcome of one ledger write, decoded from the receipt's event logs.
///
/// Never constructed directly by business logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryCallResult {
    pub status: CallStatus,
    pub schema_id: u64,
    pub schema_version: i64,
}

impl RegistryCallResult {
    pub fn is_confirmed(&self) -> bool {
        self.status == CallStatus::Confirmed
    }
}

/// Success code emitted by the registry contract
const RET_CODE_SUCCESS: i64 = 0;

/// Client for the Claim Protocol Template registry contract
pub struct CptRegistry<L> {
    ledger: L,
}

impl<L: LedgerClient> CptRegistry<L> {
    pub fn new(ledger: L) -> Self {
        Self { ledger }
    }

    /// Register a new schema
    pub async fn register_cpt(
        &self,
        publisher: Address,
        field_ints: &[i64],
        field_hashes: &[[u8; 32]],
        schema_json: &str,
        signature: &RsvSignature,
    ) -> Result<RegistryCallResult, RegistryError> {
        self.write_cpt(
            abi::FUNC_REGISTER_CPT,
            events::register_cpt_ret_log(),
            publisher,
            field_ints,
            field_hashes,
            schema_json,
            signature,
        )
        .await
    }

    /// Update an existing schema
    pub async fn update_cpt(
        &self,
        publisher: Address,
        field_ints: &[i64],
        field_hashes: &[[u8; 32]],
        schema_json: &str,
        signature: &RsvSignature,
    ) -> Result<RegistryCallResult, RegistryError> {
        self.write_cpt(
            abi::FUNC_UPDATE_CPT,
            events::update_cpt_ret_log(),
            publisher,
            field_ints,
            field_hashes,
            schema_json,
            signature,
        )
        .await
    }

    /// Register a disclosure policy.
    ///
    /// Policy calls share the CPT call shape and the contract reports
    /// them through the CPT ret-log events.
    pub async fn register_policy(
        &self,
        publisher: Address,
        field_ints: &[i64],
        field_hashes: &[[u8; 32]],
        policy_json: &str,
        signature: &RsvSignature,
    ) -> Result<RegistryCallResult, RegistryError> {
        self.write_cpt(
            abi::FUNC_REGISTER_POLICY,
            events::register_cpt_ret_log(),
            publisher,
            field_ints,
            field_hashes,
            policy_json,
            signature,
        )
        .await
    }

    /// Update a disclosure policy
    pub async fn update_policy(
        &self,
        publisher: Address,
        field_ints: &[i64],
        field_hashes: &[[u8; 32]],
        policy_json: &str,
        signature: &RsvSignature,
    ) -> Result<RegistryCallResult, RegistryError> {
        self.write_cpt(
            abi::FUNC_UPDATE_POLICY,
            events::update_cpt_ret_log(),
            publisher,
            field_ints,
            field_hashes,
            policy_json,
            signature,
        )
        .await
    }

    /// Look up a registered schema. Read-only; no signature, no receipt.
    pub async fn query_cpt(&self, schema_id: u64) -> Result<SchemaRecord, RegistryError> {
        let payload = abi::build_query_call(schema_id);
        let raw = self.ledger.call(&payload).await?;
        abi::decode_schema_record(&raw, schema_id)
    }

    /// Decode `CredentialTemplate` events from a receipt
    pub fn decode_credential_templates(
        &self,
        receipt: &TransactionReceipt,
    ) -> Result<Vec<CredentialTemplateLog>, RegistryError> {
        let event = events::credential_template();
        events::decode_events(&receipt.logs, &event)
            .map(|decoded| CredentialTemplateLog::from_event(decoded?))
            .collect()
    }

    async fn write_cpt(
        &self,
        function: &'static str,
        result_event: Event,
        publisher: Address,
        field_ints: &[i64],
        field_hashes: &[[u8; 32]],
        schema_json: &str,
        signature: &RsvSignature,
    ) -> Result<RegistryCallResult, RegistryError> {
        let payload = abi::build_cpt_call(
            function,
            publisher,
            field_ints,
            field_hashes,
            schema_json,
            signature,
        )?;
        debug!(function, %publisher, bytes = payload.data.len(), "submitting registry call");

        let receipt = self.ledger.submit(&payload).await?;
        let result = interpret_receipt(&receipt, &result_event)?;
        if !result.is_confirmed() {
            warn!(
                function,
                schema_id = result.schema_id,
                status = ?result.status,
                "registry call failed"
            );
        }
        Ok(result)
    }
}

/// Interpret a receipt against a result-event descriptor.
///
/// The protocol guarantees at most one outcome event per call: zero
/// matches means the result is missing, more than one means the receipt
/// cannot be attributed to a single call. Both are protocol failures,
/// distinct from the registry reporting a nonzero code.
pub fn interpret_receipt(
    receipt: &TransactionReceipt,
    event: &Event,
) -> Result<RegistryCallResult, RegistryError> {
    let decoded: Vec<DecodedEvent> =
        events::decode_events(&receipt.logs, event).collect::<Result<_, _>>()?;

    let single = match decoded.as_slice() {
        [] => return Err(RegistryError::NoResultEvent),
        [one] => one.clone(),
        many => {
            return Err(RegistryError::AmbiguousResultEvent { count: many.len() });
        }
    };

    let ret = CptRetLog::from_event(single)?;
    let status = if ret.ret_code == RET_CODE_SUCCESS {
        CallStatus::Confirmed
    } else {
        CallStatus::Failed {
            ret_code: ret.ret_code,
        }
    };
    Ok(RegistryCallResult {
        status,
        schema_id: ret.cpt_id,
        schema_version: ret.cpt_version,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::register_cpt_ret_log;
    use crate::ledger::LogEntry;
    use ethers_core::abi::{self as ethabi, Token};
    use ethers_core::types::{H256, I256, U256};

    fn ret_log_entry(event: &Event, ret_code: u64, cpt_id: u64, version: i64) -> LogEntry {
        LogEntry {
            topics: vec![event.signature()],
            data: ethabi::encode(&[
                Token::Uint(U256::from(ret_code)),
                Token::Uint(U256::from(cpt_id)),
                Token::Int(I256::from(version).into_raw()),
            ])
            .into(),
        }
    }

    fn receipt(logs: Vec<LogEntry>) -> TransactionReceipt {
        TransactionReceipt {
            transaction_hash: H256::repeat_byte(0x01),
            block_number: 128,
            logs,
        }
    }

    #[test]
    fn test_single_success_event_confirms() {
        let event = register_cpt_ret_log();
        let result =
            interpret_receipt(&receipt(vec![ret_log_entry(&event, 0, 42, 1)]), &event).unwrap();
        assert_eq!(result.status, CallStatus::Confirmed);
        assert_eq!(result.schema_id, 42);
        assert_eq!(result.schema_version, 1);
        assert!(result.is_confirmed());
    }

    #[test]
    fn test_nonzero_ret_code_fails_with_code_surfaced() {
        let event = register_cpt_ret_log();
        let result =
            interpret_receipt(&receipt(vec![ret_log_entry(&event, 500301, 42, 1)]), &event)
                .unwrap();
        assert_eq!(result.status, CallStatus::Failed { ret_code: 500301 });
        assert!(!result.is_confirmed());
    }

    #[test]
    fn test_zero_matching_events_is_no_result() {
        let event = register_cpt_ret_log();
        assert!(matches!(
            interpret_receipt(&receipt(vec![]), &event),
            Err(RegistryError::NoResultEvent)
        ));
    }

    #[test]
    fn test_two_matching_events_is_ambiguous() {
        let event = register_cpt_ret_log();
        let logs = vec![
            ret_log_entry(&event, 0, 42, 1),
            ret_log_entry(&event, 0, 42, 1),
        ];
        assert!(matches!(
            interpret_receipt(&receipt(logs), &event),
            Err(RegistryError::AmbiguousResultEvent { count: 2 })
        ));
    }

    #[test]
    fn test_foreign_events_are_ignored() {
        let register = register_cpt_ret_log();
        let update = crate::events::update_cpt_ret_log();
        let logs = vec![
            ret_log_entry(&update, 0, 7, 2),
            ret_log_entry(&register, 0, 42, 1),
        ];
        let result = interpret_receipt(&receipt(logs), &register).unwrap();
        assert_eq!(result.schema_id, 42);
    }
}
