//! Event-log decoding
//!
//! The registry contract reports call outcomes only through emitted
//! events. Each event is described declaratively — name plus ordered
//! parameter types — and matching log entries are decoded in receipt
//! order. The receipt is static input, so decoding is a lazy,
//! restartable iterator rather than a stream.

use ethers_core::abi::{Event, EventParam, ParamType, RawLog, Token};

use crate::abi::int_to_i64;
use crate::error::RegistryError;
use crate::ledger::LogEntry;

/// Descriptor for `RegisterCptRetLog(uint256 retCode, uint256 cptId, int256 cptVersion)`
pub fn register_cpt_ret_log() -> Event {
    ret_log_event("RegisterCptRetLog")
}

/// Descriptor for `UpdateCptRetLog(uint256 retCode, uint256 cptId, int256 cptVersion)`
pub fn update_cpt_ret_log() -> Event {
    ret_log_event("UpdateCptRetLog")
}

/// Descriptor for `CredentialTemplate(uint256 cptId, bytes publicKey, bytes proof)`
pub fn credential_template() -> Event {
    Event {
        name: "CredentialTemplate".to_string(),
        inputs: vec![
            param("cptId", ParamType::Uint(256)),
            param("publicKey", ParamType::Bytes),
            param("proof", ParamType::Bytes),
        ],
        anonymous: false,
    }
}

fn ret_log_event(name: &str) -> Event {
    Event {
        name: name.to_string(),
        inputs: vec![
            param("retCode", ParamType::Uint(256)),
            param("cptId", ParamType::Uint(256)),
            param("cptVersion", ParamType::Int(256)),
        ],
        anonymous: false,
    }
}

fn param(name: &str, kind: ParamType) -> EventParam {
    EventParam {
        name: name.to_string(),
        kind,
        indexed: false,
    }
}

/// One decoded event occurrence: parameter values in declaration order
#[derive(Debug, Clone)]
pub struct DecodedEvent {
    pub params: Vec<Token>,
}

/// Whether a log entry was emitted by the described event
pub fn matches_signature(log: &LogEntry, event: &Event) -> bool {
    log.topics.first() == Some(&event.signature())
}

/// Decode all matching logs, preserving receipt order.
///
/// Non-matching entries are skipped. A matching entry whose data does
/// not fit the declared types yields [`RegistryError::EventDecode`] —
/// that is data corruption and is never truncated away.
pub fn decode_events<'a>(
    logs: &'a [LogEntry],
    event: &'a Event,
) -> impl Iterator<Item = Result<DecodedEvent, RegistryError>> + 'a {
    logs.iter()
        .filter(|log| matches_signature(log, event))
        .map(|log| {
            let raw = RawLog {
                topics: log.topics.clone(),
                data: log.data.to_vec(),
            };
            let parsed = event
                .parse_log(raw)
                .map_err(|e| RegistryError::EventDecode(e.to_string()))?;
            Ok(DecodedEvent {
                params: parsed.params.into_iter().map(|p| p.value).collect(),
            })
        })
}

/// Typed form of a `RegisterCptRetLog`/`UpdateCptRetLog` occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CptRetLog {
    pub ret_code: i64,
    pub cpt_id: u64,
    pub cpt_version: i64,
}

impl CptRetLog {
    pub fn from_event(event: DecodedEvent) -> Result<Self, RegistryError> {
        let mut params = event.params.into_iter();
        let ret_code = int_to_i64(next_uint(&mut params)?);
        let cpt_id = next_uint(&mut params)?.low_u64();
        let cpt_version = int_to_i64(next_int(&mut params)?);
        Ok(Self {
            ret_code,
            cpt_id,
            cpt_version,
        })
    }
}

/// Typed form of a `CredentialTemplate` occurrence
#[derive(Debug, Clone)]
pub struct CredentialTemplateLog {
    pub cpt_id: u64,
    pub public_key: Vec<u8>,
    pub proof: Vec<u8>,
}

impl CredentialTemplateLog {
    pub fn from_event(event: DecodedEvent) -> Result<Self, RegistryError> {
        let mut params = event.params.into_iter();
        let cpt_id = next_uint(&mut params)?.low_u64();
        let public_key = next_bytes(&mut params)?;
        let proof = next_bytes(&mut params)?;
        Ok(Self {
            cpt_id,
            public_key,
            proof,
        })
    }
}

fn next_uint(
    params: &mut impl Iterator<Item = Token>,
) -> Result<ethers_core::types::U256, RegistryError> {
    params
        .next()
        .and_then(Token::into_uint)
        .ok_or_else(shape_error)
}

fn next_int(
    params: &mut impl Iterator<Item = Token>,
) -> Result<ethers_core::types::U256, RegistryError> {
    params
        .next()
        .and_then(Token::into_int)
        .ok_or_else(shape_error)
}

fn next_bytes(params: &mut impl Iterator<Item = Token>) -> Result<Vec<u8>, RegistryError> {
    params
        .next()
        .and_then(Token::into_bytes)
        .ok_or_else(shape_error)
}

fn shape_error() -> RegistryError {
    RegistryError::EventDecode("event parameters do not match declared types".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers_core::abi;
    use ethers_core::types::{I256, U256};

    fn ret_log_entry(event: &Event, ret_code: u64, cpt_id: u64, version: i64) -> LogEntry {
        LogEntry {
            topics: vec![event.signature()],
            data: abi::encode(&[
                Token::Uint(U256::from(ret_code)),
                Token::Uint(U256::from(cpt_id)),
                Token::Int(I256::from(version).into_raw()),
            ])
            .into(),
        }
    }

    #[test]
    fn test_no_matching_logs_decodes_empty() {
        let register = register_cpt_ret_log();
        let update = update_cpt_ret_log();
        let logs = vec![ret_log_entry(&update, 0, 1, 1)];
        assert_eq!(decode_events(&logs, &register).count(), 0);
    }

    #[test]
    fn test_decodes_matches_in_receipt_order() {
        let register = register_cpt_ret_log();
        let update = update_cpt_ret_log();
        let logs = vec![
            ret_log_entry(&register, 0, 10, 1),
            ret_log_entry(&update, 0, 99, 2),
            ret_log_entry(&register, 500301, 11, -1),
        ];

        let decoded: Vec<CptRetLog> = decode_events(&logs, &register)
            .map(|e| CptRetLog::from_event(e.unwrap()).unwrap())
            .collect();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].cpt_id, 10);
        assert_eq!(decoded[1].cpt_id, 11);
        assert_eq!(decoded[1].ret_code, 500301);
        assert_eq!(decoded[1].cpt_version, -1);
    }

    #[test]
    fn test_decoding_is_restartable() {
        let register = register_cpt_ret_log();
        let logs = vec![ret_log_entry(&register, 0, 10, 1)];
        assert_eq!(decode_events(&logs, &register).count(), 1);
        assert_eq!(decode_events(&logs, &register).count(), 1);
    }

    #[test]
    fn test_short_data_is_decode_error() {
        let register = register_cpt_ret_log();
        let logs = vec![LogEntry {
            topics: vec![register.signature()],
            data: vec![0u8; 32].into(), // three words declared, one present
        }];
        let results: Vec<_> = decode_events(&logs, &register).collect();
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(RegistryError::EventDecode(_))));
    }

    #[test]
    fn test_credential_template_decoding() {
        let event = credential_template();
        let logs = vec![LogEntry {
            topics: vec![event.signature()],
            data: abi::encode(&[
                Token::Uint(U256::from(42u64)),
                Token::Bytes(vec![1, 2, 3]),
                Token::Bytes(vec![4, 5]),
            ])
            .into(),
        }];

        let decoded: Vec<CredentialTemplateLog> = decode_events(&logs, &event)
            .map(|e| CredentialTemplateLog::from_event(e.unwrap()).unwrap())
            .collect();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].cpt_id, 42);
        assert_eq!(decoded[0].public_key, vec![1, 2, 3]);
        assert_eq!(decoded[0].proof, vec![4, 5]);
    }
}
