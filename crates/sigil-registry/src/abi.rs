//! ABI call encoding for the CPT registry contract
//!
//! The contract's call shapes are fixed-width by ABI constraint, not by
//! choice: `registerCpt(address, int256[8], bytes32[8], bytes32[32],
//! uint8, bytes32, bytes32)` and friends. Shorter inputs are zero-padded
//! up to the fixed widths; longer inputs are rejected. Rather than one
//! generated wrapper type per contract function, encoding is a small set
//! of explicit functions driven by the declared type lists.

use ethers_core::abi::{self, ParamType, Token};
use ethers_core::types::{Address, Bytes, I256, U256};
use ethers_core::utils::keccak256;

use sigil_crypto::RsvSignature;

use crate::error::RegistryError;

/// Fixed width of the schema field-int and field-hash arrays
pub const MAX_FIELD_VALUES: usize = 8;

/// Fixed number of schema document chunks
pub const MAX_SCHEMA_CHUNKS: usize = 32;

/// Bytes per schema chunk (one `bytes32` word)
pub const CHUNK_SIZE: usize = 32;

pub const FUNC_REGISTER_CPT: &str = "registerCpt";
pub const FUNC_UPDATE_CPT: &str = "updateCpt";
pub const FUNC_REGISTER_POLICY: &str = "registerPolicy";
pub const FUNC_UPDATE_POLICY: &str = "updatePolicy";
pub const FUNC_QUERY_CPT: &str = "queryCpt";

/// A fully encoded, signed call ready for submission.
///
/// Holding a `CallPayload` corresponds to the `Signed` phase of a
/// registration: the authorization signature is already baked into the
/// encoded arguments. Submission and interpretation happen in
/// [`crate::cpt::CptRegistry`].
#[derive(Debug, Clone)]
pub struct CallPayload {
    /// Contract function name
    pub function: &'static str,
    /// Selector plus ABI-encoded arguments
    pub data: Bytes,
}

/// A registered schema as returned by `queryCpt`.
///
/// Decoded from the fixed 7-tuple `(address, int256[], bytes32[],
/// bytes32[], uint8, bytes32, bytes32)`.
#[derive(Debug, Clone)]
pub struct SchemaRecord {
    pub publisher: Address,
    pub field_ints: Vec<i64>,
    pub field_hashes: Vec<[u8; 32]>,
    /// Schema document reassembled from its chunks
    pub schema_json: String,
    pub version: u8,
    pub signature_r: [u8; 32],
    pub signature_s: [u8; 32],
}

/// Encode a schema registration/update call.
///
/// `function` is one of the four write functions; all of them share the
/// same argument shape on the contract.
pub fn build_cpt_call(
    function: &'static str,
    publisher: Address,
    field_ints: &[i64],
    field_hashes: &[[u8; 32]],
    schema_json: &str,
    signature: &RsvSignature,
) -> Result<CallPayload, RegistryError> {
    if field_ints.len() > MAX_FIELD_VALUES {
        return Err(RegistryError::SchemaTooLarge {
            actual: field_ints.len(),
            max: MAX_FIELD_VALUES,
        });
    }
    if field_hashes.len() > MAX_FIELD_VALUES {
        return Err(RegistryError::SchemaTooLarge {
            actual: field_hashes.len(),
            max: MAX_FIELD_VALUES,
        });
    }

    let mut ints: Vec<Token> = field_ints
        .iter()
        .map(|&v| Token::Int(I256::from(v).into_raw()))
        .collect();
    ints.resize(MAX_FIELD_VALUES, Token::Int(U256::zero()));

    let mut hashes: Vec<Token> = field_hashes
        .iter()
        .map(|h| Token::FixedBytes(h.to_vec()))
        .collect();
    hashes.resize(MAX_FIELD_VALUES, Token::FixedBytes(vec![0u8; 32]));

    let chunks = chunk_schema(schema_json)?
        .into_iter()
        .map(|c| Token::FixedBytes(c.to_vec()))
        .collect();

    let tokens = [
        Token::Address(publisher),
        Token::FixedArray(ints),
        Token::FixedArray(hashes),
        Token::FixedArray(chunks),
        Token::Uint(U256::from(signature.v())),
        Token::FixedBytes(signature.r().to_vec()),
        Token::FixedBytes(signature.s().to_vec()),
    ];

    let signature_string = format!(
        "{function}(address,int256[{MAX_FIELD_VALUES}],bytes32[{MAX_FIELD_VALUES}],\
bytes32[{MAX_SCHEMA_CHUNKS}],uint8,bytes32,bytes32)"
    );
    Ok(CallPayload {
        function,
        data: encode_call(&signature_string, &tokens),
    })
}

/// Encode the read-only `queryCpt(uint256)` call
pub fn build_query_call(schema_id: u64) -> CallPayload {
    let tokens = [Token::Uint(U256::from(schema_id))];
    CallPayload {
        function: FUNC_QUERY_CPT,
        data: encode_call("queryCpt(uint256)", &tokens),
    }
}

/// Decode the `queryCpt` return tuple.
///
/// An all-zero publisher address is the contract's empty/default record
/// and maps to [`RegistryError::SchemaNotFound`].
pub fn decode_schema_record(data: &[u8], schema_id: u64) -> Result<SchemaRecord, RegistryError> {
    let types = [
        ParamType::Address,
        ParamType::Array(Box::new(ParamType::Int(256))),
        ParamType::Array(Box::new(ParamType::FixedBytes(32))),
        ParamType::Array(Box::new(ParamType::FixedBytes(32))),
        ParamType::Uint(8),
        ParamType::FixedBytes(32),
        ParamType::FixedBytes(32),
    ];
    let mut tokens = abi::decode(&types, data)
        .map_err(|e| RegistryError::AbiDecode(e.to_string()))?
        .into_iter();

    let mut next = || tokens.next().ok_or_else(truncated);

    let publisher = next()?.into_address().ok_or_else(truncated)?;
    if publisher == Address::zero() {
        return Err(RegistryError::SchemaNotFound { schema_id });
    }

    let field_ints = next()?
        .into_array()
        .ok_or_else(truncated)?
        .into_iter()
        .map(|t| t.into_int().map(int_to_i64).ok_or_else(truncated))
        .collect::<Result<Vec<i64>, _>>()?;

    let field_hashes = decode_hash_array(next()?)?;
    let chunk_words = decode_hash_array(next()?)?;
    let schema_json = assemble_schema(&chunk_words)?;

    let version = next()?.into_uint().ok_or_else(truncated)?.low_u32() as u8;
    let signature_r = decode_word(next()?)?;
    let signature_s = decode_word(next()?)?;

    Ok(SchemaRecord {
        publisher,
        field_ints,
        field_hashes,
        schema_json,
        version,
        signature_r,
        signature_s,
    })
}

/// Split a schema document into zero-padded 32-byte chunks
pub fn chunk_schema(schema_json: &str) -> Result<Vec<[u8; CHUNK_SIZE]>, RegistryError> {
    let bytes = schema_json.as_bytes();
    let needed = bytes.len().div_ceil(CHUNK_SIZE);
    if needed > MAX_SCHEMA_CHUNKS {
        return Err(RegistryError::SchemaTooLarge {
            actual: needed,
            max: MAX_SCHEMA_CHUNKS,
        });
    }

    let mut chunks = vec![[0u8; CHUNK_SIZE]; MAX_SCHEMA_CHUNKS];
    for (i, piece) in bytes.chunks(CHUNK_SIZE).enumerate() {
        chunks[i][..piece.len()].copy_from_slice(piece);
    }
    Ok(chunks)
}

/// Reassemble a schema document from its chunks, dropping zero padding
pub fn assemble_schema(chunks: &[[u8; CHUNK_SIZE]]) -> Result<String, RegistryError> {
    let mut bytes: Vec<u8> = chunks.iter().flatten().copied().collect();
    while bytes.last() == Some(&0) {
        bytes.pop();
    }
    String::from_utf8(bytes)
        .map_err(|e| RegistryError::AbiDecode(format!("schema is not valid UTF-8: {e}")))
}

fn encode_call(signature_string: &str, tokens: &[Token]) -> Bytes {
    let selector = &keccak256(signature_string.as_bytes())[..4];
    let mut data = selector.to_vec();
    data.extend_from_slice(&abi::encode(tokens));
    data.into()
}

fn decode_hash_array(token: Token) -> Result<Vec<[u8; 32]>, RegistryError> {
    token
        .into_array()
        .ok_or_else(truncated)?
        .into_iter()
        .map(decode_word)
        .collect()
}

fn decode_word(token: Token) -> Result<[u8; 32], RegistryError> {
    let bytes = token.into_fixed_bytes().ok_or_else(truncated)?;
    bytes
        .try_into()
        .map_err(|_| RegistryError::AbiDecode("bytes32 word has wrong length".to_string()))
}

fn truncated() -> RegistryError {
    RegistryError::AbiDecode("result tuple shorter than declared types".to_string())
}

/// Reinterpret an ABI int256 word as i64.
///
/// The low 64 bits of a two's-complement int256 are exactly the i64 for
/// any in-range value; registry ints are small by contract.
pub(crate) fn int_to_i64(word: U256) -> i64 {
    word.low_u64() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers_core::abi::Token;

    fn signature() -> RsvSignature {
        RsvSignature::new(27, [0x11; 32], [0x22; 32]).unwrap()
    }

    #[test]
    fn test_register_call_shape() {
        let payload = build_cpt_call(
            FUNC_REGISTER_CPT,
            Address::repeat_byte(0xAB),
            &[1, -2, 3],
            &[[0xCC; 32]],
            r#"{"name":"string","gender":"string"}"#,
            &signature(),
        )
        .unwrap();

        assert_eq!(payload.function, "registerCpt");
        // 4-byte selector + 52 static words:
        // address + 8 ints + 8 hashes + 32 chunks + v + r + s
        assert_eq!(payload.data.len(), 4 + 52 * 32);
    }

    #[test]
    fn test_oversized_schema_rejected() {
        let big = "x".repeat(MAX_SCHEMA_CHUNKS * CHUNK_SIZE + 1);
        let err = build_cpt_call(
            FUNC_REGISTER_CPT,
            Address::zero(),
            &[],
            &[],
            &big,
            &signature(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::SchemaTooLarge { actual: 33, max: 32 }
        ));
    }

    #[test]
    fn test_oversized_field_arrays_rejected() {
        let err = build_cpt_call(
            FUNC_REGISTER_CPT,
            Address::zero(),
            &[0; 9],
            &[],
            "{}",
            &signature(),
        )
        .unwrap_err();
        assert!(matches!(err, RegistryError::SchemaTooLarge { actual: 9, max: 8 }));

        let err = build_cpt_call(
            FUNC_REGISTER_CPT,
            Address::zero(),
            &[],
            &[[0; 32]; 9],
            "{}",
            &signature(),
        )
        .unwrap_err();
        assert!(matches!(err, RegistryError::SchemaTooLarge { actual: 9, max: 8 }));
    }

    #[test]
    fn test_chunking_round_trip() {
        let doc = r#"{"fields":{"name":"string","age":"integer"}}"#;
        let chunks = chunk_schema(doc).unwrap();
        assert_eq!(chunks.len(), MAX_SCHEMA_CHUNKS);
        assert_eq!(assemble_schema(&chunks).unwrap(), doc);
    }

    #[test]
    fn test_empty_schema_is_all_padding() {
        let chunks = chunk_schema("").unwrap();
        assert!(chunks.iter().all(|c| c == &[0u8; CHUNK_SIZE]));
        assert_eq!(assemble_schema(&chunks).unwrap(), "");
    }

    #[test]
    fn test_query_round_trip_through_abi() {
        let doc = r#"{"name":"string"}"#;
        let chunks = chunk_schema(doc).unwrap();
        let encoded = abi::encode(&[
            Token::Address(Address::repeat_byte(0x42)),
            Token::Array(vec![Token::Int(I256::from(-5).into_raw())]),
            Token::Array(vec![Token::FixedBytes(vec![0xEE; 32])]),
            Token::Array(chunks.iter().map(|c| Token::FixedBytes(c.to_vec())).collect()),
            Token::Uint(U256::from(3u8)),
            Token::FixedBytes(vec![0x11; 32]),
            Token::FixedBytes(vec![0x22; 32]),
        ]);

        let record = decode_schema_record(&encoded, 9).unwrap();
        assert_eq!(record.publisher, Address::repeat_byte(0x42));
        assert_eq!(record.field_ints, vec![-5]);
        assert_eq!(record.field_hashes, vec![[0xEE; 32]]);
        assert_eq!(record.schema_json, doc);
        assert_eq!(record.version, 3);
        assert_eq!(record.signature_r, [0x11; 32]);
        assert_eq!(record.signature_s, [0x22; 32]);
    }

    #[test]
    fn test_zero_publisher_is_not_found() {
        let encoded = abi::encode(&[
            Token::Address(Address::zero()),
            Token::Array(vec![]),
            Token::Array(vec![]),
            Token::Array(vec![]),
            Token::Uint(U256::zero()),
            Token::FixedBytes(vec![0; 32]),
            Token::FixedBytes(vec![0; 32]),
        ]);
        assert!(matches!(
            decode_schema_record(&encoded, 7),
            Err(RegistryError::SchemaNotFound { schema_id: 7 })
        ));
    }
}
