//! Canonical binary codec
//!
//! Little-endian fixed-width integers and u64 length prefixes. Decoding is
//! strict: the input must be consumed exactly, so every value has a single
//! accepted byte form.

use crate::error::{BlockchainError, Result};
use bincode::config::{Configuration, Fixint, LittleEndian, Limit};

/// Upper bound on any single decoded value, guards length-prefix bombs.
pub const MAX_DECODE_BYTES: usize = 32 * 1024 * 1024;

type CodecConfig = Configuration<LittleEndian, Fixint, Limit<MAX_DECODE_BYTES>>;

fn codec_config() -> CodecConfig {
    bincode::config::standard()
        .with_little_endian()
        .with_fixed_int_encoding()
        .with_limit::<MAX_DECODE_BYTES>()
}

pub fn serialize<T: bincode::Encode>(data: &T) -> Result<Vec<u8>> {
    bincode::encode_to_vec(data, codec_config())
        .map_err(|e| BlockchainError::MalformedData(format!("Serialization failed: {e}")))
}

pub fn deserialize<T>(bytes: &[u8]) -> Result<T>
where
    T: bincode::Decode<()>,
{
    let (data, consumed) = bincode::decode_from_slice(bytes, codec_config())
        .map_err(|e| BlockchainError::MalformedData(format!("Deserialization failed: {e}")))?;
    if consumed != bytes.len() {
        return Err(BlockchainError::MalformedData(format!(
            "{} trailing bytes after value",
            bytes.len() - consumed
        )));
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, bincode::Encode, bincode::Decode)]
    struct TestData {
        id: u64,
        tag: [u8; 4],
        values: Vec<u32>,
    }

    fn sample() -> TestData {
        TestData {
            id: 42,
            tag: *b"TEST",
            values: vec![1, 2, 3],
        }
    }

    #[test]
    fn test_fixed_width_layout() {
        let bytes = serialize(&sample()).unwrap();
        // u64 id + 4-byte tag + u64 length + 3 * u32
        assert_eq!(bytes.len(), 8 + 4 + 8 + 12);
        assert_eq!(&bytes[..8], &42u64.to_le_bytes());
        assert_eq!(&bytes[12..20], &3u64.to_le_bytes());
    }

    #[test]
    fn test_serialize_deserialize() {
        let bytes = serialize(&sample()).unwrap();
        let decoded: TestData = deserialize(&bytes).unwrap();
        assert_eq!(decoded, sample());
        assert_eq!(serialize(&decoded).unwrap(), bytes);
    }

    #[test]
    fn test_truncated_input_is_malformed() {
        let bytes = serialize(&sample()).unwrap();
        let result: Result<TestData> = deserialize(&bytes[..bytes.len() - 1]);
        assert!(matches!(result, Err(BlockchainError::MalformedData(_))));
    }

    #[test]
    fn test_trailing_bytes_are_malformed() {
        let mut bytes = serialize(&sample()).unwrap();
        bytes.push(0);
        let result: Result<TestData> = deserialize(&bytes);
        assert!(matches!(result, Err(BlockchainError::MalformedData(_))));
    }

    #[test]
    fn test_oversized_length_prefix_is_malformed() {
        let mut bytes = serialize(&sample()).unwrap();
        bytes[12..20].copy_from_slice(&u64::MAX.to_le_bytes());
        let result: Result<TestData> = deserialize(&bytes);
        assert!(matches!(result, Err(BlockchainError::MalformedData(_))));
    }
}
