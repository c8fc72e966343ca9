use crate::error::{BlockchainError, Result};
use crate::utils::{serialize, sha256_digest};
use data_encoding::HEXLOWER;
use std::fmt;

/// 32-byte SHA-256 digest, the identity of every ledger object
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, bincode::Encode, bincode::Decode,
)]
pub struct Sha256(pub [u8; 32]);

impl Sha256 {
    pub const ZERO: Sha256 = Sha256([0u8; 32]);

    pub fn digest(data: &[u8]) -> Sha256 {
        Sha256(sha256_digest(data))
    }

    /// Hash of the canonical encoding of `value`
    pub fn of<T: bincode::Encode>(value: &T) -> Result<Sha256> {
        Ok(Sha256::digest(&serialize(value)?))
    }

    /// Hash of the two digests concatenated, used for merkle nodes
    pub fn concat(&self, other: &Sha256) -> Sha256 {
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(&self.0);
        buf[32..].copy_from_slice(&other.0);
        Sha256::digest(&buf)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    pub fn to_hex(&self) -> String {
        HEXLOWER.encode(&self.0)
    }

    pub fn from_hex(s: &str) -> Result<Sha256> {
        let bytes = hex::decode(s)
            .map_err(|e| BlockchainError::MalformedData(format!("invalid hash hex: {e}")))?;
        let arr: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
            BlockchainError::MalformedData(format!("hash must be 32 bytes, got {}", b.len()))
        })?;
        Ok(Sha256(arr))
    }
}

impl fmt::Display for Sha256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Sha256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sha256({})", self.to_hex())
    }
}

super::impl_hex_serde!(Sha256);
