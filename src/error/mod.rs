//! Error handling for the node
//!
//! Two layers: `ValidationError` covers consensus rule violations and is
//! returned whenever a block or transaction is refused, while
//! `BlockchainError` is the crate-wide error carrying codec, storage,
//! network and configuration failures.

use crate::cipher::{Address, Sha256};
use thiserror::Error;

/// Result type alias for node operations
pub type Result<T> = std::result::Result<T, BlockchainError>;

/// Why a block or transaction was refused by the ledger.
///
/// Rejection never mutates state, so the same input always produces the
/// same value here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid signature for input {index}")]
    InvalidSignature { index: usize },
    #[error("output {0} is spent by a pending transaction")]
    DoubleSpend(Sha256),
    #[error("output {0} is spent twice in the same block")]
    DoubleSpendInBlock(Sha256),
    #[error("unknown input {0}")]
    UnknownInput(Sha256),
    #[error("output owned by locked distribution address {0}")]
    LockedAddressSpend(Address),
    #[error("coin supply would exceed the maximum")]
    SupplyOverflow,
    #[error("supply invariant violated: {0}")]
    SupplyInvariantViolation(String),
    #[error("bad block sequence: expected {expected}, got {actual}")]
    BadBlockSequence { expected: u64, actual: u64 },
    #[error("previous hash does not match head")]
    BadPrevHash,
    #[error("block timestamp precedes head")]
    BadTimestamp,
    #[error("body hash does not match block body")]
    BadBodyHash,
    #[error("merkle root does not match block body")]
    BadMerkleRoot,
    #[error("block signature does not verify against the blockchain key")]
    BadBlockSignature,
    #[error("a different block is already committed at seq {0}")]
    ConflictingBlock(u64),
    #[error("block does not match the configured genesis block")]
    GenesisMismatch,
    #[error("fee recorded in header does not match burned hours")]
    BadFee,
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),
    #[error("outputs spend more coins than the inputs hold")]
    InsufficientCoins,
    #[error("outputs spend more coin hours than the inputs hold")]
    InsufficientHours,
    #[error("transaction {0} is already confirmed")]
    AlreadyConfirmed(Sha256),
}

/// Crate-wide error type
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// Corrupt or truncated bytes, either from the wire or from disk
    #[error("malformed data: {0}")]
    MalformedData(String),
    #[error("rejected: {0}")]
    Rejected(#[from] ValidationError),
    /// A signing operation was requested but this node holds no key
    #[error("node holds no blockchain signing key")]
    NotAuthorized,
    #[error("invalid address: {0}")]
    InvalidAddress(#[from] AddressError),
    #[error("cryptographic error: {0}")]
    Crypto(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("database error: {0}")]
    Database(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("encryption error: {0}")]
    Encryption(String),
    #[error("candidate pool is full")]
    PoolFull,
    #[error("node is shutting down")]
    Shutdown,
}

/// Failure to decode a base58 address
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("invalid base58 encoding")]
    InvalidBase58,
    #[error("invalid length {0}")]
    InvalidLength(usize),
    #[error("invalid checksum")]
    InvalidChecksum,
    #[error("unsupported version {0}")]
    InvalidVersion(u8),
}

impl From<std::io::Error> for BlockchainError {
    fn from(err: std::io::Error) -> Self {
        BlockchainError::Io(err.to_string())
    }
}

impl From<sled::Error> for BlockchainError {
    fn from(err: sled::Error) -> Self {
        BlockchainError::Database(err.to_string())
    }
}

impl From<bincode::error::EncodeError> for BlockchainError {
    fn from(err: bincode::error::EncodeError) -> Self {
        BlockchainError::MalformedData(format!("encode failed: {err}"))
    }
}

impl From<bincode::error::DecodeError> for BlockchainError {
    fn from(err: bincode::error::DecodeError) -> Self {
        BlockchainError::MalformedData(format!("decode failed: {err}"))
    }
}

impl BlockchainError {
    /// The consensus reason behind a rejection, if any
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            BlockchainError::Rejected(reason) => Some(reason),
            _ => None,
        }
    }

    /// True when the error was caused by bad data rather than by local
    /// failure, so the peer that sent it should be penalized.
    pub fn is_peer_fault(&self) -> bool {
        matches!(
            self,
            BlockchainError::MalformedData(_) | BlockchainError::Rejected(_)
        )
    }
}
