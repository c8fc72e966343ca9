//! Data storage and persistence
//!
//! The in-memory unspent set, the sled-backed block store with its history
//! indices, the candidate pool of pending transactions, and encrypted
//! storage for the blockchain signing key.

pub mod blockstore;
pub mod keyfile;
pub mod memory_pool;
pub mod utxo_set;

pub use blockstore::{BlockStore, TransactionRecord, UxOutRecord};
pub use keyfile::{read_encrypted_key, write_encrypted_key, KEY_PASSWORD_ENV};
pub use memory_pool::{MemoryPool, UnconfirmedTxn};
pub use utxo_set::{AppliedBlock, UnspentPool, UnspentSnapshot};
