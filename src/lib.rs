//! # SPO Chain - Distribution Ledger Node
//!
//! A node for a centrally-signed UTXO ledger. One authority key signs every
//! block; everyone else validates, relays and serves the chain. The whole
//! coin supply is minted in the genesis block and handed out to a fixed
//! table of distribution addresses that unlock on a schedule.
//!
//! ## How I Organized My Code
//! - `cipher/`: secp256k1 keys, recoverable signatures, SHA-256 and addresses
//! - `core/`: outputs, transactions, blocks, merkle roots and coin hours
//! - `storage/`: the in-memory unspent set, the sled block store, the
//!   candidate pool and the encrypted key file
//! - `visor/`: the ledger state machine, the distribution lock schedule,
//!   genesis handling and the request gateway
//! - `daemon/`: the wire protocol, connections, block and transaction sync
//! - `pex/`: the peer address book
//! - `config/`: TOML configuration and its validation
//! - `cli/`: command-line interface
//!
//! ## When I Need to Understand Something
//! 1. `visor/ledger.rs` decides what gets into the chain
//! 2. `core/transaction.rs` holds the spending rules
//! 3. `daemon/handler.rs` shows how peers feed blocks and transactions in
//! 4. `main.rs` wires everything together for `startnode`

pub mod cipher;
pub mod cli;
pub mod config;
pub mod core;
pub mod daemon;
pub mod error;
pub mod pex;
pub mod storage;
pub mod utils;
pub mod visor;

#[cfg(test)]
pub mod testnet;

// Re-export commonly used types for convenience
pub use cipher::{
    generate_key_pair, pubkey_from_seckey, validate_address, Address, PublicKey, SecretKey, Sha256,
    Sig,
};
pub use cli::{Command, Opt};
pub use config::{Config, NodeConfig, NodeMode};
pub use core::{
    Block, BlockBody, BlockHeader, SignedBlock, Transaction, TransactionOutput, UxOut,
    DROPLETS_PER_COIN,
};
pub use daemon::{Daemon, DaemonHandle};
pub use error::{BlockchainError, Result, ValidationError};
pub use pex::Pex;
pub use storage::{BlockStore, MemoryPool, UnspentPool};
pub use utils::{current_timestamp, deserialize, serialize};
pub use visor::{BlockOutcome, Gateway, UnspentFilter, Visor, VisorState};
