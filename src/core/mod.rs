//! Ledger entities
//!
//! Unspent outputs, transactions and blocks, their canonical hashes, and
//! the merkle root over a block body.

pub mod block;
pub mod merkle;
pub mod monetary;
pub mod transaction;
pub mod ux_out;

pub use block::{Block, BlockBody, BlockHeader, SignedBlock};
pub use merkle::merkle_root;
pub use monetary::{coin_hours, DROPLETS_PER_COIN, MAX_COIN_SUPPLY};
pub use transaction::{Transaction, TransactionOutput};
pub use ux_out::{UxBody, UxHead, UxOut};
