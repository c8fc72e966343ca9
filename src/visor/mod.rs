//! Ledger state machine
//!
//! `Visor` validates blocks and transactions against the unspent set,
//! enforces the distribution lock-up and the authority signature, and
//! persists accepted blocks. `Gateway` is the worker pool through which
//! outside callers reach it.

pub mod distribution;
pub mod gateway;
pub mod genesis;
pub mod ledger;

pub use distribution::DistributionSchedule;
pub use gateway::Gateway;
pub use genesis::{genesis_block, sign_genesis, verify_genesis};
pub use ledger::{BlockOutcome, TransactionStatus, UnspentFilter, Visor, VisorState};
