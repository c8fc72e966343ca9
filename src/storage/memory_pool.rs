use crate::cipher::Sha256;
use crate::core::{Block, Transaction};
use crate::error::{BlockchainError, Result, ValidationError};
use std::collections::HashMap;

/// A validated transaction waiting to be included in a block
#[derive(Debug, Clone, PartialEq)]
pub struct UnconfirmedTxn {
    pub tx: Transaction,
    /// unix time it was admitted
    pub received: u64,
    /// coin hours it burns
    pub fee: u64,
}

/// Candidate pool of pending transactions ( K -> txid, V => UnconfirmedTxn ).
///
/// Tracks which unspent outputs each entry consumes so two pending
/// transactions can never spend the same output.
#[derive(Debug, Default)]
pub struct MemoryPool {
    txns: HashMap<Sha256, UnconfirmedTxn>,
    spending: HashMap<Sha256, Sha256>,
    capacity: usize,
}

impl MemoryPool {
    pub fn new(capacity: usize) -> MemoryPool {
        MemoryPool {
            txns: HashMap::new(),
            spending: HashMap::new(),
            capacity,
        }
    }

    pub fn get(&self, txid: &Sha256) -> Option<&UnconfirmedTxn> {
        self.txns.get(txid)
    }

    pub fn contains(&self, txid: &Sha256) -> bool {
        self.txns.contains_key(txid)
    }

    pub fn len(&self) -> usize {
        self.txns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.txns.is_empty()
    }

    /// Pending transaction spending the output `id`, if any
    pub fn spender_of(&self, id: &Sha256) -> Option<Sha256> {
        self.spending.get(id).copied()
    }

    pub fn get_all(&self) -> Vec<UnconfirmedTxn> {
        self.txns.values().cloned().collect()
    }

    pub fn hashes(&self) -> Vec<Sha256> {
        self.txns.keys().copied().collect()
    }

    /// Adds an already validated transaction. Returns false when it was
    /// already pending.
    pub fn add(&mut self, tx: Transaction, received: u64, fee: u64) -> Result<bool> {
        let txid = tx.hash();
        if self.txns.contains_key(&txid) {
            return Ok(false);
        }
        if let Some(input) = tx.inputs.iter().find(|i| self.spending.contains_key(*i)) {
            return Err(ValidationError::DoubleSpend(*input).into());
        }
        if self.txns.len() >= self.capacity {
            return Err(BlockchainError::PoolFull);
        }
        for input in &tx.inputs {
            self.spending.insert(*input, txid);
        }
        self.txns.insert(txid, UnconfirmedTxn { tx, received, fee });
        Ok(true)
    }

    pub fn remove(&mut self, txid: &Sha256) -> Option<UnconfirmedTxn> {
        let entry = self.txns.remove(txid)?;
        for input in &entry.tx.inputs {
            self.spending.remove(input);
        }
        Some(entry)
    }

    /// Drops everything the block confirmed, and every pending transaction
    /// that conflicts with it. Returns how many entries were removed.
    pub fn remove_confirmed(&mut self, block: &Block) -> usize {
        let mut doomed: Vec<Sha256> = Vec::new();
        for tx in block.get_transactions() {
            if self.txns.contains_key(&tx.hash()) {
                doomed.push(tx.hash());
            }
            doomed.extend(tx.inputs.iter().filter_map(|i| self.spending.get(i).copied()));
        }
        doomed.sort();
        doomed.dedup();
        doomed
            .iter()
            .filter(|txid| self.remove(txid).is_some())
            .count()
    }

    /// Pending transactions in block-creation order: highest fee first,
    /// ties broken by hash so every node picks the same order.
    pub fn ordered(&self) -> Vec<&UnconfirmedTxn> {
        let mut entries: Vec<&UnconfirmedTxn> = self.txns.values().collect();
        entries.sort_by(|a, b| b.fee.cmp(&a.fee).then_with(|| a.tx.hash().cmp(&b.tx.hash())));
        entries
    }
}
