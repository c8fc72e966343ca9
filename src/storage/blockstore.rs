//! Persistent chain storage on sled
//!
//! Blocks are keyed by big-endian sequence so iteration follows the chain,
//! with a second index by header hash. Alongside the blocks the store keeps
//! the current unspent set and the history indices (every output ever
//! created, per-address output lists, transactions by hash) so that
//! historical queries never replay the chain. All trees for a block are
//! written in one sled transaction.

use crate::cipher::{Address, Sha256};
use crate::core::{SignedBlock, Transaction, UxOut};
use crate::error::{BlockchainError, Result};
use crate::storage::utxo_set::AppliedBlock;
use crate::utils::{deserialize, serialize};
use serde::Serialize;
use sled::{Db, Transactional, Tree};
use std::collections::HashMap;
use std::path::Path;

const BLOCKS_TREE: &str = "blocks";
const BLOCK_HASHES_TREE: &str = "block_hashes";
const UNSPENT_TREE: &str = "unspent";
const UXOUT_HISTORY_TREE: &str = "uxouts";
const ADDRESS_INDEX_TREE: &str = "address_uxouts";
const TRANSACTIONS_TREE: &str = "transactions";

/// An output together with how it was eventually spent
#[derive(Debug, Clone, PartialEq, Serialize, bincode::Encode, bincode::Decode)]
pub struct UxOutRecord {
    pub out: UxOut,
    pub spent_tx: Option<Sha256>,
    pub spent_block_seq: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, bincode::Encode, bincode::Decode)]
pub struct TransactionRecord {
    pub tx: Transaction,
    pub block_seq: u64,
}

pub struct BlockStore {
    db: Db,
    blocks: Tree,
    hashes: Tree,
    unspent: Tree,
    uxouts: Tree,
    address_index: Tree,
    transactions: Tree,
}

fn address_key(address: &Address, id: &Sha256) -> [u8; 52] {
    let mut key = [0u8; 52];
    key[..20].copy_from_slice(&address.key);
    key[20..].copy_from_slice(&id.0);
    key
}

fn seq_from_key(bytes: &[u8]) -> Result<u64> {
    let arr: [u8; 8] = bytes
        .try_into()
        .map_err(|_| BlockchainError::MalformedData("block key is not 8 bytes".to_string()))?;
    Ok(u64::from_be_bytes(arr))
}

impl BlockStore {
    pub fn open(path: &Path) -> Result<BlockStore> {
        let db = sled::open(path)
            .map_err(|e| BlockchainError::Database(format!("Failed to open database: {e}")))?;
        BlockStore::from_db(db)
    }

    pub fn from_db(db: Db) -> Result<BlockStore> {
        let open = |name: &str| {
            db.open_tree(name)
                .map_err(|e| BlockchainError::Database(format!("Failed to open {name} tree: {e}")))
        };
        Ok(BlockStore {
            blocks: open(BLOCKS_TREE)?,
            hashes: open(BLOCK_HASHES_TREE)?,
            unspent: open(UNSPENT_TREE)?,
            uxouts: open(UXOUT_HISTORY_TREE)?,
            address_index: open(ADDRESS_INDEX_TREE)?,
            transactions: open(TRANSACTIONS_TREE)?,
            db,
        })
    }

    pub fn head_seq(&self) -> Result<Option<u64>> {
        match self.blocks.last()? {
            Some((key, _)) => Ok(Some(seq_from_key(&key)?)),
            None => Ok(None),
        }
    }

    pub fn get_block(&self, seq: u64) -> Result<Option<SignedBlock>> {
        self.blocks
            .get(seq.to_be_bytes())?
            .map(|bytes| SignedBlock::deserialize(&bytes))
            .transpose()
    }

    pub fn get_block_by_hash(&self, hash: &Sha256) -> Result<Option<SignedBlock>> {
        match self.hashes.get(hash.0)? {
            Some(key) => self.get_block(seq_from_key(&key)?),
            None => Ok(None),
        }
    }

    /// Blocks with `start <= seq <= end`
    pub fn get_blocks(&self, start: u64, end: u64) -> Result<Vec<SignedBlock>> {
        if start > end {
            return Ok(vec![]);
        }
        self.blocks
            .range(start.to_be_bytes()..=end.to_be_bytes())
            .map(|item| {
                let (_, bytes) = item?;
                SignedBlock::deserialize(&bytes)
            })
            .collect()
    }

    pub fn load_unspent(&self) -> Result<HashMap<Sha256, UxOut>> {
        let mut outputs = HashMap::new();
        for item in self.unspent.iter() {
            let (key, bytes) = item?;
            let id: [u8; 32] = key.as_ref().try_into().map_err(|_| {
                BlockchainError::MalformedData("unspent key is not 32 bytes".to_string())
            })?;
            outputs.insert(Sha256(id), deserialize::<UxOut>(&bytes)?);
        }
        Ok(outputs)
    }

    pub fn get_transaction(&self, hash: &Sha256) -> Result<Option<TransactionRecord>> {
        self.transactions
            .get(hash.0)?
            .map(|bytes| deserialize(&bytes))
            .transpose()
    }

    pub fn get_uxout(&self, id: &Sha256) -> Result<Option<UxOutRecord>> {
        self.uxouts
            .get(id.0)?
            .map(|bytes| deserialize(&bytes))
            .transpose()
    }

    /// Every output ever sent to `address`, spent or not
    pub fn get_address_uxouts(&self, address: &Address) -> Result<Vec<UxOutRecord>> {
        let mut records = Vec::new();
        for item in self.address_index.scan_prefix(address.key) {
            let (key, _) = item?;
            let id: [u8; 32] = key[20..].try_into().map_err(|_| {
                BlockchainError::MalformedData("address index key is malformed".to_string())
            })?;
            let record = self.get_uxout(&Sha256(id))?.ok_or_else(|| {
                BlockchainError::MalformedData(format!(
                    "address index points at missing output {}",
                    Sha256(id)
                ))
            })?;
            records.push(record);
        }
        Ok(records)
    }

    /// Writes the block, its unspent set changes and history in one step
    pub fn commit_block(&self, block: &SignedBlock, applied: &AppliedBlock) -> Result<()> {
        let seq_key = block.seq().to_be_bytes();
        let block_hash = block.hash()?;
        let block_bytes = block.serialize()?;

        let mut spent = Vec::with_capacity(applied.spent.len());
        for (id, out, spender) in &applied.spent {
            let record = UxOutRecord {
                out: out.clone(),
                spent_tx: Some(*spender),
                spent_block_seq: Some(applied.head_seq),
            };
            spent.push((*id, serialize(&record)?));
        }
        let mut created = Vec::with_capacity(applied.created.len());
        for (id, out) in &applied.created {
            let record = UxOutRecord {
                out: out.clone(),
                spent_tx: None,
                spent_block_seq: None,
            };
            created.push((
                *id,
                serialize(out)?,
                serialize(&record)?,
                address_key(&out.body.address, id),
            ));
        }
        let mut txns = Vec::with_capacity(block.block.body.transactions.len());
        for tx in block.block.get_transactions() {
            let record = TransactionRecord {
                tx: tx.clone(),
                block_seq: block.seq(),
            };
            txns.push((tx.hash(), serialize(&record)?));
        }

        (
            &self.blocks,
            &self.hashes,
            &self.unspent,
            &self.uxouts,
            &self.address_index,
            &self.transactions,
        )
            .transaction(|(blocks, hashes, unspent, uxouts, address_index, transactions)| {
                blocks.insert(&seq_key[..], block_bytes.as_slice())?;
                hashes.insert(&block_hash.0[..], &seq_key[..])?;
                for (id, record) in &spent {
                    unspent.remove(&id.0[..])?;
                    uxouts.insert(&id.0[..], record.as_slice())?;
                }
                for (id, out, record, index_key) in &created {
                    unspent.insert(&id.0[..], out.as_slice())?;
                    uxouts.insert(&id.0[..], record.as_slice())?;
                    address_index.insert(&index_key[..], Vec::<u8>::new())?;
                }
                for (hash, record) in &txns {
                    transactions.insert(&hash.0[..], record.as_slice())?;
                }
                Ok(())
            })
            .map_err(|e: sled::transaction::TransactionError| {
                BlockchainError::Database(format!("Failed to commit block {}: {e}", block.seq()))
            })?;
        Ok(())
    }

    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::generate_key_pair;
    use crate::core::{Block, BlockBody, Transaction, TransactionOutput, DROPLETS_PER_COIN};
    use crate::storage::UnspentPool;
    use std::collections::HashSet;

    fn temporary_store() -> BlockStore {
        let db = sled::Config::new().temporary(true).open().unwrap();
        BlockStore::from_db(db).unwrap()
    }

    #[test]
    fn test_commit_and_query_history() {
        let store = temporary_store();
        assert_eq!(store.head_seq().unwrap(), None);

        let (sk, pk) = generate_key_pair();
        let owner = pk.to_address();
        let (_, other) = generate_key_pair();
        let supply = 10 * DROPLETS_PER_COIN;

        let genesis = Block::new_genesis_block(owner, supply, 100).unwrap();
        let mut pool = UnspentPool::new(supply);
        let applied = pool.apply_block(&genesis, None, &HashSet::new()).unwrap();
        let genesis = genesis.sign(&sk).unwrap();
        store.commit_block(&genesis, &applied).unwrap();

        let input = applied.created[0].0;
        let mut tx = Transaction::new(
            vec![input],
            vec![TransactionOutput {
                address: other.to_address(),
                coins: supply,
                hours: 0,
            }],
        )
        .unwrap();
        tx.sign_inputs(&[sk.clone()]).unwrap();
        let block = Block::new_block(
            &genesis.block.head,
            200,
            0,
            BlockBody {
                transactions: vec![tx.clone()],
            },
        )
        .unwrap();
        let applied = pool.apply_block(&block, Some(0), &HashSet::new()).unwrap();
        let block = block.sign(&sk).unwrap();
        store.commit_block(&block, &applied).unwrap();

        assert_eq!(store.head_seq().unwrap(), Some(1));
        assert_eq!(store.get_block(1).unwrap().unwrap(), block);
        assert_eq!(
            store.get_block_by_hash(&block.hash().unwrap()).unwrap().unwrap(),
            block
        );
        assert_eq!(store.get_blocks(0, 5).unwrap().len(), 2);
        assert!(store.get_blocks(3, 1).unwrap().is_empty());

        let unspent = store.load_unspent().unwrap();
        assert_eq!(unspent.len(), 1);
        assert!(!unspent.contains_key(&input));

        let record = store.get_transaction(&tx.hash()).unwrap().unwrap();
        assert_eq!(record.block_seq, 1);

        let history = store.get_address_uxouts(&owner).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].spent_tx, Some(tx.hash()));
        assert_eq!(history[0].spent_block_seq, Some(1));

        let received = store.get_address_uxouts(&other.to_address()).unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].spent_tx, None);
    }

    #[test]
    fn test_corrupt_block_is_malformed() {
        let store = temporary_store();
        store.blocks.insert(7u64.to_be_bytes(), vec![1u8, 2, 3]).unwrap();
        assert!(matches!(
            store.get_block(7),
            Err(BlockchainError::MalformedData(_))
        ));
    }
}
