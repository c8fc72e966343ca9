// The visor owns the chain: it validates every block and transaction before
// anything touches the unspent set, then persists accepted blocks.
// All mutation goes through one write lock, reads share a read lock.

use crate::cipher::{Address, Sha256, SecretKey};
use crate::config::{NodeMode, VisorConfig};
use crate::core::{
    Block, BlockBody, BlockHeader, SignedBlock, Transaction, TransactionOutput, UxOut,
};
use crate::error::{BlockchainError, Result, ValidationError};
use crate::storage::{
    BlockStore, MemoryPool, TransactionRecord, UnconfirmedTxn, UnspentPool, UxOutRecord,
};
use crate::visor::distribution::DistributionSchedule;
use crate::visor::genesis::{genesis_block, verify_genesis};
use log::{debug, info, warn};
use parking_lot::RwLock;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisorState {
    /// No genesis block yet
    Bootstrapping,
    Synced,
}

/// Outcome of handing a block to the visor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOutcome {
    Applied,
    /// The identical block is already committed
    Known,
}

/// Filter for unspent output queries. An empty filter matches everything.
#[derive(Debug, Clone, Default)]
pub struct UnspentFilter {
    pub addresses: Option<HashSet<Address>>,
    pub ids: Option<HashSet<Sha256>>,
}

impl UnspentFilter {
    pub fn by_addresses(addresses: impl IntoIterator<Item = Address>) -> UnspentFilter {
        UnspentFilter {
            addresses: Some(addresses.into_iter().collect()),
            ids: None,
        }
    }

    pub fn by_ids(ids: impl IntoIterator<Item = Sha256>) -> UnspentFilter {
        UnspentFilter {
            addresses: None,
            ids: Some(ids.into_iter().collect()),
        }
    }

    fn matches(&self, id: &Sha256, ux: &UxOut) -> bool {
        self.addresses
            .as_ref()
            .map_or(true, |set| set.contains(&ux.body.address))
            && self.ids.as_ref().map_or(true, |set| set.contains(id))
    }
}

/// Where a transaction currently lives
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionStatus {
    Unconfirmed(UnconfirmedTxn),
    Confirmed {
        record: TransactionRecord,
        /// blocks on top of and including the confirming block
        depth: u64,
    },
}

struct ChainState {
    unspent: UnspentPool,
    head: Option<BlockHeader>,
    pool: MemoryPool,
}

impl ChainState {
    fn head_seq(&self) -> Option<u64> {
        self.head.as_ref().map(|h| h.seq)
    }
}

pub struct Visor {
    config: VisorConfig,
    store: BlockStore,
    schedule: DistributionSchedule,
    genesis: Block,
    genesis_hash: Sha256,
    state: RwLock<ChainState>,
}

impl Visor {
    /// Loads the chain from `store`, or creates the genesis block when the
    /// store is empty and a genesis signature is available.
    ///
    /// A store whose genesis block differs from the configured one is a
    /// configuration error; persisted state that fails to decode is fatal.
    pub fn open(config: VisorConfig, store: BlockStore) -> Result<Visor> {
        let genesis = genesis_block(&config.genesis)?;
        let genesis_hash = genesis.hash()?;
        let schedule = DistributionSchedule::new(&config.distribution);

        let state = match store.head_seq()? {
            Some(head_seq) => {
                let stored = store.get_block(0)?.ok_or_else(|| {
                    BlockchainError::MalformedData("database has no genesis block".to_string())
                })?;
                if stored.block != genesis {
                    return Err(BlockchainError::Config(format!(
                        "database genesis {} does not match configured genesis {genesis_hash}",
                        stored.hash()?
                    )));
                }
                let head = store.get_block(head_seq)?.ok_or_else(|| {
                    BlockchainError::MalformedData(format!("missing head block {head_seq}"))
                })?;
                let unspent = UnspentPool::from_outputs(
                    store.load_unspent()?,
                    Some(head_seq),
                    config.max_supply,
                )
                .map_err(|e| BlockchainError::MalformedData(format!("stored unspent set: {e}")))?;
                info!(
                    "Loaded chain at seq {head_seq} with {} unspent outputs",
                    unspent.len()
                );
                ChainState {
                    unspent,
                    head: Some(head.block.head),
                    pool: MemoryPool::new(config.max_unconfirmed),
                }
            }
            None => ChainState {
                unspent: UnspentPool::new(config.max_supply),
                head: None,
                pool: MemoryPool::new(config.max_unconfirmed),
            },
        };

        let visor = Visor {
            config,
            store,
            schedule,
            genesis,
            genesis_hash,
            state: RwLock::new(state),
        };
        visor.ensure_genesis()?;
        Ok(visor)
    }

    // Commits the genesis block right away when I either hold its signature
    // or can produce it; otherwise the node waits for a peer to send it.
    fn ensure_genesis(&self) -> Result<()> {
        if self.state.read().head.is_some() {
            return Ok(());
        }
        let sig = match (&self.config.genesis.signature, &self.config.blockchain_seckey) {
            (Some(sig), _) => *sig,
            (None, Some(seckey)) => self.genesis.clone().sign(seckey)?.sig,
            (None, None) => {
                info!("No genesis signature configured, waiting for genesis from peers");
                return Ok(());
            }
        };
        let signed = SignedBlock {
            block: self.genesis.clone(),
            sig,
        };
        self.execute_block(&signed)
            .map_err(|e| BlockchainError::Config(format!("genesis block rejected: {e}")))?;
        Ok(())
    }

    pub fn mode(&self) -> NodeMode {
        self.config.mode
    }

    pub fn config(&self) -> &VisorConfig {
        &self.config
    }

    pub fn schedule(&self) -> &DistributionSchedule {
        &self.schedule
    }

    pub fn genesis_hash(&self) -> Sha256 {
        self.genesis_hash
    }

    pub fn state(&self) -> VisorState {
        if self.state.read().head.is_some() {
            VisorState::Synced
        } else {
            VisorState::Bootstrapping
        }
    }

    pub fn head_seq(&self) -> Option<u64> {
        self.state.read().head_seq()
    }

    /// Head sequence and header hash
    pub fn head(&self) -> Result<Option<(u64, Sha256)>> {
        let state = self.state.read();
        state
            .head
            .as_ref()
            .map(|h| Ok((h.seq, h.hash()?)))
            .transpose()
    }

    pub fn total_coins(&self) -> u64 {
        self.state.read().unspent.total_coins()
    }

    fn signing_key(&self) -> Result<&SecretKey> {
        self.config
            .blockchain_seckey
            .as_ref()
            .ok_or(BlockchainError::NotAuthorized)
    }

    /// Validates and commits `block`. On any failure the unspent set, the
    /// head and the store are left exactly as they were.
    pub fn execute_block(&self, block: &SignedBlock) -> Result<BlockOutcome> {
        let mut state = self.state.write();
        self.execute_locked(&mut state, block)
    }

    fn execute_locked(&self, state: &mut ChainState, signed: &SignedBlock) -> Result<BlockOutcome> {
        let block = &signed.block;
        let seq = block.seq();

        if let Some(head_seq) = state.head_seq() {
            if seq <= head_seq {
                // first committed block at a seq wins
                let committed = self.store.get_block(seq)?.ok_or_else(|| {
                    BlockchainError::MalformedData(format!("missing committed block {seq}"))
                })?;
                return if committed.hash()? == signed.hash()? {
                    Ok(BlockOutcome::Known)
                } else {
                    Err(ValidationError::ConflictingBlock(seq).into())
                };
            }
        }

        let expected = state.head_seq().map_or(0, |s| s + 1);
        if seq != expected {
            return Err(ValidationError::BadBlockSequence {
                expected,
                actual: seq,
            }
            .into());
        }

        match &state.head {
            None => verify_genesis(signed, &self.genesis, &self.config.blockchain_pubkey)?,
            Some(head) => {
                if block.head.prev_hash != head.hash()? {
                    return Err(ValidationError::BadPrevHash.into());
                }
                if block.time() < head.time {
                    return Err(ValidationError::BadTimestamp.into());
                }
                signed.verify_signature(&self.config.blockchain_pubkey)?;
                block.verify_body()?;
                self.verify_block_transactions(state, block)?;
            }
        }

        let locked = if seq == 0 {
            HashSet::new()
        } else {
            self.schedule.locked_addresses(block.time())
        };
        let snapshot = state.unspent.snapshot();
        let applied = state.unspent.apply_block(block, state.head_seq(), &locked)?;
        if applied.burned_hours != block.head.fee {
            state.unspent.restore(snapshot);
            return Err(ValidationError::BadFee.into());
        }
        if let Err(e) = self.store.commit_block(signed, &applied) {
            state.unspent.restore(snapshot);
            return Err(e);
        }

        let removed = state.pool.remove_confirmed(block);
        state.head = Some(block.head.clone());
        info!(
            "Executed block {seq} ({} txns, fee {}), {removed} pending txns cleared",
            block.get_transactions().len(),
            block.head.fee
        );
        Ok(BlockOutcome::Applied)
    }

    // Signature and value checks per transaction. Spending rules that
    // depend on the rest of the block are enforced by the unspent set.
    fn verify_block_transactions(&self, state: &ChainState, block: &Block) -> Result<()> {
        if block.get_transactions().len() > self.config.max_block_transactions {
            return Err(ValidationError::InvalidTransaction(format!(
                "block carries more than {} transactions",
                self.config.max_block_transactions
            ))
            .into());
        }
        for tx in block.get_transactions() {
            tx.verify_structure()?;
            let uxins = state.unspent.get_inputs(&tx.inputs)?;
            tx.verify_spending(&uxins, block.time())?;
        }
        Ok(())
    }

    /// Admits `tx` to the candidate pool after validating it against the
    /// current unspent set at time `now`. Returns false when it was already
    /// pending.
    pub fn inject_transaction(&self, tx: Transaction, now: u64) -> Result<bool> {
        let mut state = self.state.write();
        tx.verify_structure()?;

        let txid = tx.hash();
        if state.pool.contains(&txid) {
            return Ok(false);
        }
        if self.store.get_transaction(&txid)?.is_some() {
            return Err(ValidationError::AlreadyConfirmed(txid).into());
        }

        let uxins = state.unspent.get_inputs(&tx.inputs)?;
        if let Some(ux) = uxins
            .iter()
            .find(|ux| self.schedule.is_locked(&ux.body.address, now))
        {
            return Err(ValidationError::LockedAddressSpend(ux.body.address).into());
        }
        tx.verify_spending(&uxins, now)?;

        let fee = tx.fee(&uxins, now);
        let added = state.pool.add(tx, now, fee)?;
        if added {
            debug!("Admitted transaction {txid} with fee {fee}");
        }
        Ok(added)
    }

    /// Builds and signs the next block from the candidate pool without
    /// committing it. Returns None when nothing is pending.
    pub fn create_block(&self, now: u64) -> Result<Option<SignedBlock>> {
        let mut state = self.state.write();
        self.build_block(&mut state, now)
    }

    /// Builds, signs and commits the next block
    pub fn create_and_execute_block(&self, now: u64) -> Result<Option<SignedBlock>> {
        let mut state = self.state.write();
        let Some(block) = self.build_block(&mut state, now)? else {
            return Ok(None);
        };
        self.execute_locked(&mut state, &block)?;
        Ok(Some(block))
    }

    fn build_block(&self, state: &mut ChainState, now: u64) -> Result<Option<SignedBlock>> {
        let seckey = self.signing_key()?;
        let head = state
            .head
            .clone()
            .ok_or_else(|| BlockchainError::Database("chain has no head block".to_string()))?;
        let time = now.max(head.time);
        let locked = self.schedule.locked_addresses(time);

        let mut chosen: Vec<Transaction> = Vec::new();
        let mut stale: Vec<Sha256> = Vec::new();
        let mut spent: HashSet<Sha256> = HashSet::new();
        let mut fee = 0u64;

        for entry in state.pool.ordered() {
            if chosen.len() >= self.config.max_block_transactions {
                break;
            }
            let tx = &entry.tx;
            let uxins = match state.unspent.get_inputs(&tx.inputs) {
                Ok(uxins) => uxins,
                Err(_) => {
                    stale.push(tx.hash());
                    continue;
                }
            };
            if uxins.iter().any(|ux| locked.contains(&ux.body.address))
                || tx.verify_spending(&uxins, time).is_err()
            {
                stale.push(tx.hash());
                continue;
            }
            if tx.inputs.iter().any(|i| spent.contains(i)) {
                continue;
            }
            spent.extend(tx.inputs.iter().copied());
            fee = fee.saturating_add(tx.fee(&uxins, time));
            chosen.push(tx.clone());
        }

        for txid in &stale {
            warn!("Dropping pending transaction {txid}, no longer valid");
            state.pool.remove(txid);
        }
        if chosen.is_empty() {
            return Ok(None);
        }

        let body = BlockBody {
            transactions: chosen,
        };
        let block = Block::new_block(&head, time, fee, body)?;
        Ok(Some(block.sign(seckey)?))
    }

    /// Spends the genesis output into one equal output per distribution
    /// address and commits the result as block 1
    pub fn create_distribution_block(&self, now: u64) -> Result<SignedBlock> {
        let seckey = self.signing_key()?;
        if self.config.genesis.address != crate::cipher::pubkey_from_seckey(seckey)?.to_address() {
            return Err(BlockchainError::NotAuthorized);
        }

        let mut state = self.state.write();
        let head = state
            .head
            .clone()
            .ok_or_else(|| BlockchainError::Database("chain has no head block".to_string()))?;
        if head.seq != 0 {
            return Err(ValidationError::BadBlockSequence {
                expected: 1,
                actual: head.seq + 1,
            }
            .into());
        }

        let genesis_tx = self.genesis.body.transactions.first().ok_or_else(|| {
            BlockchainError::MalformedData("genesis block has no transaction".to_string())
        })?;
        let genesis_ux = genesis_tx
            .create_outputs(crate::core::UxHead {
                time: self.genesis.time(),
                bkseq: 0,
            })
            .into_iter()
            .next()
            .ok_or_else(|| {
                BlockchainError::MalformedData("genesis transaction has no output".to_string())
            })?;
        let genesis_id = genesis_ux.hash()?;

        let dist = &self.config.distribution;
        let hours_each = genesis_ux.body.hours / dist.addresses.len() as u64;
        let outputs = dist
            .addresses
            .iter()
            .map(|address| TransactionOutput {
                address: *address,
                coins: dist.coins_per_address,
                hours: hours_each,
            })
            .collect();
        let mut tx = Transaction::new(vec![genesis_id], outputs)?;
        tx.sign_inputs(std::slice::from_ref(seckey))?;

        let time = now.max(head.time);
        let fee = tx.fee(std::slice::from_ref(&genesis_ux), time);
        let block = Block::new_block(
            &head,
            time,
            fee,
            BlockBody {
                transactions: vec![tx],
            },
        )?
        .sign(seckey)?;
        self.execute_locked(&mut state, &block)?;
        info!(
            "Distributed {} coins to {} addresses",
            dist.coins_per_address,
            dist.addresses.len()
        );
        Ok(block)
    }

    pub fn get_block(&self, seq: u64) -> Result<Option<SignedBlock>> {
        let _state = self.state.read();
        self.store.get_block(seq)
    }

    pub fn get_block_by_hash(&self, hash: &Sha256) -> Result<Option<SignedBlock>> {
        let _state = self.state.read();
        self.store.get_block_by_hash(hash)
    }

    /// Blocks with `start <= seq <= end`
    pub fn get_blocks(&self, start: u64, end: u64) -> Result<Vec<SignedBlock>> {
        let _state = self.state.read();
        self.store.get_blocks(start, end)
    }

    /// Up to `count` consecutive blocks starting at seq `from`
    pub fn get_blocks_from(&self, from: u64, count: u64) -> Result<Vec<SignedBlock>> {
        let state = self.state.read();
        let Some(head) = state.head_seq() else {
            return Ok(Vec::new());
        };
        if count == 0 || from > head {
            return Ok(Vec::new());
        }
        let end = from.saturating_add(count - 1).min(head);
        self.store.get_blocks(from, end)
    }

    /// The most recent `n` blocks, oldest first
    pub fn get_last_blocks(&self, n: u64) -> Result<Vec<SignedBlock>> {
        let state = self.state.read();
        match state.head_seq() {
            Some(head) if n > 0 => self.store.get_blocks((head + 1).saturating_sub(n), head),
            _ => Ok(Vec::new()),
        }
    }

    /// Blocks at each listed seq; missing seqs are skipped
    pub fn get_blocks_in_depth(&self, seqs: &[u64]) -> Result<Vec<SignedBlock>> {
        let _state = self.state.read();
        let mut blocks = Vec::with_capacity(seqs.len());
        for seq in seqs {
            if let Some(block) = self.store.get_block(*seq)? {
                blocks.push(block);
            }
        }
        Ok(blocks)
    }

    pub fn get_unspent_outputs(&self, filter: &UnspentFilter) -> Vec<(Sha256, UxOut)> {
        let state = self.state.read();
        if let Some(ids) = &filter.ids {
            return ids
                .iter()
                .filter_map(|id| state.unspent.get(id).map(|ux| (*id, ux.clone())))
                .filter(|(id, ux)| filter.matches(id, ux))
                .collect();
        }
        state
            .unspent
            .iter()
            .filter(|(id, ux)| filter.matches(id, ux))
            .map(|(id, ux)| (*id, ux.clone()))
            .collect()
    }

    pub fn get_transaction(&self, txid: &Sha256) -> Result<Option<TransactionStatus>> {
        let state = self.state.read();
        if let Some(entry) = state.pool.get(txid) {
            return Ok(Some(TransactionStatus::Unconfirmed(entry.clone())));
        }
        let head = state.head_seq().unwrap_or(0);
        Ok(self
            .store
            .get_transaction(txid)?
            .map(|record| TransactionStatus::Confirmed {
                depth: head.saturating_sub(record.block_seq) + 1,
                record,
            }))
    }

    /// Every output ever owned by `address`, spent or not
    pub fn get_address_outputs(&self, address: &Address) -> Result<Vec<UxOutRecord>> {
        let _state = self.state.read();
        self.store.get_address_uxouts(address)
    }

    pub fn get_unconfirmed(&self) -> Vec<UnconfirmedTxn> {
        self.state.read().pool.get_all()
    }

    pub fn get_unconfirmed_hashes(&self) -> Vec<Sha256> {
        self.state.read().pool.hashes()
    }

    /// Pending transactions among `hashes`
    pub fn get_unconfirmed_txns(&self, hashes: &[Sha256]) -> Vec<Transaction> {
        let state = self.state.read();
        hashes
            .iter()
            .filter_map(|h| state.pool.get(h).map(|e| e.tx.clone()))
            .collect()
    }

    /// The subset of `hashes` this node has neither pending nor confirmed
    pub fn filter_known_txns(&self, hashes: &[Sha256]) -> Result<Vec<Sha256>> {
        let state = self.state.read();
        let mut unknown = Vec::new();
        for hash in hashes {
            if !state.pool.contains(hash) && self.store.get_transaction(hash)?.is_none() {
                unknown.push(*hash);
            }
        }
        Ok(unknown)
    }

    pub fn flush(&self) -> Result<()> {
        self.store.flush()
    }
}
