use crate::cipher::{Address, Sha256};
use crate::core::{Block, UxHead, UxOut};
use crate::error::{Result, ValidationError};
use log::debug;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Effect of one block on the unspent set, used to persist and index it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppliedBlock {
    pub head_seq: u64,
    /// consumed outputs with the transaction that spent each
    pub spent: Vec<(Sha256, UxOut, Sha256)>,
    pub created: Vec<(Sha256, UxOut)>,
    pub burned_coins: u64,
    pub burned_hours: u64,
}

/// Checkpoint of an `UnspentPool`. Taking one only bumps a reference count;
/// the map is copied on the next write to either side.
#[derive(Debug, Clone)]
pub struct UnspentSnapshot(UnspentPool);

/// In-memory unspent output set keyed by output id
#[derive(Debug, Clone)]
pub struct UnspentPool {
    outputs: Arc<HashMap<Sha256, UxOut>>,
    head_seq: Option<u64>,
    total_coins: u64,
    max_supply: u64,
}

impl UnspentPool {
    pub fn new(max_supply: u64) -> UnspentPool {
        UnspentPool {
            outputs: Arc::new(HashMap::new()),
            head_seq: None,
            total_coins: 0,
            max_supply,
        }
    }

    /// Rebuilds the set from persisted outputs
    pub fn from_outputs(
        outputs: HashMap<Sha256, UxOut>,
        head_seq: Option<u64>,
        max_supply: u64,
    ) -> std::result::Result<UnspentPool, ValidationError> {
        let total_coins = outputs
            .values()
            .try_fold(0u64, |acc, ux| acc.checked_add(ux.body.coins))
            .filter(|total| *total <= max_supply)
            .ok_or(ValidationError::SupplyOverflow)?;
        Ok(UnspentPool {
            outputs: Arc::new(outputs),
            head_seq,
            total_coins,
            max_supply,
        })
    }

    pub fn get(&self, id: &Sha256) -> Option<&UxOut> {
        self.outputs.get(id)
    }

    pub fn contains(&self, id: &Sha256) -> bool {
        self.outputs.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    pub fn head_seq(&self) -> Option<u64> {
        self.head_seq
    }

    pub fn total_coins(&self) -> u64 {
        self.total_coins
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Sha256, &UxOut)> {
        self.outputs.iter()
    }

    pub fn get_by_addresses(&self, addresses: &HashSet<Address>) -> Vec<UxOut> {
        self.outputs
            .values()
            .filter(|ux| addresses.contains(&ux.body.address))
            .cloned()
            .collect()
    }

    /// Resolves the inputs of a transaction, failing on the first missing one
    pub fn get_inputs(&self, inputs: &[Sha256]) -> std::result::Result<Vec<UxOut>, ValidationError> {
        inputs
            .iter()
            .map(|id| {
                self.outputs
                    .get(id)
                    .cloned()
                    .ok_or(ValidationError::UnknownInput(*id))
            })
            .collect()
    }

    pub fn snapshot(&self) -> UnspentSnapshot {
        UnspentSnapshot(self.clone())
    }

    pub fn restore(&mut self, snapshot: UnspentSnapshot) {
        *self = snapshot.0;
    }

    /// Applies every transaction of `block` or none of them.
    ///
    /// Inputs must exist in the set as it was before the block, must not be
    /// owned by an address in `locked`, and may be consumed only once.
    /// Outputs created by the block are keyed by their body hash.
    pub fn apply_block(
        &mut self,
        block: &Block,
        expected_head: Option<u64>,
        locked: &HashSet<Address>,
    ) -> Result<AppliedBlock> {
        if self.head_seq != expected_head {
            return Err(ValidationError::BadBlockSequence {
                expected: expected_head.map_or(0, |s| s + 1),
                actual: self.head_seq.map_or(0, |s| s + 1),
            }
            .into());
        }
        let next_seq = expected_head.map_or(0, |s| s + 1);
        if block.seq() != next_seq {
            return Err(ValidationError::BadBlockSequence {
                expected: next_seq,
                actual: block.seq(),
            }
            .into());
        }

        let head = UxHead {
            time: block.time(),
            bkseq: block.seq(),
        };
        let mut applied = AppliedBlock {
            head_seq: block.seq(),
            ..AppliedBlock::default()
        };
        let mut consumed: HashSet<Sha256> = HashSet::new();
        let mut created_ids: HashSet<Sha256> = HashSet::new();
        let mut coins_in_total = 0u64;
        let mut coins_out_total = 0u64;

        for tx in block.get_transactions() {
            if tx.inputs.is_empty() && block.seq() != 0 {
                return Err(ValidationError::InvalidTransaction(
                    "only the genesis block may create coins".to_string(),
                )
                .into());
            }

            let mut coins_in = 0u64;
            let mut hours_in = 0u64;
            for id in &tx.inputs {
                if !consumed.insert(*id) {
                    return Err(ValidationError::DoubleSpendInBlock(*id).into());
                }
                let ux = self
                    .outputs
                    .get(id)
                    .ok_or(ValidationError::UnknownInput(*id))?;
                if locked.contains(&ux.body.address) {
                    return Err(ValidationError::LockedAddressSpend(ux.body.address).into());
                }
                coins_in = coins_in
                    .checked_add(ux.body.coins)
                    .ok_or(ValidationError::SupplyOverflow)?;
                hours_in = hours_in.saturating_add(ux.coin_hours(block.time()));
                applied.spent.push((*id, ux.clone(), tx.hash()));
            }

            let coins_out = tx.output_coins().ok_or(ValidationError::SupplyOverflow)?;
            let hours_out = tx.output_hours().ok_or(ValidationError::SupplyOverflow)?;
            if !tx.inputs.is_empty() {
                if coins_out > coins_in {
                    return Err(ValidationError::InsufficientCoins.into());
                }
                applied.burned_coins += coins_in - coins_out;
                applied.burned_hours = applied
                    .burned_hours
                    .saturating_add(hours_in.saturating_sub(hours_out));
            }
            coins_in_total = coins_in_total
                .checked_add(coins_in)
                .ok_or(ValidationError::SupplyOverflow)?;
            coins_out_total = coins_out_total
                .checked_add(coins_out)
                .ok_or(ValidationError::SupplyOverflow)?;

            for ux in tx.create_outputs(head) {
                let id = ux.hash()?;
                if self.outputs.contains_key(&id) || !created_ids.insert(id) {
                    return Err(ValidationError::InvalidTransaction(format!(
                        "output {id} already exists"
                    ))
                    .into());
                }
                applied.created.push((id, ux));
            }
        }

        let new_total = self
            .total_coins
            .saturating_sub(coins_in_total)
            .checked_add(coins_out_total)
            .filter(|total| *total <= self.max_supply)
            .ok_or(ValidationError::SupplyOverflow)?;

        // validation is complete, nothing below can fail
        let outputs = Arc::make_mut(&mut self.outputs);
        for (id, _, _) in &applied.spent {
            outputs.remove(id);
        }
        for (id, ux) in &applied.created {
            outputs.insert(*id, ux.clone());
        }
        self.total_coins = new_total;
        self.head_seq = Some(block.seq());
        debug!(
            "Applied block {} to unspent set: -{} +{} outputs",
            block.seq(),
            applied.spent.len(),
            applied.created.len()
        );
        Ok(applied)
    }
}
