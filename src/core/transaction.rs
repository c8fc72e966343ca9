// This file implements transactions - how value moves between addresses.
// A transaction consumes unspent outputs by hash and creates new ones.
// Its identity is the inner hash over inputs and outputs, which is also
// the message every input signature commits to.

use crate::cipher::{sign_hash, verify_address_signature, Address, SecretKey, Sha256, Sig};
use crate::core::ux_out::{total_coins, total_hours, UxBody, UxHead, UxOut};
use crate::error::{Result, ValidationError};
use crate::utils::{deserialize, serialize};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
pub struct TransactionOutput {
    pub address: Address,
    pub coins: u64,
    pub hours: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct Transaction {
    pub inner_hash: Sha256,
    pub sigs: Vec<Sig>,       // one per input, same order
    pub inputs: Vec<Sha256>,  // ids of the outputs I spend
    pub outputs: Vec<TransactionOutput>,
}

impl Transaction {
    /// Builds an unsigned transaction with its inner hash filled in
    pub fn new(inputs: Vec<Sha256>, outputs: Vec<TransactionOutput>) -> Result<Transaction> {
        let mut tx = Transaction {
            inner_hash: Sha256::ZERO,
            sigs: vec![],
            inputs,
            outputs,
        };
        tx.update_inner_hash()?;
        Ok(tx)
    }

    pub fn compute_inner_hash(&self) -> Result<Sha256> {
        let mut buf = serialize(&self.inputs)?;
        buf.extend_from_slice(&serialize(&self.outputs)?);
        Ok(Sha256::digest(&buf))
    }

    pub fn update_inner_hash(&mut self) -> Result<()> {
        self.inner_hash = self.compute_inner_hash()?;
        Ok(())
    }

    /// Signs every input, `keys[i]` must own input `i`
    pub fn sign_inputs(&mut self, keys: &[SecretKey]) -> Result<()> {
        self.update_inner_hash()?;
        self.sigs = keys
            .iter()
            .map(|key| sign_hash(&self.inner_hash, key))
            .collect::<Result<Vec<_>>>()?;
        Ok(())
    }

    pub fn hash(&self) -> Sha256 {
        self.inner_hash
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        serialize(self)
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Transaction> {
        deserialize(bytes)
    }

    pub fn output_coins(&self) -> Option<u64> {
        self.outputs
            .iter()
            .try_fold(0u64, |acc, o| acc.checked_add(o.coins))
    }

    pub fn output_hours(&self) -> Option<u64> {
        self.outputs
            .iter()
            .try_fold(0u64, |acc, o| acc.checked_add(o.hours))
    }

    /// Outputs this transaction creates once included at `head`
    pub fn create_outputs(&self, head: UxHead) -> Vec<UxOut> {
        self.outputs
            .iter()
            .map(|o| UxOut {
                head,
                body: UxBody {
                    src_transaction: self.inner_hash,
                    address: o.address,
                    coins: o.coins,
                    hours: o.hours,
                },
            })
            .collect()
    }

    /// Checks every rule that does not need the unspent set
    pub fn verify_structure(&self) -> Result<()> {
        let invalid = |msg: &str| ValidationError::InvalidTransaction(msg.to_string());

        if self.inputs.is_empty() {
            return Err(invalid("no inputs").into());
        }
        if self.outputs.is_empty() {
            return Err(invalid("no outputs").into());
        }
        if self.sigs.len() != self.inputs.len() {
            return Err(invalid("signature count does not match input count").into());
        }
        if self.compute_inner_hash()? != self.inner_hash {
            return Err(invalid("inner hash does not match contents").into());
        }

        let mut seen = HashSet::with_capacity(self.inputs.len());
        for input in &self.inputs {
            if !seen.insert(input) {
                return Err(invalid("duplicate input").into());
            }
        }

        let mut seen_outputs = HashSet::with_capacity(self.outputs.len());
        for output in &self.outputs {
            if output.coins == 0 {
                return Err(invalid("zero coin output").into());
            }
            if !seen_outputs.insert(output) {
                return Err(invalid("duplicate output").into());
            }
        }

        if self.output_coins().is_none() || self.output_hours().is_none() {
            return Err(invalid("output totals overflow").into());
        }
        Ok(())
    }

    /// Checks signatures and value conservation against the resolved
    /// inputs, which must be given in input order.
    pub fn verify_spending(
        &self,
        uxins: &[UxOut],
        now: u64,
    ) -> std::result::Result<(), ValidationError> {
        if uxins.len() != self.inputs.len() {
            return Err(ValidationError::InvalidTransaction(
                "resolved input count mismatch".to_string(),
            ));
        }
        for (index, (ux, sig)) in uxins.iter().zip(&self.sigs).enumerate() {
            if !verify_address_signature(&ux.body.address, sig, &self.inner_hash) {
                return Err(ValidationError::InvalidSignature { index });
            }
        }

        let coins_in = total_coins(uxins).ok_or(ValidationError::SupplyOverflow)?;
        let coins_out = self.output_coins().ok_or(ValidationError::SupplyOverflow)?;
        if coins_out > coins_in {
            return Err(ValidationError::InsufficientCoins);
        }

        let hours_in = total_hours(uxins, now).ok_or(ValidationError::SupplyOverflow)?;
        let hours_out = self.output_hours().ok_or(ValidationError::SupplyOverflow)?;
        if hours_out > hours_in {
            return Err(ValidationError::InsufficientHours);
        }
        Ok(())
    }

    /// Coin hours burned when spending `uxins` at `now`
    pub fn fee(&self, uxins: &[UxOut], now: u64) -> u64 {
        let hours_in = total_hours(uxins, now).unwrap_or(u64::MAX);
        hours_in.saturating_sub(self.output_hours().unwrap_or(u64::MAX))
    }
}
