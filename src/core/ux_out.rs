// Unspent outputs are the only holders of value in the ledger.
// An output is identified by the hash of its body, so the same creating
// transaction always produces the same id and nothing else can.

use crate::cipher::{Address, Sha256};
use crate::core::monetary::coin_hours;
use crate::error::Result;
use serde::{Deserialize, Serialize};

// Where and when the output was created. Not part of the identity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
pub struct UxHead {
    pub time: u64,  // timestamp of the creating block
    pub bkseq: u64, // sequence of the creating block
}

#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
pub struct UxBody {
    pub src_transaction: Sha256, // hash of the transaction that created me
    pub address: Address,
    pub coins: u64, // droplets
    pub hours: u64, // hours assigned at creation
}

#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
pub struct UxOut {
    pub head: UxHead,
    pub body: UxBody,
}

impl UxOut {
    pub fn hash(&self) -> Result<Sha256> {
        Sha256::of(&self.body)
    }

    /// Hours spendable from this output at time `now`
    pub fn coin_hours(&self, now: u64) -> u64 {
        coin_hours(self.body.coins, self.body.hours, self.head.time, now)
    }
}

/// Totals across a set of outputs, checked against overflow
pub fn total_coins(uxs: &[UxOut]) -> Option<u64> {
    uxs.iter()
        .try_fold(0u64, |acc, ux| acc.checked_add(ux.body.coins))
}

pub fn total_hours(uxs: &[UxOut], now: u64) -> Option<u64> {
    uxs.iter()
        .try_fold(0u64, |acc, ux| acc.checked_add(ux.coin_hours(now)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::monetary::DROPLETS_PER_COIN;

    fn ux(coins: u64, time: u64) -> UxOut {
        UxOut {
            head: UxHead { time, bkseq: 3 },
            body: UxBody {
                src_transaction: Sha256::digest(b"src"),
                address: Address::default(),
                coins,
                hours: 1,
            },
        }
    }

    #[test]
    fn test_identity_ignores_head() {
        let a = ux(5, 100);
        let mut b = a.clone();
        b.head.time = 999;
        b.head.bkseq = 7;
        assert_eq!(a.hash().unwrap(), b.hash().unwrap());

        b.body.coins += 1;
        assert_ne!(a.hash().unwrap(), b.hash().unwrap());
    }

    #[test]
    fn test_totals() {
        let uxs = vec![ux(2 * DROPLETS_PER_COIN, 0), ux(3 * DROPLETS_PER_COIN, 0)];
        assert_eq!(total_coins(&uxs), Some(5 * DROPLETS_PER_COIN));
        // 1 + 2 and 1 + 3 after one hour
        assert_eq!(total_hours(&uxs, 3600), Some(7));
        assert_eq!(total_coins(&[ux(u64::MAX, 0), ux(1, 0)]), None);
    }
}
