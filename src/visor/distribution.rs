//! Time-based lock-up of the distribution addresses.
//!
//! The table is split into an unlocked prefix and a locked suffix. The
//! prefix starts at `initial_unlocked` entries and, once `unlock_start`
//! is set, grows by `unlock_rate` entries at the end of every elapsed
//! `unlock_interval_secs`.

use crate::cipher::Address;
use crate::config::DistributionParams;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct DistributionSchedule {
    addresses: Vec<Address>,
    initial_unlocked: u64,
    unlock_rate: u64,
    unlock_interval: u64,
    unlock_start: Option<u64>,
}

impl DistributionSchedule {
    pub fn new(params: &DistributionParams) -> DistributionSchedule {
        DistributionSchedule {
            addresses: params.addresses.clone(),
            initial_unlocked: params.initial_unlocked,
            unlock_rate: params.unlock_rate,
            unlock_interval: params.unlock_interval_secs.max(1),
            unlock_start: params.unlock_start,
        }
    }

    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    /// Number of table entries spendable at `now`
    pub fn unlocked_count(&self, now: u64) -> usize {
        let total = self.addresses.len() as u64;
        let extra = match self.unlock_start {
            Some(start) if now >= start => {
                let intervals = (now - start) / self.unlock_interval;
                intervals.saturating_mul(self.unlock_rate)
            }
            _ => 0,
        };
        self.initial_unlocked.saturating_add(extra).min(total) as usize
    }

    pub fn unlocked_addresses(&self, now: u64) -> &[Address] {
        &self.addresses[..self.unlocked_count(now)]
    }

    pub fn locked_addresses(&self, now: u64) -> HashSet<Address> {
        self.addresses[self.unlocked_count(now)..]
            .iter()
            .copied()
            .collect()
    }

    pub fn is_locked(&self, address: &Address, now: u64) -> bool {
        self.addresses[self.unlocked_count(now)..].contains(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::generate_key_pair;

    fn schedule(count: usize, start: Option<u64>) -> DistributionSchedule {
        let addresses = (0..count)
            .map(|_| generate_key_pair().1.to_address())
            .collect();
        DistributionSchedule::new(&DistributionParams {
            addresses,
            initial_unlocked: 2,
            unlock_rate: 3,
            unlock_interval_secs: 100,
            unlock_start: start,
            coins_per_address: 1,
        })
    }

    #[test]
    fn test_only_prefix_unlocked_without_start() {
        let s = schedule(10, None);
        assert_eq!(s.unlocked_count(u64::MAX), 2);
        assert_eq!(s.locked_addresses(0).len(), 8);
        assert!(!s.is_locked(&s.addresses()[1], 0));
        assert!(s.is_locked(&s.addresses()[2], 0));
    }

    #[test]
    fn test_unlock_boundaries() {
        let s = schedule(10, Some(1000));
        assert_eq!(s.unlocked_count(999), 2);
        assert_eq!(s.unlocked_count(1000), 2);
        assert_eq!(s.unlocked_count(1099), 2);
        assert_eq!(s.unlocked_count(1100), 5);
        assert_eq!(s.unlocked_count(1199), 5);
        assert_eq!(s.unlocked_count(1200), 8);
        // clamps at the table size
        assert_eq!(s.unlocked_count(5000), 10);
        assert!(s.locked_addresses(5000).is_empty());
    }

    #[test]
    fn test_unlock_is_monotonic() {
        let s = schedule(20, Some(0));
        let mut last = 0;
        for now in (0..3000).step_by(37) {
            let count = s.unlocked_count(now);
            assert!(count >= last);
            last = count;
        }
    }
}
