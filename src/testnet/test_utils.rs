//! Test utilities for ledger testing

use crate::cipher::{generate_key_pair, pubkey_from_seckey, Address, SecretKey};
use crate::config::{DistributionParams, GenesisParams, NodeMode, VisorConfig};
use crate::core::{Transaction, TransactionOutput, DROPLETS_PER_COIN};
use crate::storage::BlockStore;
use crate::visor::{UnspentFilter, Visor};

pub const TEST_GENESIS_TIME: u64 = 1_600_000_000;
pub const TEST_DISTRIBUTION_COUNT: usize = 4;
/// whole coins per distribution address
pub const TEST_COINS_PER_ADDRESS: u64 = 1_000;

/// Small chain parameters: four distribution addresses, the first two
/// unlocked, the rest unlocking one per hour starting a day after genesis.
/// Returns the config and the distribution secret keys in table order.
pub fn test_visor_config(mode: NodeMode) -> (VisorConfig, Vec<SecretKey>) {
    let (authority, authority_pk) = generate_key_pair();
    let dist_keys: Vec<SecretKey> = (0..TEST_DISTRIBUTION_COUNT)
        .map(|_| generate_key_pair().0)
        .collect();
    let addresses = dist_keys
        .iter()
        .map(|k| pubkey_from_seckey(k).map(|pk| pk.to_address()))
        .collect::<crate::error::Result<Vec<Address>>>()
        .unwrap();

    let coins_per_address = TEST_COINS_PER_ADDRESS * DROPLETS_PER_COIN;
    let max_supply = coins_per_address * TEST_DISTRIBUTION_COUNT as u64;
    let config = VisorConfig {
        mode,
        blockchain_pubkey: authority_pk,
        blockchain_seckey: Some(authority),
        genesis: GenesisParams {
            address: authority_pk.to_address(),
            signature: None,
            timestamp: TEST_GENESIS_TIME,
            coin_volume: max_supply,
        },
        distribution: DistributionParams {
            addresses,
            initial_unlocked: 2,
            unlock_rate: 1,
            unlock_interval_secs: 3600,
            unlock_start: Some(TEST_GENESIS_TIME + 86_400),
            coins_per_address,
        },
        max_supply,
        max_block_transactions: 100,
        max_unconfirmed: 100,
    };
    (config, dist_keys)
}

/// Opens a visor on a temporary database
pub fn test_visor(config: VisorConfig) -> Visor {
    let db = sled::Config::new().temporary(true).open().unwrap();
    Visor::open(config, BlockStore::from_db(db).unwrap()).unwrap()
}

pub struct TestChain {
    pub visor: Visor,
    pub config: VisorConfig,
    pub dist_keys: Vec<SecretKey>,
}

impl TestChain {
    pub fn new(mode: NodeMode) -> TestChain {
        let (config, dist_keys) = test_visor_config(mode);
        TestChain {
            visor: test_visor(config.clone()),
            config,
            dist_keys,
        }
    }

    /// Two hours after genesis, before any scheduled unlock
    pub fn now(&self) -> u64 {
        TEST_GENESIS_TIME + 7200
    }

    /// Config for a follower of this chain that knows the genesis signature
    pub fn follower_config(&self) -> VisorConfig {
        let mut config = self.config.clone();
        config.mode = NodeMode::Follower;
        config.blockchain_seckey = None;
        config.genesis.signature = self.visor.get_block(0).unwrap().map(|b| b.sig);
        config
    }
}

/// Spends the first unspent output owned by `key`, sending `coins`
/// droplets to `to` and the remainder back. All hours are burned.
pub fn signed_transfer(visor: &Visor, key: &SecretKey, to: Address, coins: u64) -> Transaction {
    let owner = pubkey_from_seckey(key).unwrap().to_address();
    let (id, ux) = visor
        .get_unspent_outputs(&UnspentFilter::by_addresses([owner]))
        .into_iter()
        .next()
        .expect("key owns no outputs");
    let mut outputs = vec![TransactionOutput {
        address: to,
        coins,
        hours: 0,
    }];
    if ux.body.coins > coins {
        outputs.push(TransactionOutput {
            address: owner,
            coins: ux.body.coins - coins,
            hours: 0,
        });
    }
    let mut tx = Transaction::new(vec![id], outputs).unwrap();
    tx.sign_inputs(std::slice::from_ref(key)).unwrap();
    tx
}
