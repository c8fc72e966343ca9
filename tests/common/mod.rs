//! Shared fixtures for integration tests: small chains on temporary
//! directories and daemons bound to loopback ephemeral ports.
#![allow(dead_code)]

use spo_chain::config::{
    Config, DaemonConfig, DistributionParams, GatewayConfig, GenesisParams, PexConfig,
    VisorConfig,
};
use spo_chain::daemon::DaemonHandle;
use spo_chain::{
    generate_key_pair, pubkey_from_seckey, Address, BlockStore, Daemon, NodeMode, SecretKey,
    Transaction, TransactionOutput, UnspentFilter, Visor, DROPLETS_PER_COIN,
};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const GENESIS_TIME: u64 = 1_600_000_000;
pub const COINS_PER_ADDRESS: u64 = 1_000 * DROPLETS_PER_COIN;

/// Chain parameters with `count` freshly keyed distribution addresses.
/// Half of them start unlocked; the rest unlock one per hour starting a
/// day after genesis.
pub fn chain_config(mode: NodeMode, count: usize) -> (VisorConfig, Vec<SecretKey>) {
    let (authority, authority_pk) = generate_key_pair();
    let keys: Vec<SecretKey> = (0..count).map(|_| generate_key_pair().0).collect();
    let addresses = keys
        .iter()
        .map(|k| pubkey_from_seckey(k).unwrap().to_address())
        .collect();
    let max_supply = COINS_PER_ADDRESS * count as u64;
    let config = VisorConfig {
        mode,
        blockchain_pubkey: authority_pk,
        blockchain_seckey: Some(authority),
        genesis: GenesisParams {
            address: authority_pk.to_address(),
            signature: None,
            timestamp: GENESIS_TIME,
            coin_volume: max_supply,
        },
        distribution: DistributionParams {
            addresses,
            initial_unlocked: (count / 2) as u64,
            unlock_rate: 1,
            unlock_interval_secs: 3600,
            unlock_start: Some(GENESIS_TIME + 86_400),
            coins_per_address: COINS_PER_ADDRESS,
        },
        max_supply,
        max_block_transactions: 100,
        max_unconfirmed: 100,
    };
    (config, keys)
}

/// The same chain seen by a node without the signing key
pub fn follower_of(config: &VisorConfig) -> VisorConfig {
    let mut follower = config.clone();
    follower.mode = NodeMode::Follower;
    follower.blockchain_seckey = None;
    follower
}

pub fn open_visor(dir: &Path, config: VisorConfig) -> Visor {
    let store = BlockStore::open(&dir.join("data.db")).unwrap();
    Visor::open(config, store).unwrap()
}

/// Spends the first output owned by `key`: `coins` to `to`, the change
/// back to the owner, all hours burned
pub fn transfer(visor: &Visor, key: &SecretKey, to: Address, coins: u64) -> Transaction {
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

/// Daemon settings for a loopback test network with fast timers
pub fn node_config(dir: &Path, visor: VisorConfig) -> Config {
    let daemon = DaemonConfig {
        port: 0,
        localhost_only: true,
        default_connections: Vec::new(),
        outgoing_rate_ms: 100,
        ping_interval_secs: 1,
        announce_interval_secs: 1,
        block_creation_interval_secs: 1,
        request_timeout_secs: 2,
        ..DaemonConfig::default()
    };
    Config {
        data_dir: dir.to_path_buf(),
        db_path: dir.join("data.db"),
        log_level: "debug".to_string(),
        daemon,
        pex: PexConfig {
            refresh_interval_secs: 1,
            ..PexConfig::default()
        },
        peers_file: dir.join("peers.json"),
        visor,
        gateway: GatewayConfig::default(),
    }
}

pub struct TestNode {
    pub handle: DaemonHandle,
    pub visor: Arc<Visor>,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<spo_chain::Result<()>>,
}

impl TestNode {
    pub async fn start(config: Config) -> TestNode {
        let store = BlockStore::open(&config.db_path).unwrap();
        let visor = Arc::new(Visor::open(config.visor.clone(), store).unwrap());
        TestNode::start_with(config, visor).await
    }

    pub async fn start_with(config: Config, visor: Arc<Visor>) -> TestNode {
        let (shutdown, rx) = watch::channel(false);
        let daemon = Daemon::new(Arc::new(config), Arc::clone(&visor), rx)
            .await
            .unwrap();
        let handle = daemon.handle();
        let task = tokio::spawn(daemon.run());
        TestNode {
            handle,
            visor,
            shutdown,
            task,
        }
    }

    pub fn addr(&self) -> std::net::SocketAddr {
        self.handle.local_addr().unwrap()
    }

    pub async fn stop(self) {
        self.shutdown.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(10), self.task)
            .await
            .expect("daemon did not stop")
            .unwrap()
            .unwrap();
    }
}

/// Polls `check` until it holds or `limit` passes
pub async fn wait_until(limit: Duration, check: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + limit;
    loop {
        if check() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
