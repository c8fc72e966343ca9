use crate::cipher::{pubkey_from_seckey, Address, PublicKey, SecretKey, Sig};
use crate::config::distribution::DISTRIBUTION_ADDRESSES;
use crate::core::{DROPLETS_PER_COIN, MAX_COIN_SUPPLY};
use crate::error::{BlockchainError, Result};
use crate::storage::{read_encrypted_key, KEY_PASSWORD_ENV};
use serde::{Deserialize, Serialize};
use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8848;
pub const DEFAULT_PEERLIST_URL: &str = "https://downloads.spaco.net/blockchain/peers.txt";
pub const DEFAULT_GENESIS_ADDRESS: &str = "47YHfeSspQp6Ap8MHi9rZHWCtFp7kszzYu";
pub const DEFAULT_BLOCKCHAIN_PUBKEY: &str =
    "027d047d6e5546ab1dfff0c73a3a74eff354cbb0f1a14461113834c10663331305";
pub const DEFAULT_GENESIS_TIMESTAMP: u64 = 1502217329;

pub const DEFAULT_CONNECTIONS: [&str; 5] = [
    "118.190.40.103:8848",
    "121.42.24.199:8848",
    "47.52.211.167:8848",
    "47.74.7.161:8848",
    "47.254.130.80:8848",
];

/// How this node participates in block authoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeMode {
    /// validates and relays, never signs
    #[default]
    Follower,
    /// signs blocks from the candidate pool on a timer
    Master,
    /// holds the signing key but only signs on explicit request
    Arbitrating,
}

impl NodeMode {
    pub fn can_sign(&self) -> bool {
        matches!(self, NodeMode::Master | NodeMode::Arbitrating)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeSection {
    pub data_dir: PathBuf,
    /// defaults to `<data_dir>/data.db`
    pub db_path: Option<PathBuf>,
    pub log_level: String,
}

impl Default for NodeSection {
    fn default() -> Self {
        let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
        Self {
            data_dir: PathBuf::from(home).join(".spo"),
            db_path: None,
            log_level: "info".to_string(),
        }
    }
}

impl NodeSection {
    pub fn db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join("data.db"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// listen address, empty for all interfaces
    pub address: String,
    pub port: u16,
    pub disable_networking: bool,
    pub disable_incoming: bool,
    pub disable_outgoing: bool,
    pub localhost_only: bool,
    pub connect_to: Option<SocketAddr>,
    pub default_connections: Vec<SocketAddr>,
    pub max_connections: usize,
    pub outgoing_max: usize,
    pub outgoing_rate_ms: u64,
    pub handshake_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub ping_interval_secs: u64,
    pub inbound_queue: usize,
    pub outbound_queue: usize,
    pub max_message_size: usize,
    pub blocks_request_count: u64,
    pub max_blocks_response: u64,
    pub max_txns_announce: usize,
    pub request_timeout_secs: u64,
    pub request_retries: u32,
    pub block_buffer_timeout_secs: u64,
    pub misbehavior_threshold: u32,
    pub ban_cooldown_secs: u64,
    pub announce_interval_secs: u64,
    pub block_creation_interval_secs: u64,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            port: DEFAULT_PORT,
            disable_networking: false,
            disable_incoming: false,
            disable_outgoing: false,
            localhost_only: false,
            connect_to: None,
            default_connections: DEFAULT_CONNECTIONS
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect(),
            max_connections: 128,
            outgoing_max: 16,
            outgoing_rate_ms: 5000,
            handshake_timeout_secs: 10,
            idle_timeout_secs: 90,
            ping_interval_secs: 30,
            inbound_queue: 64,
            outbound_queue: 256,
            max_message_size: 8 * 1024 * 1024,
            blocks_request_count: 20,
            max_blocks_response: 50,
            max_txns_announce: 256,
            request_timeout_secs: 15,
            request_retries: 3,
            block_buffer_timeout_secs: 60,
            misbehavior_threshold: 10,
            ban_cooldown_secs: 3600,
            announce_interval_secs: 60,
            block_creation_interval_secs: 10,
        }
    }
}

impl DaemonConfig {
    pub fn listen_addr(&self) -> String {
        let host = if self.localhost_only {
            "127.0.0.1"
        } else if self.address.is_empty() {
            "0.0.0.0"
        } else {
            self.address.as_str()
        };
        format!("{host}:{}", self.port)
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_secs(self.handshake_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn block_buffer_timeout(&self) -> Duration {
        Duration::from_secs(self.block_buffer_timeout_secs)
    }

    pub fn ban_cooldown(&self) -> Duration {
        Duration::from_secs(self.ban_cooldown_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PexConfig {
    pub disabled: bool,
    pub max_peers: usize,
    /// defaults to `<data_dir>/peers.json`
    pub peers_file: Option<PathBuf>,
    pub download_peerlist: bool,
    pub peerlist_url: String,
    pub refresh_interval_secs: u64,
    pub max_retries: u32,
    pub exchange_count: usize,
}

impl Default for PexConfig {
    fn default() -> Self {
        Self {
            disabled: false,
            max_peers: 65535,
            peers_file: None,
            download_peerlist: false,
            peerlist_url: DEFAULT_PEERLIST_URL.to_string(),
            refresh_interval_secs: 60,
            max_retries: 10,
            exchange_count: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisorSection {
    pub mode: NodeMode,
    pub blockchain_pubkey: String,
    pub blockchain_seckey: Option<String>,
    pub blockchain_seckey_file: Option<PathBuf>,
    pub genesis_address: String,
    pub genesis_signature: Option<String>,
    pub genesis_timestamp: u64,
    /// whole coins
    pub max_coin_supply: u64,
    pub max_block_transactions: usize,
    pub max_unconfirmed: usize,
}

impl Default for VisorSection {
    fn default() -> Self {
        Self {
            mode: NodeMode::Follower,
            blockchain_pubkey: DEFAULT_BLOCKCHAIN_PUBKEY.to_string(),
            blockchain_seckey: None,
            blockchain_seckey_file: None,
            genesis_address: DEFAULT_GENESIS_ADDRESS.to_string(),
            genesis_signature: None,
            genesis_timestamp: DEFAULT_GENESIS_TIMESTAMP,
            max_coin_supply: MAX_COIN_SUPPLY,
            max_block_transactions: 500,
            max_unconfirmed: 10_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributionSection {
    /// defaults to the main network table
    pub addresses: Option<Vec<String>>,
    pub initial_unlocked: u64,
    pub unlock_rate: u64,
    pub unlock_interval_secs: u64,
    pub unlock_start: Option<u64>,
}

impl Default for DistributionSection {
    fn default() -> Self {
        Self {
            addresses: None,
            initial_unlocked: 25,
            unlock_rate: 5,
            unlock_interval_secs: 60 * 60 * 24 * 365,
            unlock_start: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub workers: usize,
    pub queue_size: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            workers: 5,
            queue_size: 1000,
        }
    }
}

/// Raw configuration as read from TOML and command-line flags
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub node: NodeSection,
    pub daemon: DaemonConfig,
    pub pex: PexConfig,
    pub visor: VisorSection,
    pub distribution: DistributionSection,
    pub gateway: GatewayConfig,
}

/// Genesis block parameters, fixed for the life of the chain
#[derive(Debug, Clone, PartialEq)]
pub struct GenesisParams {
    pub address: Address,
    pub signature: Option<Sig>,
    pub timestamp: u64,
    /// droplets paid by the genesis output
    pub coin_volume: u64,
}

/// Distribution table and unlock policy
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionParams {
    pub addresses: Vec<Address>,
    pub initial_unlocked: u64,
    pub unlock_rate: u64,
    pub unlock_interval_secs: u64,
    pub unlock_start: Option<u64>,
    /// droplets held by each distribution address
    pub coins_per_address: u64,
}

/// Validated ledger configuration
#[derive(Debug, Clone)]
pub struct VisorConfig {
    pub mode: NodeMode,
    pub blockchain_pubkey: PublicKey,
    pub blockchain_seckey: Option<SecretKey>,
    pub genesis: GenesisParams,
    pub distribution: DistributionParams,
    /// droplets
    pub max_supply: u64,
    pub max_block_transactions: usize,
    pub max_unconfirmed: usize,
}

/// Immutable node configuration, built once at startup and shared by
/// reference with every component
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub log_level: String,
    pub daemon: DaemonConfig,
    pub pex: PexConfig,
    pub peers_file: PathBuf,
    pub visor: VisorConfig,
    pub gateway: GatewayConfig,
}

fn config_err(msg: impl Into<String>) -> BlockchainError {
    BlockchainError::Config(msg.into())
}

impl NodeConfig {
    /// Reads a TOML file; missing keys fall back to defaults
    pub fn from_file(path: &Path) -> Result<NodeConfig> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| config_err(format!("cannot read {}: {e}", path.display())))?;
        NodeConfig::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<NodeConfig> {
        toml::from_str(text).map_err(|e| config_err(format!("invalid config file: {e}")))
    }

    fn load_seckey(&self) -> Result<Option<SecretKey>> {
        if let Some(hex) = &self.visor.blockchain_seckey {
            let key = SecretKey::from_hex(hex)
                .map_err(|e| config_err(format!("blockchain_seckey: {e}")))?;
            return Ok(Some(key));
        }
        if let Some(path) = &self.visor.blockchain_seckey_file {
            let password = env::var(KEY_PASSWORD_ENV).map_err(|_| {
                config_err(format!(
                    "{KEY_PASSWORD_ENV} must be set to unlock {}",
                    path.display()
                ))
            })?;
            return read_encrypted_key(path, &password).map(Some);
        }
        Ok(None)
    }

    fn distribution(&self, max_supply_coins: u64) -> Result<DistributionParams> {
        let section = &self.distribution;
        let addresses = match &section.addresses {
            Some(list) => list
                .iter()
                .map(|s| {
                    Address::decode(s)
                        .map_err(|e| config_err(format!("distribution address {s}: {e}")))
                })
                .collect::<Result<Vec<_>>>()?,
            None => DISTRIBUTION_ADDRESSES
                .iter()
                .map(|s| {
                    Address::decode(s)
                        .map_err(|e| config_err(format!("distribution address {s}: {e}")))
                })
                .collect::<Result<Vec<_>>>()?,
        };

        let count = addresses.len() as u64;
        if count == 0 {
            return Err(config_err("distribution address list is empty"));
        }
        if max_supply_coins % count != 0 {
            return Err(config_err(format!(
                "max coin supply {max_supply_coins} is not divisible by {count} distribution addresses"
            )));
        }
        if section.initial_unlocked > count {
            return Err(config_err(format!(
                "initial_unlocked {} exceeds {count} distribution addresses",
                section.initial_unlocked
            )));
        }
        if section.unlock_interval_secs == 0 {
            return Err(config_err("unlock_interval_secs must be positive"));
        }
        let coins_per_address = (max_supply_coins / count)
            .checked_mul(DROPLETS_PER_COIN)
            .ok_or_else(|| config_err("distribution amount overflows"))?;

        Ok(DistributionParams {
            addresses,
            initial_unlocked: section.initial_unlocked,
            unlock_rate: section.unlock_rate,
            unlock_interval_secs: section.unlock_interval_secs,
            unlock_start: section.unlock_start,
            coins_per_address,
        })
    }

    /// Checks every setting and produces the runtime configuration.
    /// Any inconsistency is a configuration error, never a panic.
    pub fn validate(self) -> Result<Config> {
        let v = &self.visor;
        let blockchain_pubkey = PublicKey::from_hex(&v.blockchain_pubkey)
            .map_err(|e| config_err(format!("blockchain_pubkey: {e}")))?;
        let genesis_address = Address::decode(&v.genesis_address)
            .map_err(|e| config_err(format!("genesis_address: {e}")))?;
        let genesis_signature = v
            .genesis_signature
            .as_deref()
            .map(Sig::from_hex)
            .transpose()
            .map_err(|e| config_err(format!("genesis_signature: {e}")))?;

        let blockchain_seckey = self.load_seckey()?;
        if let Some(seckey) = &blockchain_seckey {
            if pubkey_from_seckey(seckey)? != blockchain_pubkey {
                return Err(config_err(
                    "blockchain secret key does not match blockchain_pubkey",
                ));
            }
        }
        if v.mode.can_sign() && blockchain_seckey.is_none() {
            return Err(config_err(format!(
                "{:?} mode requires a blockchain secret key",
                v.mode
            )));
        }

        let max_supply = v
            .max_coin_supply
            .checked_mul(DROPLETS_PER_COIN)
            .ok_or_else(|| config_err("max_coin_supply overflows"))?;
        let distribution = self.distribution(v.max_coin_supply)?;

        if self.gateway.workers == 0 || self.gateway.queue_size == 0 {
            return Err(config_err("gateway workers and queue_size must be positive"));
        }
        if self.daemon.inbound_queue == 0 || self.daemon.outbound_queue == 0 {
            return Err(config_err("daemon queue sizes must be positive"));
        }
        if self.pex.max_peers == 0 {
            return Err(config_err("pex max_peers must be positive"));
        }

        let visor = VisorConfig {
            mode: v.mode,
            blockchain_pubkey,
            blockchain_seckey,
            genesis: GenesisParams {
                address: genesis_address,
                signature: genesis_signature,
                timestamp: v.genesis_timestamp,
                coin_volume: max_supply,
            },
            distribution,
            max_supply,
            max_block_transactions: v.max_block_transactions.max(1),
            max_unconfirmed: v.max_unconfirmed,
        };

        let peers_file = self
            .pex
            .peers_file
            .clone()
            .unwrap_or_else(|| self.node.data_dir.join("peers.json"));

        Ok(Config {
            db_path: self.node.db_path(),
            data_dir: self.node.data_dir,
            log_level: self.node.log_level,
            daemon: self.daemon,
            pex: self.pex,
            peers_file,
            visor,
            gateway: self.gateway,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::generate_key_pair;

    #[test]
    fn test_defaults_validate() {
        let config = NodeConfig::default().validate().unwrap();
        assert_eq!(config.daemon.port, 8848);
        assert_eq!(config.daemon.default_connections.len(), 5);
        assert_eq!(config.visor.mode, NodeMode::Follower);
        assert_eq!(config.visor.distribution.addresses.len(), 280);
        assert_eq!(
            config.visor.distribution.coins_per_address,
            10_000_000 * DROPLETS_PER_COIN
        );
        assert_eq!(config.visor.max_supply, 2_800_000_000 * DROPLETS_PER_COIN);
        assert_eq!(config.gateway.workers, 5);
        assert!(config.db_path.ends_with("data.db"));
    }

    #[test]
    fn test_toml_overrides() {
        let text = r#"
            [daemon]
            port = 9000
            localhost_only = true

            [pex]
            disabled = true

            [distribution]
            initial_unlocked = 30
        "#;
        let config = NodeConfig::from_toml(text).unwrap().validate().unwrap();
        assert_eq!(config.daemon.port, 9000);
        assert_eq!(config.daemon.listen_addr(), "127.0.0.1:9000");
        assert!(config.pex.disabled);
        assert_eq!(config.visor.distribution.initial_unlocked, 30);
        // untouched sections keep defaults
        assert_eq!(config.gateway.queue_size, 1000);
    }

    #[test]
    fn test_indivisible_supply_is_config_error() {
        let mut raw = NodeConfig::default();
        raw.visor.max_coin_supply = 2_800_000_001;
        assert!(matches!(raw.validate(), Err(BlockchainError::Config(_))));
    }

    #[test]
    fn test_master_requires_matching_key() {
        let mut raw = NodeConfig::default();
        raw.visor.mode = NodeMode::Master;
        assert!(matches!(raw.clone().validate(), Err(BlockchainError::Config(_))));

        let (sk, pk) = generate_key_pair();
        raw.visor.blockchain_seckey = Some(sk.to_hex());
        assert!(raw.clone().validate().is_err(), "key does not match pubkey");

        raw.visor.blockchain_pubkey = pk.to_hex();
        let config = raw.validate().unwrap();
        assert!(config.visor.blockchain_seckey.is_some());
    }

    #[test]
    fn test_bad_values_rejected() {
        let mut raw = NodeConfig::default();
        raw.visor.genesis_address = "not-an-address".to_string();
        assert!(raw.validate().is_err());

        let mut raw = NodeConfig::default();
        raw.distribution.initial_unlocked = 281;
        assert!(raw.validate().is_err());

        let mut raw = NodeConfig::default();
        raw.gateway.workers = 0;
        assert!(raw.validate().is_err());

        assert!(NodeConfig::from_toml("[daemon]\nport = \"x\"").is_err());
    }
}
