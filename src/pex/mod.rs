//! Peer exchange
//!
//! A bounded book of known peer addresses with last-seen and retry
//! metadata. It is fed by configured seed nodes, by `GivePeers` messages
//! and by an optional downloaded bootstrap list, and is persisted as JSON
//! between runs.

pub mod bootstrap;

pub use bootstrap::{download_peer_list, parse_peer_list};

use crate::config::PexConfig;
use crate::error::{BlockchainError, Result};
use log::{debug, info, warn};
use rand::seq::IteratorRandom;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerRecord {
    pub addr: SocketAddr,
    /// unix seconds
    pub last_seen: u64,
    /// configured seed nodes, never evicted
    pub trusted: bool,
    pub retry_times: u32,
}

pub struct Pex {
    peers: HashMap<SocketAddr, PeerRecord>,
    max_peers: usize,
    max_retries: u32,
    localhost_only: bool,
    own_addrs: HashSet<SocketAddr>,
    path: PathBuf,
}

impl Pex {
    pub fn new(config: &PexConfig, path: PathBuf, localhost_only: bool) -> Pex {
        Pex {
            peers: HashMap::new(),
            max_peers: config.max_peers.max(1),
            max_retries: config.max_retries,
            localhost_only,
            own_addrs: HashSet::new(),
            path,
        }
    }

    /// Addresses this node listens on; they are never stored
    pub fn set_own_addrs(&mut self, addrs: impl IntoIterator<Item = SocketAddr>) {
        self.own_addrs = addrs.into_iter().collect();
        let own = self.own_addrs.clone();
        self.peers.retain(|addr, _| !own.contains(addr));
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn contains(&self, addr: &SocketAddr) -> bool {
        self.peers.contains_key(addr)
    }

    pub fn get(&self, addr: &SocketAddr) -> Option<&PeerRecord> {
        self.peers.get(addr)
    }

    fn acceptable(&self, addr: &SocketAddr) -> bool {
        let ip = addr.ip();
        if ip.is_unspecified() || ip.is_multicast() || addr.port() == 0 {
            return false;
        }
        if self.own_addrs.contains(addr) {
            return false;
        }
        // loopback peers only make sense on a local test network
        ip.is_loopback() == self.localhost_only
    }

    /// Adds or refreshes an untrusted peer. Returns true if it was new.
    pub fn add_peer(&mut self, addr: SocketAddr, now: u64) -> bool {
        if !self.acceptable(&addr) {
            debug!("Ignoring unusable peer address {addr}");
            return false;
        }
        if let Some(record) = self.peers.get_mut(&addr) {
            record.last_seen = record.last_seen.max(now);
            return false;
        }
        if self.peers.len() >= self.max_peers && !self.evict_one() {
            return false;
        }
        self.peers.insert(
            addr,
            PeerRecord {
                addr,
                last_seen: now,
                trusted: false,
                retry_times: 0,
            },
        );
        true
    }

    pub fn add_peers(&mut self, addrs: impl IntoIterator<Item = SocketAddr>, now: u64) -> usize {
        addrs
            .into_iter()
            .filter(|addr| self.add_peer(*addr, now))
            .count()
    }

    /// Seed nodes are kept regardless of capacity or failures
    pub fn add_trusted(&mut self, addr: SocketAddr, now: u64) {
        if self.own_addrs.contains(&addr) {
            return;
        }
        let record = self.peers.entry(addr).or_insert(PeerRecord {
            addr,
            last_seen: now,
            trusted: true,
            retry_times: 0,
        });
        record.trusted = true;
    }

    pub fn remove(&mut self, addr: &SocketAddr) -> Option<PeerRecord> {
        self.peers.remove(addr)
    }

    // Drops the least recently seen untrusted entry
    fn evict_one(&mut self) -> bool {
        let victim = self
            .peers
            .values()
            .filter(|r| !r.trusted)
            .min_by_key(|r| r.last_seen)
            .map(|r| r.addr);
        match victim {
            Some(addr) => {
                self.peers.remove(&addr);
                true
            }
            None => false,
        }
    }

    /// A successful connection clears the retry count
    pub fn mark_seen(&mut self, addr: &SocketAddr, now: u64) {
        if let Some(record) = self.peers.get_mut(addr) {
            record.last_seen = now;
            record.retry_times = 0;
        }
    }

    /// Records a failed dial; untrusted peers are forgotten once they
    /// exceed the retry limit
    pub fn increment_retry(&mut self, addr: &SocketAddr) {
        let Some(record) = self.peers.get_mut(addr) else {
            return;
        };
        record.retry_times = record.retry_times.saturating_add(1);
        if !record.trusted && record.retry_times > self.max_retries {
            debug!("Forgetting peer {addr} after {} failed dials", record.retry_times);
            self.peers.remove(addr);
        }
    }

    /// Up to `n` random peers, excluding `exclude`
    pub fn random_peers(&self, n: usize, exclude: &HashSet<SocketAddr>) -> Vec<SocketAddr> {
        let mut rng = rand::thread_rng();
        self.peers
            .keys()
            .filter(|addr| !exclude.contains(*addr))
            .copied()
            .choose_multiple(&mut rng, n)
    }

    pub fn all(&self) -> Vec<PeerRecord> {
        self.peers.values().cloned().collect()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads peers saved by a previous run. A missing file is not an error.
    pub fn load(&mut self, now: u64) -> Result<usize> {
        if !self.path.exists() {
            return Ok(0);
        }
        let text = fs::read_to_string(&self.path)?;
        let records: Vec<PeerRecord> = serde_json::from_str(&text).map_err(|e| {
            BlockchainError::MalformedData(format!("{}: {e}", self.path.display()))
        })?;
        let mut loaded = 0;
        for record in records {
            if record.trusted {
                self.add_trusted(record.addr, record.last_seen);
                loaded += 1;
            } else if self.add_peer(record.addr, record.last_seen.min(now)) {
                if let Some(stored) = self.peers.get_mut(&record.addr) {
                    stored.retry_times = record.retry_times;
                }
                loaded += 1;
            }
        }
        info!("Loaded {loaded} peers from {}", self.path.display());
        Ok(loaded)
    }

    pub fn save(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let mut records = self.all();
        records.sort_by_key(|r| r.addr);
        let json = serde_json::to_string_pretty(&records)
            .map_err(|e| BlockchainError::Io(format!("failed to encode peers: {e}")))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            warn!("Could not replace {}: {e}", self.path.display());
            BlockchainError::from(e)
        })
    }
}
