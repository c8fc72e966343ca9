use log::warn;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};

/// Misbehavior counters and temporary bans, keyed by a peer's IP address.
///
/// The port is ignored: an inbound peer picks its own source port and
/// claims its listening port, so neither identifies it.
///
/// Counters track consecutive offences: any accepted block or transaction
/// from the peer resets it.
pub struct PeerBook {
    strikes: Mutex<HashMap<IpAddr, u32>>,
    banned: Mutex<HashMap<IpAddr, Instant>>,
    threshold: u32,
    cooldown: Duration,
}

impl PeerBook {
    pub fn new(threshold: u32, cooldown: Duration) -> PeerBook {
        PeerBook {
            strikes: Mutex::new(HashMap::new()),
            banned: Mutex::new(HashMap::new()),
            threshold: threshold.max(1),
            cooldown,
        }
    }

    pub fn record_success(&self, addr: SocketAddr) {
        self.strikes.lock().remove(&addr.ip());
    }

    /// Counts one offence. Returns true when this pushed the peer over the
    /// threshold, in which case it is now banned.
    pub fn record_misbehavior(&self, addr: SocketAddr) -> bool {
        let ip = addr.ip();
        let count = {
            let mut strikes = self.strikes.lock();
            let entry = strikes.entry(ip).or_insert(0);
            *entry = entry.saturating_add(1);
            *entry
        };
        if count >= self.threshold {
            self.strikes.lock().remove(&ip);
            self.ban(ip);
            warn!("Banned {ip} for {:?} after {count} offences", self.cooldown);
            return true;
        }
        false
    }

    pub fn strikes(&self, addr: SocketAddr) -> u32 {
        self.strikes.lock().get(&addr.ip()).copied().unwrap_or(0)
    }

    pub fn ban(&self, ip: IpAddr) {
        self.banned.lock().insert(ip, Instant::now() + self.cooldown);
    }

    pub fn is_banned(&self, addr: SocketAddr) -> bool {
        self.is_ip_banned(addr.ip())
    }

    pub fn is_ip_banned(&self, ip: IpAddr) -> bool {
        let mut banned = self.banned.lock();
        match banned.get(&ip) {
            Some(until) if *until > Instant::now() => true,
            Some(_) => {
                banned.remove(&ip);
                false
            }
            None => false,
        }
    }

    pub fn banned_count(&self) -> usize {
        let now = Instant::now();
        let mut banned = self.banned.lock();
        banned.retain(|_, until| *until > now);
        banned.len()
    }
}
