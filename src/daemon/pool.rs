use crate::daemon::messages::{DisconnectReason, Message};
use log::{debug, warn};
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Inbound,
    Outbound,
}

/// Shared view of one live connection. The connection task owns the
/// socket; everyone else talks to it through this handle.
pub struct ConnectionHandle {
    pub id: u64,
    /// address the peer listens on
    pub addr: SocketAddr,
    pub direction: Direction,
    pub version: u32,
    outbound: mpsc::Sender<Message>,
    close: Notify,
    close_reason: Mutex<Option<DisconnectReason>>,
    /// last head seq the peer announced
    head_seq: Mutex<Option<u64>>,
}

impl ConnectionHandle {
    /// Queues `msg` without waiting. A full queue closes the connection.
    pub fn send(&self, msg: Message) -> bool {
        match self.outbound.try_send(msg) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("Outbound queue to {} is full, disconnecting", self.addr);
                self.close(DisconnectReason::QueueFull);
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }

    /// Asks the connection task to shut down
    pub fn close(&self, reason: DisconnectReason) {
        let mut slot = self.close_reason.lock();
        if slot.is_none() {
            *slot = Some(reason);
        }
        self.close.notify_one();
    }

    pub async fn closed(&self) -> DisconnectReason {
        self.close.notified().await;
        let reason = *self.close_reason.lock();
        reason.unwrap_or(DisconnectReason::Shutdown)
    }

    pub fn head_seq(&self) -> Option<u64> {
        *self.head_seq.lock()
    }

    pub fn set_head_seq(&self, seq: u64) {
        let mut head = self.head_seq.lock();
        *head = Some(head.map_or(seq, |h| h.max(seq)));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterError {
    Duplicate,
    Full,
}

/// Registry of handshaken connections
pub struct ConnectionPool {
    conns: RwLock<HashMap<u64, Arc<ConnectionHandle>>>,
    next_id: AtomicU64,
    max_connections: usize,
}

impl ConnectionPool {
    pub fn new(max_connections: usize) -> ConnectionPool {
        ConnectionPool {
            conns: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            max_connections,
        }
    }

    pub fn register(
        &self,
        addr: SocketAddr,
        direction: Direction,
        version: u32,
        outbound: mpsc::Sender<Message>,
    ) -> Result<Arc<ConnectionHandle>, RegisterError> {
        let mut conns = self.conns.write();
        if conns.values().any(|c| c.addr == addr) {
            return Err(RegisterError::Duplicate);
        }
        if conns.len() >= self.max_connections {
            return Err(RegisterError::Full);
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let handle = Arc::new(ConnectionHandle {
            id,
            addr,
            direction,
            version,
            outbound,
            close: Notify::new(),
            close_reason: Mutex::new(None),
            head_seq: Mutex::new(None),
        });
        conns.insert(id, Arc::clone(&handle));
        debug!("Registered {direction:?} connection {id} to {addr}");
        Ok(handle)
    }

    pub fn remove(&self, id: u64) -> Option<Arc<ConnectionHandle>> {
        self.conns.write().remove(&id)
    }

    pub fn get(&self, id: u64) -> Option<Arc<ConnectionHandle>> {
        self.conns.read().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.conns.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.conns.read().is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.len() >= self.max_connections
    }

    pub fn outbound_count(&self) -> usize {
        self.conns
            .read()
            .values()
            .filter(|c| c.direction == Direction::Outbound)
            .count()
    }

    pub fn is_connected(&self, addr: &SocketAddr) -> bool {
        self.conns.read().values().any(|c| &c.addr == addr)
    }

    pub fn addresses(&self) -> HashSet<SocketAddr> {
        self.conns.read().values().map(|c| c.addr).collect()
    }

    pub fn all(&self) -> Vec<Arc<ConnectionHandle>> {
        self.conns.read().values().cloned().collect()
    }

    /// Queues `msg` on every connection except `except`
    pub fn broadcast(&self, msg: &Message, except: Option<u64>) -> usize {
        self.all()
            .into_iter()
            .filter(|c| Some(c.id) != except)
            .filter(|c| c.send(msg.clone()))
            .count()
    }

    /// Connection with the highest announced head at or above `min_seq`,
    /// skipping `exclude`
    pub fn best_peer(&self, min_seq: u64, exclude: &HashSet<u64>) -> Option<Arc<ConnectionHandle>> {
        self.all()
            .into_iter()
            .filter(|c| !exclude.contains(&c.id))
            .filter_map(|c| c.head_seq().filter(|h| *h >= min_seq).map(|h| (h, c)))
            .max_by(|(a, ca), (b, cb)| a.cmp(b).then_with(|| cb.id.cmp(&ca.id)))
            .map(|(_, c)| c)
    }

    pub fn close_all(&self, reason: DisconnectReason) {
        for conn in self.all() {
            conn.close(reason);
        }
    }
}
