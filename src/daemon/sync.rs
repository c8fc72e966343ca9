//! Bookkeeping for pulling blocks and transactions from peers.
//!
//! Only one block range is in flight at a time so blocks arrive roughly in
//! order; anything that arrives ahead of the head waits in a buffer until
//! the gap closes or it expires. Transaction requests are deduplicated
//! across connections so two peers announcing the same hash cause a
//! single fetch.

use crate::cipher::Sha256;
use crate::core::SignedBlock;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// Most blocks held ahead of the head
pub const MAX_BUFFERED_BLOCKS: usize = 1024;
/// Most announced hashes remembered per connection
const MAX_SEEN_PER_PEER: usize = 4096;

#[derive(Debug, Clone, PartialEq)]
pub struct BlockRequest {
    pub conn_id: u64,
    pub from: u64,
    pub count: u64,
    pub sent: Instant,
    pub attempts: u32,
    /// connections already tried for this range
    pub tried: HashSet<u64>,
}

/// What to do with an expired block request
#[derive(Debug, Clone, PartialEq)]
pub enum RequestExpiry {
    /// resend the range, to a different peer
    Retry { from: u64, count: u64, tried: HashSet<u64>, attempts: u32 },
    Abandon { from: u64 },
}

/// Result of offering a block to the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Buffered {
    Held,
    /// a block at that seq is already waiting; the first one stays
    AlreadyHeld,
    Full,
}

#[derive(Debug)]
struct PendingBlock {
    block: SignedBlock,
    sender: SocketAddr,
    received: Instant,
}

#[derive(Debug)]
pub struct SyncState {
    request: Option<BlockRequest>,
    buffer: BTreeMap<u64, PendingBlock>,
    txn_requests: HashMap<Sha256, Instant>,
    seen: HashMap<u64, HashSet<Sha256>>,
    timeout: Duration,
    buffer_timeout: Duration,
    retries: u32,
}

impl SyncState {
    pub fn new(timeout: Duration, buffer_timeout: Duration, retries: u32) -> SyncState {
        SyncState {
            request: None,
            buffer: BTreeMap::new(),
            txn_requests: HashMap::new(),
            seen: HashMap::new(),
            timeout,
            buffer_timeout,
            retries,
        }
    }

    pub fn request(&self) -> Option<&BlockRequest> {
        self.request.as_ref()
    }

    pub fn has_request(&self) -> bool {
        self.request.is_some()
    }

    pub fn start_request(&mut self, conn_id: u64, from: u64, count: u64, now: Instant) {
        self.start_retry(conn_id, from, count, HashSet::new(), 0, now);
    }

    pub fn start_retry(
        &mut self,
        conn_id: u64,
        from: u64,
        count: u64,
        mut tried: HashSet<u64>,
        attempts: u32,
        now: Instant,
    ) {
        tried.insert(conn_id);
        self.request = Some(BlockRequest {
            conn_id,
            from,
            count,
            sent: now,
            attempts,
            tried,
        });
    }

    /// Clears the request if `conn_id` answered it with blocks starting at
    /// `first_seq`
    pub fn complete_request(&mut self, conn_id: u64, first_seq: u64) -> bool {
        match &self.request {
            Some(req) if req.conn_id == conn_id && req.from == first_seq => {
                self.request = None;
                true
            }
            _ => false,
        }
    }

    /// Drops an outstanding request once the chain has moved past it
    pub fn head_advanced(&mut self, head: u64) {
        if let Some(req) = &self.request {
            if req.from + req.count <= head + 1 {
                self.request = None;
            }
        }
        self.buffer = self.buffer.split_off(&(head + 1));
    }

    /// Checks the outstanding request for a timeout
    pub fn expire_request(&mut self, now: Instant) -> Option<RequestExpiry> {
        let req = self.request.as_ref()?;
        if now.duration_since(req.sent) < self.timeout {
            return None;
        }
        let req = self.request.take()?;
        if req.attempts >= self.retries {
            return Some(RequestExpiry::Abandon { from: req.from });
        }
        Some(RequestExpiry::Retry {
            from: req.from,
            count: req.count,
            tried: req.tried,
            attempts: req.attempts + 1,
        })
    }

    /// A dropped connection fails its request immediately
    pub fn forget_connection(&mut self, conn_id: u64) {
        self.seen.remove(&conn_id);
        if let Some(req) = &mut self.request {
            if req.conn_id == conn_id {
                req.sent = req
                    .sent
                    .checked_sub(self.timeout)
                    .unwrap_or(req.sent);
            }
        }
    }

    /// Holds a block that is ahead of the head, remembering who sent it
    pub fn buffer_block(&mut self, block: SignedBlock, sender: SocketAddr, now: Instant) -> Buffered {
        let seq = block.seq();
        if self.buffer.contains_key(&seq) {
            return Buffered::AlreadyHeld;
        }
        if self.buffer.len() >= MAX_BUFFERED_BLOCKS {
            return Buffered::Full;
        }
        self.buffer.insert(
            seq,
            PendingBlock {
                block,
                sender,
                received: now,
            },
        );
        Buffered::Held
    }

    /// Removes and returns the buffered block at `seq` with its sender
    pub fn take_buffered(&mut self, seq: u64) -> Option<(SignedBlock, SocketAddr)> {
        self.buffer.remove(&seq).map(|p| (p.block, p.sender))
    }

    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Discards buffered blocks older than the buffer timeout
    pub fn expire_buffer(&mut self, now: Instant) -> usize {
        let before = self.buffer.len();
        let timeout = self.buffer_timeout;
        self.buffer
            .retain(|_, p| now.duration_since(p.received) < timeout);
        before - self.buffer.len()
    }

    /// Filters an announcement down to hashes this connection has not
    /// announced before and that no connection is already being asked for
    pub fn filter_announced(&mut self, conn_id: u64, hashes: &[Sha256]) -> Vec<Sha256> {
        let seen = self.seen.entry(conn_id).or_default();
        if seen.len() > MAX_SEEN_PER_PEER {
            seen.clear();
        }
        hashes
            .iter()
            .filter(|h| seen.insert(**h))
            .filter(|h| !self.txn_requests.contains_key(*h))
            .copied()
            .collect()
    }

    pub fn note_txn_requests(&mut self, hashes: &[Sha256], now: Instant) {
        for hash in hashes {
            self.txn_requests.insert(*hash, now);
        }
    }

    pub fn txn_received(&mut self, hash: &Sha256) {
        self.txn_requests.remove(hash);
    }

    /// Marks hashes as known for `conn_id`, e.g. ones it sent or we
    /// announced to it
    pub fn mark_seen(&mut self, conn_id: u64, hashes: &[Sha256]) {
        let seen = self.seen.entry(conn_id).or_default();
        seen.extend(hashes.iter().copied());
    }

    pub fn has_seen(&self, conn_id: u64, hash: &Sha256) -> bool {
        self.seen.get(&conn_id).is_some_and(|s| s.contains(hash))
    }

    pub fn expire_txn_requests(&mut self, now: Instant) -> usize {
        let before = self.txn_requests.len();
        let timeout = self.timeout;
        self.txn_requests
            .retain(|_, sent| now.duration_since(*sent) < timeout);
        before - self.txn_requests.len()
    }
}
