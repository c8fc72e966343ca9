//! Peer-to-peer daemon
//!
//! Accepts and dials TCP connections, keeps the local chain in sync with
//! the best peer, relays transactions and exchanges peer addresses. Each
//! connection runs in its own task; the daemon loop drives the periodic
//! work (pings, announcements, dialing, request expiry, block creation on
//! master nodes).

pub mod connection;
mod handler;
pub mod messages;
pub mod peer_book;
pub mod pool;
pub mod sync;

pub use connection::handshake;
pub use messages::{DisconnectReason, Introduction, Message, PeerAddr, PROTOCOL_VERSION};
pub use peer_book::PeerBook;
pub use pool::{ConnectionHandle, ConnectionPool, Direction};
pub use sync::SyncState;

use crate::cipher::Sha256;
use crate::config::{Config, NodeMode};
use crate::error::Result;
use crate::pex::{download_peer_list, Pex};
use crate::utils::current_timestamp;
use crate::visor::Visor;
use log::{debug, error, info, warn};
use messages::MIN_PROTOCOL_VERSION;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use sync::RequestExpiry;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::time::{interval, timeout, MissedTickBehavior};

const MAINTENANCE_INTERVAL: Duration = Duration::from_secs(1);
const SHUTDOWN_GRACE: Duration = Duration::from_secs(3);

/// State shared by the daemon loop and every connection task
pub(crate) struct Shared {
    pub(crate) config: Arc<Config>,
    pub(crate) visor: Arc<Visor>,
    pub(crate) pool: ConnectionPool,
    pub(crate) book: PeerBook,
    pub(crate) sync: Mutex<SyncState>,
    pub(crate) pex: Mutex<Pex>,
    /// outbound dials in progress or connected
    dialing: Mutex<HashSet<SocketAddr>>,
    mirror: u32,
    port: u16,
    pub(crate) shutdown: watch::Receiver<bool>,
}

fn unix_now() -> u64 {
    current_timestamp().unwrap_or_default()
}

impl Shared {
    fn new(
        config: Arc<Config>,
        visor: Arc<Visor>,
        pex: Pex,
        port: u16,
        shutdown: watch::Receiver<bool>,
    ) -> Shared {
        let cfg = &config.daemon;
        Shared {
            pool: ConnectionPool::new(cfg.max_connections),
            book: PeerBook::new(cfg.misbehavior_threshold, cfg.ban_cooldown()),
            sync: Mutex::new(SyncState::new(
                cfg.request_timeout(),
                cfg.block_buffer_timeout(),
                cfg.request_retries,
            )),
            pex: Mutex::new(pex),
            dialing: Mutex::new(HashSet::new()),
            mirror: rand::random(),
            port,
            shutdown,
            config,
            visor,
        }
    }

    pub(crate) fn introduction(&self) -> Introduction {
        Introduction {
            version: PROTOCOL_VERSION,
            mirror: self.mirror,
            port: self.port,
            genesis_hash: self.visor.genesis_hash(),
        }
    }

    /// Reason to refuse a peer after its introduction, if any
    pub(crate) fn check_introduction(
        &self,
        theirs: &Introduction,
        listen_addr: SocketAddr,
    ) -> Option<DisconnectReason> {
        if theirs.mirror == self.mirror {
            Some(DisconnectReason::SelfConnection)
        } else if theirs.version < MIN_PROTOCOL_VERSION {
            Some(DisconnectReason::VersionMismatch)
        } else if theirs.genesis_hash != self.visor.genesis_hash() {
            Some(DisconnectReason::GenesisMismatch)
        } else if self.book.is_banned(listen_addr) {
            Some(DisconnectReason::Banned)
        } else {
            None
        }
    }

    /// Greets a newly registered connection with our head, our pending
    /// transactions and a peer request
    pub(crate) fn peer_connected(&self, conn: &Arc<ConnectionHandle>) {
        if !self.config.pex.disabled {
            let now = unix_now();
            let mut pex = self.pex.lock();
            match conn.direction {
                Direction::Outbound => pex.mark_seen(&conn.addr, now),
                Direction::Inbound => {
                    pex.add_peer(conn.addr, now);
                }
            }
        }
        if let Some(head) = self.visor.head_seq() {
            conn.send(Message::AnnounceBlocks { max_seq: head });
        }
        if !self.config.pex.disabled {
            conn.send(Message::GetPeers);
        }
        let pending = self.visor.get_unconfirmed_hashes();
        self.announce_txns_to(conn, &pending);
    }

    /// Counts an offence against `conn`. Errs once the peer is banned.
    pub(crate) fn punish(&self, conn: &ConnectionHandle) -> std::result::Result<(), DisconnectReason> {
        self.punish_addr(conn.addr)
    }

    /// Counts an offence against whoever sent from `addr`, which may no
    /// longer be the connection at hand. A ban closes every connection
    /// from that IP.
    pub(crate) fn punish_addr(&self, addr: SocketAddr) -> std::result::Result<(), DisconnectReason> {
        if !self.book.record_misbehavior(addr) {
            return Ok(());
        }
        for conn in self.pool.all() {
            if conn.addr.ip() == addr.ip() {
                conn.close(DisconnectReason::Misbehaving);
            }
        }
        Err(DisconnectReason::Misbehaving)
    }

    /// Asks the best peer for the blocks after our head, unless a request
    /// is already in flight
    pub(crate) fn request_blocks(&self) {
        let from = self.visor.head_seq().map_or(0, |h| h + 1);
        let count = self.config.daemon.blocks_request_count.max(1);
        let peer = {
            let mut sync = self.sync.lock();
            if sync.has_request() {
                return;
            }
            let Some(peer) = self.pool.best_peer(from, &HashSet::new()) else {
                return;
            };
            sync.start_request(peer.id, from, count, Instant::now());
            peer
        };
        debug!("Requesting {count} blocks from {from} from {}", peer.addr);
        peer.send(Message::GetBlocks { from, count });
    }

    fn announce_txns_to(&self, conn: &ConnectionHandle, hashes: &[Sha256]) {
        let unseen: Vec<Sha256> = {
            let mut sync = self.sync.lock();
            let unseen: Vec<Sha256> = hashes
                .iter()
                .filter(|h| !sync.has_seen(conn.id, h))
                .take(self.config.daemon.max_txns_announce)
                .copied()
                .collect();
            sync.mark_seen(conn.id, &unseen);
            unseen
        };
        if !unseen.is_empty() {
            conn.send(Message::AnnounceTxns(unseen));
        }
    }

    /// Announces `hashes` to every connection that has not seen them
    pub(crate) fn announce_txns(&self, hashes: &[Sha256]) {
        for conn in self.pool.all() {
            self.announce_txns_to(&conn, hashes);
        }
    }

    fn announce(&self) {
        if let Some(head) = self.visor.head_seq() {
            self.pool
                .broadcast(&Message::AnnounceBlocks { max_seq: head }, None);
        }
        let pending = self.visor.get_unconfirmed_hashes();
        if !pending.is_empty() {
            self.announce_txns(&pending);
        }
    }

    /// Expires stale requests and buffered blocks, retrying a timed out
    /// block request on another peer
    fn maintain(&self) {
        let now = Instant::now();
        let expiry = {
            let mut sync = self.sync.lock();
            let dropped = sync.expire_buffer(now);
            if dropped > 0 {
                debug!("Dropped {dropped} stale buffered blocks");
            }
            sync.expire_txn_requests(now);
            sync.expire_request(now)
        };
        match expiry {
            Some(RequestExpiry::Retry {
                from,
                count,
                tried,
                attempts,
            }) => match self.pool.best_peer(from, &tried) {
                Some(peer) => {
                    debug!("Retrying blocks from {from} with {}", peer.addr);
                    self.sync
                        .lock()
                        .start_retry(peer.id, from, count, tried, attempts, now);
                    peer.send(Message::GetBlocks { from, count });
                }
                None => debug!("No other peer has blocks from {from}"),
            },
            Some(RequestExpiry::Abandon { from }) => {
                warn!("Block request from {from} failed on every retry")
            }
            None => {}
        }
        self.request_blocks();
    }

    fn dial_peers(self: &Arc<Self>) {
        let cfg = &self.config.daemon;
        if cfg.disable_outgoing {
            return;
        }
        let targets = if let Some(addr) = cfg.connect_to {
            vec![addr]
        } else {
            let outbound = self.pool.outbound_count();
            if outbound >= cfg.outgoing_max || self.pool.is_full() {
                return;
            }
            let mut exclude = self.pool.addresses();
            exclude.extend(self.dialing.lock().iter().copied());
            self.pex
                .lock()
                .random_peers(cfg.outgoing_max - outbound, &exclude)
        };
        for addr in targets {
            if self.pool.is_connected(&addr) || self.book.is_banned(addr) {
                continue;
            }
            self.connect(addr);
        }
    }

    /// Dials `addr` in the background
    pub(crate) fn connect(self: &Arc<Self>, addr: SocketAddr) {
        if !self.dialing.lock().insert(addr) {
            return;
        }
        let shared = Arc::clone(self);
        tokio::spawn(async move {
            let dial_timeout = shared.config.daemon.handshake_timeout();
            match timeout(dial_timeout, TcpStream::connect(addr)).await {
                Ok(Ok(stream)) => {
                    debug!("Dialed {addr}");
                    connection::run(Arc::clone(&shared), stream, addr, Direction::Outbound)
                        .await;
                }
                Ok(Err(e)) => {
                    debug!("Failed to connect to {addr}: {e}");
                    shared.pex.lock().increment_retry(&addr);
                }
                Err(_) => {
                    debug!("Timed out connecting to {addr}");
                    shared.pex.lock().increment_retry(&addr);
                }
            }
            shared.dialing.lock().remove(&addr);
        });
    }

    fn refresh_pex(self: &Arc<Self>) {
        if self.config.pex.disabled {
            return;
        }
        if let Err(e) = self.pex.lock().save() {
            warn!("Failed to save peers: {e}");
        }
        self.pool.broadcast(&Message::GetPeers, None);

        if self.config.pex.download_peerlist {
            let shared = Arc::clone(self);
            tokio::spawn(async move {
                match download_peer_list(&shared.config.pex.peerlist_url).await {
                    Ok(peers) => {
                        let added = shared.pex.lock().add_peers(peers, unix_now());
                        debug!("Added {added} downloaded peers");
                    }
                    Err(e) => warn!("{e}"),
                }
            });
        }
    }

    fn create_block(&self) {
        match self.visor.create_and_execute_block(unix_now()) {
            Ok(Some(block)) => {
                let seq = block.seq();
                info!(
                    "Created block {seq} with {} transactions",
                    block.block.body.transactions.len()
                );
                self.sync.lock().head_advanced(seq);
                self.pool
                    .broadcast(&Message::AnnounceBlocks { max_seq: seq }, None);
            }
            Ok(None) => {}
            Err(e) => error!("Failed to create block: {e}"),
        }
    }
}

/// Cloneable view of a running daemon
#[derive(Clone)]
pub struct DaemonHandle {
    shared: Arc<Shared>,
    local_addr: Option<SocketAddr>,
}

impl DaemonHandle {
    /// Address the daemon accepts connections on, if it listens
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    pub fn connection_count(&self) -> usize {
        self.shared.pool.len()
    }

    pub fn connected_peers(&self) -> HashSet<SocketAddr> {
        self.shared.pool.addresses()
    }

    pub fn is_banned(&self, addr: SocketAddr) -> bool {
        self.shared.book.is_banned(addr)
    }

    pub fn known_peers(&self) -> Vec<SocketAddr> {
        self.shared.pex.lock().all().into_iter().map(|r| r.addr).collect()
    }

    /// Dials `addr` outside the regular dial schedule
    pub fn connect(&self, addr: SocketAddr) {
        self.shared.connect(addr);
    }
}

pub struct Daemon {
    shared: Arc<Shared>,
    listener: Option<TcpListener>,
}

impl Daemon {
    /// Binds the listener and loads the peer book. Nothing runs until
    /// [`Daemon::run`].
    pub async fn new(
        config: Arc<Config>,
        visor: Arc<Visor>,
        shutdown: watch::Receiver<bool>,
    ) -> Result<Daemon> {
        let cfg = &config.daemon;
        let listener = if cfg.disable_networking || cfg.disable_incoming {
            None
        } else {
            let addr = cfg.listen_addr();
            let listener = TcpListener::bind(&addr).await?;
            info!("Daemon listening on {}", listener.local_addr()?);
            Some(listener)
        };
        let local_addr = match &listener {
            Some(l) => Some(l.local_addr()?),
            None => None,
        };
        let port = local_addr.map_or(cfg.port, |a| a.port());

        let now = unix_now();
        let mut pex = Pex::new(&config.pex, config.peers_file.clone(), cfg.localhost_only);
        if let Some(addr) = local_addr {
            pex.set_own_addrs([addr, SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port)]);
        }
        if !config.pex.disabled {
            match pex.load(now) {
                Ok(n) => info!("Loaded {n} peers from {}", pex.path().display()),
                Err(e) => warn!("Ignoring saved peers: {e}"),
            }
        }
        for addr in &cfg.default_connections {
            pex.add_trusted(*addr, now);
        }

        let shared = Arc::new(Shared::new(config, visor, pex, port, shutdown));
        Ok(Daemon { shared, listener })
    }

    pub fn handle(&self) -> DaemonHandle {
        DaemonHandle {
            shared: Arc::clone(&self.shared),
            local_addr: self.listener.as_ref().and_then(|l| l.local_addr().ok()),
        }
    }

    /// Runs until the shutdown signal flips to true
    pub async fn run(self) -> Result<()> {
        let shared = self.shared;
        let cfg = &shared.config.daemon;
        let mut shutdown = shared.shutdown.clone();

        if cfg.disable_networking {
            info!("Networking disabled");
            while !*shutdown.borrow() {
                if shutdown.changed().await.is_err() {
                    break;
                }
            }
            return shared.visor.flush();
        }

        let secs = |s: u64| Duration::from_secs(s.max(1));
        let mut maintenance = interval(MAINTENANCE_INTERVAL);
        let mut ping = interval(secs(cfg.ping_interval_secs));
        let mut announce = interval(secs(cfg.announce_interval_secs));
        let mut dial = interval(Duration::from_millis(cfg.outgoing_rate_ms.max(1)));
        let mut refresh = interval(secs(shared.config.pex.refresh_interval_secs));
        let mut create = interval(secs(cfg.block_creation_interval_secs));
        for timer in [
            &mut maintenance,
            &mut ping,
            &mut announce,
            &mut dial,
            &mut refresh,
            &mut create,
        ] {
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        }
        let is_master = shared.visor.mode() == NodeMode::Master;

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                accepted = accept(&self.listener) => match accepted {
                    Ok((stream, remote)) => accept_inbound(&shared, stream, remote),
                    Err(e) => error!("Error accepting connection: {e}"),
                },
                _ = maintenance.tick() => shared.maintain(),
                _ = ping.tick() => {
                    shared.pool.broadcast(&Message::Ping, None);
                }
                _ = announce.tick() => shared.announce(),
                _ = dial.tick() => shared.dial_peers(),
                _ = refresh.tick() => shared.refresh_pex(),
                _ = create.tick(), if is_master => shared.create_block(),
            }
        }

        info!("Daemon shutting down");
        drop(self.listener);
        shared.pool.close_all(DisconnectReason::Shutdown);
        let deadline = Instant::now() + SHUTDOWN_GRACE;
        while !shared.pool.is_empty() && Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        if !shared.config.pex.disabled {
            if let Err(e) = shared.pex.lock().save() {
                warn!("Failed to save peers: {e}");
            }
        }
        shared.visor.flush()
    }
}

async fn accept(listener: &Option<TcpListener>) -> std::io::Result<(TcpStream, SocketAddr)> {
    match listener {
        Some(listener) => listener.accept().await,
        None => std::future::pending().await,
    }
}

fn accept_inbound(shared: &Arc<Shared>, stream: TcpStream, remote: SocketAddr) {
    if shared.config.daemon.localhost_only && !remote.ip().is_loopback() {
        warn!("Rejecting non-local connection from {remote}");
        return;
    }
    if shared.book.is_ip_banned(remote.ip()) {
        debug!("Refusing banned peer {remote}");
        tokio::spawn(connection::refuse_banned(stream));
        return;
    }
    if shared.pool.is_full() {
        warn!("Rejecting connection from {remote}: connection limit reached");
        return;
    }
    tokio::spawn(connection::run(
        Arc::clone(shared),
        stream,
        remote,
        Direction::Inbound,
    ));
}
