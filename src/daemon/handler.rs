//! Handlers for messages arriving on an established connection.
//!
//! Handlers never block on the network: replies go through the
//! connection's outbound queue. An `Err` closes the connection with the
//! given reason.

use crate::cipher::Sha256;
use crate::core::{SignedBlock, Transaction};
use crate::daemon::messages::{command_name, DisconnectReason, Message, PeerAddr};
use crate::daemon::pool::ConnectionHandle;
use crate::daemon::sync::Buffered;
use crate::daemon::Shared;
use crate::error::{BlockchainError, ValidationError};
use crate::utils::current_timestamp;
use crate::visor::BlockOutcome;
use log::{debug, error, info, trace, warn};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

type Handled = std::result::Result<(), DisconnectReason>;

pub(crate) fn handle_message(
    shared: &Arc<Shared>,
    conn: &Arc<ConnectionHandle>,
    msg: Message,
) -> Handled {
    trace!("{} -> {}", conn.addr, command_name(&msg.command()));
    match msg {
        Message::Introduction(_) => {
            debug!("Ignoring repeated introduction from {}", conn.addr);
            Ok(())
        }
        Message::Ping => {
            conn.send(Message::Pong);
            Ok(())
        }
        Message::Pong => Ok(()),
        Message::GetPeers => {
            give_peers(shared, conn);
            Ok(())
        }
        Message::GivePeers(peers) => receive_peers(shared, conn, peers),
        Message::AnnounceBlocks { max_seq } => {
            conn.set_head_seq(max_seq);
            shared.request_blocks();
            Ok(())
        }
        Message::GetBlocks { from, count } => give_blocks(shared, conn, from, count),
        Message::GiveBlocks(blocks) => receive_blocks(shared, conn, blocks),
        Message::AnnounceTxns(hashes) => receive_txn_announce(shared, conn, hashes),
        Message::GetTxns(hashes) => {
            let limit = shared.config.daemon.max_txns_announce;
            let txns = shared
                .visor
                .get_unconfirmed_txns(&hashes[..hashes.len().min(limit)]);
            if !txns.is_empty() {
                conn.send(Message::GiveTxns(txns));
            }
            Ok(())
        }
        Message::GiveTxns(txns) => receive_txns(shared, conn, txns),
        Message::Disconnect(reason) => {
            info!("{} disconnected: {reason}", conn.addr);
            Err(DisconnectReason::ConnectionLost)
        }
    }
}

fn give_peers(shared: &Shared, conn: &ConnectionHandle) {
    if shared.config.pex.disabled {
        return;
    }
    let exclude = HashSet::from([conn.addr]);
    let peers: Vec<PeerAddr> = shared
        .pex
        .lock()
        .random_peers(shared.config.pex.exchange_count, &exclude)
        .iter()
        .filter_map(PeerAddr::from_socket)
        .collect();
    if !peers.is_empty() {
        conn.send(Message::GivePeers(peers));
    }
}

fn receive_peers(shared: &Shared, conn: &ConnectionHandle, peers: Vec<PeerAddr>) -> Handled {
    if peers.len() > shared.config.pex.exchange_count.max(1) * 4 {
        warn!("{} sent {} peers", conn.addr, peers.len());
        return shared.punish(conn);
    }
    if shared.config.pex.disabled {
        return Ok(());
    }
    let now = current_timestamp().unwrap_or_default();
    let added = shared
        .pex
        .lock()
        .add_peers(peers.into_iter().map(PeerAddr::to_socket), now);
    if added > 0 {
        debug!("Learned {added} peers from {}", conn.addr);
    }
    Ok(())
}

fn give_blocks(shared: &Shared, conn: &ConnectionHandle, from: u64, count: u64) -> Handled {
    let count = count.min(shared.config.daemon.max_blocks_response);
    match shared.visor.get_blocks_from(from, count) {
        Ok(blocks) if !blocks.is_empty() => {
            debug!(
                "Sending {} blocks from {from} to {}",
                blocks.len(),
                conn.addr
            );
            conn.send(Message::GiveBlocks(blocks));
        }
        Ok(_) => {}
        Err(e) => error!("Failed to read blocks from {from}: {e}"),
    }
    Ok(())
}

/// Blocks in a response must be consecutive and within the size limit
fn check_block_batch(blocks: &[SignedBlock], max: u64) -> bool {
    blocks.len() as u64 <= max && blocks.windows(2).all(|w| w[1].seq() == w[0].seq() + 1)
}

fn receive_blocks(
    shared: &Arc<Shared>,
    conn: &Arc<ConnectionHandle>,
    blocks: Vec<SignedBlock>,
) -> Handled {
    if !check_block_batch(&blocks, shared.config.daemon.max_blocks_response) {
        warn!("{} sent an out of order or oversized block batch", conn.addr);
        shared.punish(conn)?;
        return Err(DisconnectReason::Misbehaving);
    }
    let Some(first) = blocks.first() else {
        return Ok(());
    };
    let last_seq = blocks.last().map_or(0, SignedBlock::seq);
    conn.set_head_seq(last_seq);
    shared.sync.lock().complete_request(conn.id, first.seq());

    let before = shared.visor.head_seq();
    let mut result = Ok(());
    for block in blocks {
        let next = shared.visor.head_seq().map_or(0, |h| h + 1);
        if block.seq() > next {
            // only the authority's blocks may wait for the gap to close
            if let Err(e) = block.verify_signature(&shared.visor.config().blockchain_pubkey) {
                warn!("Invalid block {} from {}: {e}", block.seq(), conn.addr);
                result = shared.punish(conn);
                break;
            }
            let buffered = shared
                .sync
                .lock()
                .buffer_block(block, conn.addr, Instant::now());
            if buffered == Buffered::Full {
                debug!("Block buffer full, dropping blocks from {}", conn.addr);
                break;
            }
            continue;
        }
        match shared.visor.execute_block(&block) {
            Ok(BlockOutcome::Applied) => shared.book.record_success(conn.addr),
            Ok(BlockOutcome::Known) => {}
            Err(e) if e.is_peer_fault() => {
                warn!("Invalid block {} from {}: {e}", block.seq(), conn.addr);
                result = shared.punish(conn);
                break;
            }
            Err(e) => {
                error!("Failed to execute block {}: {e}", block.seq());
                break;
            }
        }
    }
    drain_buffer(shared);

    let after = shared.visor.head_seq();
    if let Some(head) = after {
        if after != before {
            info!("Chain head is now {head}");
            shared.sync.lock().head_advanced(head);
            shared
                .pool
                .broadcast(&Message::AnnounceBlocks { max_seq: head }, Some(conn.id));
        }
    }
    result?;
    shared.request_blocks();
    Ok(())
}

/// Executes buffered blocks that now follow the head. A block that fails
/// counts against the peer that sent it.
pub(crate) fn drain_buffer(shared: &Shared) {
    loop {
        let next = shared.visor.head_seq().map_or(0, |h| h + 1);
        let Some((block, sender)) = shared.sync.lock().take_buffered(next) else {
            return;
        };
        match shared.visor.execute_block(&block) {
            Ok(BlockOutcome::Applied) => shared.book.record_success(sender),
            Ok(BlockOutcome::Known) => {}
            Err(e) if e.is_peer_fault() => {
                warn!("Invalid buffered block {next} from {sender}: {e}");
                // a ban closes the sender's connection
                let _ = shared.punish_addr(sender);
                return;
            }
            Err(e) => {
                error!("Failed to execute buffered block {next}: {e}");
                return;
            }
        }
    }
}

fn receive_txn_announce(
    shared: &Shared,
    conn: &ConnectionHandle,
    hashes: Vec<Sha256>,
) -> Handled {
    if hashes.len() > shared.config.daemon.max_txns_announce {
        warn!("{} announced {} transactions", conn.addr, hashes.len());
        return shared.punish(conn);
    }
    let wanted = shared.sync.lock().filter_announced(conn.id, &hashes);
    if wanted.is_empty() {
        return Ok(());
    }
    let unknown = match shared.visor.filter_known_txns(&wanted) {
        Ok(unknown) => unknown,
        Err(e) => {
            error!("Failed to look up announced transactions: {e}");
            return Ok(());
        }
    };
    if !unknown.is_empty() {
        shared
            .sync
            .lock()
            .note_txn_requests(&unknown, Instant::now());
        conn.send(Message::GetTxns(unknown));
    }
    Ok(())
}

/// Rejections that an honest peer can trigger by racing a block
fn is_benign(err: &BlockchainError) -> bool {
    matches!(
        err.validation(),
        Some(ValidationError::AlreadyConfirmed(_))
            | Some(ValidationError::UnknownInput(_))
            | Some(ValidationError::DoubleSpend(_))
    ) || matches!(err, BlockchainError::PoolFull)
}

fn receive_txns(
    shared: &Arc<Shared>,
    conn: &Arc<ConnectionHandle>,
    txns: Vec<Transaction>,
) -> Handled {
    if txns.len() > shared.config.daemon.max_txns_announce {
        warn!("{} sent {} transactions", conn.addr, txns.len());
        return shared.punish(conn);
    }
    let now = current_timestamp().unwrap_or_default();
    let mut admitted = Vec::new();
    for tx in txns {
        let hash = tx.hash();
        {
            let mut sync = shared.sync.lock();
            sync.txn_received(&hash);
            sync.mark_seen(conn.id, &[hash]);
        }
        match shared.visor.inject_transaction(tx, now) {
            Ok(true) => {
                shared.book.record_success(conn.addr);
                admitted.push(hash);
            }
            Ok(false) => {}
            Err(e) if is_benign(&e) => debug!("Skipping transaction {hash}: {e}"),
            Err(e) if e.is_peer_fault() => {
                warn!("Invalid transaction {hash} from {}: {e}", conn.addr);
                shared.punish(conn)?;
            }
            Err(e) => error!("Failed to inject transaction {hash}: {e}"),
        }
    }
    if !admitted.is_empty() {
        debug!("Admitted {} transactions from {}", admitted.len(), conn.addr);
        shared.announce_txns(&admitted);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::generate_key_pair;
    use crate::config::{Config, DaemonConfig, GatewayConfig, NodeMode, PexConfig};
    use crate::core::{Block, BlockBody, DROPLETS_PER_COIN};
    use crate::daemon::messages::PROTOCOL_VERSION;
    use crate::daemon::pool::Direction;
    use crate::pex::Pex;
    use crate::testnet::{signed_transfer, test_visor, TestChain};
    use crate::visor::Visor;
    use std::net::SocketAddr;
    use std::path::PathBuf;
    use tokio::sync::{mpsc, watch};

    /// A master chain with blocks 0 to 3
    fn master_chain() -> (TestChain, Vec<SignedBlock>) {
        let chain = TestChain::new(NodeMode::Master);
        let now = chain.now();
        chain.visor.create_distribution_block(now).unwrap();
        let to = chain.config.distribution.addresses[2];
        for key in &chain.dist_keys[..2] {
            let tx = signed_transfer(&chain.visor, key, to, DROPLETS_PER_COIN);
            chain.visor.inject_transaction(tx, now).unwrap();
            chain.visor.create_and_execute_block(now).unwrap().unwrap();
        }
        let blocks = (0..=3)
            .map(|seq| chain.visor.get_block(seq).unwrap().unwrap())
            .collect();
        (chain, blocks)
    }

    fn daemon_state(visor: Visor) -> Arc<Shared> {
        let pex = PexConfig {
            disabled: true,
            ..PexConfig::default()
        };
        let config = Config {
            data_dir: PathBuf::from("unused"),
            db_path: PathBuf::from("unused/data.db"),
            log_level: "debug".to_string(),
            daemon: DaemonConfig {
                misbehavior_threshold: 3,
                ..DaemonConfig::default()
            },
            pex: pex.clone(),
            peers_file: PathBuf::from("unused/peers.json"),
            visor: visor.config().clone(),
            gateway: GatewayConfig::default(),
        };
        let pex = Pex::new(&pex, config.peers_file.clone(), true);
        let (_stop, shutdown) = watch::channel(false);
        Arc::new(Shared::new(Arc::new(config), Arc::new(visor), pex, 0, shutdown))
    }

    /// Registers an inbound peer at 10.0.0.`host`
    fn peer(shared: &Shared, host: u8) -> (Arc<ConnectionHandle>, mpsc::Receiver<Message>) {
        let (tx, rx) = mpsc::channel(64);
        let addr = SocketAddr::from(([10, 0, 0, host], 8848));
        let conn = shared
            .pool
            .register(addr, Direction::Inbound, PROTOCOL_VERSION, tx)
            .unwrap();
        (conn, rx)
    }

    fn chain(len: u64) -> Vec<SignedBlock> {
        let (sk, pk) = generate_key_pair();
        let genesis = Block::new_genesis_block(pk.to_address(), 1, 0).unwrap();
        let mut head = genesis.head.clone();
        let mut blocks = vec![genesis.sign(&sk).unwrap()];
        for _ in 1..len {
            let block = Block::new_block(&head, 1, 0, BlockBody::default()).unwrap();
            head = block.head.clone();
            blocks.push(block.sign(&sk).unwrap());
        }
        blocks
    }

    #[test]
    fn test_block_batch_checks() {
        let blocks = chain(4);
        assert!(check_block_batch(&blocks, 4));
        assert!(!check_block_batch(&blocks, 3));
        assert!(check_block_batch(&[], 4));

        let mut shuffled = blocks.clone();
        shuffled.swap(1, 2);
        assert!(!check_block_batch(&shuffled, 4));
        let gap = vec![blocks[0].clone(), blocks[2].clone()];
        assert!(!check_block_batch(&gap, 4));
    }

    #[test]
    fn test_benign_rejections() {
        let hash = Sha256::digest(b"ux");
        assert!(is_benign(&ValidationError::DoubleSpend(hash).into()));
        assert!(is_benign(&BlockchainError::PoolFull));
        assert!(!is_benign(
            &ValidationError::InvalidSignature { index: 0 }.into()
        ));
    }

    #[test]
    fn test_block_ahead_of_head_waits_for_gap() {
        let (chain, blocks) = master_chain();
        let shared = daemon_state(test_visor(chain.follower_config()));
        let (conn, _rx) = peer(&shared, 1);

        assert_eq!(receive_blocks(&shared, &conn, vec![blocks[3].clone()]), Ok(()));
        assert_eq!(shared.visor.head_seq(), Some(0));
        assert_eq!(shared.sync.lock().buffered_len(), 1);

        assert_eq!(receive_blocks(&shared, &conn, blocks[1..3].to_vec()), Ok(()));
        assert_eq!(shared.visor.head_seq(), Some(3));
        assert_eq!(shared.sync.lock().buffered_len(), 0);
        assert_eq!(shared.book.strikes(conn.addr), 0);
    }

    #[test]
    fn test_unsigned_future_blocks_get_sender_banned() {
        let (chain, blocks) = master_chain();
        let shared = daemon_state(test_visor(chain.follower_config()));
        let (conn, _rx) = peer(&shared, 1);
        let forged = blocks[3].block.clone().sign(&generate_key_pair().0).unwrap();

        assert_eq!(receive_blocks(&shared, &conn, vec![forged.clone()]), Ok(()));
        assert_eq!(shared.book.strikes(conn.addr), 1);
        assert_eq!(shared.sync.lock().buffered_len(), 0);
        assert_eq!(receive_blocks(&shared, &conn, vec![forged.clone()]), Ok(()));
        assert_eq!(
            receive_blocks(&shared, &conn, vec![forged]),
            Err(DisconnectReason::Misbehaving)
        );
        assert!(shared.book.is_banned(conn.addr));
        assert_eq!(shared.visor.head_seq(), Some(0));
    }

    #[test]
    fn test_buffered_block_failure_blames_its_sender() {
        let (chain, blocks) = master_chain();
        let shared = daemon_state(test_visor(chain.follower_config()));
        let (honest, _rx1) = peer(&shared, 1);
        let (liar, _rx2) = peer(&shared, 2);

        // signed by the authority, but not built on block 1
        let authority = chain.config.blockchain_seckey.as_ref().unwrap();
        let mut bad = blocks[2].block.clone();
        bad.head.prev_hash = Sha256::digest(b"elsewhere");
        let bad = bad.sign(authority).unwrap();

        assert_eq!(receive_blocks(&shared, &liar, vec![bad]), Ok(()));
        assert_eq!(shared.book.strikes(liar.addr), 0);
        // the honest copy of block 2 does not replace the waiting one
        assert_eq!(receive_blocks(&shared, &honest, vec![blocks[2].clone()]), Ok(()));
        assert_eq!(shared.sync.lock().buffered_len(), 1);

        assert_eq!(receive_blocks(&shared, &honest, vec![blocks[1].clone()]), Ok(()));
        assert_eq!(shared.visor.head_seq(), Some(1));
        assert_eq!(shared.book.strikes(liar.addr), 1);
        assert_eq!(shared.book.strikes(honest.addr), 0);

        // the honest peer can still fill the gap
        assert_eq!(receive_blocks(&shared, &honest, blocks[2..].to_vec()), Ok(()));
        assert_eq!(shared.visor.head_seq(), Some(3));
    }
}
