//! One peer connection: handshake, then a reader task, a writer task and
//! the message loop that feeds the daemon's handlers.

use crate::daemon::handler;
use crate::daemon::messages::{
    command_name, read_frame, write_message, DisconnectReason, Introduction, Message,
};
use crate::daemon::pool::{ConnectionHandle, Direction, RegisterError};
use crate::daemon::Shared;
use crate::error::{BlockchainError, Result};
use log::{debug, error, info, trace, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::timeout;

/// How long a closing connection gets to flush its queue
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// What the reader task hands to the message loop
enum Inbound {
    Message(Message),
    /// a frame that did not decode
    Malformed(BlockchainError),
}

/// Exchanges `Introduction` messages. Both sides send first, so neither
/// waits on the other.
pub async fn handshake<S>(
    stream: &mut S,
    ours: &Introduction,
    max_message_size: usize,
) -> Result<Introduction>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    write_message(stream, &Message::Introduction(ours.clone())).await?;
    let (command, body) = read_frame(stream, max_message_size).await?;
    match Message::decode(command, &body)? {
        Some(Message::Introduction(theirs)) => Ok(theirs),
        Some(Message::Disconnect(reason)) => Err(BlockchainError::Network(format!(
            "peer refused connection: {reason}"
        ))),
        _ => Err(BlockchainError::MalformedData(
            "expected introduction".to_string(),
        )),
    }
}

/// Runs a freshly opened socket until it closes. `remote` is the socket
/// peer address; for outbound connections it is also the listen address.
pub(crate) async fn run(
    shared: Arc<Shared>,
    stream: TcpStream,
    remote: SocketAddr,
    direction: Direction,
) {
    if let Err(e) = serve(&shared, stream, remote, direction).await {
        debug!("Connection with {remote} ended: {e}");
    }
}

async fn serve(
    shared: &Arc<Shared>,
    mut stream: TcpStream,
    remote: SocketAddr,
    direction: Direction,
) -> Result<()> {
    let cfg = &shared.config.daemon;
    let ours = shared.introduction();
    let theirs = timeout(
        cfg.handshake_timeout(),
        handshake(&mut stream, &ours, cfg.max_message_size),
    )
    .await
    .map_err(|_| BlockchainError::Network(format!("handshake with {remote} timed out")))??;

    let listen_addr = match direction {
        Direction::Outbound => remote,
        Direction::Inbound => SocketAddr::new(remote.ip(), theirs.port),
    };

    if let Some(reason) = shared.check_introduction(&theirs, listen_addr) {
        if reason == DisconnectReason::SelfConnection {
            shared.pex.lock().remove(&listen_addr);
        }
        refuse(&mut stream, reason).await;
        return Err(BlockchainError::Network(format!(
            "refused {listen_addr}: {reason}"
        )));
    }

    let (out_tx, out_rx) = mpsc::channel(cfg.outbound_queue.max(1));
    let conn = match shared
        .pool
        .register(listen_addr, direction, theirs.version, out_tx)
    {
        Ok(conn) => conn,
        Err(e) => {
            let reason = match e {
                RegisterError::Duplicate => DisconnectReason::Duplicate,
                RegisterError::Full => DisconnectReason::TooManyConnections,
            };
            refuse(&mut stream, reason).await;
            return Err(BlockchainError::Network(format!(
                "refused {listen_addr}: {reason}"
            )));
        }
    };
    info!(
        "Connected to {listen_addr} ({:?}, protocol {})",
        direction, theirs.version
    );
    shared.peer_connected(&conn);

    let (reader, writer) = stream.into_split();
    let writer_task = tokio::spawn(write_loop(writer, out_rx, conn.addr));
    let (in_tx, in_rx) = mpsc::channel(cfg.inbound_queue.max(1));
    let reader_task = tokio::spawn(read_loop(reader, in_tx, cfg.max_message_size));

    let reason = message_loop(shared, &conn, in_rx).await;
    info!("Disconnecting {listen_addr}: {reason}");

    reader_task.abort();
    shared.pool.remove(conn.id);
    shared.sync.lock().forget_connection(conn.id);
    if reason != DisconnectReason::ConnectionLost {
        conn.send(Message::Disconnect(reason));
    }
    // the writer exits once the last sender is gone and the queue is empty
    drop(conn);
    let _ = timeout(DRAIN_TIMEOUT, writer_task).await;
    Ok(())
}

/// Tells a banned peer why it is dropped, without a handshake
pub(crate) async fn refuse_banned(mut stream: TcpStream) {
    let _ = timeout(
        DRAIN_TIMEOUT,
        refuse(&mut stream, DisconnectReason::Banned),
    )
    .await;
}

async fn refuse(stream: &mut TcpStream, reason: DisconnectReason) {
    if let Err(e) = write_message(stream, &Message::Disconnect(reason)).await {
        trace!("Could not send disconnect: {e}");
    }
}

async fn read_loop(mut reader: OwnedReadHalf, inbound: mpsc::Sender<Inbound>, max_size: usize) {
    loop {
        let (command, body) = match read_frame(&mut reader, max_size).await {
            Ok(frame) => frame,
            Err(e) => {
                debug!("Read failed: {e}");
                return;
            }
        };
        let item = match Message::decode(command, &body) {
            Ok(Some(msg)) => Inbound::Message(msg),
            Ok(None) => {
                trace!("Ignoring unknown command {}", command_name(&command));
                continue;
            }
            Err(e) => Inbound::Malformed(e),
        };
        // a full queue applies backpressure to the socket
        if inbound.send(item).await.is_err() {
            return;
        }
    }
}

async fn write_loop(
    mut writer: OwnedWriteHalf,
    mut outbound: mpsc::Receiver<Message>,
    addr: SocketAddr,
) {
    while let Some(msg) = outbound.recv().await {
        if let Err(e) = write_message(&mut writer, &msg).await {
            debug!("Write to {addr} failed: {e}");
            return;
        }
    }
}

async fn message_loop(
    shared: &Arc<Shared>,
    conn: &Arc<ConnectionHandle>,
    mut inbound: mpsc::Receiver<Inbound>,
) -> DisconnectReason {
    let idle = shared.config.daemon.idle_timeout();
    let mut shutdown = shared.shutdown.clone();
    if *shutdown.borrow() {
        return DisconnectReason::Shutdown;
    }
    loop {
        tokio::select! {
            reason = conn.closed() => return reason,
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    return DisconnectReason::Shutdown;
                }
            }
            item = timeout(idle, inbound.recv()) => match item {
                Err(_) => return DisconnectReason::Idle,
                Ok(None) => return DisconnectReason::ConnectionLost,
                Ok(Some(Inbound::Message(msg))) => {
                    if let Err(reason) = dispatch(shared, conn, msg).await {
                        return reason;
                    }
                }
                Ok(Some(Inbound::Malformed(e))) => {
                    warn!("Malformed message from {}: {e}", conn.addr);
                    return shared.punish(conn).err().unwrap_or(DisconnectReason::Misbehaving);
                }
            }
        }
    }
}

/// Runs the handler for `msg`. Block and transaction batches verify
/// signatures and commit to disk, so they run on the blocking pool.
async fn dispatch(
    shared: &Arc<Shared>,
    conn: &Arc<ConnectionHandle>,
    msg: Message,
) -> std::result::Result<(), DisconnectReason> {
    if !matches!(msg, Message::GiveBlocks(_) | Message::GiveTxns(_)) {
        return handler::handle_message(shared, conn, msg);
    }
    let (shared, conn) = (Arc::clone(shared), Arc::clone(conn));
    match tokio::task::spawn_blocking(move || handler::handle_message(&shared, &conn, msg)).await {
        Ok(handled) => handled,
        Err(e) => {
            error!("Message handler failed: {e}");
            Err(DisconnectReason::ConnectionLost)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::Sha256;
    use crate::daemon::messages::PROTOCOL_VERSION;

    fn intro(mirror: u32) -> Introduction {
        Introduction {
            version: PROTOCOL_VERSION,
            mirror,
            port: 7000,
            genesis_hash: Sha256::digest(b"genesis"),
        }
    }

    #[tokio::test]
    async fn test_handshake_exchanges_introductions() {
        let (mut a, mut b) = tokio::io::duplex(4096);
        let left = tokio::spawn(async move { handshake(&mut a, &intro(1), 1024).await });
        let theirs = handshake(&mut b, &intro(2), 1024).await.unwrap();
        assert_eq!(theirs.mirror, 1);
        assert_eq!(left.await.unwrap().unwrap().mirror, 2);
    }

    #[tokio::test]
    async fn test_handshake_rejects_other_first_message() {
        let (mut a, mut b) = tokio::io::duplex(4096);
        tokio::spawn(async move {
            write_message(&mut a, &Message::Ping).await.unwrap();
            // keep the pipe open until the other side is done
            let _ = read_frame(&mut a, 1024).await;
        });
        let result = handshake(&mut b, &intro(2), 1024).await;
        assert!(matches!(result, Err(BlockchainError::MalformedData(_))));
    }

    #[tokio::test]
    async fn test_handshake_reports_refusal() {
        let (mut a, mut b) = tokio::io::duplex(4096);
        tokio::spawn(async move {
            write_message(&mut a, &Message::Disconnect(DisconnectReason::Banned))
                .await
                .unwrap();
            let _ = read_frame(&mut a, 1024).await;
        });
        let result = handshake(&mut b, &intro(2), 1024).await;
        assert!(matches!(result, Err(BlockchainError::Network(_))));
    }
}
