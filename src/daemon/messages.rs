//! Wire messages and framing.
//!
//! Every frame is `[u32 LE length][4-byte command][body]` where the length
//! counts the command and the body. Bodies use the same strict binary
//! codec as the ledger, so hashes are fixed 32-byte arrays and addresses
//! travel as their 20-byte key.

use crate::cipher::Sha256;
use crate::core::{SignedBlock, Transaction};
use crate::error::{BlockchainError, Result};
use crate::utils::{deserialize, serialize};
use std::fmt;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub const PROTOCOL_VERSION: u32 = 2;
pub const MIN_PROTOCOL_VERSION: u32 = 2;

const HEADER_LEN: usize = 4;
const COMMAND_LEN: usize = 4;

pub type Command = [u8; COMMAND_LEN];

pub const INTRODUCTION: Command = *b"INTR";
pub const PING: Command = *b"PING";
pub const PONG: Command = *b"PONG";
pub const GET_PEERS: Command = *b"GETP";
pub const GIVE_PEERS: Command = *b"GIVP";
pub const ANNOUNCE_BLOCKS: Command = *b"ANBK";
pub const GET_BLOCKS: Command = *b"GETB";
pub const GIVE_BLOCKS: Command = *b"GIVB";
pub const ANNOUNCE_TXNS: Command = *b"ANNT";
pub const GET_TXNS: Command = *b"GETT";
pub const GIVE_TXNS: Command = *b"GIVT";
pub const DISCONNECT: Command = *b"DISC";

#[derive(Debug, Clone, PartialEq, Eq, bincode::Encode, bincode::Decode)]
pub struct Introduction {
    pub version: u32,
    /// random per process, detects connections to ourselves
    pub mirror: u32,
    /// port the sender listens on
    pub port: u16,
    pub genesis_hash: Sha256,
}

/// IPv4 peer address as exchanged in `GivePeers`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, bincode::Encode, bincode::Decode)]
pub struct PeerAddr {
    pub ip: [u8; 4],
    pub port: u16,
}

impl PeerAddr {
    pub fn from_socket(addr: &SocketAddr) -> Option<PeerAddr> {
        match addr {
            SocketAddr::V4(v4) => Some(PeerAddr {
                ip: v4.ip().octets(),
                port: v4.port(),
            }),
            SocketAddr::V6(_) => None,
        }
    }

    pub fn to_socket(self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::from(self.ip), self.port))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, bincode::Encode, bincode::Decode)]
pub enum DisconnectReason {
    Shutdown,
    Misbehaving,
    Banned,
    Duplicate,
    SelfConnection,
    VersionMismatch,
    GenesisMismatch,
    TooManyConnections,
    Idle,
    QueueFull,
    ConnectionLost,
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DisconnectReason::Shutdown => "node shutting down",
            DisconnectReason::Misbehaving => "too many invalid messages",
            DisconnectReason::Banned => "peer is banned",
            DisconnectReason::Duplicate => "already connected",
            DisconnectReason::SelfConnection => "connected to self",
            DisconnectReason::VersionMismatch => "unsupported protocol version",
            DisconnectReason::GenesisMismatch => "different genesis block",
            DisconnectReason::TooManyConnections => "connection limit reached",
            DisconnectReason::Idle => "idle timeout",
            DisconnectReason::QueueFull => "outbound queue full",
            DisconnectReason::ConnectionLost => "connection lost",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Introduction(Introduction),
    Ping,
    Pong,
    GetPeers,
    GivePeers(Vec<PeerAddr>),
    /// sender's head seq
    AnnounceBlocks { max_seq: u64 },
    /// `count` blocks starting at seq `from`
    GetBlocks { from: u64, count: u64 },
    GiveBlocks(Vec<SignedBlock>),
    AnnounceTxns(Vec<Sha256>),
    GetTxns(Vec<Sha256>),
    GiveTxns(Vec<Transaction>),
    Disconnect(DisconnectReason),
}

impl Message {
    pub fn command(&self) -> Command {
        match self {
            Message::Introduction(_) => INTRODUCTION,
            Message::Ping => PING,
            Message::Pong => PONG,
            Message::GetPeers => GET_PEERS,
            Message::GivePeers(_) => GIVE_PEERS,
            Message::AnnounceBlocks { .. } => ANNOUNCE_BLOCKS,
            Message::GetBlocks { .. } => GET_BLOCKS,
            Message::GiveBlocks(_) => GIVE_BLOCKS,
            Message::AnnounceTxns(_) => ANNOUNCE_TXNS,
            Message::GetTxns(_) => GET_TXNS,
            Message::GiveTxns(_) => GIVE_TXNS,
            Message::Disconnect(_) => DISCONNECT,
        }
    }

    fn encode_body(&self) -> Result<Vec<u8>> {
        match self {
            Message::Introduction(intro) => serialize(intro),
            Message::Ping | Message::Pong | Message::GetPeers => Ok(Vec::new()),
            Message::GivePeers(peers) => serialize(peers),
            Message::AnnounceBlocks { max_seq } => serialize(max_seq),
            Message::GetBlocks { from, count } => serialize(&(*from, *count)),
            Message::GiveBlocks(blocks) => serialize(blocks),
            Message::AnnounceTxns(hashes) | Message::GetTxns(hashes) => serialize(hashes),
            Message::GiveTxns(txns) => serialize(txns),
            Message::Disconnect(reason) => serialize(reason),
        }
    }

    /// Full frame including the length prefix
    pub fn encode(&self) -> Result<Vec<u8>> {
        let body = self.encode_body()?;
        let len = u32::try_from(COMMAND_LEN + body.len())
            .map_err(|_| BlockchainError::MalformedData("message too large".to_string()))?;
        let mut frame = Vec::with_capacity(HEADER_LEN + COMMAND_LEN + body.len());
        frame.extend_from_slice(&len.to_le_bytes());
        frame.extend_from_slice(&self.command());
        frame.extend_from_slice(&body);
        Ok(frame)
    }

    /// Decodes a body for `command`. Unknown commands yield `None`.
    pub fn decode(command: Command, body: &[u8]) -> Result<Option<Message>> {
        let empty = |msg: Message| {
            if body.is_empty() {
                Ok(Some(msg))
            } else {
                Err(BlockchainError::MalformedData(
                    "unexpected message body".to_string(),
                ))
            }
        };
        let msg = match command {
            INTRODUCTION => Message::Introduction(deserialize(body)?),
            PING => return empty(Message::Ping),
            PONG => return empty(Message::Pong),
            GET_PEERS => return empty(Message::GetPeers),
            GIVE_PEERS => Message::GivePeers(deserialize(body)?),
            ANNOUNCE_BLOCKS => Message::AnnounceBlocks {
                max_seq: deserialize(body)?,
            },
            GET_BLOCKS => {
                let (from, count): (u64, u64) = deserialize(body)?;
                Message::GetBlocks { from, count }
            }
            GIVE_BLOCKS => Message::GiveBlocks(deserialize(body)?),
            ANNOUNCE_TXNS => Message::AnnounceTxns(deserialize(body)?),
            GET_TXNS => Message::GetTxns(deserialize(body)?),
            GIVE_TXNS => Message::GiveTxns(deserialize(body)?),
            DISCONNECT => Message::Disconnect(deserialize(body)?),
            _ => return Ok(None),
        };
        Ok(Some(msg))
    }
}

/// Reads one frame. Frames longer than `max_size` are refused without
/// reading their body, the connection must then be closed.
pub async fn read_frame<R>(reader: &mut R, max_size: usize) -> Result<(Command, Vec<u8>)>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; HEADER_LEN];
    reader.read_exact(&mut len_buf).await?;
    let len = u32::from_le_bytes(len_buf) as usize;
    if len < COMMAND_LEN {
        return Err(BlockchainError::MalformedData(format!(
            "frame of {len} bytes has no command"
        )));
    }
    if len > max_size {
        return Err(BlockchainError::Network(format!(
            "frame of {len} bytes exceeds limit {max_size}"
        )));
    }
    let mut command = [0u8; COMMAND_LEN];
    reader.read_exact(&mut command).await?;
    let mut body = vec![0u8; len - COMMAND_LEN];
    reader.read_exact(&mut body).await?;
    Ok((command, body))
}

pub async fn write_message<W>(writer: &mut W, msg: &Message) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let frame = msg.encode()?;
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

pub fn command_name(command: &Command) -> String {
    String::from_utf8_lossy(command).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::{generate_key_pair, Address};
    use crate::core::{Block, TransactionOutput};

    async fn round_trip(msg: Message) -> Message {
        let frame = msg.encode().unwrap();
        let mut reader = &frame[..];
        let (command, body) = read_frame(&mut reader, 1 << 20).await.unwrap();
        assert!(reader.is_empty());
        Message::decode(command, &body).unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_frames_decode_back() {
        let (sk, pk) = generate_key_pair();
        let genesis = Block::new_genesis_block(pk.to_address(), 100, 1).unwrap();
        let tx = Transaction::new(
            vec![Sha256::digest(b"in")],
            vec![TransactionOutput {
                address: Address::default(),
                coins: 1,
                hours: 0,
            }],
        )
        .unwrap();
        let messages = vec![
            Message::Introduction(Introduction {
                version: PROTOCOL_VERSION,
                mirror: 7,
                port: 8848,
                genesis_hash: genesis.hash().unwrap(),
            }),
            Message::Ping,
            Message::GivePeers(vec![PeerAddr {
                ip: [1, 2, 3, 4],
                port: 8848,
            }]),
            Message::GetBlocks { from: 3, count: 20 },
            Message::GiveBlocks(vec![genesis.sign(&sk).unwrap()]),
            Message::AnnounceTxns(vec![tx.hash()]),
            Message::GiveTxns(vec![tx]),
            Message::Disconnect(DisconnectReason::Idle),
        ];
        for msg in messages {
            assert_eq!(round_trip(msg.clone()).await, msg);
        }
    }

    #[test]
    fn test_frame_layout() {
        let frame = Message::AnnounceBlocks { max_seq: 9 }.encode().unwrap();
        assert_eq!(&frame[..4], &12u32.to_le_bytes());
        assert_eq!(&frame[4..8], b"ANBK");
        assert_eq!(&frame[8..], &9u64.to_le_bytes());
    }

    #[test]
    fn test_unknown_command_ignored() {
        assert_eq!(Message::decode(*b"XXXX", &[1, 2, 3]).unwrap(), None);
    }

    #[test]
    fn test_malformed_bodies() {
        assert!(matches!(
            Message::decode(PING, &[0]),
            Err(BlockchainError::MalformedData(_))
        ));
        assert!(matches!(
            Message::decode(ANNOUNCE_BLOCKS, &[1, 2]),
            Err(BlockchainError::MalformedData(_))
        ));
        // trailing byte after a valid body
        let mut body = 5u64.to_le_bytes().to_vec();
        body.push(0);
        assert!(Message::decode(ANNOUNCE_BLOCKS, &body).is_err());
    }

    #[tokio::test]
    async fn test_oversized_frame_refused() {
        let frame = Message::GiveTxns(vec![]).encode().unwrap();
        let mut huge = (1_000_000u32).to_le_bytes().to_vec();
        huge.extend_from_slice(&frame[4..]);
        let mut reader = &huge[..];
        assert!(matches!(
            read_frame(&mut reader, 1024).await,
            Err(BlockchainError::Network(_))
        ));

        let mut short = &[2u8, 0, 0, 0, b'P', b'I'][..];
        assert!(matches!(
            read_frame(&mut short, 1024).await,
            Err(BlockchainError::MalformedData(_))
        ));
    }

    #[test]
    fn test_peer_addr_conversion() {
        let addr: SocketAddr = "10.1.2.3:6000".parse().unwrap();
        let peer = PeerAddr::from_socket(&addr).unwrap();
        assert_eq!(peer.to_socket(), addr);
        assert!(PeerAddr::from_socket(&"[::1]:1".parse().unwrap()).is_none());
    }
}
