use crate::config::{NodeConfig, NodeMode};
use crate::error::Result;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

/// Node mode as given on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeArg(pub NodeMode);

impl FromStr for ModeArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "follower" => Ok(ModeArg(NodeMode::Follower)),
            "master" => Ok(ModeArg(NodeMode::Master)),
            "arbitrating" => Ok(ModeArg(NodeMode::Arbitrating)),
            _ => Err(format!(
                "Invalid mode: {s}. Valid options: follower, master, arbitrating"
            )),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "spo-chain", about = "Distribution-ledger node")]
pub struct Opt {
    #[arg(long, global = true, help = "TOML configuration file")]
    pub config: Option<PathBuf>,
    #[arg(long = "data-dir", global = true, help = "Directory for the database and peer list")]
    pub data_dir: Option<PathBuf>,
    #[arg(long = "log-level", global = true, help = "Log level (error, warn, info, debug, trace)")]
    pub log_level: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

impl Opt {
    /// Reads the config file, if any, and applies the global flags
    pub fn load_config(&self) -> Result<NodeConfig> {
        let mut config = match &self.config {
            Some(path) => NodeConfig::from_file(path)?,
            None => NodeConfig::default(),
        };
        if let Some(dir) = &self.data_dir {
            config.node.data_dir = dir.clone();
        }
        if let Some(level) = &self.log_level {
            config.node.log_level = level.clone();
        }
        Ok(config)
    }
}

/// Overrides for `startnode`
#[derive(Debug, Clone, Default, clap::Args)]
pub struct NodeArgs {
    #[arg(long, help = "Port to listen on")]
    pub port: Option<u16>,
    #[arg(long, help = "Node mode (follower, master, arbitrating)")]
    pub mode: Option<ModeArg>,
    #[arg(long = "connect-to", help = "Only connect to this peer")]
    pub connect_to: Option<SocketAddr>,
    #[arg(long = "localhost-only", help = "Listen on and connect to loopback only")]
    pub localhost_only: bool,
    #[arg(long = "disable-networking", help = "Run without any peer connections")]
    pub disable_networking: bool,
    #[arg(long = "disable-pex", help = "Do not exchange peer addresses")]
    pub disable_pex: bool,
}

impl NodeArgs {
    pub fn apply(&self, config: &mut NodeConfig) {
        if let Some(port) = self.port {
            config.daemon.port = port;
        }
        if let Some(ModeArg(mode)) = self.mode {
            config.visor.mode = mode;
        }
        if let Some(addr) = self.connect_to {
            config.daemon.connect_to = Some(addr);
        }
        config.daemon.localhost_only |= self.localhost_only;
        config.daemon.disable_networking |= self.disable_networking;
        config.pex.disabled |= self.disable_pex;
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(name = "startnode", about = "Run the node until interrupted")]
    StartNode {
        #[command(flatten)]
        args: NodeArgs,
    },
    #[command(name = "verifyaddress", about = "Check an address checksum")]
    VerifyAddress {
        #[arg(help = "Base58 address")]
        address: String,
    },
    #[command(name = "keygen", about = "Print a fresh key pair and its address")]
    Keygen,
    #[command(
        name = "encryptkey",
        about = "Write a secret key to an encrypted file, password from SPO_KEY_PASSWORD"
    )]
    EncryptKey {
        #[arg(help = "Secret key as hex")]
        seckey: String,
        #[arg(help = "Output file")]
        output: PathBuf,
    },
    #[command(
        name = "genesissig",
        about = "Sign the configured genesis block with the blockchain key"
    )]
    GenesisSig,
    #[command(name = "printchain", about = "Print the most recent blocks")]
    PrintChain {
        #[arg(default_value_t = 10, help = "Number of blocks")]
        count: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_startnode_flags() {
        let opt = Opt::parse_from([
            "spo-chain",
            "--data-dir",
            "/tmp/spo",
            "startnode",
            "--port",
            "9000",
            "--mode",
            "master",
            "--localhost-only",
        ]);
        let Command::StartNode { args } = &opt.command else {
            panic!("expected startnode");
        };
        let mut config = opt.load_config().unwrap();
        args.apply(&mut config);
        assert_eq!(config.node.data_dir, PathBuf::from("/tmp/spo"));
        assert_eq!(config.daemon.port, 9000);
        assert_eq!(config.visor.mode, NodeMode::Master);
        assert!(config.daemon.localhost_only);
        assert!(!config.daemon.disable_networking);
    }

    #[test]
    fn test_bad_mode_rejected() {
        assert!("leader".parse::<ModeArg>().is_err());
        assert_eq!(
            "Arbitrating".parse::<ModeArg>().unwrap().0,
            NodeMode::Arbitrating
        );
    }

    #[test]
    fn test_printchain_default_count() {
        let opt = Opt::parse_from(["spo-chain", "printchain"]);
        assert!(matches!(opt.command, Command::PrintChain { count: 10 }));
    }
}
