// Entry point for the spo-chain node binary
use clap::Parser;
use log::{error, info, warn};
use spo_chain::cli::NodeArgs;
use spo_chain::config::Config;
use spo_chain::storage::{write_encrypted_key, KEY_PASSWORD_ENV};
use spo_chain::visor::sign_genesis;
use spo_chain::{
    current_timestamp, generate_key_pair, validate_address, BlockStore, BlockchainError, Command,
    Daemon, Gateway, NodeConfig, NodeMode, Opt, SecretKey, Visor,
};
use std::env;
use std::fs;
use std::process;
use std::sync::Arc;
use tokio::sync::watch;

fn main() {
    let opt = Opt::parse();

    // the log level comes from the config file, so that is read first
    let config = match opt.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.node.log_level.as_str()),
    )
    .init();

    if let Err(e) = run_command(opt.command, config) {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn run_command(command: Command, mut config: NodeConfig) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::StartNode { args } => start_node(args, config)?,
        Command::VerifyAddress { address } => {
            if !validate_address(&address) {
                return Err(format!("Invalid address: {address}").into());
            }
            println!("Address {address} is valid");
        }
        Command::Keygen => {
            let (seckey, pubkey) = generate_key_pair();
            println!("Secret key: {}", seckey.to_hex());
            println!("Public key: {}", pubkey.to_hex());
            println!("Address:    {}", pubkey.to_address().encode());
        }
        Command::EncryptKey { seckey, output } => {
            let seckey = SecretKey::from_hex(&seckey)?;
            let password = env::var(KEY_PASSWORD_ENV)
                .map_err(|_| format!("{KEY_PASSWORD_ENV} must be set"))?;
            write_encrypted_key(&output, &seckey, &password)?;
            println!("Wrote encrypted key to {}", output.display());
        }
        Command::GenesisSig => {
            // signing only needs the key, not a signing mode
            config.visor.mode = NodeMode::Follower;
            let config = config.validate()?;
            let seckey = config
                .visor
                .blockchain_seckey
                .as_ref()
                .ok_or(BlockchainError::NotAuthorized)?;
            let genesis = sign_genesis(&config.visor.genesis, seckey)?;
            println!("Genesis hash:      {}", genesis.hash()?);
            println!("Genesis signature: {}", genesis.sig.to_hex());
        }
        Command::PrintChain { count } => {
            let config = config.validate()?;
            let store = BlockStore::open(&config.db_path)?;
            let Some(head) = store.head_seq()? else {
                println!("The chain is empty");
                return Ok(());
            };
            let start = (head + 1).saturating_sub(count);
            for block in store.get_blocks(start, head)?.iter().rev() {
                let header = &block.block.head;
                println!("Block {} {}", header.seq, block.hash()?);
                println!("  Prev hash: {}", header.prev_hash);
                println!("  Time:      {}", header.time);
                println!("  Fee:       {}", header.fee);
                for tx in block.block.get_transactions() {
                    println!("  - Transaction {}", tx.hash());
                    for input in &tx.inputs {
                        println!("    -- Input {input}");
                    }
                    for output in &tx.outputs {
                        println!(
                            "    -- Output {} coins={} hours={}",
                            output.address.encode(),
                            output.coins,
                            output.hours
                        );
                    }
                }
                println!();
            }
        }
    }
    Ok(())
}

fn start_node(args: NodeArgs, mut config: NodeConfig) -> Result<(), Box<dyn std::error::Error>> {
    args.apply(&mut config);
    let config = Arc::new(config.validate()?);
    fs::create_dir_all(&config.data_dir)?;
    info!(
        "Starting {:?} node, data in {}",
        config.visor.mode,
        config.data_dir.display()
    );

    let store = BlockStore::open(&config.db_path)?;
    let visor = Arc::new(Visor::open(config.visor.clone(), store)?);
    if config.visor.mode == NodeMode::Master && visor.head_seq() == Some(0) {
        let block = visor.create_distribution_block(current_timestamp()?)?;
        info!("Created distribution block {}", block.seq());
    }
    // the gateway is the entry point for RPC front ends
    let _gateway = Gateway::start(Arc::clone(&visor), &config.gateway)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run_daemon(config, visor))?;
    Ok(())
}

async fn run_daemon(config: Arc<Config>, visor: Arc<Visor>) -> spo_chain::Result<()> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let daemon = Daemon::new(config, visor, shutdown_rx).await?;
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received, shutting down");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                warn!("Cannot listen for Ctrl-C: {e}");
                // dropping the sender would stop the daemon
                std::future::pending::<()>().await;
                drop(shutdown_tx);
            }
        }
    });
    daemon.run().await
}
