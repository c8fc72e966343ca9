//! Ledger integration tests
//!
//! Exercises the visor against on-disk databases: the production
//! distribution, the unlock schedule, idempotent rejection and ordering.

mod common;

use common::*;
use spo_chain::config::NodeConfig;
use spo_chain::error::ValidationError;
use spo_chain::visor::{genesis_block, VisorState};
use spo_chain::{
    generate_key_pair, BlockOutcome, BlockchainError, NodeMode, UnspentFilter, Visor,
    DROPLETS_PER_COIN,
};
use std::sync::Arc;
use std::thread;
use tempfile::tempdir;

#[test]
fn test_default_distribution_pays_every_address() {
    let dir = tempdir().unwrap();
    let (seckey, pubkey) = generate_key_pair();
    let mut node = NodeConfig::default();
    node.node.data_dir = dir.path().to_path_buf();
    node.visor.mode = NodeMode::Master;
    node.visor.blockchain_pubkey = pubkey.to_hex();
    node.visor.blockchain_seckey = Some(seckey.to_hex());
    node.visor.genesis_address = pubkey.to_address().encode();
    let config = node.validate().unwrap();

    let visor = open_visor(dir.path(), config.visor.clone());
    assert_eq!(visor.head_seq(), Some(0));
    let block = visor
        .create_distribution_block(config.visor.genesis.timestamp + 60)
        .unwrap();
    assert_eq!(block.seq(), 1);

    let outputs = visor.get_unspent_outputs(&UnspentFilter::default());
    assert_eq!(outputs.len(), 280);
    assert!(outputs
        .iter()
        .all(|(_, ux)| ux.body.coins == 10_000_000 * DROPLETS_PER_COIN));
    assert_eq!(visor.total_coins(), 2_800_000_000 * DROPLETS_PER_COIN);

    // no unlock start configured: only the initial prefix is spendable
    let schedule = visor.schedule();
    assert_eq!(schedule.unlocked_count(u64::MAX), 25);
    assert!(!schedule.is_locked(&config.visor.distribution.addresses[24], 0));
    assert!(schedule.is_locked(&config.visor.distribution.addresses[25], u64::MAX));
}

#[test]
fn test_distribution_requires_genesis_owner() {
    let dir = tempdir().unwrap();
    let (mut config, _) = chain_config(NodeMode::Master, 4);
    // genesis paid to someone other than the signing authority
    config.genesis.address = generate_key_pair().1.to_address();
    let visor = open_visor(dir.path(), config);
    assert!(matches!(
        visor.create_distribution_block(GENESIS_TIME + 1),
        Err(BlockchainError::NotAuthorized)
    ));
    assert_eq!(visor.head_seq(), Some(0));
}

#[test]
fn test_unlock_boundary() {
    let dir = tempdir().unwrap();
    let (mut config, keys) = chain_config(NodeMode::Arbitrating, 4);
    let start = GENESIS_TIME + 1000;
    config.distribution.initial_unlocked = 1;
    config.distribution.unlock_rate = 1;
    config.distribution.unlock_interval_secs = 100;
    config.distribution.unlock_start = Some(start);
    let to = config.distribution.addresses[0];
    let visor = open_visor(dir.path(), config);
    visor.create_distribution_block(GENESIS_TIME + 10).unwrap();

    let tx = transfer(&visor, &keys[1], to, DROPLETS_PER_COIN);
    let err = visor.inject_transaction(tx.clone(), start + 99).unwrap_err();
    assert!(matches!(
        err.validation(),
        Some(ValidationError::LockedAddressSpend(_))
    ));
    assert!(visor.get_unconfirmed().is_empty());

    assert!(visor.inject_transaction(tx.clone(), start + 100).unwrap());
    let block = visor.create_and_execute_block(start + 100).unwrap().unwrap();
    assert_eq!(block.seq(), 2);
    assert_eq!(visor.total_coins(), visor.config().max_supply);

    // the last address is still locked at that time
    let tx = transfer(&visor, &keys[3], to, DROPLETS_PER_COIN);
    assert!(visor.inject_transaction(tx, start + 150).is_err());
}

#[test]
fn test_rejection_is_idempotent() {
    let dir = tempdir().unwrap();
    let (config, keys) = chain_config(NodeMode::Master, 4);
    let master = open_visor(dir.path(), config.clone());
    master.create_distribution_block(GENESIS_TIME + 10).unwrap();

    let follower_dir = tempdir().unwrap();
    let mut follower_config = follower_of(&config);
    follower_config.genesis.signature = master.get_block(0).unwrap().map(|b| b.sig);
    let follower = open_visor(follower_dir.path(), follower_config);
    assert_eq!(follower.state(), VisorState::Synced);

    let block1 = master.get_block(1).unwrap().unwrap();
    assert_eq!(follower.execute_block(&block1).unwrap(), BlockOutcome::Applied);
    assert_eq!(follower.execute_block(&block1).unwrap(), BlockOutcome::Known);

    // a block signed by a stranger fails the same way every time
    let to = config.distribution.addresses[1];
    let tx = transfer(&master, &keys[0], to, DROPLETS_PER_COIN);
    master.inject_transaction(tx, GENESIS_TIME + 20).unwrap();
    let good = master.create_block(GENESIS_TIME + 20).unwrap().unwrap();
    let forged = good.block.clone().sign(&generate_key_pair().0).unwrap();

    let before = follower.get_unspent_outputs(&UnspentFilter::default());
    let first = follower.execute_block(&forged).unwrap_err();
    let second = follower.execute_block(&forged).unwrap_err();
    assert_eq!(first.validation(), Some(&ValidationError::BadBlockSignature));
    assert_eq!(first.validation(), second.validation());
    assert_eq!(follower.get_unspent_outputs(&UnspentFilter::default()).len(), before.len());
    assert_eq!(follower.head_seq(), Some(1));

    assert_eq!(follower.execute_block(&good).unwrap(), BlockOutcome::Applied);
}

#[test]
fn test_blocks_apply_in_sequence() {
    let dir = tempdir().unwrap();
    let (config, keys) = chain_config(NodeMode::Master, 4);
    let master = open_visor(dir.path(), config.clone());
    master.create_distribution_block(GENESIS_TIME + 10).unwrap();
    let to = config.distribution.addresses[1];
    let tx = transfer(&master, &keys[0], to, DROPLETS_PER_COIN);
    master.inject_transaction(tx, GENESIS_TIME + 20).unwrap();
    master.create_and_execute_block(GENESIS_TIME + 20).unwrap().unwrap();

    let follower_dir = tempdir().unwrap();
    let mut follower_config = follower_of(&config);
    follower_config.genesis.signature = master.get_block(0).unwrap().map(|b| b.sig);
    let follower = open_visor(follower_dir.path(), follower_config);

    let block1 = master.get_block(1).unwrap().unwrap();
    let block2 = master.get_block(2).unwrap().unwrap();
    let err = follower.execute_block(&block2).unwrap_err();
    assert_eq!(
        err.validation(),
        Some(&ValidationError::BadBlockSequence {
            expected: 1,
            actual: 2
        })
    );
    follower.execute_block(&block1).unwrap();
    follower.execute_block(&block2).unwrap();
    assert_eq!(follower.head().unwrap(), master.head().unwrap());
}

#[test]
fn test_concurrent_duplicate_inject_admits_once() {
    let dir = tempdir().unwrap();
    let (config, keys) = chain_config(NodeMode::Master, 4);
    let visor = Arc::new(open_visor(dir.path(), config.clone()));
    visor.create_distribution_block(GENESIS_TIME + 10).unwrap();
    let tx = transfer(&visor, &keys[0], config.distribution.addresses[1], DROPLETS_PER_COIN);

    let workers: Vec<_> = (0..8)
        .map(|_| {
            let visor = Arc::clone(&visor);
            let tx = tx.clone();
            thread::spawn(move || visor.inject_transaction(tx, GENESIS_TIME + 20).unwrap())
        })
        .collect();
    let admitted = workers
        .into_iter()
        .map(|w| w.join().unwrap())
        .filter(|added| *added)
        .count();
    assert_eq!(admitted, 1);
    assert_eq!(visor.get_unconfirmed().len(), 1);
}

#[test]
fn test_follower_bootstraps_genesis_from_block() {
    let dir = tempdir().unwrap();
    let (config, _) = chain_config(NodeMode::Master, 4);
    let master = open_visor(dir.path(), config.clone());

    let follower_dir = tempdir().unwrap();
    let follower = open_visor(follower_dir.path(), follower_of(&config));
    assert_eq!(follower.state(), VisorState::Bootstrapping);
    assert_eq!(follower.head_seq(), None);

    // a genesis block with the right content but a bad signature is refused
    let unsigned = genesis_block(&config.genesis).unwrap();
    let forged = unsigned.sign(&generate_key_pair().0).unwrap();
    assert!(follower.execute_block(&forged).is_err());
    assert_eq!(follower.state(), VisorState::Bootstrapping);

    let genesis = master.get_block(0).unwrap().unwrap();
    follower.execute_block(&genesis).unwrap();
    assert_eq!(follower.state(), VisorState::Synced);
    assert_eq!(follower.genesis_hash(), master.genesis_hash());
}

#[test]
fn test_chain_survives_reopen() {
    let dir = tempdir().unwrap();
    let (config, keys) = chain_config(NodeMode::Master, 4);
    let to = config.distribution.addresses[1];
    let txid = {
        let visor = open_visor(dir.path(), config.clone());
        visor.create_distribution_block(GENESIS_TIME + 10).unwrap();
        let tx = transfer(&visor, &keys[0], to, DROPLETS_PER_COIN);
        visor.inject_transaction(tx.clone(), GENESIS_TIME + 20).unwrap();
        visor.create_and_execute_block(GENESIS_TIME + 20).unwrap();
        visor.flush().unwrap();
        tx.hash()
    };

    let visor: Visor = open_visor(dir.path(), config.clone());
    assert_eq!(visor.head_seq(), Some(2));
    assert_eq!(visor.total_coins(), config.max_supply);
    assert!(visor.get_transaction(&txid).unwrap().is_some());
    assert_eq!(visor.get_address_outputs(&to).unwrap().len(), 2);
}
