//! Request gateway in front of the visor.
//!
//! External callers (RPC, GUI, tests) never touch the visor directly.
//! Requests go into a bounded queue drained by a fixed set of worker
//! threads; each request carries a oneshot channel for its reply.

use crate::cipher::{Address, Sha256};
use crate::config::GatewayConfig;
use crate::core::{SignedBlock, Transaction, UxOut};
use crate::error::{BlockchainError, Result};
use crate::storage::{UnconfirmedTxn, UxOutRecord};
use crate::utils::current_timestamp;
use crate::visor::ledger::{TransactionStatus, UnspentFilter, Visor};
use log::{debug, info};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;
use tokio::sync::{mpsc, oneshot};

type Job = Box<dyn FnOnce(&Visor) + Send + 'static>;

#[derive(Clone)]
pub struct Gateway {
    jobs: mpsc::Sender<Job>,
}

impl Gateway {
    /// Spawns `config.workers` worker threads sharing one queue of
    /// `config.queue_size` pending requests. Workers exit once every
    /// `Gateway` handle is dropped.
    pub fn start(visor: Arc<Visor>, config: &GatewayConfig) -> Result<Gateway> {
        if config.workers == 0 || config.queue_size == 0 {
            return Err(BlockchainError::Config(
                "gateway needs at least one worker and queue slot".to_string(),
            ));
        }
        let (jobs, rx) = mpsc::channel::<Job>(config.queue_size);
        let rx = Arc::new(Mutex::new(rx));

        for id in 0..config.workers {
            let rx = Arc::clone(&rx);
            let visor = Arc::clone(&visor);
            thread::Builder::new()
                .name(format!("gateway-{id}"))
                .spawn(move || loop {
                    // the lock is released before the job runs
                    let job = rx.lock().blocking_recv();
                    match job {
                        Some(job) => job(&visor),
                        None => {
                            debug!("Gateway worker {id} exiting");
                            break;
                        }
                    }
                })?;
        }
        info!(
            "Gateway started with {} workers, queue size {}",
            config.workers, config.queue_size
        );
        Ok(Gateway { jobs })
    }

    async fn call<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Visor) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply, rx) = oneshot::channel();
        let job: Job = Box::new(move |visor| {
            // the caller may have given up waiting
            let _ = reply.send(f(visor));
        });
        self.jobs
            .send(job)
            .await
            .map_err(|_| BlockchainError::Shutdown)?;
        rx.await.map_err(|_| BlockchainError::Shutdown)?
    }

    pub async fn get_last_blocks(&self, n: u64) -> Result<Vec<SignedBlock>> {
        self.call(move |v| v.get_last_blocks(n)).await
    }

    pub async fn get_blocks(&self, start: u64, end: u64) -> Result<Vec<SignedBlock>> {
        self.call(move |v| v.get_blocks(start, end)).await
    }

    pub async fn get_blocks_in_depth(&self, seqs: Vec<u64>) -> Result<Vec<SignedBlock>> {
        self.call(move |v| v.get_blocks_in_depth(&seqs)).await
    }

    pub async fn get_unspent_outputs(&self, filter: UnspentFilter) -> Result<Vec<(Sha256, UxOut)>> {
        self.call(move |v| Ok(v.get_unspent_outputs(&filter))).await
    }

    pub async fn get_transaction(&self, txid: Sha256) -> Result<Option<TransactionStatus>> {
        self.call(move |v| v.get_transaction(&txid)).await
    }

    /// Validates `tx` against the current chain and admits it to the
    /// candidate pool. Returns false if it was already pending.
    pub async fn inject_transaction(&self, tx: Transaction) -> Result<bool> {
        self.call(move |v| v.inject_transaction(tx, current_timestamp()?))
            .await
    }

    pub async fn get_address_outputs(&self, address: Address) -> Result<Vec<UxOutRecord>> {
        self.call(move |v| v.get_address_outputs(&address)).await
    }

    pub async fn get_time_now(&self) -> Result<u64> {
        self.call(|_| current_timestamp()).await
    }

    pub async fn get_head(&self) -> Result<Option<(u64, Sha256)>> {
        self.call(|v| v.head()).await
    }

    pub async fn get_unconfirmed(&self) -> Result<Vec<UnconfirmedTxn>> {
        self.call(|v| Ok(v.get_unconfirmed())).await
    }

    /// Signs and commits a block from the candidate pool. Only nodes
    /// holding the blockchain key may do this.
    pub async fn create_block(&self) -> Result<Option<SignedBlock>> {
        self.call(|v| v.create_and_execute_block(current_timestamp()?))
            .await
    }
}
