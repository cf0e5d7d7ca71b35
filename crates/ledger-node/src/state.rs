use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use ledger_core::{Block, ConsensusResolver, Ledger, MineError, Miner, PeerRegistry};
use thiserror::Error;
use tokio::{
    sync::{Mutex, RwLock},
    task::JoinSet,
};
use tracing::{debug, warn};

use crate::fetch::HttpChainFetcher;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error(transparent)]
    Mine(#[from] MineError),
    #[error("mining task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Everything the routes and the periodic jobs share.
///
/// Writers of the ledger (new transactions, sealed blocks, chain replacement)
/// go through the write half of `ledger`. Proof-of-work runs on the blocking
/// pool without holding it.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<RwLock<Ledger>>,
    pub peers: Arc<RwLock<PeerRegistry>>,
    pub miner: Arc<Miner>,
    fetcher: HttpChainFetcher,
    mining: Arc<Mutex<()>>,
    cancel: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(ledger: Ledger, peers: PeerRegistry, miner: Miner, fetcher: HttpChainFetcher) -> Self {
        Self {
            ledger: Arc::new(RwLock::new(ledger)),
            peers: Arc::new(RwLock::new(peers)),
            miner: Arc::new(miner),
            fetcher,
            mining: Arc::new(Mutex::new(())),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// One mining round. Rounds are serialized; a round whose tip was replaced
    /// by consensus while solving fails with [`MineError::StaleTip`] or
    /// [`MineError::Cancelled`].
    pub async fn mine(&self) -> Result<Block, NodeError> {
        let _round = self.mining.lock().await;
        // Reset under the read guard; adoption raises `cancel` under the write lock.
        let job = {
            let ledger = self.ledger.read().await;
            self.cancel.store(false, Ordering::SeqCst);
            self.miner.prepare(&ledger)
        };

        let cancel = Arc::clone(&self.cancel);
        let solver = job.clone();
        let nonce = tokio::task::spawn_blocking(move || solver.solve(&cancel)).await??;

        let mut ledger = self.ledger.write().await;
        Ok(self.miner.seal(&mut ledger, &job, nonce)?)
    }

    /// One consensus round: fetch every peer concurrently, then pick and adopt
    /// the longest valid chain under the write lock.
    pub async fn resolve(&self) -> bool {
        let peers = self.peers.read().await.snapshot();
        let mut fetches = JoinSet::new();
        for peer in peers {
            let fetcher = self.fetcher.clone();
            fetches.spawn(async move {
                let result = fetcher.fetch_chain(&peer).await;
                (peer, result)
            });
        }

        let mut responses = Vec::with_capacity(fetches.len());
        while let Some(joined) = fetches.join_next().await {
            match joined {
                Ok(response) => responses.push(response),
                Err(err) => warn!(error = %err, "peer fetch task failed"),
            }
        }
        debug!(responses = responses.len(), "collected peer chains");

        let mut ledger = self.ledger.write().await;
        match ConsensusResolver::select_best(&ledger, responses) {
            Some(chain) => {
                self.cancel_mining();
                ConsensusResolver::adopt(&mut ledger, chain)
            }
            None => false,
        }
    }

    /// Asks a running proof-of-work search to stop.
    pub fn cancel_mining(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }
}
