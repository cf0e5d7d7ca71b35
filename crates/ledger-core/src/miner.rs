use std::sync::atomic::AtomicBool;

use crate::chain::Ledger;
use crate::constants::{DEFAULT_MINER_MESSAGE, HALVING_INTERVAL, INITIAL_REWARD};
use crate::error::MineError;
use crate::mine::solve_parallel;
use crate::pow::ProofOfWork;
use crate::{Block, Hash, Transaction};
use tracing::info;

/// Reward for mining the block at `index`: `100 / 2^floor(index / 100)`.
///
/// Every halving of a power-of-two fraction is exact in `f64`, so rewards are
/// exact until they underflow to `0.0` at block index 107 500.
pub fn block_reward(index: u64) -> f64 {
    let halvings = i32::try_from(index / HALVING_INTERVAL).unwrap_or(i32::MAX);
    INITIAL_REWARD * 0.5f64.powi(halvings)
}

/// Snapshot of the chain tip a mining round builds on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MiningJob {
    pub tip_index: u64,
    pub tip_hash: Hash,
    pub previous_nonce: u64,
    pub pow: ProofOfWork,
}

impl MiningJob {
    pub fn next_index(&self) -> u64 {
        self.tip_index + 1
    }

    /// Parallel search for the smallest valid nonce; stops early if `cancel` is raised.
    pub fn solve(&self, cancel: &AtomicBool) -> Result<u64, MineError> {
        solve_parallel(&self.pow, self.previous_nonce, cancel)
    }
}

#[derive(Clone, Debug)]
pub struct Miner {
    recipient: String,
    message: String,
}

impl Miner {
    /// `recipient` receives the block rewards, normally the node identifier.
    pub fn new(recipient: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            message: DEFAULT_MINER_MESSAGE.to_string(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// One full mining round on an exclusively borrowed ledger.
    pub fn mine_once(&self, ledger: &mut Ledger) -> Block {
        let job = self.prepare(ledger);
        let nonce = job.pow.solve(job.previous_nonce);
        self.commit(ledger, &job, nonce)
    }

    pub fn prepare(&self, ledger: &Ledger) -> MiningJob {
        let last = ledger.last_block();
        MiningJob {
            tip_index: last.index,
            tip_hash: last.hash(),
            previous_nonce: last.nonce,
            pow: *ledger.proof_of_work(),
        }
    }

    /// Seals a block for a solved `job`, unless the chain tip moved in the meantime.
    pub fn seal(&self, ledger: &mut Ledger, job: &MiningJob, nonce: u64) -> Result<Block, MineError> {
        let last = ledger.last_block();
        if last.index != job.tip_index || last.hash() != job.tip_hash {
            return Err(MineError::StaleTip {
                expected: job.tip_index,
            });
        }
        Ok(self.commit(ledger, job, nonce))
    }

    fn commit(&self, ledger: &mut Ledger, job: &MiningJob, nonce: u64) -> Block {
        let reward = block_reward(job.next_index());
        ledger.enqueue(Transaction::reward(self.recipient.as_str(), reward));
        let block = ledger.new_block(nonce, self.message.as_str(), Some(job.tip_hash.clone()));
        info!(index = block.index, nonce, reward, "forged new block");
        block
    }
}
