use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

pub mod chain;
pub mod consensus;
pub mod constants;
pub mod error;
pub mod hash;
pub mod mine;
pub mod miner;
pub mod peers;
pub mod pow;

pub use chain::Ledger;
pub use consensus::{ChainFetcher, ConsensusResolver, PeerChain};
pub use error::{ChainError, FetchError, LedgerError, MineError, PeerError};
pub use miner::{block_reward, Miner, MiningJob};
pub use peers::PeerRegistry;
pub use pow::ProofOfWork;

/// Hex-encoded SHA-256 digest.
pub type Hash = String;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    #[serde(rename = "MYC")]
    pub amount: f64,
    #[serde(rename = "input")]
    pub data: String,
}

impl Transaction {
    pub fn new(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: f64,
        data: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
            data: data.into(),
        }
    }

    /// A system-minted transaction paying `amount` to `recipient`.
    pub fn reward(recipient: impl Into<String>, amount: f64) -> Self {
        Self::new(
            constants::SYSTEM_SENDER,
            recipient,
            amount,
            constants::REWARD_DATA,
        )
    }

    /// Structural checks only; balances and signatures are not tracked.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.recipient.trim().is_empty() {
            return Err(LedgerError::MissingRecipient);
        }
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(LedgerError::InvalidAmount(self.amount));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    /// Seconds since the Unix epoch, with sub-second precision.
    pub timestamp: f64,
    pub transactions: Vec<Transaction>,
    pub nonce: u64,
    pub miner_message: String,
    pub previous_hash: Hash,
}

impl Block {
    /// Digest of the block's canonical (sorted-key) JSON form.
    pub fn hash(&self) -> Hash {
        hash::digest(self)
    }
}

pub fn unix_timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or_default()
}
