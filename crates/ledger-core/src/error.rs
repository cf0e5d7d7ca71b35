use thiserror::Error;

/// Rejections raised while admitting data into the ledger.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LedgerError {
    #[error("transaction recipient must not be empty")]
    MissingRecipient,
    #[error("transaction amount must be a finite, non-negative number, got {0}")]
    InvalidAmount(f64),
    #[error("refusing to replace the chain with an empty one")]
    EmptyChain,
}

/// First violation found while walking a candidate chain.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("candidate chain is empty")]
    Empty,
    #[error("block {index}: previous hash {found} does not match {expected}")]
    PreviousHashMismatch {
        index: u64,
        expected: String,
        found: String,
    },
    #[error("block {index}: nonce {nonce} is not a valid proof for {previous_nonce}")]
    InvalidProof {
        index: u64,
        previous_nonce: u64,
        nonce: u64,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PeerError {
    #[error("invalid peer address {0:?}: missing host")]
    MissingHost(String),
    #[error("invalid peer address {0:?}: missing or invalid port")]
    InvalidPort(String),
}

/// Why a peer's chain could not be obtained. Always non-fatal to a consensus round.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("peer {peer} unreachable: {reason}")]
    Unreachable { peer: String, reason: String },
    #[error("peer {peer} answered with status {status}")]
    Status { peer: String, status: u16 },
    #[error("peer {peer} sent a malformed chain: {reason}")]
    Malformed { peer: String, reason: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MineError {
    #[error("proof-of-work search was cancelled")]
    Cancelled,
    #[error("chain tip moved from block {expected} while mining; solution discarded")]
    StaleTip { expected: u64 },
}
