#![allow(dead_code)]

use ledger_core::{Block, FetchError, Ledger, Miner, PeerChain, ProofOfWork};

pub const TEST_DIFFICULTY: usize = 2;

pub fn test_ledger() -> Ledger {
    Ledger::with_proof_of_work(ProofOfWork::new(TEST_DIFFICULTY))
}

/// A ledger mined up to `height` blocks, genesis included.
pub fn mined_ledger(height: usize, miner: &str) -> Ledger {
    let mut ledger = test_ledger();
    let miner = Miner::new(miner);
    while ledger.height() < height {
        ledger
            .add_transaction("alice", "bob", ledger.height() as f64, "payment")
            .expect("valid transaction");
        miner.mine_once(&mut ledger);
    }
    ledger
}

pub fn mined_chain(height: usize, miner: &str) -> Vec<Block> {
    mined_ledger(height, miner).chain().to_vec()
}

pub fn serve(chain: Vec<Block>) -> Result<PeerChain, FetchError> {
    Ok(PeerChain::new(chain))
}

pub fn refused(peer: &str) -> Result<PeerChain, FetchError> {
    Err(FetchError::Unreachable {
        peer: peer.to_string(),
        reason: "connection refused".to_string(),
    })
}

/// Serves `chain` the way a peer's `GET /chain` does: through its JSON body.
pub fn serve_json(chain: Vec<Block>) -> Result<PeerChain, FetchError> {
    let malformed = |err: serde_json::Error| FetchError::Malformed {
        peer: "json".to_string(),
        reason: err.to_string(),
    };
    let body = serde_json::to_string(&PeerChain::new(chain)).map_err(malformed)?;
    serde_json::from_str(&body).map_err(malformed)
}
