use crate::constants::{
    GENESIS_INDEX, GENESIS_MINER_MESSAGE, GENESIS_NONCE, GENESIS_PREVIOUS_HASH,
};
use crate::error::{ChainError, LedgerError};
use crate::pow::ProofOfWork;
use crate::{unix_timestamp, Block, Hash, Transaction};
use tracing::{debug, info};

/// The chain together with the pool of transactions waiting for the next block.
///
/// Every mutation takes `&mut self`, so callers sharing a ledger across tasks
/// must serialize writers (the node keeps it behind a `RwLock`). Sealing a
/// block drains the pool and appends in one call; no reader can observe one
/// without the other.
#[derive(Clone, Debug)]
pub struct Ledger {
    chain: Vec<Block>,
    pending: Vec<Transaction>,
    pow: ProofOfWork,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::with_proof_of_work(ProofOfWork::default())
    }

    /// A ledger holding only the genesis block, validating with `pow`.
    pub fn with_proof_of_work(pow: ProofOfWork) -> Self {
        Self {
            chain: vec![genesis_block()],
            pending: Vec::new(),
            pow,
        }
    }

    pub fn proof_of_work(&self) -> &ProofOfWork {
        &self.pow
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    /// Number of blocks, genesis included.
    pub fn height(&self) -> usize {
        self.chain.len()
    }

    pub fn last_block(&self) -> &Block {
        self.chain
            .last()
            .expect("ledger invariant: chain always holds the genesis block")
    }

    /// Seals the pending pool into a new block and appends it.
    ///
    /// `previous_hash` defaults to the digest of the current last block.
    pub fn new_block(
        &mut self,
        nonce: u64,
        miner_message: impl Into<String>,
        previous_hash: Option<Hash>,
    ) -> Block {
        let previous_hash = previous_hash.unwrap_or_else(|| self.last_block().hash());
        let block = Block {
            index: self.chain.len() as u64 + 1,
            timestamp: unix_timestamp(),
            transactions: std::mem::take(&mut self.pending),
            nonce,
            miner_message: miner_message.into(),
            previous_hash,
        };
        self.chain.push(block.clone());
        info!(
            index = block.index,
            nonce,
            txs = block.transactions.len(),
            "sealed block"
        );
        block
    }

    /// Queues a transaction and returns the index of the block it will land in.
    pub fn add_transaction(
        &mut self,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: f64,
        data: impl Into<String>,
    ) -> Result<u64, LedgerError> {
        self.submit(Transaction::new(sender, recipient, amount, data))
    }

    pub fn submit(&mut self, tx: Transaction) -> Result<u64, LedgerError> {
        tx.validate()?;
        Ok(self.enqueue(tx))
    }

    // System transactions skip validation.
    pub(crate) fn enqueue(&mut self, tx: Transaction) -> u64 {
        debug!(sender = %tx.sender, recipient = %tx.recipient, amount = tx.amount, "queued transaction");
        self.pending.push(tx);
        self.chain.len() as u64 + 1
    }

    pub fn validate_chain(&self, chain: &[Block]) -> bool {
        match self.check_chain(chain) {
            Ok(()) => true,
            Err(err) => {
                debug!(error = %err, "chain failed validation");
                false
            }
        }
    }

    /// Walks every adjacent pair of `chain` and reports the first broken link
    /// or invalid proof.
    pub fn check_chain(&self, chain: &[Block]) -> Result<(), ChainError> {
        if chain.is_empty() {
            return Err(ChainError::Empty);
        }
        chain.windows(2).try_for_each(|pair| {
            let (previous, block) = (&pair[0], &pair[1]);
            let expected = previous.hash();
            if block.previous_hash != expected {
                return Err(ChainError::PreviousHashMismatch {
                    index: block.index,
                    expected,
                    found: block.previous_hash.clone(),
                });
            }
            if !self.pow.validate(previous.nonce, block.nonce) {
                return Err(ChainError::InvalidProof {
                    index: block.index,
                    previous_nonce: previous.nonce,
                    nonce: block.nonce,
                });
            }
            Ok(())
        })
    }

    /// Swaps in `chain` wholesale. Callers validate first; only emptiness is checked here.
    pub fn replace_chain(&mut self, chain: Vec<Block>) -> Result<(), LedgerError> {
        if chain.is_empty() {
            return Err(LedgerError::EmptyChain);
        }
        info!(
            old_height = self.chain.len(),
            new_height = chain.len(),
            "replacing local chain"
        );
        self.chain = chain;
        Ok(())
    }
}

/// A transaction-free first block with the sentinel previous hash.
pub fn genesis_block() -> Block {
    Block {
        index: GENESIS_INDEX,
        timestamp: unix_timestamp(),
        transactions: vec![],
        nonce: GENESIS_NONCE,
        miner_message: GENESIS_MINER_MESSAGE.to_string(),
        previous_hash: GENESIS_PREVIOUS_HASH.to_string(),
    }
}
