//! Longest-valid-chain reconciliation against known peers.
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::chain::Ledger;
use crate::error::FetchError;
use crate::peers::PeerRegistry;
use crate::Block;

/// A peer's answer to "send me your chain"; also the body of `GET /chain`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeerChain {
    pub chain: Vec<Block>,
    pub length: usize,
}

impl PeerChain {
    pub fn new(chain: Vec<Block>) -> Self {
        Self {
            length: chain.len(),
            chain,
        }
    }
}

/// Source of remote chains. Any error means "this peer has nothing better".
pub trait ChainFetcher {
    fn fetch_chain(&self, peer: &str) -> Result<PeerChain, FetchError>;
}

impl<F> ChainFetcher for F
where
    F: Fn(&str) -> Result<PeerChain, FetchError>,
{
    fn fetch_chain(&self, peer: &str) -> Result<PeerChain, FetchError> {
        self(peer)
    }
}

pub struct ConsensusResolver;

impl ConsensusResolver {
    /// Runs one consensus round. Returns `true` when the local chain was replaced.
    pub fn resolve<F>(ledger: &mut Ledger, peers: &PeerRegistry, fetcher: &F) -> bool
    where
        F: ChainFetcher + ?Sized,
    {
        let responses = peers
            .peers()
            .map(|peer| (peer.to_string(), fetcher.fetch_chain(peer)));
        match Self::select_best(ledger, responses) {
            Some(chain) => Self::adopt(ledger, chain),
            None => false,
        }
    }

    /// Picks the longest valid chain strictly longer than the local one.
    ///
    /// Peers arrive in whatever order the caller produced them. When several
    /// peers offer equally long valid chains the first one seen wins, since a
    /// later one is no longer strictly longer; with an unordered peer set that
    /// choice is not deterministic.
    pub fn select_best<I>(ledger: &Ledger, responses: I) -> Option<Vec<Block>>
    where
        I: IntoIterator<Item = (String, Result<PeerChain, FetchError>)>,
    {
        let mut max_length = ledger.height();
        let mut best = None;

        for (peer, response) in responses {
            let remote = match response {
                Ok(remote) => remote,
                Err(err) => {
                    warn!(%peer, error = %err, "skipping peer");
                    continue;
                }
            };
            if remote.length != remote.chain.len() {
                warn!(
                    %peer,
                    reported = remote.length,
                    actual = remote.chain.len(),
                    "skipping peer: length does not match chain"
                );
                continue;
            }
            if remote.length <= max_length {
                debug!(%peer, length = remote.length, max_length, "peer chain is not longer");
                continue;
            }
            match ledger.check_chain(&remote.chain) {
                Ok(()) => {
                    debug!(%peer, length = remote.length, "new best candidate");
                    max_length = remote.length;
                    best = Some(remote.chain);
                }
                Err(err) => debug!(%peer, error = %err, "rejecting invalid chain"),
            }
        }
        best
    }

    /// Replaces the local chain with a candidate from [`Self::select_best`].
    pub fn adopt(ledger: &mut Ledger, chain: Vec<Block>) -> bool {
        let height = chain.len();
        match ledger.replace_chain(chain) {
            Ok(()) => {
                info!(height, "local chain replaced by longer peer chain");
                true
            }
            Err(err) => {
                warn!(error = %err, "could not adopt peer chain");
                false
            }
        }
    }
}
