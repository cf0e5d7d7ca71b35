use std::time::Duration;

use anyhow::Result;
use ledger_core::{FetchError, PeerChain};
use reqwest::Client;

/// Fetches `GET http://{peer}/chain` from other nodes.
#[derive(Clone, Debug)]
pub struct HttpChainFetcher {
    client: Client,
}

impl HttpChainFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    pub async fn fetch_chain(&self, peer: &str) -> Result<PeerChain, FetchError> {
        let response = self
            .client
            .get(format!("http://{peer}/chain"))
            .send()
            .await
            .map_err(|err| FetchError::Unreachable {
                peer: peer.to_string(),
                reason: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                peer: peer.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .json::<PeerChain>()
            .await
            .map_err(|err| FetchError::Malformed {
                peer: peer.to_string(),
                reason: err.to_string(),
            })
    }
}
