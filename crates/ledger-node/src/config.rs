use std::time::Duration;

use clap::Parser;
use ledger_core::constants::{DEFAULT_MINER_MESSAGE, POW_TARGET_DIFFICULTY};

use crate::constants::{
    DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_LISTEN, DEFAULT_MINE_INTERVAL_SECS,
    DEFAULT_RESOLVE_INTERVAL_SECS, NODE_ID_BYTES,
};

#[derive(Parser, Debug, Clone)]
#[command(name = "ledger-node")]
#[command(about = "Minimal proof-of-work ledger node")]
pub struct Args {
    /// Address to listen on, e.g. 127.0.0.1:5001
    #[arg(long, default_value = DEFAULT_LISTEN)]
    pub listen: String,

    /// Identifier credited with mining rewards (random when omitted)
    #[arg(long)]
    pub node_id: Option<String>,

    /// Leading zero hex digits required of a proof-of-work digest
    #[arg(long, default_value_t = POW_TARGET_DIFFICULTY)]
    pub difficulty: usize,

    /// Message stamped into every block this node mines
    #[arg(long, default_value = DEFAULT_MINER_MESSAGE)]
    pub miner_message: String,

    /// Peer to register at startup, e.g. http://127.0.0.1:5002 (repeatable)
    #[arg(long = "peer")]
    pub peers: Vec<String>,

    /// Seconds between scheduled mining rounds; 0 disables the job
    #[arg(long, default_value_t = DEFAULT_MINE_INTERVAL_SECS)]
    pub mine_interval_secs: u64,

    /// Seconds between scheduled consensus rounds; 0 disables the job
    #[arg(long, default_value_t = DEFAULT_RESOLVE_INTERVAL_SECS)]
    pub resolve_interval_secs: u64,

    /// Per-peer timeout when fetching chains
    #[arg(long, default_value_t = DEFAULT_FETCH_TIMEOUT_SECS)]
    pub fetch_timeout_secs: u64,
}

impl Args {
    pub fn node_id(&self) -> String {
        self.node_id.clone().unwrap_or_else(generate_node_id)
    }

    pub fn mine_interval(&self) -> Duration {
        Duration::from_secs(self.mine_interval_secs)
    }

    pub fn resolve_interval(&self) -> Duration {
        Duration::from_secs(self.resolve_interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

pub fn generate_node_id() -> String {
    hex::encode(rand::random::<[u8; NODE_ID_BYTES]>())
}
