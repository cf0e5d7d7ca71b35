pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;

/// Leading `'0'` hex digits a proof-of-work digest must start with.
pub const POW_TARGET_DIFFICULTY: usize = 4;
/// Nonces checked per parallel batch before the cancel flag is polled again.
pub const POW_BATCH_SIZE: u64 = 1 << 14;

pub const GENESIS_INDEX: u64 = 1;
pub const GENESIS_NONCE: u64 = 1337;
/// Stands in for the previous hash of the genesis block; never a real digest.
pub const GENESIS_PREVIOUS_HASH: &str = "1";
pub const GENESIS_MINER_MESSAGE: &str = "Something with chancelors, banks & bailouts";

/// Sender of system-minted reward transactions.
pub const SYSTEM_SENDER: &str = "0";
pub const REWARD_DATA: &str = "mining reward";
pub const DEFAULT_MINER_MESSAGE: &str = "miner_message";
pub const INITIAL_REWARD: f64 = 100.0;
pub const HALVING_INTERVAL: u64 = 100;
