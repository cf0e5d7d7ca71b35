pub(crate) const DEFAULT_LISTEN: &str = "0.0.0.0:5001";
pub(crate) const DEFAULT_MINE_INTERVAL_SECS: u64 = 30;
pub(crate) const DEFAULT_RESOLVE_INTERVAL_SECS: u64 = 30;
pub(crate) const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 5;
/// Random bytes in a generated node identifier (hex-encoded to twice as many chars).
pub(crate) const NODE_ID_BYTES: usize = 16;
