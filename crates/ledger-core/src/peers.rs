use std::collections::HashSet;

use crate::error::PeerError;
use tracing::debug;

/// Known peers, stored as normalized `host:port` strings.
///
/// Iteration order is unspecified.
#[derive(Clone, Debug, Default)]
pub struct PeerRegistry {
    peers: HashSet<String>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `address` and returns its normalized form. Registering a peer twice
    /// is a no-op.
    pub fn register(&mut self, address: &str) -> Result<String, PeerError> {
        let normalized = normalize_address(address)?;
        if self.peers.insert(normalized.clone()) {
            debug!(peer = %normalized, "registered peer");
        }
        Ok(normalized)
    }

    pub fn peers(&self) -> impl Iterator<Item = &str> + '_ {
        self.peers.iter().map(String::as_str)
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.peers.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

/// Reduces `http://Host:5000/path`, `host:5000` and similar to `host:5000`.
pub fn normalize_address(address: &str) -> Result<String, PeerError> {
    let trimmed = address.trim();
    let without_scheme = trimmed
        .split_once("://")
        .map_or(trimmed, |(_, rest)| rest);
    let authority = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    let authority = authority
        .rsplit_once('@')
        .map_or(authority, |(_, host_port)| host_port);

    let (host, port) = authority
        .rsplit_once(':')
        .ok_or_else(|| PeerError::InvalidPort(address.to_string()))?;
    if host.is_empty() {
        return Err(PeerError::MissingHost(address.to_string()));
    }
    let port: u16 = port
        .parse()
        .ok()
        .filter(|port| *port != 0)
        .ok_or_else(|| PeerError::InvalidPort(address.to_string()))?;

    Ok(format!("{}:{port}", host.to_ascii_lowercase()))
}
