use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use ledger_core::{
    peers::normalize_address, Block, LedgerError, PeerChain, PeerError, Transaction,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::state::{AppState, NodeError};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/mine", get(mine))
        .route("/transaction/new", post(new_transaction))
        .route("/chain", get(full_chain))
        .route("/miner/register", post(register_nodes))
        .route("/miner/nodes/resolve", get(consensus).post(consensus))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug)]
pub enum ApiError {
    InvalidInput(String),
    Conflict(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError::InvalidInput(err.to_string())
    }
}

impl From<PeerError> for ApiError {
    fn from(err: PeerError) -> Self {
        ApiError::InvalidInput(err.to_string())
    }
}

impl From<NodeError> for ApiError {
    fn from(err: NodeError) -> Self {
        match err {
            NodeError::Mine(err) => ApiError::Conflict(err.to_string()),
            NodeError::Join(err) => ApiError::Internal(err.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

#[derive(Serialize)]
struct MineResponse {
    message: &'static str,
    index: u64,
    transactions: Vec<Transaction>,
    nonce: u64,
    miner_message: String,
    previous_hash: String,
}

impl From<Block> for MineResponse {
    fn from(block: Block) -> Self {
        Self {
            message: "Forged new block.",
            index: block.index,
            transactions: block.transactions,
            nonce: block.nonce,
            miner_message: block.miner_message,
            previous_hash: block.previous_hash,
        }
    }
}

/// Body of `POST /transaction/new`; every field is required.
#[derive(Deserialize)]
struct TxIn {
    sender: Option<String>,
    recipient: Option<String>,
    #[serde(rename = "MYC")]
    amount: Option<f64>,
    #[serde(rename = "input")]
    data: Option<String>,
}

#[derive(Deserialize)]
struct RegisterIn {
    nodes: Option<Vec<String>>,
}

async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn mine(State(state): State<AppState>) -> Result<Json<MineResponse>, ApiError> {
    let block = state.mine().await.inspect_err(|err| {
        warn!(error = %err, "mining round failed");
    })?;
    Ok(Json(block.into()))
}

async fn new_transaction(
    State(state): State<AppState>,
    Json(tx): Json<TxIn>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(sender), Some(recipient), Some(amount), Some(data)) =
        (tx.sender, tx.recipient, tx.amount, tx.data)
    else {
        return Err(ApiError::InvalidInput("Missing values.".to_string()));
    };
    let index = state
        .ledger
        .write()
        .await
        .add_transaction(sender, recipient, amount, data)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": format!("Transaction will be added to the Block {index}") })),
    ))
}

async fn full_chain(State(state): State<AppState>) -> Json<PeerChain> {
    let chain = state.ledger.read().await.chain().to_vec();
    Json(PeerChain::new(chain))
}

async fn register_nodes(
    State(state): State<AppState>,
    Json(body): Json<RegisterIn>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(nodes) = body.nodes else {
        return Err(ApiError::InvalidInput(
            "Error: Please supply list of valid nodes".to_string(),
        ));
    };
    // Reject the whole batch before touching the registry.
    for node in &nodes {
        normalize_address(node)?;
    }

    let mut peers = state.peers.write().await;
    for node in &nodes {
        peers.register(node)?;
    }
    let mut total_nodes = peers.snapshot();
    total_nodes.sort_unstable();
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "New nodes have been added.",
            "total_nodes": total_nodes,
        })),
    ))
}

async fn consensus(State(state): State<AppState>) -> Json<serde_json::Value> {
    let replaced = state.resolve().await;
    let chain = state.ledger.read().await.chain().to_vec();
    if replaced {
        Json(json!({ "message": "Our chain was replaced.", "new_chain": chain }))
    } else {
        Json(json!({ "message": "Our chain is authoritative.", "chain": chain }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::HttpChainFetcher;
    use axum_test::TestServer;
    use ledger_core::{constants::SYSTEM_SENDER, Ledger, Miner, PeerRegistry, ProofOfWork};
    use serde_json::Value;
    use std::time::Duration;

    fn test_state(node_id: &str) -> AppState {
        AppState::new(
            Ledger::with_proof_of_work(ProofOfWork::new(2)),
            PeerRegistry::new(),
            Miner::new(node_id),
            HttpChainFetcher::new(Duration::from_secs(2)).expect("http client"),
        )
    }

    fn test_server(state: AppState) -> TestServer {
        TestServer::new(router(state)).expect("Failed to create test server")
    }

    #[tokio::test]
    async fn test_health_and_genesis_chain() {
        let server = test_server(test_state("node-a"));

        let response = server.get("/health").await;
        assert_eq!(response.status_code(), 200);
        let json: Value = response.json();
        assert_eq!(json["status"], "ok");

        let response = server.get("/chain").await;
        assert_eq!(response.status_code(), 200);
        let chain: PeerChain = response.json();
        assert_eq!(chain.length, 1);
        assert_eq!(chain.chain[0].index, 1);
        assert_eq!(chain.chain[0].nonce, 1337);
    }

    #[tokio::test]
    async fn test_new_transaction() {
        let server = test_server(test_state("node-a"));

        let response = server
            .post("/transaction/new")
            .json(&json!({ "sender": "alice", "recipient": "bob", "MYC": 5, "input": "rent" }))
            .await;
        assert_eq!(response.status_code(), 201);
        let json: Value = response.json();
        assert_eq!(json["message"], "Transaction will be added to the Block 2");

        let response = server
            .post("/transaction/new")
            .json(&json!({ "sender": "alice", "recipient": "bob" }))
            .await;
        assert_eq!(response.status_code(), 400);
        let json: Value = response.json();
        assert_eq!(json["error"], "Missing values.");

        let response = server
            .post("/transaction/new")
            .json(&json!({ "sender": "alice", "recipient": "", "MYC": 5, "input": "" }))
            .await;
        assert_eq!(response.status_code(), 400);
    }

    #[tokio::test]
    async fn test_mine_forges_block_with_reward() {
        let state = test_state("node-a");
        let server = test_server(state.clone());

        server
            .post("/transaction/new")
            .json(&json!({ "sender": "alice", "recipient": "bob", "MYC": 1.5, "input": "tea" }))
            .await;

        let response = server.get("/mine").await;
        assert_eq!(response.status_code(), 200);
        let json: Value = response.json();
        assert_eq!(json["message"], "Forged new block.");
        assert_eq!(json["index"], 2);
        assert_eq!(json["miner_message"], "miner_message");
        let txs = json["transactions"].as_array().unwrap();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0]["input"], "tea");
        assert_eq!(txs[1]["sender"], SYSTEM_SENDER);
        assert_eq!(txs[1]["recipient"], "node-a");
        assert_eq!(txs[1]["MYC"], 100.0);

        let ledger = state.ledger.read().await;
        assert_eq!(ledger.height(), 2);
        assert!(ledger.pending().is_empty());
        assert!(ledger.validate_chain(ledger.chain()));
    }

    #[tokio::test]
    async fn test_register_nodes() {
        let server = test_server(test_state("node-a"));

        let response = server
            .post("/miner/register")
            .json(&json!({ "nodes": ["http://127.0.0.1:5002", "127.0.0.1:5002", "http://127.0.0.1:5003"] }))
            .await;
        assert_eq!(response.status_code(), 201);
        let json: Value = response.json();
        assert_eq!(json["message"], "New nodes have been added.");
        assert_eq!(
            json["total_nodes"],
            json!(["127.0.0.1:5002", "127.0.0.1:5003"])
        );

        let response = server.post("/miner/register").json(&json!({})).await;
        assert_eq!(response.status_code(), 400);
        let json: Value = response.json();
        assert_eq!(json["error"], "Error: Please supply list of valid nodes");

        let response = server
            .post("/miner/register")
            .json(&json!({ "nodes": ["http://127.0.0.1:5004", "http://nowhere"] }))
            .await;
        assert_eq!(response.status_code(), 400);
        let json: Value = response.json();
        assert!(json["error"].as_str().unwrap().contains("nowhere"));
    }

    #[tokio::test]
    async fn test_resolve_without_peers_is_authoritative() {
        let server = test_server(test_state("node-a"));
        let response = server.get("/miner/nodes/resolve").await;
        assert_eq!(response.status_code(), 200);
        let json: Value = response.json();
        assert_eq!(json["message"], "Our chain is authoritative.");
        assert_eq!(json["chain"].as_array().unwrap().len(), 1);

        let response = server.post("/miner/nodes/resolve").await;
        assert_eq!(response.status_code(), 200);
    }

    #[tokio::test]
    async fn test_resolve_adopts_longer_peer_chain() {
        // Peer node with three mined blocks, served over real TCP.
        let peer_state = test_state("node-b");
        for _ in 0..3 {
            peer_state.mine().await.expect("peer mines");
        }
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let peer_addr = listener.local_addr().unwrap();
        let peer_app = router(peer_state.clone());
        tokio::spawn(async move { axum::serve(listener, peer_app).await });

        let state = test_state("node-a");
        let server = test_server(state.clone());
        server
            .post("/miner/register")
            .json(&json!({ "nodes": [format!("http://{peer_addr}"), "127.0.0.1:1"] }))
            .await;

        let response = server.get("/miner/nodes/resolve").await;
        assert_eq!(response.status_code(), 200);
        let json: Value = response.json();
        assert_eq!(json["message"], "Our chain was replaced.");
        assert_eq!(json["new_chain"].as_array().unwrap().len(), 4);

        let local = state.ledger.read().await.chain().to_vec();
        let remote = peer_state.ledger.read().await.chain().to_vec();
        assert_eq!(local, remote);

        // Equal length now: a second round keeps the local chain.
        let response = server.get("/miner/nodes/resolve").await;
        let json: Value = response.json();
        assert_eq!(json["message"], "Our chain is authoritative.");
    }
}
