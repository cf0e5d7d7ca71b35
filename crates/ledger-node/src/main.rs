use std::net::SocketAddr;

use anyhow::Context;
use clap::Parser;
use ledger_core::{Ledger, Miner, PeerRegistry, ProofOfWork};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod constants;
mod fetch;
mod jobs;
mod routes;
mod state;

use config::Args;
use fetch::HttpChainFetcher;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let node_id = args.node_id();

    let mut peers = PeerRegistry::new();
    for peer in &args.peers {
        peers
            .register(peer)
            .with_context(|| format!("invalid --peer {peer}"))?;
    }

    let ledger = Ledger::with_proof_of_work(ProofOfWork::new(args.difficulty));
    let miner = Miner::new(node_id.clone()).with_message(args.miner_message.clone());
    let fetcher = HttpChainFetcher::new(args.fetch_timeout())?;
    let state = AppState::new(ledger, peers, miner, fetcher);

    let jobs: Vec<_> = [
        jobs::spawn_mining(state.clone(), args.mine_interval()),
        jobs::spawn_consensus(state.clone(), args.resolve_interval()),
    ]
    .into_iter()
    .flatten()
    .collect();

    let app = routes::router(state.clone());
    let addr: SocketAddr = args.listen.parse()?;
    info!(%node_id, difficulty = args.difficulty, "ledger-node listening on http://{addr}");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shutting down");
    state.cancel_mining();
    for job in jobs {
        job.abort();
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
