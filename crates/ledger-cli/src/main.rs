use anyhow::Result;
use clap::{Parser, Subcommand};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "ledger-cli")]
#[command(about = "CLI client for the minimal ledger node")]
struct Cli {
    /// Node base URL (e.g. http://127.0.0.1:5001)
    #[arg(long, global = true, default_value = "http://127.0.0.1:5001")]
    node: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a transaction
    Submit {
        /// Sender
        #[arg(long)]
        sender: String,
        /// Recipient
        #[arg(long)]
        recipient: String,
        /// Amount
        #[arg(long)]
        amount: f64,
        /// Free-form payload stored with the transaction
        #[arg(long, default_value = "")]
        data: String,
    },
    /// Print the node's full chain
    Chain,
    /// Run one mining round on the node
    Mine,
    /// Register peers with the node
    Register {
        /// Peer addresses, e.g. http://127.0.0.1:5002
        #[arg(required = true)]
        peers: Vec<String>,
    },
    /// Run one consensus round on the node
    Resolve,
}

#[derive(Serialize)]
struct Tx {
    sender: String,
    recipient: String,
    #[serde(rename = "MYC")]
    amount: f64,
    #[serde(rename = "input")]
    data: String,
}

#[derive(Serialize)]
struct Register {
    nodes: Vec<String>,
}

impl Command {
    fn request(self, client: &Client, node: &str) -> RequestBuilder {
        let node = node.trim_end_matches('/');
        match self {
            Command::Submit {
                sender,
                recipient,
                amount,
                data,
            } => client.post(format!("{node}/transaction/new")).json(&Tx {
                sender,
                recipient,
                amount,
                data,
            }),
            Command::Chain => client.get(format!("{node}/chain")),
            Command::Mine => client.get(format!("{node}/mine")),
            Command::Register { peers } => client
                .post(format!("{node}/miner/register"))
                .json(&Register { nodes: peers }),
            Command::Resolve => client.post(format!("{node}/miner/nodes/resolve")),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .pretty()
        .init();

    let cli = Cli::parse();
    let client = Client::new();
    let request = cli.cmd.request(&client, &cli.node).build()?;
    debug!(method = %request.method(), url = %request.url(), "sending request");

    let res = client.execute(request).await?;
    let status = res.status();
    let body = res.text().await?;
    println!("status: {}", status);
    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{body}"),
    }
    Ok(())
}
