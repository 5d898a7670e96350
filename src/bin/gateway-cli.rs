use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Command-line client for the ENS asset gateway", long_about = None)]
struct Cli {
    #[arg(short, long, env = "GATEWAY_URL", default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve an address or name (alice.eth, alice.base.eth, alice.base, alice)
    Resolve { identifier: String },
    /// Send ETH, or an ERC-20 token with --token
    Send {
        recipient: String,
        amount: String,
        /// ERC-20 contract address; omit for ETH
        #[arg(long)]
        token: Option<String>,
        /// Token decimals; read from the contract when omitted
        #[arg(long, requires = "token")]
        decimals: Option<u8>,
    },
    /// Show per-network reachability
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Resolve { identifier } => {
            client
                .post(format!("{}/resolve", base))
                .json(&json!({ "identifier": identifier }))
                .send()
                .await?
        }
        Commands::Send {
            recipient,
            amount,
            token,
            decimals,
        } => {
            let mut body = json!({
                "recipient": recipient,
                "amount": amount,
                "isEth": token.is_none(),
            });
            if let Some(token) = token {
                body["tokenAddress"] = json!(token);
            }
            if let Some(decimals) = decimals {
                body["decimals"] = json!(decimals);
            }
            client
                .post(format!("{}/send-asset", base))
                .json(&body)
                .send()
                .await?
        }
        Commands::Health => client.get(format!("{}/health", base)).send().await?,
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    let rendered = match serde_json::from_str::<Value>(&text) {
        Ok(json) => serde_json::to_string_pretty(&json)?,
        Err(_) => text,
    };

    if status.is_success() {
        println!("{}", rendered);
        Ok(())
    } else {
        eprintln!("Error: gateway returned status {}", status);
        eprintln!("{}", rendered);
        std::process::exit(1);
    }
}
