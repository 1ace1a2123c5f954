use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "manager-cli")]
#[command(about = "Operator CLI for the exchange manager", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[arg(short, long, default_value = "CHANGE_ME_IN_PRODUCTION")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check manager system status
    Status,
    /// List registered exchanges
    List,
    /// Show one exchange
    Get { name: String },
    /// Declare a new exchange
    Declare {
        name: String,
        #[arg(long, default_value = "fanout")]
        mode: String,
        #[arg(long)]
        durable: bool,
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Delete an exchange
    Delete { name: String },
    /// Per-consumer status of an exchange
    ConsumerStatus { name: String },
    /// Reload one exchange (stops its consumers first)
    Reload { name: String },
    /// Reload the whole system (drain, then re-declare everything)
    ReloadAll,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    match cli.command {
        Commands::Status => {
            let res = client
                .get(format!("{}/system/status", cli.url))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::List => {
            let res = client
                .get(format!("{}/exchanges", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Get { name } => {
            let res = client
                .get(format!("{}/exchanges/{}", cli.url, name))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Declare {
            name,
            mode,
            durable,
            comment,
        } => {
            let body = json!({
                "name": name,
                "mode": mode,
                "durable": durable,
                "comment": comment,
            });
            let res = client
                .post(format!("{}/exchanges", cli.url))
                .headers(headers)
                .json(&body)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Delete { name } => {
            let res = client
                .delete(format!("{}/exchanges/{}", cli.url, name))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::ConsumerStatus { name } => {
            let res = client
                .get(format!("{}/exchanges/{}/status", cli.url, name))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Reload { name } => {
            let res = client
                .post(format!("{}/exchanges/{}/reload", cli.url, name))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::ReloadAll => {
            let res = client
                .post(format!("{}/system/reload", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: management API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
