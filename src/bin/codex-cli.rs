use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "codex-cli")]
#[command(about = "Management CLI for the codex-link status API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:8081")]
    url: String,

    #[arg(short, long, env = "CODEX_LINK_API_KEY", default_value = "CHANGE_ME_IN_PRODUCTION")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show connectivity status for all domains, or one
    Status { domain: Option<String> },
    /// Probe the backend now for a domain
    Retry { domain: String },
    /// List proposals (backend or mock, depending on mode)
    Proposals,
    /// Approve a pending proposal
    Approve { id: String },
    /// Reject a pending proposal
    Reject { id: String },
    /// Show AI learning status
    Learning,
    /// Force a domain into real or mock mode (requires debug hooks)
    Force { domain: String, mode: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let base = cli.url.trim_end_matches('/').to_string();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );
    let client = reqwest::Client::builder()
        .default_headers(headers)
        .build()?;

    let request = match cli.command {
        Commands::Status { domain: None } => client.get(format!("{}/status", base)),
        Commands::Status { domain: Some(domain) } => {
            client.get(format!("{}/status/{}", base, domain))
        }
        Commands::Retry { domain } => client.post(format!("{}/retry/{}", base, domain)),
        Commands::Proposals => client.get(format!("{}/feeds/proposals", base)),
        Commands::Approve { id } => {
            client.post(format!("{}/feeds/proposals/{}/approve", base, id))
        }
        Commands::Reject { id } => client.post(format!("{}/feeds/proposals/{}/reject", base, id)),
        Commands::Learning => client.get(format!("{}/feeds/learning", base)),
        Commands::Force { domain, mode } => client
            .post(format!("{}/debug/mode/{}", base, domain))
            .json(&json!({ "mode": mode.to_ascii_lowercase() })),
    };

    print_response(request.send().await?).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: status API returned {}", status);
        if let Ok(text) = res.text().await {
            if !text.is_empty() {
                eprintln!("Response: {}", text);
            }
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
