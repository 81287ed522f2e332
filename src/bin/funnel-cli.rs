use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "funnel-cli")]
#[command(about = "Management CLI for the signup funnel admin API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Admin secret.
    #[arg(short, long, env = "ADMIN_SECRET")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every signup, newest first
    Signups,
    /// Approve signups and send invites
    Approve {
        /// Signup IDs (UUIDs), at most 50
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Page view summary
    Analytics {
        #[arg(short, long, default_value_t = 30)]
        days: u32,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let res = match cli.command {
        Commands::Signups => {
            client
                .get(format!("{base}/api/admin/signups"))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Approve { ids } => {
            client
                .post(format!("{base}/api/admin/approve"))
                .headers(headers)
                .json(&json!({ "ids": ids }))
                .send()
                .await?
        }
        Commands::Analytics { days } => {
            client
                .get(format!("{base}/api/admin/analytics"))
                .query(&[("days", days)])
                .headers(headers)
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: admin API returned status {}", status);
        if let Some(retry) = res.headers().get("retry-after").and_then(|v| v.to_str().ok()) {
            eprintln!("Retry after {retry}s");
        }
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
