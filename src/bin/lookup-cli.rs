use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "lookup-cli")]
#[command(about = "Management CLI for the link lookup service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    /// Shared secret sent in the API key header.
    #[arg(short, long, env = "API_KEY", hide_env_values = true)]
    key: Option<String>,

    #[arg(long, default_value = "x-api-key")]
    header: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show loaded record count and source path
    Health,
    /// Look up the link for an email
    Lookup {
        email: String,
        /// Use the authenticated POST endpoint instead of GET
        #[arg(long)]
        post: bool,
    },
    /// Reload the table, optionally from a different source path
    Reload {
        #[arg(long)]
        path: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(key) = &cli.key {
        headers.insert(
            reqwest::header::HeaderName::from_bytes(cli.header.as_bytes())?,
            HeaderValue::from_str(key)?,
        );
    }

    let res = match cli.command {
        Commands::Health => client.get(format!("{}/health", cli.url)).send().await?,
        Commands::Lookup { email, post: false } => {
            client
                .get(format!("{}/lookup", cli.url))
                .query(&[("email", email)])
                .send()
                .await?
        }
        Commands::Lookup { email, post: true } => {
            client
                .post(format!("{}/lookup", cli.url))
                .headers(headers)
                .json(&json!({ "email": email }))
                .send()
                .await?
        }
        Commands::Reload { path } => {
            client
                .post(format!("{}/reload", cli.url))
                .headers(headers)
                .json(&json!({ "path": path }))
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let body: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    if !status.is_success() {
        return Err(format!("request failed with status {}", status).into());
    }
    Ok(())
}
