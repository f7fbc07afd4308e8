use clap::{Parser, Subcommand};
use reqwest::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ORIGIN,
};
use reqwest::Method;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "passport-cli")]
#[command(about = "Query a running passport score proxy", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the score for an address
    Score { address: String },
    /// Send a CORS preflight for an address and print the granted headers
    Preflight {
        address: String,
        #[arg(long, default_value = "https://example.com")]
        origin: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Score { address } => {
            let res = client
                .get(format!("{}/api/gitcoin/{}", base, address))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Preflight { address, origin } => {
            let res = client
                .request(Method::OPTIONS, format!("{}/api/gitcoin/{}", base, address))
                .header(ORIGIN, origin)
                .send()
                .await?;
            println!("Status: {}", res.status());
            for name in [
                ACCESS_CONTROL_ALLOW_ORIGIN,
                ACCESS_CONTROL_ALLOW_METHODS,
                ACCESS_CONTROL_ALLOW_HEADERS,
            ] {
                let value = res
                    .headers()
                    .get(&name)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("(missing)");
                println!("{}: {}", name, value);
            }
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: proxy returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    if let Some(cache) = res.headers().get(reqwest::header::CACHE_CONTROL) {
        eprintln!("Cache-Control: {}", cache.to_str().unwrap_or("(binary)"));
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
