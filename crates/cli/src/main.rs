use clap::Parser;
use cli::commands::{print_error, query_code, DEFAULT_SERVER_URL};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "cep-cli")]
#[command(about = "Looks up a Brazilian postal code (CEP) through the CEP race server")]
struct Cli {
    /// Postal code to look up, e.g. 01310100
    cep: String,

    /// Base URL of the race server
    #[arg(long, default_value = DEFAULT_SERVER_URL)]
    server: String,

    /// Request timeout in seconds
    #[arg(long, default_value = "10")]
    timeout: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let client = reqwest::Client::builder().timeout(Duration::from_secs(cli.timeout)).build()?;

    let mut stdout = std::io::stdout().lock();
    if let Err(e) = query_code(&client, &cli.server, &cli.cep, &mut stdout).await {
        print_error(&e.to_string());
    }

    Ok(())
}
