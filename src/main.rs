use cexio::build_client;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Credentials and the default pair come from CEXIO_* variables when set
    let client = build_client(None)?;
    let pair = format!("{}/{}", client.config().ccy1(), client.config().ccy2());

    let price = client.last_price(None).await?;
    println!("Last price {}: {}", pair, price);

    let ticker = client.ticker(None).await?;
    println!("Ticker {}: {}", pair, serde_json::to_string_pretty(&ticker)?);

    if client.config().has_credentials() {
        match client.balance().await {
            Ok(balance) => println!("Balance: {}", balance),
            Err(e) => println!("Error fetching balance: {}", e),
        }
    }

    Ok(())
}
