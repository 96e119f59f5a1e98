//! Fetch a JSON document and print it
//!
//! `cargo run --example fetch_json -- https://httpbin.org/get`

use net::{Client, RequestDescriptor};
use serde_json::Map;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://httpbin.org/get".to_string());
    let client = Client::new()?;

    let body = client.get(&url, &Map::new()).await?;
    println!("{}", serde_json::to_string_pretty(&body)?);

    let echoed = client
        .ajax(
            RequestDescriptor::new(url.as_str())
                .field("from", "fetch_json")
                .on_error(|e| eprintln!("ajax failed: {}", e)),
        )
        .await;
    println!("ajax returned a body: {}", echoed.is_some());
    Ok(())
}
