/*
[INPUT]:  PIPEDRIVE_API_TOKEN (and optional PIPEDRIVE_BASE_URL) from the environment
[OUTPUT]: Person lookups printed to stdout
[POS]:    Examples - persons queries through the core client
[UPDATE]: When adding new person endpoints
*/

use pipedrive_client::*;
use serde_json::json;

/// Example: look up persons by name, email and free-text search
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("=== Pipedrive Persons Example ===\n");

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return;
        }
    };

    let mut client = match PipedriveClient::with_config(config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create client: {}", e);
            return;
        }
    };
    println!("✓ Client created for {}\n", client.base_url());

    println!("Listing the first persons...");
    match client.persons().get_all(&json!({ "start": 0, "limit": 5 })).await {
        Ok(envelope) => println!("✓ Persons: {:?}", envelope.data()),
        Err(e) => println!("✗ Error: {}", e),
    }

    println!("\nSearching for \"Ada\"...");
    match client.persons().search("Ada").await {
        Ok(results) => println!("✓ {} result(s)", results.len()),
        Err(e) => println!("✗ Error: {}", e),
    }

    println!("\nLooking up ada@example.com...");
    match client.persons().get_by_email("ada@example.com").await {
        Ok(Some(person)) => println!("✓ Found: {}", person),
        Ok(None) => println!("✓ No person with that email"),
        Err(e) if e.is_rate_limited() => println!("✗ Still rate limited: {}", e),
        Err(e) => println!("✗ Error: {}", e),
    }

    println!("\n✓ Persons example complete");
}
