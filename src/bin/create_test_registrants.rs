//! Create 40 test registrants for an event, spread across its companies.
//!
//! Usage:
//!   AWS_APPSYNC_GRAPHQL_ENDPOINT=... AWS_APPSYNC_API_KEY=... \
//!   cargo run --bin create-test-registrants -- <eventId>

use anyhow::Result;
use aps_admin::backend::AppSyncBackend;
use aps_admin::graphql::{AppSyncConfig, GraphQlClient};
use aps_admin::test_registrants::create_test_registrants;
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: cargo run --bin create-test-registrants -- <eventId>");
        std::process::exit(1);
    }
    let event_id = &args[1];

    let backend = AppSyncBackend::new(GraphQlClient::new(AppSyncConfig::current_from_env()?));

    println!("Creating test registrants for {}", event_id);
    let report = create_test_registrants(&backend, event_id, &mut rand::rng()).await?;

    println!();
    println!("=== Summary ===");
    println!("Successfully created: {} registrants", report.created);
    println!("Errors: {}", report.failed);
    println!();
    println!("Distribution:");
    for (attendee_type, count) in &report.distribution {
        println!("  {}: {}", attendee_type, count);
    }

    Ok(())
}
