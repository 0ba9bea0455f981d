//! Import companies from the exported company CSV into the current AppSync API.
//!
//! Usage:
//!   AWS_APPSYNC_GRAPHQL_ENDPOINT=... AWS_APPSYNC_API_KEY=... \
//!   cargo run --bin import-companies -- <eventId> [csvPath]
//!
//! `csvPath` defaults to `data/apsCompanies.csv`.

use anyhow::{Context, Result};
use aps_admin::backend::AppSyncBackend;
use aps_admin::companies::import_companies_from_csv;
use aps_admin::graphql::{AppSyncConfig, GraphQlClient};
use std::env;
use std::fs;

const DEFAULT_CSV_PATH: &str = "data/apsCompanies.csv";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: cargo run --bin import-companies -- <eventId> [csvPath]");
        std::process::exit(1);
    }
    let event_id = &args[1];
    let csv_path = args.get(2).map(String::as_str).unwrap_or(DEFAULT_CSV_PATH);

    let csv_text = fs::read_to_string(csv_path)
        .with_context(|| format!("Failed to import companies: cannot read {}", csv_path))?;
    let backend = AppSyncBackend::new(GraphQlClient::new(AppSyncConfig::current_from_env()?));

    println!("Importing companies from {} into {}", csv_path, event_id);
    let report = import_companies_from_csv(&backend, &csv_text, event_id).await;

    println!();
    println!("Import complete!");
    println!("  Imported: {}", report.success);
    println!("  Errors:   {}", report.errors.len());
    for e in &report.errors {
        println!("  {} ({}): {}", e.id, e.name, e.error);
    }

    Ok(())
}
