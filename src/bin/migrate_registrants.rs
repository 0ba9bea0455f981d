//! One-time migration of registrants, seating assignments and add-ons from
//! the legacy AppSync API to the current one.
//!
//! Companies must be imported first (see `import-companies`); registrants keep
//! their legacy company ids.
//!
//! Usage:
//!   OLD_APPSYNC_GRAPHQL_ENDPOINT=... OLD_APPSYNC_API_KEY=... \
//!   AWS_APPSYNC_GRAPHQL_ENDPOINT=... AWS_APPSYNC_API_KEY=... \
//!   cargo run --bin migrate-registrants -- [--pool <concurrency>] [--report <path>]
//!
//! Without `--pool`, registrants are migrated in paced batches of 10.

use anyhow::{Context, Result, bail};
use aps_admin::backend::{AppSyncBackend, AppSyncLegacyBackend};
use aps_admin::graphql::{AppSyncConfig, GraphQlClient};
use aps_admin::migration::{MigrationConfig, MigrationReport, RegistrantMigration, Scheduling};
use std::env;
use std::fs;
use std::sync::Arc;

struct Args {
    pool: Option<usize>,
    report_path: Option<String>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        pool: None,
        report_path: None,
    };
    let mut iter = env::args().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--pool" => {
                let value = iter.next().context("--pool needs a concurrency value")?;
                args.pool = Some(value.parse().context("Invalid --pool value")?);
            }
            "--report" => {
                args.report_path = Some(iter.next().context("--report needs a path")?);
            }
            other => bail!(
                "Unknown argument: {}\nUsage: cargo run --bin migrate-registrants -- [--pool <concurrency>] [--report <path>]",
                other
            ),
        }
    }

    Ok(args)
}

fn print_summary(report: &MigrationReport) {
    println!();
    println!("Migration complete!");
    println!("  Migrated:         {}", report.success);
    println!("  Errors:           {}", report.errors.len());
    println!("  Warnings:         {}", report.warnings.len());
    println!("  Add-ons migrated: {}", report.add_ons_migrated);

    if !report.errors.is_empty() {
        println!();
        println!("Errors:");
        for e in &report.errors {
            println!("  {} <{}>: {}", e.id, e.email, e.error);
        }
    }
    if !report.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for w in &report.warnings {
            println!("  {} <{}>: {}", w.id, w.email, w.warning);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("info".parse().context("Invalid log directive")?),
        )
        .init();

    let args = parse_args()?;

    let legacy = GraphQlClient::new(AppSyncConfig::legacy_from_env()?);
    let current = GraphQlClient::new(AppSyncConfig::current_from_env()?);

    let mut config = MigrationConfig::default();
    if let Some(concurrency) = args.pool {
        config.scheduling = Scheduling::Pool { concurrency };
    }

    println!("Migration: legacy registrants -> {}", config.target_event_id);
    println!("Scheduling: {:?}", config.scheduling);
    println!();

    let migration = RegistrantMigration::new(
        Arc::new(AppSyncLegacyBackend::new(legacy)),
        Arc::new(AppSyncBackend::new(current)),
        config,
    );
    let report = migration.run().await.context("Migration failed")?;

    print_summary(&report);

    if let Some(path) = args.report_path {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        fs::write(&path, json).with_context(|| format!("Failed to write report to {}", path))?;
        println!();
        println!("Report written to {}", path);
    }

    Ok(())
}
