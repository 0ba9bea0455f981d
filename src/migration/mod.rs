//! One-time migration of registrants from the legacy API to the new one.
//!
//! The run reads every legacy registrant up front, then migrates them in
//! paced batches. Each registrant is handled independently: its company is
//! checked, the record is mapped and written, then its seating assignment
//! and add-ons follow. Per-registrant failures end up in the returned
//! [`MigrationReport`]; only a failed legacy read aborts the run.

mod add_ons;
mod mapper;
mod reader;
mod report;
mod resolver;
mod writer;

pub use add_ons::AddOnCache;
pub use mapper::map_registrant;
pub use reader::read_all_registrants;
pub use report::{MigrationReport, RecordError, RecordWarning, RegistrantAddOns};

use crate::backend::{LegacyBackend, NewBackend};
use crate::batch;
use crate::configuration::{
    LEGACY_PAGE_PAUSE, MIGRATION_BATCH_PAUSE, MIGRATION_BATCH_SIZE, PAGE_SIZE, TARGET_EVENT_ID,
};
use crate::types::LegacyRegistrant;
use anyhow::Result;
use chrono::Utc;
use report::RegistrantOutcome;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Instrument, info, info_span, warn};
use writer::WriteResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheduling {
    /// Fixed-size batches, all members concurrent, pause between batches.
    Batches { size: usize, pause: Duration },
    /// One queue with at most `concurrency` registrants in flight.
    Pool { concurrency: usize },
}

#[derive(Debug, Clone)]
pub struct MigrationConfig {
    pub target_event_id: String,
    pub page_size: usize,
    pub page_pause: Duration,
    pub scheduling: Scheduling,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            target_event_id: TARGET_EVENT_ID.to_string(),
            page_size: PAGE_SIZE,
            page_pause: LEGACY_PAGE_PAUSE,
            scheduling: Scheduling::Batches {
                size: MIGRATION_BATCH_SIZE,
                pause: MIGRATION_BATCH_PAUSE,
            },
        }
    }
}

pub struct RegistrantMigration<L, N> {
    legacy: Arc<L>,
    backend: Arc<N>,
    config: MigrationConfig,
}

impl<L: LegacyBackend, N: NewBackend> RegistrantMigration<L, N> {
    pub fn new(legacy: Arc<L>, backend: Arc<N>, config: MigrationConfig) -> Self {
        Self {
            legacy,
            backend,
            config,
        }
    }

    /// Run the whole migration. Each call gets its own add-on cache.
    pub async fn run(&self) -> Result<MigrationReport> {
        let started_at = Utc::now();
        info!(
            target_event = %self.config.target_event_id,
            scheduling = ?self.config.scheduling,
            "Starting registrant migration"
        );

        let registrants = read_all_registrants(
            self.legacy.as_ref(),
            self.config.page_size,
            self.config.page_pause,
        )
        .await?;
        info!(registrants = registrants.len(), "Read legacy registrants");

        let cache = AddOnCache::new();
        let outcomes = match self.config.scheduling {
            Scheduling::Batches { size, pause } => {
                batch::for_each_in_batches(&registrants, size, pause, |r| {
                    let span = info_span!("registrant", id = %r.id);
                    self.migrate_one(r, &cache).instrument(span)
                })
                .await
            }
            Scheduling::Pool { concurrency } => {
                batch::for_each_bounded(&registrants, concurrency, |r| {
                    let span = info_span!("registrant", id = %r.id);
                    self.migrate_one(r, &cache).instrument(span)
                })
                .await
            }
        };

        let mut report = MigrationReport::default();
        for outcome in outcomes {
            report.record(outcome);
        }

        info!(
            success = report.success,
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            add_ons_migrated = report.add_ons_migrated,
            distinct_add_ons = cache.len(),
            elapsed_secs = (Utc::now() - started_at).num_seconds(),
            "Registrant migration complete"
        );

        Ok(report)
    }

    async fn migrate_one(
        &self,
        registrant: &LegacyRegistrant,
        cache: &AddOnCache,
    ) -> RegistrantOutcome {
        let mut outcome = RegistrantOutcome::new(&registrant.id, &registrant.email);
        let company_id = registrant
            .company_id
            .as_deref()
            .filter(|id| !id.is_empty());

        if let Some(company_id) = company_id
            && let Some(warning) = resolver::check_company(self.backend.as_ref(), company_id).await
        {
            outcome.warnings.push(warning);
        }

        let input = map_registrant(registrant, &self.config.target_event_id);
        match writer::write_registrant(self.backend.as_ref(), &input).await {
            WriteResult::Created(created) => {
                if let Some(warning) = writer::verify_company(&created, company_id) {
                    outcome.warnings.push(warning);
                }
            }
            WriteResult::AlreadyExists => {
                outcome
                    .warnings
                    .push("Registrant already exists, skipped create".to_string());
            }
            WriteResult::Failed(error) => {
                outcome.error = Some(error);
                return outcome;
            }
        }

        if let Some(seating_id) = registrant
            .seating_chart_registrant_id
            .as_deref()
            .filter(|id| !id.is_empty())
            && let Err(e) = resolver::migrate_seating(
                self.legacy.as_ref(),
                self.backend.as_ref(),
                &registrant.id,
                seating_id,
            )
            .await
        {
            warn!(error = %e, "Seating chart migration failed");
            outcome
                .warnings
                .push(format!("Seating chart migration failed: {:#}", e));
        }

        let add_ons = resolver::migrate_add_ons(
            self.legacy.as_ref(),
            self.backend.as_ref(),
            cache,
            &registrant.id,
            &self.config.target_event_id,
            self.config.page_size,
        )
        .await;
        outcome.warnings.extend(add_ons.warnings);
        outcome.add_on_ids = add_ons.add_on_ids;

        outcome
    }
}
