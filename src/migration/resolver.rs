//! Foreign-key resolution for one registrant: company, seating assignment
//! and add-ons.

use super::add_ons::AddOnCache;
use crate::backend::{LegacyBackend, NewBackend};
use crate::types::{RegistrantAddOnLink, SeatingChartRegistrantInput};
use anyhow::{Context, Result, bail};
use tracing::{info, warn};

/// Best-effort check that `company_id` exists in the new backend. Companies
/// are imported separately with their legacy ids, so the id is reused as is.
pub(crate) async fn check_company<N: NewBackend>(backend: &N, company_id: &str) -> Option<String> {
    match backend.get_company(company_id).await {
        Ok(Some(company)) if company.id == company_id => None,
        Ok(Some(company)) => Some(format!(
            "Company lookup for {} returned {}",
            company_id, company.id
        )),
        Ok(None) => Some(format!("Company {} not found in new backend", company_id)),
        Err(e) => Some(format!("Company {} lookup failed: {}", company_id, e)),
    }
}

/// Copy the legacy seating assignment and attach it to the new registrant.
pub(crate) async fn migrate_seating<L, N>(
    legacy: &L,
    backend: &N,
    registrant_id: &str,
    seating_chart_registrant_id: &str,
) -> Result<()>
where
    L: LegacyBackend,
    N: NewBackend,
{
    let seat = legacy
        .get_seating_chart_registrant(seating_chart_registrant_id)
        .await
        .context("Failed to fetch legacy seating chart registrant")?
        .with_context(|| {
            format!(
                "Seating chart registrant {} not found in legacy backend",
                seating_chart_registrant_id
            )
        })?;

    let Some(seating_chart_id) = seat.seating_chart_id.filter(|id| !id.is_empty()) else {
        bail!(
            "Missing seatingChartID for seating chart registrant {}",
            seating_chart_registrant_id
        );
    };

    let input = SeatingChartRegistrantInput {
        id: seat.id,
        seating_chart_id,
        registrant_id: registrant_id.to_string(),
        category: seat.category,
        first_name: seat.first_name,
        last_name: seat.last_name,
        table_number: seat.table_number,
        notes: seat.notes,
    };

    let new_id = match backend.create_seating_chart_registrant(&input).await {
        Ok(id) => id,
        Err(e) if e.is_duplicate() => input.id.clone(),
        Err(e) => return Err(e).context("Failed to create seating chart registrant"),
    };

    backend
        .attach_seating_assignment(registrant_id, &new_id)
        .await
        .context("Failed to attach seating assignment")?;

    Ok(())
}

#[derive(Debug, Default)]
pub(crate) struct AddOnMigration {
    pub add_on_ids: Vec<String>,
    pub warnings: Vec<String>,
}

/// Migrate every add-on joined to `registrant_id`.
///
/// A failed join-table page ends the listing early and is only logged.
pub(crate) async fn migrate_add_ons<L, N>(
    legacy: &L,
    backend: &N,
    cache: &AddOnCache,
    registrant_id: &str,
    event_id: &str,
    page_size: usize,
) -> AddOnMigration
where
    L: LegacyBackend,
    N: NewBackend,
{
    let links = list_links(legacy, registrant_id, page_size).await;
    let mut result = AddOnMigration::default();

    for link in links {
        match migrate_link(legacy, backend, cache, &link, event_id).await {
            Ok(new_id) => result.add_on_ids.push(new_id),
            Err(e) => result
                .warnings
                .push(format!("Add-on {} migration failed: {:#}", link.add_on_id, e)),
        }
    }

    result
}

async fn list_links<L: LegacyBackend>(
    legacy: &L,
    registrant_id: &str,
    page_size: usize,
) -> Vec<RegistrantAddOnLink> {
    let mut links = Vec::new();
    let mut next_token: Option<String> = None;

    loop {
        let page = match legacy
            .list_registrant_add_ons(registrant_id, page_size, next_token.as_deref())
            .await
        {
            Ok(page) => page,
            Err(e) => {
                warn!(error = %e, fetched = links.len(), "Failed to list registrant add-ons");
                break;
            }
        };

        links.extend(page.items);
        next_token = page.next_token.filter(|t| !t.is_empty());
        if next_token.is_none() {
            break;
        }
    }

    links
}

async fn migrate_link<L, N>(
    legacy: &L,
    backend: &N,
    cache: &AddOnCache,
    link: &RegistrantAddOnLink,
    event_id: &str,
) -> Result<String>
where
    L: LegacyBackend,
    N: NewBackend,
{
    let add_on = legacy
        .get_add_on(&link.add_on_id)
        .await
        .context("Failed to fetch legacy add-on")?
        .context("Add-on not found in legacy backend")?;

    let new_id = cache.migrate(backend, &add_on, event_id).await?;

    let new_link = RegistrantAddOnLink {
        id: link.id.clone(),
        registrant_id: link.registrant_id.clone(),
        add_on_id: new_id.clone(),
    };
    match backend.create_registrant_add_on(&new_link).await {
        Ok(()) => info!(add_on = %new_id, "Add-on associated"),
        Err(e) if e.is_duplicate() => {}
        Err(e) => return Err(e).context("Failed to associate add-on"),
    }

    Ok(new_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::test_utils::{InMemoryLegacyBackend, InMemoryNewBackend};
    use crate::types::{AddOn, SeatingChartRegistrant};

    fn seat(id: &str, chart: Option<&str>) -> SeatingChartRegistrant {
        SeatingChartRegistrant {
            id: id.to_string(),
            seating_chart_id: chart.map(str::to_string),
            category: Some("VIP".to_string()),
            table_number: Some(7),
            ..Default::default()
        }
    }

    fn add_on(id: &str) -> AddOn {
        AddOn {
            id: id.to_string(),
            title: Some(format!("Workshop {}", id)),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn existing_company_gives_no_warning() {
        let backend = InMemoryNewBackend::new().with_company("c-1", "aps-2026");
        assert!(check_company(&backend, "c-1").await.is_none());
    }

    #[tokio::test]
    async fn missing_company_warning_names_the_id() {
        let backend = InMemoryNewBackend::new();
        let warning = check_company(&backend, "c-404").await.unwrap();
        assert!(warning.contains("c-404"));
    }

    #[tokio::test]
    async fn company_lookup_failure_is_a_warning() {
        let backend = InMemoryNewBackend::new().with_failing_company_lookup();
        let warning = check_company(&backend, "c-1").await.unwrap();
        assert!(warning.contains("lookup failed"));
    }

    #[tokio::test]
    async fn seating_is_created_and_attached() {
        let legacy = InMemoryLegacyBackend::new().with_seating(seat("s-1", Some("chart-1")));
        let backend = InMemoryNewBackend::new();

        migrate_seating(&legacy, &backend, "r-1", "s-1").await.unwrap();

        let stored = backend.seating.lock().unwrap().get("s-1").cloned().unwrap();
        assert_eq!(stored.seating_chart_id, "chart-1");
        assert_eq!(stored.registrant_id, "r-1");
        assert_eq!(stored.table_number, Some(7));
        assert_eq!(
            backend.seating_assignments.lock().unwrap().get("r-1").map(String::as_str),
            Some("s-1")
        );
    }

    #[tokio::test]
    async fn seating_without_chart_id_fails() {
        let legacy = InMemoryLegacyBackend::new().with_seating(seat("s-1", None));
        let backend = InMemoryNewBackend::new();

        let err = migrate_seating(&legacy, &backend, "r-1", "s-1")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Missing seatingChartID"));
        assert!(backend.seating.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn seating_rerun_is_tolerated() {
        let legacy = InMemoryLegacyBackend::new().with_seating(seat("s-1", Some("chart-1")));
        let backend = InMemoryNewBackend::new();

        migrate_seating(&legacy, &backend, "r-1", "s-1").await.unwrap();
        migrate_seating(&legacy, &backend, "r-1", "s-1").await.unwrap();

        assert_eq!(backend.seating.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn add_ons_are_migrated_and_associated() {
        let legacy = InMemoryLegacyBackend::new()
            .with_add_on(add_on("a-1"))
            .with_add_on(add_on("a-2"))
            .with_link("r-1", "a-1")
            .with_link("r-1", "a-2");
        let backend = InMemoryNewBackend::new();
        let cache = AddOnCache::new();

        let result = migrate_add_ons(&legacy, &backend, &cache, "r-1", "aps-2026", 1).await;

        assert_eq!(result.add_on_ids, ["a-1", "a-2"]);
        assert!(result.warnings.is_empty());
        assert_eq!(backend.add_on_links.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unknown_add_on_is_a_warning() {
        let legacy = InMemoryLegacyBackend::new().with_link("r-1", "ghost");
        let backend = InMemoryNewBackend::new();

        let result =
            migrate_add_ons(&legacy, &backend, &AddOnCache::new(), "r-1", "aps-2026", 1000).await;

        assert!(result.add_on_ids.is_empty());
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("ghost"));
    }

    #[tokio::test]
    async fn join_table_failure_is_silent() {
        let legacy = InMemoryLegacyBackend::new()
            .with_add_on(add_on("a-1"))
            .with_link("r-1", "a-1")
            .with_failing_links_for("r-1");
        let backend = InMemoryNewBackend::new();

        let result =
            migrate_add_ons(&legacy, &backend, &AddOnCache::new(), "r-1", "aps-2026", 1000).await;

        assert!(result.add_on_ids.is_empty());
        assert!(result.warnings.is_empty());
    }
}
