use crate::backend::LegacyBackend;
use crate::types::LegacyRegistrant;
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::info;

/// Read every legacy registrant, following continuation tokens in order.
///
/// Any page failure aborts the read; there is no partial result.
pub async fn read_all_registrants<L: LegacyBackend>(
    legacy: &L,
    page_size: usize,
    page_pause: Duration,
) -> Result<Vec<LegacyRegistrant>> {
    let mut registrants = Vec::new();
    let mut next_token: Option<String> = None;
    let mut page = 1;

    loop {
        let result = legacy
            .list_registrants(page_size, next_token.as_deref())
            .await
            .with_context(|| format!("Failed to read legacy registrants page {}", page))?;

        info!(page, items = result.items.len(), "Read legacy registrants page");
        registrants.extend(result.items);

        next_token = result.next_token.filter(|t| !t.is_empty());
        if next_token.is_none() {
            break;
        }

        page += 1;
        tokio::time::sleep(page_pause).await;
    }

    Ok(registrants)
}
