use crate::backend::NewBackend;
use crate::types::{CreatedRegistrant, RegistrantInput};
use tracing::{debug, warn};

#[derive(Debug)]
pub(crate) enum WriteResult {
    Created(CreatedRegistrant),
    /// The registrant was written by an earlier run.
    AlreadyExists,
    Failed(String),
}

pub(crate) async fn write_registrant<N: NewBackend>(
    backend: &N,
    input: &RegistrantInput,
) -> WriteResult {
    match backend.create_registrant(input).await {
        Ok(created) => {
            debug!(id = %created.id, "Registrant created");
            WriteResult::Created(created)
        }
        Err(e) if e.is_duplicate() => {
            debug!(error = %e, "Registrant already exists");
            WriteResult::AlreadyExists
        }
        Err(e) => {
            warn!(error = %e, "Registrant create failed");
            WriteResult::Failed(e.to_string())
        }
    }
}

/// Compare the company the backend stored against the one we sent.
/// Returns a warning on mismatch; the write is never rolled back.
pub(crate) fn verify_company(
    created: &CreatedRegistrant,
    expected: Option<&str>,
) -> Option<String> {
    let stored = created.company_id.as_deref();
    if stored == expected {
        return None;
    }

    Some(format!(
        "Company reference mismatch: expected {}, stored {}",
        expected.unwrap_or("none"),
        stored.unwrap_or("none")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::test_utils::InMemoryNewBackend;

    fn input(id: &str, email: &str) -> RegistrantInput {
        RegistrantInput {
            id: Some(id.to_string()),
            aps_id: "aps-2026".to_string(),
            email: email.to_string(),
            company_id: Some("c-1".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn second_write_reports_already_exists() {
        let backend = InMemoryNewBackend::new();
        let r = input("r-1", "a@example.com");

        assert!(matches!(
            write_registrant(&backend, &r).await,
            WriteResult::Created(_)
        ));
        assert!(matches!(
            write_registrant(&backend, &r).await,
            WriteResult::AlreadyExists
        ));
        assert_eq!(backend.registrant_count(), 1);
    }

    #[tokio::test]
    async fn other_errors_carry_the_raw_message() {
        let backend = InMemoryNewBackend::new().rejecting_email("bad@example.com");
        match write_registrant(&backend, &input("r-2", "bad@example.com")).await {
            WriteResult::Failed(msg) => assert!(msg.contains("invalid value")),
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(!backend.has_registrant("r-2"));
    }

    #[test]
    fn company_mismatch_is_reported() {
        let created = CreatedRegistrant {
            id: "r-1".to_string(),
            email: "a@example.com".to_string(),
            company_id: None,
        };
        let warning = verify_company(&created, Some("c-1")).unwrap();
        assert!(warning.contains("expected c-1"));
        assert!(verify_company(&created, None).is_none());
    }
}
