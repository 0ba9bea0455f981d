//! Synthetic registrants for exercising the portal against a fresh event.

use crate::backend::NewBackend;
use crate::configuration::{
    LIST_PAGE_PAUSE, PAGE_SIZE, TEST_REGISTRANT_COUNT, TEST_REGISTRANT_PAUSE,
};
use crate::types::{AppUserProfileInput, AttendeeType, Company, CreatedRegistrant, RegistrantInput};
use anyhow::{Context, Result, bail};
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::{error, info, warn};

const FIRST_NAMES: &[&str] = &[
    "James", "Mary", "John", "Patricia", "Robert", "Jennifer", "Michael", "Linda", "William",
    "Elizabeth", "David", "Barbara", "Richard", "Susan", "Joseph", "Jessica", "Thomas", "Sarah",
    "Christopher", "Karen", "Charles", "Nancy", "Daniel", "Lisa", "Matthew", "Betty", "Anthony",
    "Margaret", "Mark", "Sandra", "Donald", "Ashley", "Steven", "Kimberly", "Paul", "Emily",
    "Andrew", "Donna", "Joshua", "Michelle", "Kenneth", "Carol", "Kevin", "Amanda", "Brian",
    "Dorothy", "George", "Melissa",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Wilson", "Anderson", "Thomas", "Taylor", "Moore",
    "Jackson", "Martin", "Lee", "Thompson", "White", "Harris", "Sanchez", "Clark", "Ramirez",
    "Lewis", "Robinson", "Walker", "Young", "Allen", "King", "Wright", "Scott", "Torres",
    "Nguyen", "Hill", "Flores", "Green", "Adams", "Nelson", "Baker", "Hall", "Rivera",
    "Campbell", "Mitchell", "Carter", "Roberts",
];

const JOB_TITLES: &[&str] = &[
    "CEO",
    "CTO",
    "VP of Engineering",
    "Director of Operations",
    "Senior Manager",
    "Product Manager",
    "Engineering Manager",
    "Sales Director",
    "Marketing Manager",
    "Operations Manager",
    "Business Development Manager",
    "Technical Lead",
    "Senior Engineer",
    "Project Manager",
    "Account Executive",
    "Solutions Architect",
];

const EMAIL_DOMAINS: &[&str] = &["example.com", "test.com", "demo.org", "sample.net"];

/// How many of each attendee type a generated batch contains.
const DISTRIBUTION: &[(AttendeeType, usize)] = &[
    (AttendeeType::Staff, 1),
    (AttendeeType::Speaker, 3),
    (AttendeeType::Oem, 9),
    (AttendeeType::Tier1, 9),
    (AttendeeType::SolutionProvider, 9),
    (AttendeeType::Sponsor, 9),
];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TestRegistrantReport {
    pub created: usize,
    pub failed: usize,
    pub distribution: BTreeMap<AttendeeType, usize>,
}

/// Every company attached to `event_id`, across all pages.
pub async fn fetch_companies_by_event<N: NewBackend>(
    backend: &N,
    event_id: &str,
) -> Result<Vec<Company>> {
    let mut companies = Vec::new();
    let mut next_token: Option<String> = None;

    loop {
        let page = backend
            .list_companies(event_id, PAGE_SIZE, next_token.as_deref())
            .await
            .context("Failed to list companies")?;
        companies.extend(page.items);

        next_token = page.next_token.filter(|t| !t.is_empty());
        if next_token.is_none() {
            break;
        }
        tokio::time::sleep(LIST_PAGE_PAUSE).await;
    }

    Ok(companies)
}

/// Create a registrant plus the app user and profile the mobile app expects.
/// Only the registrant write can fail the call.
pub async fn create_registrant_with_app_user<N: NewBackend>(
    backend: &N,
    input: &RegistrantInput,
) -> Result<CreatedRegistrant> {
    let created = backend
        .create_registrant(input)
        .await
        .context("Failed to create registrant")?;

    let user_id = match backend.create_app_user(&created.id).await {
        Ok(id) => id,
        Err(e) => {
            error!(registrant = %created.id, error = %e, "Failed to create app user");
            return Ok(created);
        }
    };

    let company = match input.company_id.as_deref() {
        Some(company_id) => match backend.get_company(company_id).await {
            Ok(company) => company.map(|c| c.name),
            Err(e) => {
                warn!(company = company_id, error = %e, "Failed to fetch company name for profile");
                None
            }
        },
        None => None,
    };

    let profile = AppUserProfileInput {
        user_id,
        first_name: input.first_name.clone(),
        last_name: input.last_name.clone(),
        email: input.email.clone(),
        phone: input.phone.clone(),
        company,
        job_title: input.job_title.clone(),
        attendee_type: input.attendee_type.clone(),
    };
    if let Err(e) = backend.create_app_user_profile(&profile).await {
        error!(registrant = %created.id, error = %e, "Failed to create app user profile");
    }

    Ok(created)
}

fn shuffled_attendee_types<R: Rng>(rng: &mut R) -> Vec<AttendeeType> {
    let mut types: Vec<AttendeeType> = DISTRIBUTION
        .iter()
        .flat_map(|&(t, n)| std::iter::repeat_n(t, n))
        .collect();
    types.shuffle(rng);
    types
}

fn pick<'a, R: Rng>(rng: &mut R, values: &[&'a str]) -> &'a str {
    values.choose(rng).copied().unwrap_or_default()
}

fn generate_email<R: Rng>(rng: &mut R, first: &str, last: &str) -> String {
    format!(
        "{}.{}{}@{}",
        first.to_lowercase(),
        last.to_lowercase(),
        rng.random_range(0..1000),
        pick(rng, EMAIL_DOMAINS)
    )
}

fn generate_phone<R: Rng>(rng: &mut R) -> String {
    format!(
        "({}) {}-{:04}",
        rng.random_range(200..1000),
        rng.random_range(200..1000),
        rng.random_range(0..10000)
    )
}

/// Create the standard set of test registrants for `event_id`, spread over
/// the companies already imported for that event.
pub async fn create_test_registrants<N, R>(
    backend: &N,
    event_id: &str,
    rng: &mut R,
) -> Result<TestRegistrantReport>
where
    N: NewBackend,
    R: Rng,
{
    info!(event_id, "Fetching companies");
    let companies = fetch_companies_by_event(backend, event_id).await?;
    if companies.is_empty() {
        bail!("No companies found for this event. Please create companies first.");
    }
    info!(
        companies = companies.len(),
        count = TEST_REGISTRANT_COUNT,
        "Creating test registrants"
    );

    let attendee_types = shuffled_attendee_types(rng);
    let mut used_names = HashSet::new();
    let mut report = TestRegistrantReport::default();

    for (index, attendee_type) in attendee_types.iter().enumerate() {
        let (first, last) = loop {
            let pair = (pick(rng, FIRST_NAMES), pick(rng, LAST_NAMES));
            if used_names.insert(pair) {
                break pair;
            }
        };
        let company = companies.choose(rng).map(|c| c.id.clone());

        let input = RegistrantInput {
            aps_id: event_id.to_string(),
            first_name: Some(first.to_string()),
            last_name: Some(last.to_string()),
            email: generate_email(rng, first, last),
            phone: Some(generate_phone(rng)),
            company_id: company,
            job_title: Some(pick(rng, JOB_TITLES).to_string()),
            attendee_type: Some(attendee_type.to_string()),
            status: Some("PENDING".to_string()),
            terms_accepted: Some(true),
            ..Default::default()
        };

        match create_registrant_with_app_user(backend, &input).await {
            Ok(created) => {
                info!(
                    n = index + 1,
                    id = %created.id,
                    email = %created.email,
                    attendee_type = %attendee_type,
                    "Created test registrant"
                );
                report.created += 1;
                tokio::time::sleep(TEST_REGISTRANT_PAUSE).await;
            }
            Err(e) => {
                error!(n = index + 1, error = %e, "Failed to create test registrant");
                report.failed += 1;
            }
        }
    }

    for attendee_type in attendee_types {
        *report.distribution.entry(attendee_type).or_default() += 1;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::test_utils::InMemoryNewBackend;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn seeded() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn distribution_covers_forty_registrants() {
        let types = shuffled_attendee_types(&mut seeded());
        assert_eq!(types.len(), TEST_REGISTRANT_COUNT);
        assert_eq!(types.iter().filter(|t| **t == AttendeeType::Staff).count(), 1);
        assert_eq!(types.iter().filter(|t| **t == AttendeeType::Speaker).count(), 3);
        assert_eq!(types.iter().filter(|t| **t == AttendeeType::Sponsor).count(), 9);
    }

    #[test]
    fn generated_contact_details_have_the_expected_shape() {
        let mut rng = seeded();
        let email = generate_email(&mut rng, "Mary", "Smith");
        assert!(email.starts_with("mary.smith"));
        assert!(EMAIL_DOMAINS.iter().any(|d| email.ends_with(&format!("@{}", d))));

        let phone = generate_phone(&mut rng);
        assert_eq!(phone.len(), "(200) 200-0000".len());
        assert!(phone.starts_with('('));
        assert_eq!(&phone[4..6], ") ");
        assert_eq!(&phone[9..10], "-");
    }

    #[tokio::test]
    async fn no_companies_is_an_error() {
        let backend = InMemoryNewBackend::new();
        let err = create_test_registrants(&backend, "aps-2026", &mut seeded())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "No companies found for this event. Please create companies first."
        );
    }

    #[tokio::test]
    async fn companies_are_read_across_pages() {
        let backend = (0..PAGE_SIZE + 5).fold(InMemoryNewBackend::new(), |b, i| {
            b.with_company(&format!("c-{:04}", i), "aps-2026")
        });
        let backend = backend.with_company("other", "aps-2025");

        let companies = fetch_companies_by_event(&backend, "aps-2026").await.unwrap();

        assert_eq!(companies.len(), PAGE_SIZE + 5);
    }

    #[tokio::test(start_paused = true)]
    async fn creates_forty_unique_registrants_with_app_users() {
        let backend = InMemoryNewBackend::new()
            .with_company("c-1", "aps-2026")
            .with_company("c-2", "aps-2026");

        let report = create_test_registrants(&backend, "aps-2026", &mut seeded())
            .await
            .unwrap();

        assert_eq!(report.created, TEST_REGISTRANT_COUNT);
        assert_eq!(report.failed, 0);
        assert_eq!(report.distribution[&AttendeeType::Oem], 9);
        assert_eq!(backend.registrant_count(), TEST_REGISTRANT_COUNT);
        assert_eq!(backend.app_users.lock().unwrap().len(), TEST_REGISTRANT_COUNT);

        let registrants = backend.registrants.lock().unwrap();
        let names: HashSet<_> = registrants
            .values()
            .map(|r| (r.first_name.clone(), r.last_name.clone()))
            .collect();
        assert_eq!(names.len(), TEST_REGISTRANT_COUNT);
        assert!(registrants.values().all(|r| {
            r.status.as_deref() == Some("PENDING") && r.terms_accepted == Some(true)
        }));

        let profiles = backend.profiles.lock().unwrap();
        assert!(profiles.iter().all(|p| p.company.is_some()));
    }

    #[tokio::test]
    async fn app_user_failure_does_not_fail_the_registrant() {
        let backend = InMemoryNewBackend::new()
            .with_company("c-1", "aps-2026")
            .with_failing_app_users();
        let input = RegistrantInput {
            aps_id: "aps-2026".to_string(),
            email: "a@example.com".to_string(),
            ..Default::default()
        };

        let created = create_registrant_with_app_user(&backend, &input).await.unwrap();

        assert!(backend.has_registrant(&created.id));
        assert!(backend.profiles.lock().unwrap().is_empty());
    }
}
