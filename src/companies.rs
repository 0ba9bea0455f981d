//! Company import from the exported company CSV.
//!
//! Companies keep their CSV id in the new backend so registrants migrated
//! later can reference them without a lookup table.

use crate::backend::NewBackend;
use crate::batch;
use crate::configuration::{COMPANY_IMPORT_BATCH_PAUSE, COMPANY_IMPORT_BATCH_SIZE};
use crate::types::{Company, CompanyType};
use email_address::EmailAddress;
use serde::Serialize;
use tracing::{info, warn};

const MIN_FIELDS: usize = 6;
const ID_COLUMN: usize = 0;
const EMAIL_COLUMN: usize = 3;
const NAME_COLUMN: usize = 4;
const TYPE_COLUMN: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyImportError {
    pub id: String,
    pub name: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompanyImportReport {
    pub success: usize,
    pub errors: Vec<CompanyImportError>,
}

/// Split one CSV line into fields. Quotes group commas and `""` is a literal
/// quote. Multi-line fields are not supported.
pub fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// The export prefixes some addresses with `'` or `'@` to stop spreadsheets
/// from treating them as formulas.
pub fn clean_email(raw: &str) -> String {
    let stripped = raw
        .strip_prefix("'@")
        .or_else(|| raw.strip_prefix('\''))
        .unwrap_or(raw);
    stripped.trim().to_string()
}

pub fn parse_company_type(raw: &str) -> Option<CompanyType> {
    raw.parse().ok()
}

#[derive(Debug)]
enum ParsedLine {
    /// Too few columns; ignored without an error entry.
    Skipped,
    Invalid(CompanyImportError),
    Company(Company),
}

fn parse_company(line: &str, event_id: &str) -> ParsedLine {
    let fields = parse_csv_line(line);
    if fields.len() < MIN_FIELDS {
        return ParsedLine::Skipped;
    }

    let column = |i: usize| fields[i].trim().to_string();
    let id = column(ID_COLUMN);
    let name = column(NAME_COLUMN);
    let email = clean_email(&fields[EMAIL_COLUMN]);

    let invalid = |error: String| {
        ParsedLine::Invalid(CompanyImportError {
            id: or_unknown(&id),
            name: or_unknown(&name),
            error,
        })
    };

    if id.is_empty() || name.is_empty() || email.is_empty() {
        return invalid("Missing required fields (id, name, or email)".to_string());
    }
    if !EmailAddress::is_valid(&email) {
        warn!(id = %id, email = %email, "Importing company with malformed email address");
    }

    ParsedLine::Company(Company {
        id,
        name,
        email: Some(email),
        company_type: parse_company_type(&fields[TYPE_COLUMN]),
        event_id: Some(event_id.to_string()),
    })
}

fn or_unknown(value: &str) -> String {
    if value.is_empty() {
        "unknown".to_string()
    } else {
        value.to_string()
    }
}

/// Import every company in `csv_text` for `event_id`. The first non-blank
/// line is the header.
pub async fn import_companies_from_csv<N: NewBackend>(
    backend: &N,
    csv_text: &str,
    event_id: &str,
) -> CompanyImportReport {
    let lines: Vec<&str> = csv_text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .skip(1)
        .collect();
    info!(lines = lines.len(), event_id, "Importing companies");

    let results = batch::for_each_in_batches(
        &lines,
        COMPANY_IMPORT_BATCH_SIZE,
        COMPANY_IMPORT_BATCH_PAUSE,
        |line| async move {
            let company = match parse_company(line, event_id) {
                ParsedLine::Skipped => return None,
                ParsedLine::Invalid(error) => return Some(Err(error)),
                ParsedLine::Company(company) => company,
            };
            match backend.create_company(&company).await {
                Ok(()) => Some(Ok(())),
                Err(e) => {
                    warn!(id = %company.id, error = %e, "Company create failed");
                    Some(Err(CompanyImportError {
                        id: company.id,
                        name: company.name,
                        error: e.to_string(),
                    }))
                }
            }
        },
    )
    .await;

    let mut report = CompanyImportReport::default();
    for result in results.into_iter().flatten() {
        match result {
            Ok(()) => report.success += 1,
            Err(error) => report.errors.push(error),
        }
    }

    info!(
        success = report.success,
        errors = report.errors.len(),
        "Company import complete"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::test_utils::InMemoryNewBackend;

    const HEADER: &str = "Id,Created,Owner,Email,Company Name,Type";

    #[test]
    fn quoted_fields_keep_commas_and_escaped_quotes() {
        assert_eq!(
            parse_csv_line(r#"c-1,"Acme, Inc.","Say ""hi""",x"#),
            vec!["c-1", "Acme, Inc.", r#"Say "hi""#, "x"]
        );
        assert_eq!(parse_csv_line("a,,b,"), vec!["a", "", "b", ""]);
    }

    #[test]
    fn spreadsheet_prefixes_are_stripped_from_emails() {
        assert_eq!(clean_email("'@sales@acme.com"), "sales@acme.com");
        assert_eq!(clean_email("'info@acme.com "), "info@acme.com");
        assert_eq!(clean_email("plain@acme.com"), "plain@acme.com");
    }

    #[test]
    fn unknown_company_types_become_none() {
        assert_eq!(parse_company_type(" oemtier1"), Some(CompanyType::OemTier1));
        assert_eq!(parse_company_type("Sponsor"), Some(CompanyType::Sponsor));
        assert_eq!(parse_company_type("Exhibitor"), None);
        assert_eq!(parse_company_type(""), None);
    }

    #[tokio::test]
    async fn imports_valid_rows_and_reports_bad_ones() {
        let csv = [
            HEADER,
            "c-1,2024-01-01,Ann,'@sales@acme.com,\"Acme, Inc.\",OEMTIER1",
            "",
            "c-2,2024-01-01,Bo,info@globex.com,Globex,Exhibitor",
            "c-3,2024-01-01,Cy,,Initech,SPONSOR",
            "too,few,columns",
        ]
        .join("\n");
        let backend = InMemoryNewBackend::new();

        let report = import_companies_from_csv(&backend, &csv, "aps-2026").await;

        assert_eq!(report.success, 2);
        assert_eq!(
            report.errors,
            vec![CompanyImportError {
                id: "c-3".to_string(),
                name: "Initech".to_string(),
                error: "Missing required fields (id, name, or email)".to_string(),
            }]
        );

        let companies = backend.companies.lock().unwrap();
        let acme = &companies["c-1"];
        assert_eq!(acme.name, "Acme, Inc.");
        assert_eq!(acme.email.as_deref(), Some("sales@acme.com"));
        assert_eq!(acme.company_type, Some(CompanyType::OemTier1));
        assert_eq!(acme.event_id.as_deref(), Some("aps-2026"));
        assert_eq!(companies["c-2"].company_type, None);
    }

    #[tokio::test]
    async fn malformed_email_is_still_imported() {
        let csv = format!("{}\nc-1,x,y,not-an-email,Acme,SPONSOR", HEADER);
        let backend = InMemoryNewBackend::new();

        let report = import_companies_from_csv(&backend, &csv, "aps-2026").await;

        assert_eq!(report.success, 1);
        assert!(report.errors.is_empty());
        let companies = backend.companies.lock().unwrap();
        assert_eq!(companies["c-1"].email.as_deref(), Some("not-an-email"));
    }

    #[tokio::test]
    async fn create_failures_carry_the_backend_message() {
        let csv = format!("{}\nc-1,x,y,a@acme.com,Acme,SPONSOR", HEADER);
        let backend = InMemoryNewBackend::new().with_company("c-1", "aps-2026");

        let report = import_companies_from_csv(&backend, &csv, "aps-2026").await;

        assert_eq!(report.success, 0);
        assert_eq!(report.errors[0].id, "c-1");
        assert_eq!(report.errors[0].name, "Acme");
        assert!(report.errors[0].error.contains("conditional request failed"));
    }

    #[tokio::test(start_paused = true)]
    async fn large_files_are_paced_in_batches() {
        let mut csv = vec![HEADER.to_string()];
        for i in 0..25 {
            csv.push(format!("c-{i},x,y,c{i}@acme.com,Company {i},SPONSOR"));
        }
        let backend = InMemoryNewBackend::new();
        let origin = tokio::time::Instant::now();

        let report = import_companies_from_csv(&backend, &csv.join("\n"), "aps-2026").await;

        assert_eq!(report.success, 25);
        assert!(origin.elapsed() >= 2 * COMPANY_IMPORT_BATCH_PAUSE);
    }
}
