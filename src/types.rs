use anyhow::bail;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// One page of an AppSync list query.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub items: Vec<T>,
    pub next_token: Option<String>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// AppSync `[String]` lists may hold `null` elements; those are dropped.
fn without_null_elements<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<Option<String>>>::deserialize(deserializer)?;
    Ok(values.map(|v| v.into_iter().flatten().collect()))
}

// ============================================================================
// Registrants
// ============================================================================

/// A registrant as stored by the legacy API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyRegistrant {
    pub id: String,
    #[serde(rename = "apsID")]
    pub aps_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: String,
    pub phone: Option<String>,
    pub company_id: Option<String>,
    pub job_title: Option<String>,
    pub attendee_type: Option<String>,
    pub status: Option<String>,
    pub terms_accepted: Option<bool>,
    #[serde(default, deserialize_with = "without_null_elements")]
    pub interests: Option<Vec<String>>,
    pub other_interest: Option<String>,
    pub speed_networking: Option<bool>,
    pub speed_networking_status: Option<String>,
    pub billing_address_first_name: Option<String>,
    pub billing_address_last_name: Option<String>,
    pub billing_address_email: Option<String>,
    pub billing_address_phone: Option<String>,
    pub billing_address_street: Option<String>,
    pub billing_address_city: Option<String>,
    pub billing_address_state: Option<String>,
    pub billing_address_zip: Option<String>,
    pub same_as_attendee: Option<bool>,
    pub speaker_topic: Option<String>,
    pub learning_objectives: Option<String>,
    pub total_amount: Option<f64>,
    pub discount_code: Option<String>,
    pub morrisette_transportation: Option<String>,
    pub morrisette_status: Option<String>,
    pub aristo_transportation: Option<String>,
    pub aristo_status: Option<String>,
    pub magna_transportation: Option<String>,
    pub magna_status: Option<String>,
    pub payment_confirmation: Option<String>,
    pub registration_email_sent: Option<bool>,
    pub registration_email_sent_date: Option<String>,
    pub registration_email_received: Option<bool>,
    pub registration_email_received_date: Option<String>,
    pub welcome_email_sent: Option<bool>,
    pub welcome_email_sent_date: Option<String>,
    pub welcome_email_received: Option<bool>,
    pub welcome_email_received_date: Option<String>,
    pub payment_method: Option<String>,
    pub payment_last4: Option<String>,
    pub approved_at: Option<String>,
    pub headshot: Option<String>,
    pub presentation: Option<String>,
    pub presentation_title: Option<String>,
    pub presentation_summary: Option<String>,
    pub bio: Option<String>,
    pub seating_chart_registrant_id: Option<String>,
}

/// `CreateApsRegistrantInput` on the new API. `None` serializes as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrantInput {
    /// Absent for freshly created registrants; the API assigns one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "apsID")]
    pub aps_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub company_id: Option<String>,
    pub job_title: Option<String>,
    pub attendee_type: Option<String>,
    pub status: Option<String>,
    pub terms_accepted: Option<bool>,
    pub interests: Option<Vec<String>>,
    pub other_interest: Option<String>,
    pub speed_networking: Option<bool>,
    pub speed_networking_status: Option<String>,
    pub billing_address_first_name: Option<String>,
    pub billing_address_last_name: Option<String>,
    pub billing_address_email: Option<String>,
    pub billing_address_phone: Option<String>,
    pub billing_address_street: Option<String>,
    pub billing_address_city: Option<String>,
    pub billing_address_state: Option<String>,
    pub billing_address_zip: Option<String>,
    pub same_as_attendee: Option<bool>,
    pub speaker_topic: Option<String>,
    pub learning_objectives: Option<String>,
    pub total_amount: Option<f64>,
    pub discount_code: Option<String>,
    pub morrisette_transportation: Option<String>,
    pub morrisette_status: Option<String>,
    pub aristo_transportation: Option<String>,
    pub aristo_status: Option<String>,
    pub magna_transportation: Option<String>,
    pub magna_status: Option<String>,
    pub payment_confirmation: Option<String>,
    pub registration_email_sent: Option<bool>,
    pub registration_email_sent_date: Option<String>,
    pub registration_email_received: Option<bool>,
    pub registration_email_received_date: Option<String>,
    pub welcome_email_sent: Option<bool>,
    pub welcome_email_sent_date: Option<String>,
    pub welcome_email_received: Option<bool>,
    pub welcome_email_received_date: Option<String>,
    pub payment_method: Option<String>,
    pub payment_last4: Option<String>,
    pub approved_at: Option<String>,
    pub headshot: Option<String>,
    pub presentation: Option<String>,
    pub presentation_title: Option<String>,
    pub presentation_summary: Option<String>,
    pub bio: Option<String>,
}

/// Fields the new API echoes back from `createApsRegistrant`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedRegistrant {
    pub id: String,
    pub email: String,
    pub company_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AttendeeType {
    Oem,
    Tier1,
    SolutionProvider,
    Sponsor,
    Speaker,
    Staff,
}

impl fmt::Display for AttendeeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Oem => "OEM",
            Self::Tier1 => "TIER1",
            Self::SolutionProvider => "SOLUTIONPROVIDER",
            Self::Sponsor => "SPONSOR",
            Self::Speaker => "SPEAKER",
            Self::Staff => "STAFF",
        };
        f.write_str(s)
    }
}

// ============================================================================
// Companies
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CompanyType {
    OemTier1,
    SolutionProvider,
    Sponsor,
}

impl FromStr for CompanyType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "OEMTIER1" => Ok(Self::OemTier1),
            "SOLUTIONPROVIDER" => Ok(Self::SolutionProvider),
            "SPONSOR" => Ok(Self::Sponsor),
            other => bail!("Invalid company type: {}", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, rename = "type")]
    pub company_type: Option<CompanyType>,
    #[serde(default)]
    pub event_id: Option<String>,
}

// ============================================================================
// Add-ons
// ============================================================================

/// Add-on record; the same shape is read from the legacy API and written to
/// the new one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddOn {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub subheadline: Option<String>,
    pub location: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub company: Option<String>,
    pub alt_link: Option<String>,
    #[serde(rename = "type")]
    pub add_on_type: Option<String>,
    pub limit: Option<i64>,
    pub event_id: Option<String>,
}

/// Join row between a registrant and an add-on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrantAddOnLink {
    pub id: String,
    pub registrant_id: String,
    pub add_on_id: String,
}

// ============================================================================
// Seating
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatingChartRegistrant {
    pub id: String,
    #[serde(rename = "seatingChartID")]
    pub seating_chart_id: Option<String>,
    pub category: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub table_number: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatingChartRegistrantInput {
    pub id: String,
    #[serde(rename = "seatingChartID")]
    pub seating_chart_id: String,
    pub registrant_id: String,
    pub category: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub table_number: Option<i64>,
    pub notes: Option<String>,
}

// ============================================================================
// App users
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppUserProfileInput {
    pub user_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub job_title: Option<String>,
    pub attendee_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn company_type_parses_case_insensitively() {
        assert_eq!(
            " solutionprovider ".parse::<CompanyType>().unwrap(),
            CompanyType::SolutionProvider
        );
        assert_eq!("OEMTIER1".parse::<CompanyType>().unwrap(), CompanyType::OemTier1);
        assert!("VENDOR".parse::<CompanyType>().is_err());
    }

    #[test]
    fn company_type_serializes_as_schema_enum() {
        assert_eq!(
            serde_json::to_value(CompanyType::OemTier1).unwrap(),
            json!("OEMTIER1")
        );
    }

    #[test]
    fn attendee_type_display_matches_serde() {
        for t in [
            AttendeeType::Oem,
            AttendeeType::Tier1,
            AttendeeType::SolutionProvider,
            AttendeeType::Sponsor,
            AttendeeType::Speaker,
            AttendeeType::Staff,
        ] {
            assert_eq!(serde_json::to_value(t).unwrap(), json!(t.to_string()));
        }
    }

    #[test]
    fn seating_chart_id_uses_schema_casing() {
        let seat: SeatingChartRegistrant = serde_json::from_value(json!({
            "id": "s-1",
            "seatingChartID": "chart-1",
            "tableNumber": 4
        }))
        .unwrap();
        assert_eq!(seat.seating_chart_id.as_deref(), Some("chart-1"));
        assert_eq!(seat.table_number, Some(4));
    }

    #[test]
    fn null_interest_entries_are_dropped() {
        let page: Page<LegacyRegistrant> = serde_json::from_value(json!({
            "items": [
                { "id": "r-1", "email": "a@example.com", "interests": ["EV", null, "Batteries"] },
                { "id": "r-2", "email": "b@example.com", "interests": null },
                { "id": "r-3", "email": "c@example.com" }
            ],
            "nextToken": null
        }))
        .unwrap();
        assert_eq!(
            page.items[0].interests,
            Some(vec!["EV".to_string(), "Batteries".to_string()])
        );
        assert_eq!(page.items[1].interests, None);
        assert_eq!(page.items[2].interests, None);
    }

    #[test]
    fn page_without_items_is_empty() {
        let page: Page<AddOn> =
            serde_json::from_value(json!({ "items": null, "nextToken": null })).unwrap();
        assert!(page.items.is_empty());
        assert!(page.next_token.is_none());
    }
}
