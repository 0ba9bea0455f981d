use super::{ApiResult, LegacyBackend, NewBackend};
use crate::graphql::{GraphQlClient, GraphQlError};
use crate::types::{
    AddOn, AppUserProfileInput, Company, CreatedRegistrant, LegacyRegistrant, Page,
    RegistrantAddOnLink, RegistrantInput, SeatingChartRegistrant, SeatingChartRegistrantInput,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::collections::HashMap;

// ============================================================================
// GraphQL documents: legacy API
// ============================================================================

const LIST_LEGACY_REGISTRANTS: &str = r#"
  query ListApsRegistrants($limit: Int, $nextToken: String) {
    listApsRegistrants(limit: $limit, nextToken: $nextToken) {
      items {
        id apsID firstName lastName email phone companyId jobTitle attendeeType status
        termsAccepted interests otherInterest speedNetworking speedNetworkingStatus
        billingAddressFirstName billingAddressLastName billingAddressEmail billingAddressPhone
        billingAddressStreet billingAddressCity billingAddressState billingAddressZip
        sameAsAttendee speakerTopic learningObjectives totalAmount discountCode
        morrisetteTransportation morrisetteStatus aristoTransportation aristoStatus
        magnaTransportation magnaStatus paymentConfirmation
        registrationEmailSent registrationEmailSentDate
        registrationEmailReceived registrationEmailReceivedDate
        welcomeEmailSent welcomeEmailSentDate welcomeEmailReceived welcomeEmailReceivedDate
        paymentMethod paymentLast4 approvedAt headshot presentation presentationTitle
        presentationSummary bio seatingChartRegistrantId
      }
      nextToken
    }
  }
"#;

const GET_LEGACY_SEATING_CHART_REGISTRANT: &str = r#"
  query GetApsSeatingChartRegistrant($id: ID!) {
    getApsSeatingChartRegistrant(id: $id) {
      id seatingChartID category firstName lastName tableNumber notes
    }
  }
"#;

const LIST_LEGACY_REGISTRANT_ADD_ONS: &str = r#"
  query ListApsRegistrantApsAddOns(
    $filter: ModelApsRegistrantApsAddOnFilterInput
    $limit: Int
    $nextToken: String
  ) {
    listApsRegistrantApsAddOns(filter: $filter, limit: $limit, nextToken: $nextToken) {
      items { id apsRegistrantId apsAddOnId }
      nextToken
    }
  }
"#;

const GET_LEGACY_ADD_ON: &str = r#"
  query GetApsAddOn($id: ID!) {
    getApsAddOn(id: $id) {
      id title description subheadline location date time company altLink type limit eventId
    }
  }
"#;

// ============================================================================
// GraphQL documents: new API
// ============================================================================

const GET_COMPANY: &str = r#"
  query GetAPSCompany($id: ID!) {
    getAPSCompany(id: $id) { id name email type eventId }
  }
"#;

const CREATE_COMPANY: &str = r#"
  mutation CreateAPSCompany($input: CreateAPSCompanyInput!) {
    createAPSCompany(input: $input) { id name email type }
  }
"#;

const LIST_COMPANIES_BY_EVENT: &str = r#"
  query ListAPSCompanies($filter: ModelAPSCompanyFilterInput, $limit: Int, $nextToken: String) {
    listAPSCompanies(filter: $filter, limit: $limit, nextToken: $nextToken) {
      items { id name email type eventId }
      nextToken
    }
  }
"#;

const CREATE_REGISTRANT: &str = r#"
  mutation CreateApsRegistrant($input: CreateApsRegistrantInput!) {
    createApsRegistrant(input: $input) { id email companyId }
  }
"#;

const UPDATE_REGISTRANT_SEATING: &str = r#"
  mutation UpdateApsRegistrant($input: UpdateApsRegistrantInput!) {
    updateApsRegistrant(input: $input) { id seatingChartRegistrantId }
  }
"#;

const CREATE_SEATING_CHART_REGISTRANT: &str = r#"
  mutation CreateApsSeatingChartRegistrant($input: CreateApsSeatingChartRegistrantInput!) {
    createApsSeatingChartRegistrant(input: $input) { id }
  }
"#;

const CREATE_ADD_ON: &str = r#"
  mutation CreateApsAddOn($input: CreateApsAddOnInput!) {
    createApsAddOn(input: $input) { id }
  }
"#;

const CREATE_REGISTRANT_ADD_ON: &str = r#"
  mutation CreateApsRegistrantApsAddOn($input: CreateApsRegistrantApsAddOnInput!) {
    createApsRegistrantApsAddOn(input: $input) { id }
  }
"#;

const CREATE_APP_USER: &str = r#"
  mutation CreateApsAppUser($input: CreateApsAppUserInput!) {
    createApsAppUser(input: $input) { id registrantId }
  }
"#;

const CREATE_APP_USER_PROFILE: &str = r#"
  mutation CreateApsAppUserProfile($input: CreateApsAppUserProfileInput!) {
    createApsAppUserProfile(input: $input) { id userId }
  }
"#;

// ============================================================================
// Helpers
// ============================================================================

#[derive(Deserialize)]
struct IdOnly {
    id: String,
}

/// The join table uses the model names as key fields.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinkRow {
    id: String,
    aps_registrant_id: String,
    aps_add_on_id: String,
}

impl From<LinkRow> for RegistrantAddOnLink {
    fn from(row: LinkRow) -> Self {
        Self {
            id: row.id,
            registrant_id: row.aps_registrant_id,
            add_on_id: row.aps_add_on_id,
        }
    }
}

/// Run `query` and pull the single top-level `field` out of `data`.
async fn field<T: DeserializeOwned>(
    client: &GraphQlClient,
    field: &str,
    query: &str,
    variables: Value,
) -> ApiResult<Option<T>> {
    let mut data: HashMap<String, Option<T>> = client.request(query, variables).await?;
    Ok(data.remove(field).flatten())
}

async fn required_field<T: DeserializeOwned>(
    client: &GraphQlClient,
    name: &str,
    query: &str,
    variables: Value,
) -> ApiResult<T> {
    field(client, name, query, variables)
        .await?
        .ok_or(GraphQlError::NoData(client.label()))
}

fn empty_page<T>() -> Page<T> {
    Page {
        items: Vec::new(),
        next_token: None,
    }
}

// ============================================================================
// AppSyncLegacyBackend
// ============================================================================

pub struct AppSyncLegacyBackend {
    client: GraphQlClient,
}

impl AppSyncLegacyBackend {
    pub fn new(client: GraphQlClient) -> Self {
        Self { client }
    }
}

impl LegacyBackend for AppSyncLegacyBackend {
    async fn list_registrants(
        &self,
        limit: usize,
        next_token: Option<&str>,
    ) -> ApiResult<Page<LegacyRegistrant>> {
        let page = field(
            &self.client,
            "listApsRegistrants",
            LIST_LEGACY_REGISTRANTS,
            json!({ "limit": limit, "nextToken": next_token }),
        )
        .await?;
        Ok(page.unwrap_or_else(empty_page))
    }

    async fn get_seating_chart_registrant(
        &self,
        id: &str,
    ) -> ApiResult<Option<SeatingChartRegistrant>> {
        field(
            &self.client,
            "getApsSeatingChartRegistrant",
            GET_LEGACY_SEATING_CHART_REGISTRANT,
            json!({ "id": id }),
        )
        .await
    }

    async fn list_registrant_add_ons(
        &self,
        registrant_id: &str,
        limit: usize,
        next_token: Option<&str>,
    ) -> ApiResult<Page<RegistrantAddOnLink>> {
        let page: Option<Page<LinkRow>> = field(
            &self.client,
            "listApsRegistrantApsAddOns",
            LIST_LEGACY_REGISTRANT_ADD_ONS,
            json!({
                "filter": { "apsRegistrantId": { "eq": registrant_id } },
                "limit": limit,
                "nextToken": next_token,
            }),
        )
        .await?;

        Ok(page
            .map(|p| Page {
                items: p.items.into_iter().map(Into::into).collect(),
                next_token: p.next_token,
            })
            .unwrap_or_else(empty_page))
    }

    async fn get_add_on(&self, id: &str) -> ApiResult<Option<AddOn>> {
        field(
            &self.client,
            "getApsAddOn",
            GET_LEGACY_ADD_ON,
            json!({ "id": id }),
        )
        .await
    }
}

// ============================================================================
// AppSyncBackend: the current API
// ============================================================================

pub struct AppSyncBackend {
    client: GraphQlClient,
}

impl AppSyncBackend {
    pub fn new(client: GraphQlClient) -> Self {
        Self { client }
    }
}

impl NewBackend for AppSyncBackend {
    async fn get_company(&self, id: &str) -> ApiResult<Option<Company>> {
        field(
            &self.client,
            "getAPSCompany",
            GET_COMPANY,
            json!({ "id": id }),
        )
        .await
    }

    async fn create_company(&self, company: &Company) -> ApiResult<()> {
        let _: IdOnly = required_field(
            &self.client,
            "createAPSCompany",
            CREATE_COMPANY,
            json!({ "input": company }),
        )
        .await?;
        Ok(())
    }

    async fn list_companies(
        &self,
        event_id: &str,
        limit: usize,
        next_token: Option<&str>,
    ) -> ApiResult<Page<Company>> {
        let page = field(
            &self.client,
            "listAPSCompanies",
            LIST_COMPANIES_BY_EVENT,
            json!({
                "filter": { "eventId": { "eq": event_id } },
                "limit": limit,
                "nextToken": next_token,
            }),
        )
        .await?;
        Ok(page.unwrap_or_else(empty_page))
    }

    async fn create_registrant(&self, input: &RegistrantInput) -> ApiResult<CreatedRegistrant> {
        required_field(
            &self.client,
            "createApsRegistrant",
            CREATE_REGISTRANT,
            json!({ "input": input }),
        )
        .await
    }

    async fn attach_seating_assignment(
        &self,
        registrant_id: &str,
        seating_chart_registrant_id: &str,
    ) -> ApiResult<()> {
        let _: IdOnly = required_field(
            &self.client,
            "updateApsRegistrant",
            UPDATE_REGISTRANT_SEATING,
            json!({
                "input": {
                    "id": registrant_id,
                    "seatingChartRegistrantId": seating_chart_registrant_id,
                }
            }),
        )
        .await?;
        Ok(())
    }

    async fn create_seating_chart_registrant(
        &self,
        input: &SeatingChartRegistrantInput,
    ) -> ApiResult<String> {
        let created: IdOnly = required_field(
            &self.client,
            "createApsSeatingChartRegistrant",
            CREATE_SEATING_CHART_REGISTRANT,
            json!({ "input": input }),
        )
        .await?;
        Ok(created.id)
    }

    async fn create_add_on(&self, add_on: &AddOn) -> ApiResult<String> {
        let created: IdOnly = required_field(
            &self.client,
            "createApsAddOn",
            CREATE_ADD_ON,
            json!({ "input": add_on }),
        )
        .await?;
        Ok(created.id)
    }

    async fn create_registrant_add_on(&self, link: &RegistrantAddOnLink) -> ApiResult<()> {
        let _: IdOnly = required_field(
            &self.client,
            "createApsRegistrantApsAddOn",
            CREATE_REGISTRANT_ADD_ON,
            json!({
                "input": {
                    "id": link.id,
                    "apsRegistrantId": link.registrant_id,
                    "apsAddOnId": link.add_on_id,
                }
            }),
        )
        .await?;
        Ok(())
    }

    async fn create_app_user(&self, registrant_id: &str) -> ApiResult<String> {
        let created: IdOnly = required_field(
            &self.client,
            "createApsAppUser",
            CREATE_APP_USER,
            json!({ "input": { "registrantId": registrant_id } }),
        )
        .await?;
        Ok(created.id)
    }

    async fn create_app_user_profile(&self, profile: &AppUserProfileInput) -> ApiResult<()> {
        let _: IdOnly = required_field(
            &self.client,
            "createApsAppUserProfile",
            CREATE_APP_USER_PROFILE,
            json!({ "input": profile }),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_rows_map_model_keys() {
        let row: LinkRow = serde_json::from_value(json!({
            "id": "l-1",
            "apsRegistrantId": "r-1",
            "apsAddOnId": "a-1"
        }))
        .unwrap();
        let link: RegistrantAddOnLink = row.into();
        assert_eq!(link.registrant_id, "r-1");
        assert_eq!(link.add_on_id, "a-1");
    }

    #[test]
    fn legacy_registrant_page_decodes_with_missing_fields() {
        let page: Page<LegacyRegistrant> = serde_json::from_value(json!({
            "items": [{ "id": "r-1", "email": "a@example.com", "companyId": "c-1" }],
            "nextToken": "abc"
        }))
        .unwrap();
        assert_eq!(page.items[0].company_id.as_deref(), Some("c-1"));
        assert!(page.items[0].seating_chart_registrant_id.is_none());
        assert_eq!(page.next_token.as_deref(), Some("abc"));
    }
}
