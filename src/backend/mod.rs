use crate::graphql::GraphQlError;
use crate::types::{
    AddOn, AppUserProfileInput, Company, CreatedRegistrant, LegacyRegistrant, Page,
    RegistrantAddOnLink, RegistrantInput, SeatingChartRegistrant, SeatingChartRegistrantInput,
};

pub mod appsync;
pub use appsync::{AppSyncBackend, AppSyncLegacyBackend};

pub type ApiResult<T> = Result<T, GraphQlError>;

// ============================================================================
// LegacyBackend trait: read-only access to the previous API
// ============================================================================

#[allow(async_fn_in_trait)]
pub trait LegacyBackend: Send + Sync {
    async fn list_registrants(
        &self,
        limit: usize,
        next_token: Option<&str>,
    ) -> ApiResult<Page<LegacyRegistrant>>;

    async fn get_seating_chart_registrant(
        &self,
        id: &str,
    ) -> ApiResult<Option<SeatingChartRegistrant>>;

    async fn list_registrant_add_ons(
        &self,
        registrant_id: &str,
        limit: usize,
        next_token: Option<&str>,
    ) -> ApiResult<Page<RegistrantAddOnLink>>;

    async fn get_add_on(&self, id: &str) -> ApiResult<Option<AddOn>>;
}

// ============================================================================
// NewBackend trait: the API receiving migrated and imported data
// ============================================================================

#[allow(async_fn_in_trait)]
pub trait NewBackend: Send + Sync {
    async fn get_company(&self, id: &str) -> ApiResult<Option<Company>>;
    async fn create_company(&self, company: &Company) -> ApiResult<()>;
    async fn list_companies(
        &self,
        event_id: &str,
        limit: usize,
        next_token: Option<&str>,
    ) -> ApiResult<Page<Company>>;

    async fn create_registrant(&self, input: &RegistrantInput) -> ApiResult<CreatedRegistrant>;
    async fn attach_seating_assignment(
        &self,
        registrant_id: &str,
        seating_chart_registrant_id: &str,
    ) -> ApiResult<()>;

    async fn create_seating_chart_registrant(
        &self,
        input: &SeatingChartRegistrantInput,
    ) -> ApiResult<String>;

    async fn create_add_on(&self, add_on: &AddOn) -> ApiResult<String>;
    async fn create_registrant_add_on(&self, link: &RegistrantAddOnLink) -> ApiResult<()>;

    async fn create_app_user(&self, registrant_id: &str) -> ApiResult<String>;
    async fn create_app_user_profile(&self, profile: &AppUserProfileInput) -> ApiResult<()>;
}

// ============================================================================
// Test utilities: in-memory backends for in-crate tests
// ============================================================================
