use std::time::Duration;

/// Event that every migrated registrant is attached to in the new backend.
pub const TARGET_EVENT_ID: &str = "aps-2026";

/// AppSync caps list queries at 1000 items per page.
pub const PAGE_SIZE: usize = 1000;

pub const MIGRATION_BATCH_SIZE: usize = 10;
pub const MIGRATION_BATCH_PAUSE: Duration = Duration::from_millis(200);
pub const LEGACY_PAGE_PAUSE: Duration = Duration::from_millis(100);

pub const COMPANY_IMPORT_BATCH_SIZE: usize = 10;
pub const COMPANY_IMPORT_BATCH_PAUSE: Duration = Duration::from_millis(100);

pub const LIST_PAGE_PAUSE: Duration = Duration::from_millis(50);
pub const TEST_REGISTRANT_COUNT: usize = 40;
pub const TEST_REGISTRANT_PAUSE: Duration = Duration::from_millis(200);

pub const EXPO_PUSH_URL: &str = "https://exp.host/--/api/v2/push/send";
/// Expo recommends at most 100 messages per request.
pub const EXPO_CHUNK_SIZE: usize = 100;
pub const DM_BODY_MAX_CHARS: usize = 120;
pub const ANNOUNCEMENT_BODY_MAX_CHARS: usize = 180;
