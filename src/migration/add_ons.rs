use crate::backend::{ApiResult, NewBackend};
use crate::types::AddOn;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

/// Legacy add-on id → new add-on id, scoped to one migration run.
///
/// Concurrent registrants may both miss the cache for the same add-on; the
/// second create then comes back as a duplicate, which is treated as present.
#[derive(Debug, Default)]
pub struct AddOnCache {
    ids: Mutex<HashMap<String, String>>,
}

impl AddOnCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, legacy_id: &str) -> Option<String> {
        self.lock().get(legacy_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&self, legacy_id: String, new_id: String) {
        self.lock().insert(legacy_id, new_id);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map still holds valid ids.
        self.ids.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make sure `add_on` exists in the new backend under its legacy id and
    /// return that id. Errors other than "already exists" are returned.
    pub async fn migrate<N: NewBackend>(
        &self,
        backend: &N,
        add_on: &AddOn,
        event_id: &str,
    ) -> ApiResult<String> {
        if let Some(new_id) = self.get(&add_on.id) {
            return Ok(new_id);
        }

        let input = AddOn {
            event_id: Some(event_id.to_string()),
            ..add_on.clone()
        };

        let new_id = match backend.create_add_on(&input).await {
            Ok(id) => id,
            Err(e) if e.is_duplicate() => {
                debug!(add_on = %add_on.id, "Add-on already exists");
                add_on.id.clone()
            }
            Err(e) => return Err(e),
        };

        self.insert(add_on.id.clone(), new_id.clone());
        Ok(new_id)
    }
}
