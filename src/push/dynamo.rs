use super::PushTokenStore;
use anyhow::{Context, Result};
use aws_sdk_dynamodb::{Client, types::AttributeValue};
use std::collections::HashMap;

// ============================================================================
// DynamoPushTokenStore: push tokens registered by the mobile app
// ============================================================================

pub struct DynamoPushTokenStore {
    client: Client,
    table_name: String,
    user_index: String,
}

impl DynamoPushTokenStore {
    pub fn new(client: Client, table_name: String, user_index: String) -> Self {
        Self {
            client,
            table_name,
            user_index,
        }
    }
}

impl PushTokenStore for DynamoPushTokenStore {
    async fn tokens_for_user(&self, user_id: &str) -> Result<Vec<String>> {
        let mut tokens = Vec::new();
        let mut exclusive_start_key = None;

        loop {
            let output = self
                .client
                .query()
                .table_name(&self.table_name)
                .index_name(&self.user_index)
                .key_condition_expression("#userId = :userId")
                .expression_attribute_names("#userId", "userId")
                .expression_attribute_values(":userId", AttributeValue::S(user_id.to_string()))
                .set_exclusive_start_key(exclusive_start_key)
                .send()
                .await
                .context("Failed to query push tokens by user")?;

            tokens.extend(output.items.unwrap_or_default().iter().filter_map(token_from_item));

            exclusive_start_key = output.last_evaluated_key;
            if exclusive_start_key.is_none() {
                break;
            }
        }

        Ok(tokens)
    }

    async fn all_tokens(&self) -> Result<Vec<String>> {
        let mut tokens = Vec::new();
        let mut exclusive_start_key = None;

        loop {
            let output = self
                .client
                .scan()
                .table_name(&self.table_name)
                .set_exclusive_start_key(exclusive_start_key)
                .send()
                .await
                .context("Failed to scan push tokens")?;

            tokens.extend(output.items.unwrap_or_default().iter().filter_map(token_from_item));

            exclusive_start_key = output.last_evaluated_key;
            if exclusive_start_key.is_none() {
                break;
            }
        }

        Ok(tokens)
    }
}

/// Rows without a usable `token` attribute are skipped.
pub(crate) fn token_from_item(item: &HashMap<String, AttributeValue>) -> Option<String> {
    item.get("token")
        .and_then(|v| v.as_s().ok())
        .filter(|token| !token.is_empty())
        .cloned()
}
