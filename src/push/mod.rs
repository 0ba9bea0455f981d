//! Push notification fan-out for new chat messages and announcements.
//!
//! Architecture: DynamoDB stream -> this Lambda -> Expo push API
//!
//! The Lambda entrypoint in `src/bin/push_fanout.rs` deserializes the stream
//! event and delegates here.

mod dynamo;
mod expo;

pub use dynamo::DynamoPushTokenStore;
pub use expo::ExpoGateway;

use crate::configuration::{ANNOUNCEMENT_BODY_MAX_CHARS, DM_BODY_MAX_CHARS};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

// DynamoDB stream payloads. Only the fields the fan-out reads are modelled.

#[derive(Debug, Default, Deserialize)]
pub struct StreamEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<StreamRecord>,
}

#[derive(Debug, Deserialize)]
pub struct StreamRecord {
    #[serde(rename = "eventName", default)]
    pub event_name: Option<String>,
    #[serde(default)]
    pub dynamodb: Option<StreamPayload>,
}

#[derive(Debug, Deserialize)]
pub struct StreamPayload {
    #[serde(rename = "NewImage", default)]
    pub new_image: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PushData {
    Dm {
        #[serde(rename = "threadId")]
        thread_id: String,
    },
    Announcement {
        #[serde(rename = "deepLink")]
        deep_link: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushMessage {
    pub to: String,
    pub title: String,
    pub body: String,
    pub data: PushData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FanoutResult {
    pub ok: bool,
    pub sent: usize,
}

#[allow(async_fn_in_trait)]
pub trait PushTokenStore: Send + Sync {
    async fn tokens_for_user(&self, user_id: &str) -> Result<Vec<String>>;
    async fn all_tokens(&self) -> Result<Vec<String>>;
}

#[allow(async_fn_in_trait)]
pub trait PushGateway: Send + Sync {
    async fn send(&self, messages: &[PushMessage]) -> Result<()>;
}

/// Image attributes arrive either as plain JSON or as AttributeValue maps
/// (`{"S": "..."}`), depending on how the trigger is wired. Empty strings
/// count as absent.
fn get_string<'a>(image: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    string_value(image.get(key)?)
}

fn string_value(value: &Value) -> Option<&str> {
    let s = match value {
        Value::String(s) => s.as_str(),
        Value::Object(attr) => attr.get("S")?.as_str()?,
        _ => return None,
    };
    (!s.is_empty()).then_some(s)
}

fn get_string_list<'a>(image: &'a Map<String, Value>, key: &str) -> Vec<&'a str> {
    let items = match image.get(key) {
        Some(Value::Array(items)) => items,
        Some(Value::Object(attr)) => match attr.get("L") {
            Some(Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };
    items.iter().filter_map(string_value).collect()
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

enum Notification<'a> {
    DirectMessage {
        thread_id: &'a str,
        sender: &'a str,
        recipients: Vec<&'a str>,
        body: Option<&'a str>,
    },
    Announcement {
        title: Option<&'a str>,
        body: &'a str,
        deep_link: Option<&'a str>,
    },
}

fn classify(image: &Map<String, Value>) -> Option<Notification<'_>> {
    let thread_id = get_string(image, "threadId");
    let body = get_string(image, "body");

    if let Some(thread_id) = thread_id
        && let Some(sender) = get_string(image, "senderUserId")
    {
        let recipients = get_string_list(image, "owners")
            .into_iter()
            .filter(|owner| *owner != sender)
            .collect();
        return Some(Notification::DirectMessage {
            thread_id,
            sender,
            recipients,
            body,
        });
    }

    match (body, get_string(image, "eventId"), thread_id) {
        (Some(body), Some(_), None) => Some(Notification::Announcement {
            title: get_string(image, "title"),
            body,
            deep_link: get_string(image, "deepLink"),
        }),
        _ => None,
    }
}

async fn build_messages<S: PushTokenStore>(
    notification: Notification<'_>,
    store: &S,
) -> Result<Vec<PushMessage>> {
    let mut messages = Vec::new();

    match notification {
        Notification::DirectMessage {
            thread_id,
            sender,
            recipients,
            body,
        } => {
            let body = body
                .map(|b| truncate(b, DM_BODY_MAX_CHARS))
                .unwrap_or_else(|| "You have a new message".to_string());
            info!(thread_id, sender, recipients = recipients.len(), "Direct message");

            for recipient in recipients {
                let tokens = store
                    .tokens_for_user(recipient)
                    .await
                    .with_context(|| format!("Failed to list push tokens for {}", recipient))?;
                messages.extend(tokens.into_iter().map(|to| PushMessage {
                    to,
                    title: "New message".to_string(),
                    body: body.clone(),
                    data: PushData::Dm {
                        thread_id: thread_id.to_string(),
                    },
                }));
            }
        }
        Notification::Announcement {
            title,
            body,
            deep_link,
        } => {
            let tokens = store
                .all_tokens()
                .await
                .context("Failed to list push tokens")?;
            info!(tokens = tokens.len(), "Announcement");

            let title = title.unwrap_or("New announcement");
            let body = truncate(body, ANNOUNCEMENT_BODY_MAX_CHARS);
            messages.extend(tokens.into_iter().map(|to| PushMessage {
                to,
                title: title.to_string(),
                body: body.clone(),
                data: PushData::Announcement {
                    deep_link: deep_link.map(str::to_string),
                },
            }));
        }
    }

    Ok(messages)
}

/// Turn the INSERT records of a stream batch into push messages and send
/// them. Records that are neither a direct message nor an announcement are
/// ignored.
pub async fn handle_stream_event<S, G>(
    event: &StreamEvent,
    store: &S,
    gateway: &G,
) -> Result<FanoutResult>
where
    S: PushTokenStore,
    G: PushGateway,
{
    let mut messages = Vec::new();

    for record in &event.records {
        if record.event_name.as_deref() != Some("INSERT") {
            continue;
        }
        let Some(image) = record.dynamodb.as_ref().and_then(|d| d.new_image.as_ref()) else {
            warn!("INSERT record without NewImage");
            continue;
        };
        if let Some(notification) = classify(image) {
            messages.extend(build_messages(notification, store).await?);
        }
    }

    if !messages.is_empty() {
        gateway.send(&messages).await?;
    }

    info!(sent = messages.len(), "Push fan-out complete");
    Ok(FanoutResult {
        ok: true,
        sent: messages.len(),
    })
}

// ============================================================================
// Test utilities
// ============================================================================

#[cfg(test)]
pub(crate) mod test_utils {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub(crate) struct InMemoryTokenStore {
        pub tokens: HashMap<String, Vec<String>>,
    }

    impl InMemoryTokenStore {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn with_token(mut self, user_id: &str, token: &str) -> Self {
            self.tokens
                .entry(user_id.to_string())
                .or_default()
                .push(token.to_string());
            self
        }
    }

    impl PushTokenStore for InMemoryTokenStore {
        async fn tokens_for_user(&self, user_id: &str) -> Result<Vec<String>> {
            Ok(self.tokens.get(user_id).cloned().unwrap_or_default())
        }

        async fn all_tokens(&self) -> Result<Vec<String>> {
            let mut tokens: Vec<String> = self.tokens.values().flatten().cloned().collect();
            tokens.sort();
            Ok(tokens)
        }
    }

    #[derive(Default)]
    pub(crate) struct RecordingGateway {
        pub sent: Mutex<Vec<Vec<PushMessage>>>,
    }

    impl RecordingGateway {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn messages(&self) -> Vec<PushMessage> {
            self.sent.lock().unwrap().iter().flatten().cloned().collect()
        }
    }

    impl PushGateway for RecordingGateway {
        async fn send(&self, messages: &[PushMessage]) -> Result<()> {
            self.sent.lock().unwrap().push(messages.to_vec());
            Ok(())
        }
    }
}
