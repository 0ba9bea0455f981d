//! Minimal AppSync GraphQL transport.
//!
//! Both the legacy and the new backend are AppSync APIs reached with an API
//! key. Errors are classified into [`GraphQlError`] so callers can tell a
//! "record already exists" rejection apart from everything else.

use anyhow::{Result, bail};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::env;

/// `errorType` AppSync reports when a create hits an existing primary key.
const DUPLICATE_ERROR_TYPE: &str = "DynamoDB:ConditionalCheckFailedException";

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum GraphQlError {
    /// The mutation was rejected because the record already exists.
    #[error("{0}")]
    Duplicate(String),
    /// The API answered with a non-empty `errors` array.
    #[error("{0}")]
    Rejected(String),
    #[error("{label} request failed: {status}")]
    Status {
        label: &'static str,
        status: reqwest::StatusCode,
    },
    #[error("No data returned from {0}")]
    NoData(&'static str),
    #[error("Failed to decode {label} response: {source}")]
    Decode {
        label: &'static str,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl GraphQlError {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate(_))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ErrorEntry {
    pub message: String,
    #[serde(default)]
    pub error_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Vec<ErrorEntry>,
}

/// Substring match against the backend's error text. Kept for resolvers that
/// do not surface a conditional-check `errorType`.
pub fn is_duplicate_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("already exists") || lower.contains("duplicate")
}

pub(crate) fn classify(errors: &[ErrorEntry]) -> GraphQlError {
    let message = errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    // Any other error in the same response means the write was not a plain
    // key collision.
    let duplicate = !errors.is_empty()
        && errors.iter().all(|e| {
            e.error_type.as_deref() == Some(DUPLICATE_ERROR_TYPE)
                || is_duplicate_message(&e.message)
        });

    if duplicate {
        GraphQlError::Duplicate(message)
    } else {
        GraphQlError::Rejected(message)
    }
}

pub(crate) fn unwrap_envelope<T: DeserializeOwned>(
    label: &'static str,
    envelope: Envelope,
) -> Result<T, GraphQlError> {
    if !envelope.errors.is_empty() {
        return Err(classify(&envelope.errors));
    }

    let data = match envelope.data {
        Some(Value::Null) | None => return Err(GraphQlError::NoData(label)),
        Some(data) => data,
    };

    serde_json::from_value(data).map_err(|source| GraphQlError::Decode { label, source })
}

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone)]
pub struct AppSyncConfig {
    pub endpoint: String,
    pub api_key: String,
    pub label: &'static str,
}

impl AppSyncConfig {
    /// Legacy API: `OLD_APPSYNC_GRAPHQL_ENDPOINT` / `OLD_APPSYNC_API_KEY`.
    pub fn legacy_from_env() -> Result<Self> {
        Self::from_env(
            "OLD_APPSYNC_GRAPHQL_ENDPOINT",
            "OLD_APPSYNC_API_KEY",
            "Old AppSync",
        )
    }

    /// Current API: `AWS_APPSYNC_GRAPHQL_ENDPOINT` / `AWS_APPSYNC_API_KEY`.
    pub fn current_from_env() -> Result<Self> {
        Self::from_env(
            "AWS_APPSYNC_GRAPHQL_ENDPOINT",
            "AWS_APPSYNC_API_KEY",
            "AppSync",
        )
    }

    fn from_env(endpoint_var: &str, key_var: &str, label: &'static str) -> Result<Self> {
        let (Some(endpoint), Some(api_key)) = (env_var(endpoint_var), env_var(key_var)) else {
            bail!("Missing {} configuration ({}, {})", label, endpoint_var, key_var);
        };

        Ok(Self {
            endpoint,
            api_key,
            label,
        })
    }
}

/// Reads `name`, falling back to the `NEXT_PUBLIC_` variant the portal also sets.
fn env_var(name: &str) -> Option<String> {
    env::var(name)
        .or_else(|_| env::var(format!("NEXT_PUBLIC_{}", name)))
        .ok()
        .filter(|v| !v.trim().is_empty())
}

// ============================================================================
// Client
// ============================================================================

#[derive(Clone)]
pub struct GraphQlClient {
    http: Client,
    config: AppSyncConfig,
}

impl GraphQlClient {
    pub fn new(config: AppSyncConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    pub fn label(&self) -> &'static str {
        self.config.label
    }

    pub async fn request<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
    ) -> Result<T, GraphQlError> {
        let response = self
            .http
            .post(&self.config.endpoint)
            .header("x-api-key", &self.config.api_key)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GraphQlError::Status {
                label: self.config.label,
                status,
            });
        }

        let envelope: Envelope = response.json().await?;
        unwrap_envelope(self.config.label, envelope)
    }
}
