//! DynamoDB-stream-triggered Lambda entrypoint for push notification fan-out.
//!
//! Architecture: message/announcement table stream -> this Lambda -> Expo
//!
//! Delegates record processing to `aps_admin::push`.

use aps_admin::configuration::EXPO_PUSH_URL;
use aps_admin::push::{DynamoPushTokenStore, ExpoGateway, FanoutResult, StreamEvent};
use aws_config::BehaviorVersion;
use lambda_runtime::{Error, LambdaEvent, service_fn};
use std::env;
use std::sync::Arc;

struct Services {
    store: DynamoPushTokenStore,
    gateway: ExpoGateway,
}

fn require_env(name: &str) -> Result<String, Error> {
    env::var(name).map_err(|_| Error::from(format!("Missing required env var: {}", name)))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .json()
        .init();

    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let dynamodb_client = aws_sdk_dynamodb::Client::new(&config);
    let table_name = require_env("PUSH_TOKEN_TABLE_NAME")?;
    let user_index = require_env("PUSH_TOKEN_GSI_NAME")?;

    let expo_url = env::var("EXPO_PUSH_URL").unwrap_or_else(|_| EXPO_PUSH_URL.to_string());
    let access_token = env::var("EXPO_ACCESS_TOKEN").ok();

    let services = Arc::new(Services {
        store: DynamoPushTokenStore::new(dynamodb_client, table_name, user_index),
        gateway: ExpoGateway::new(expo_url, access_token),
    });

    lambda_runtime::run(service_fn(|event| handler(event, services.clone()))).await?;
    Ok(())
}

async fn handler(
    event: LambdaEvent<StreamEvent>,
    services: Arc<Services>,
) -> Result<FanoutResult, Error> {
    aps_admin::push::handle_stream_event(&event.payload, &services.store, &services.gateway)
        .await
        .map_err(|e| Error::from(format!("{:#}", e)))
}
