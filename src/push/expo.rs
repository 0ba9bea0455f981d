use super::{PushGateway, PushMessage};
use crate::configuration::EXPO_CHUNK_SIZE;
use anyhow::{Context, Result, bail};
use reqwest::header::AUTHORIZATION;
use tracing::info;

/// Sends push messages through the Expo push API.
pub struct ExpoGateway {
    http: reqwest::Client,
    url: String,
    access_token: Option<String>,
}

impl ExpoGateway {
    pub fn new(url: String, access_token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url,
            access_token: access_token.filter(|t| !t.is_empty()),
        }
    }

    fn build_request(&self, messages: &[PushMessage]) -> reqwest::Result<reqwest::Request> {
        let mut request = self.http.post(&self.url).json(messages);
        if let Some(token) = &self.access_token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        request.build()
    }
}

impl PushGateway for ExpoGateway {
    async fn send(&self, messages: &[PushMessage]) -> Result<()> {
        for (index, chunk) in messages.chunks(EXPO_CHUNK_SIZE).enumerate() {
            let request = self
                .build_request(chunk)
                .context("Failed to build Expo push request")?;
            let response = self
                .http
                .execute(request)
                .await
                .context("Failed to send Expo push request")?;

            let status = response.status();
            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                bail!("Expo push failed: {} {}", status, text);
            }
            info!(chunk = index + 1, messages = chunk.len(), "Expo push accepted");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::push::PushData;
    use reqwest::header::CONTENT_TYPE;

    fn message(to: &str) -> PushMessage {
        PushMessage {
            to: to.to_string(),
            title: "New message".to_string(),
            body: "Hi".to_string(),
            data: PushData::Dm {
                thread_id: "t-1".to_string(),
            },
        }
    }

    #[test]
    fn request_carries_bearer_token_and_json_array() {
        let gateway = ExpoGateway::new(
            "https://exp.host/--/api/v2/push/send".to_string(),
            Some("secret".to_string()),
        );
        let request = gateway.build_request(&[message("ExponentPushToken[a]")]).unwrap();

        assert_eq!(request.headers()[AUTHORIZATION], "Bearer secret");
        assert_eq!(request.headers()[CONTENT_TYPE], "application/json");
        let body: serde_json::Value =
            serde_json::from_slice(request.body().and_then(|b| b.as_bytes()).unwrap()).unwrap();
        assert_eq!(body[0]["to"], "ExponentPushToken[a]");
        assert_eq!(body[0]["data"]["type"], "dm");
    }

    #[test]
    fn empty_access_token_sends_no_authorization() {
        let gateway = ExpoGateway::new("https://example.com/push".to_string(), Some(String::new()));
        let request = gateway.build_request(&[message("t")]).unwrap();
        assert!(request.headers().get(AUTHORIZATION).is_none());
    }
}
