use anyhow::Context;
use async_trait::async_trait;
use gmpa_core::{BotClient, BotReply};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Tokens are refreshed this long before the server says they expire.
const EXPIRY_MARGIN: Duration = Duration::from_secs(30);

/// OAuth2 client-credentials for the Interact service.
#[derive(Clone)]
pub struct InteractCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub application_id: String,
}

impl std::fmt::Debug for InteractCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("application_id", &self.application_id)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// Client for Interact chat-AI bots.
///
/// Every message call is authorised with a bearer token obtained through the
/// client-credentials grant. Tokens that carry `expires_in` are reused until
/// shortly before they expire; others are fetched again for each call.
pub struct InteractClient {
    client: Client,
    base_url: String,
    token_path: String,
    credentials: InteractCredentials,
    cached_token: RwLock<Option<CachedToken>>,
}

impl InteractClient {
    pub fn new(base_url: impl Into<String>, credentials: InteractCredentials) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        info!("Creating InteractClient for {base_url}");
        Self {
            client: Client::new(),
            base_url,
            token_path: "/api/token".to_string(),
            credentials,
            cached_token: RwLock::new(None),
        }
    }

    #[must_use]
    pub fn with_token_path(mut self, token_path: impl Into<String>) -> Self {
        self.token_path = token_path.into();
        self
    }

    fn token_url(&self) -> String {
        format!("{}{}", self.base_url, self.token_path)
    }

    fn messages_url(&self, bot_id: &str) -> String {
        format!("{}/api/chat-ai/v1/bots/{bot_id}/messages", self.base_url)
    }

    /// A valid access token, from cache when possible.
    pub async fn access_token(&self) -> anyhow::Result<String> {
        if let Some(cached) = self.cached_token.read().await.as_ref() {
            if Instant::now() < cached.expires_at {
                debug!("Reusing cached access token");
                return Ok(cached.token.clone());
            }
        }

        let response = self.fetch_token().await?;
        let token = response
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| anyhow::anyhow!("Invalid token response: missing access_token"))?;

        let mut cache = self.cached_token.write().await;
        // A lifetime too large to represent is treated as having none.
        *cache = response
            .expires_in
            .and_then(|secs| {
                Instant::now().checked_add(Duration::from_secs(secs).saturating_sub(EXPIRY_MARGIN))
            })
            .map(|expires_at| CachedToken {
                token: token.clone(),
                expires_at,
            });

        Ok(token)
    }

    async fn fetch_token(&self) -> anyhow::Result<TokenResponse> {
        info!("Requesting access token from {}", self.token_url());

        let response = self
            .client
            .post(self.token_url())
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .context("Error obtaining token")?
            .error_for_status()
            .context("Error obtaining token")?
            .json::<TokenResponse>()
            .await
            .context("Invalid token response")?;

        Ok(response)
    }
}

#[async_trait]
impl BotClient for InteractClient {
    async fn send_message(&self, bot_id: &str, message: &str) -> anyhow::Result<BotReply> {
        let token = self.access_token().await?;

        info!(
            "Sending message to bot {bot_id}: {} bytes",
            message.len()
        );

        let body = self
            .client
            .post(self.messages_url(bot_id))
            .bearer_auth(token)
            .header("X-APPLICATION-ID", &self.credentials.application_id)
            .json(&json!({
                "files": [],
                "message": message,
            }))
            .send()
            .await
            .context("API call failed")?
            .error_for_status()
            .context("API call failed")?
            .json::<serde_json::Value>()
            .await
            .context("Invalid bot response: body is not JSON")?;

        info!("Received response from bot {bot_id}");
        Ok(BotReply::new(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> InteractClient {
        InteractClient::new(
            base,
            InteractCredentials {
                client_id: "id".to_string(),
                client_secret: "secret".to_string(),
                application_id: "test".to_string(),
            },
        )
    }

    #[test]
    fn urls_are_built_from_base() {
        let c = client("https://interact.example.com/").with_token_path("/oauth/token");
        assert_eq!(c.token_url(), "https://interact.example.com/oauth/token");
        assert_eq!(
            c.messages_url("bot-1"),
            "https://interact.example.com/api/chat-ai/v1/bots/bot-1/messages"
        );
    }

    #[test]
    fn debug_hides_secret() {
        let c = client("https://interact.example.com");
        let printed = format!("{:?}", c.credentials);
        assert!(!printed.contains("\"secret\""));
        assert!(printed.contains("***"));
    }
}
