//! services/app/src/adapters/token_endpoint.rs
//!
//! The `TokenEndpoint` port over HTTP: one `authorization_code` grant POSTed as a
//! form to the provider's token URL, using `reqwest`.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;
use task_keeper_core::ports::{CodeExchange, PortError, PortResult, TokenEndpoint, TokenResponse};
use tracing::{debug, warn};

pub struct HttpTokenEndpoint {
    client: Client,
    token_url: Url,
}

impl HttpTokenEndpoint {
    pub fn new(token_url: Url) -> Self {
        Self::with_client(Client::new(), token_url)
    }

    pub fn with_client(client: Client, token_url: Url) -> Self {
        Self { client, token_url }
    }
}

/// The provider's raw JSON. The profile fields ride along next to the tokens.
#[derive(Debug, Deserialize)]
struct RawTokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    login: Option<String>,
    #[serde(rename = "usuarioId")]
    user_id: Option<Value>,
    #[serde(rename = "usuarioNome")]
    user_name: Option<String>,
}

impl RawTokenResponse {
    fn to_domain(self) -> TokenResponse {
        let user_id = match self.user_id {
            Some(Value::String(id)) => Some(id),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => None,
        };
        TokenResponse {
            access_token: self.access_token.filter(|token| !token.is_empty()),
            refresh_token: self.refresh_token,
            user_id,
            user_name: self.user_name,
            login: self.login,
        }
    }
}

#[async_trait]
impl TokenEndpoint for HttpTokenEndpoint {
    async fn exchange_code(&self, exchange: &CodeExchange) -> PortResult<TokenResponse> {
        let form = [
            ("grant_type", "authorization_code"),
            ("code", exchange.code.as_str()),
            ("redirect_uri", exchange.redirect_uri.as_str()),
            ("client_id", exchange.client_id.as_str()),
            ("client_secret", exchange.client_secret.as_str()),
        ];

        debug!(token_url = %self.token_url, "Exchanging authorization code");
        let response = self
            .client
            .post(self.token_url.clone())
            .header(ACCEPT, "application/json")
            .form(&form)
            .send()
            .await
            .map_err(|e| PortError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "Token endpoint rejected the code exchange");
            return Err(PortError::Network(format!(
                "token endpoint answered {}: {}",
                status, body
            )));
        }

        let raw: RawTokenResponse = response
            .json()
            .await
            .map_err(|e| PortError::Unexpected(format!("unreadable token response: {}", e)))?;
        Ok(raw.to_domain())
    }
}
