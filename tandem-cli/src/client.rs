//! HTTP client for the hub API

use anyhow::{Result, bail};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tandem_core::{HubStats, LeaderboardPage};
use tandem_server::http::{ErrorResponse, EventResponse, RegisterResponse, StateResponse};

/// Default hub address, matching the server's default port.
pub const DEFAULT_HUB_URL: &str = "http://127.0.0.1:8600";

/// Thin typed wrapper over the hub's HTTP API.
pub struct HubClient {
    base_url: String,
    api_key: Option<String>,
    http: reqwest::Client,
}

impl HubClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
            http: reqwest::Client::new(),
        }
    }

    /// Attach the API key sent as a bearer token on authenticated calls.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    /// Decode a success body, or surface the hub's error code and message.
    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        match response.json::<ErrorResponse>().await {
            Ok(body) => bail!("{} ({})", body.error, body.code),
            Err(_) => bail!("hub returned {}", status),
        }
    }

    pub async fn register(&self, body: &Value) -> Result<RegisterResponse> {
        let response = self
            .http
            .post(self.url("/api/register"))
            .json(body)
            .send()
            .await?;
        Self::parse(response).await
    }

    pub async fn submit_event(&self, body: &Value) -> Result<EventResponse> {
        let request = self
            .authed(self.http.post(self.url("/api/events")))
            .json(body);
        Self::parse(request.send().await?).await
    }

    pub async fn state(&self, runtime_id: &str) -> Result<StateResponse> {
        let request = self.authed(
            self.http
                .get(self.url(&format!("/api/runtime/{runtime_id}/state"))),
        );
        Self::parse(request.send().await?).await
    }

    pub async fn leaderboard(&self, query: &[(&str, String)]) -> Result<LeaderboardPage> {
        let request = self.http.get(self.url("/api/leaderboard")).query(query);
        Self::parse(request.send().await?).await
    }

    pub async fn stats(&self) -> Result<HubStats> {
        let response = self.http.get(self.url("/api/stats")).send().await?;
        Self::parse(response).await
    }
}
