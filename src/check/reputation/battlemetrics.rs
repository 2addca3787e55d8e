//! BattleMetrics ban API client.
//!
//! `GET {base}/bans?filter[search]=<identifier>` with a bearer token. Only the
//! record type and the free-text reason of each ban are used.

use super::{BanCountProvider, BanEntry};
use crate::config::BattleMetricsConfig;
use crate::error::ProviderError;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct BansResponse {
    #[serde(default)]
    data: Vec<BanResource>,
}

#[derive(Debug, Deserialize)]
struct BanResource {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    attributes: BanAttributes,
}

#[derive(Debug, Default, Deserialize)]
struct BanAttributes {
    #[serde(default)]
    reason: Option<String>,
}

/// Ban-count provider backed by the BattleMetrics REST API.
pub struct BattleMetricsClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl BattleMetricsClient {
    pub fn new(config: &BattleMetricsConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("altwatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        info!(base_url = %config.base_url, timeout_secs = config.timeout_secs, "BattleMetrics client initialized");

        Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().unwrap_or_default(),
        }
    }

    /// RCON player search URL for profile links.
    pub fn profile_url(identifier: &str) -> String {
        format!(
            "https://www.battlemetrics.com/rcon/players?filter%5Bsearch%5D={}&filter%5Bservers%5D=false&filter%5BplayerFlags%5D=&sort=-lastSeen&showServers=true&method=quick&redirect=1",
            identifier
        )
    }
}

#[async_trait]
impl BanCountProvider for BattleMetricsClient {
    fn name(&self) -> &'static str {
        "battlemetrics"
    }

    async fn fetch_bans(&self, identifier: &str) -> Result<Vec<BanEntry>, ProviderError> {
        let url = format!("{}/bans", self.base_url);
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.api_key)
            .query(&[("filter[search]", identifier)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let body: BansResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        debug!(identifier = %identifier, records = body.data.len(), "BattleMetrics bans fetched");

        Ok(body
            .data
            .into_iter()
            .map(|ban| BanEntry {
                kind: ban.kind,
                reason: ban.attributes.reason.unwrap_or_default(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use std::collections::HashMap;

    async fn bans_handler(
        headers: HeaderMap,
        Query(params): Query<HashMap<String, String>>,
    ) -> Result<Json<serde_json::Value>, StatusCode> {
        if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("Bearer token") {
            return Err(StatusCode::UNAUTHORIZED);
        }
        let data = match params.get("filter[search]").map(String::as_str) {
            Some("cheater") => serde_json::json!([
                { "type": "ban", "attributes": { "reason": "Cheating (aimbot)" } },
                { "type": "ban", "attributes": { "reason": "Teamkilling" } },
                { "type": "ban", "attributes": { "reason": null } },
                { "type": "banExemption", "attributes": {} }
            ]),
            _ => serde_json::json!([]),
        };
        Ok(Json(serde_json::json!({ "data": data })))
    }

    async fn spawn_api() -> String {
        let app = Router::new().route("/bans", get(bans_handler));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/", addr)
    }

    fn client(base_url: String, api_key: &str) -> BattleMetricsClient {
        BattleMetricsClient::new(&BattleMetricsConfig {
            enabled: true,
            api_key: Some(api_key.to_string()),
            base_url,
            timeout_secs: 2,
        })
    }

    #[tokio::test]
    async fn test_fetch_bans_parses_records() {
        let c = client(spawn_api().await, "token");
        let bans = c.fetch_bans("cheater").await.unwrap();
        assert_eq!(bans.len(), 4);
        assert_eq!(bans[0], BanEntry::ban("Cheating (aimbot)"));
        assert_eq!(bans[2].reason, "");
        assert_eq!(bans[3].kind, "banExemption");
        assert!(c.fetch_bans("clean").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bad_token_is_status_error() {
        let c = client(spawn_api().await, "wrong");
        let err = c.fetch_bans("cheater").await.unwrap_err();
        assert!(matches!(err, ProviderError::Status(401)));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let c = client("http://127.0.0.1:9".to_string(), "token");
        let err = c.fetch_bans("cheater").await.unwrap_err();
        assert!(matches!(err, ProviderError::Transport(_)));
    }

    #[test]
    fn test_profile_url_embeds_identifier() {
        assert!(BattleMetricsClient::profile_url("abc").contains("filter%5Bsearch%5D=abc&"));
    }
}
