//! Community Ban List GraphQL client.

use super::{CommunityLookup, CommunityReputation, CommunityReputationProvider};
use crate::config::CommunityBanListConfig;
use crate::error::ProviderError;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

const STEAM_USER_QUERY: &str = r#"
query Search($id: String!) {
  steamUser(id: $id) {
    id
    name
    reputationPoints
    riskRating
    reputationRank
    activeBans: bans(orderBy: "created", orderDirection: DESC, expired: false) {
      edges { cursor }
    }
    expiredBans: bans(orderBy: "created", orderDirection: DESC, expired: true) {
      edges { cursor }
    }
  }
}
"#;

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<SearchData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchData {
    steam_user: Option<SteamUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SteamUser {
    #[serde(default)]
    reputation_points: Option<f64>,
    #[serde(default)]
    risk_rating: Option<f64>,
    #[serde(default)]
    reputation_rank: Option<u64>,
    #[serde(default)]
    active_bans: Edges,
    #[serde(default)]
    expired_bans: Edges,
}

#[derive(Debug, Default, Deserialize)]
struct Edges {
    #[serde(default)]
    edges: Vec<serde_json::Value>,
}

/// Community reputation provider backed by the CBL GraphQL endpoint.
pub struct CommunityBanListClient {
    http_client: reqwest::Client,
    endpoint: String,
}

impl CommunityBanListClient {
    pub fn new(config: &CommunityBanListConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("altwatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        info!(endpoint = %config.endpoint, "Community Ban List client initialized");

        Self {
            http_client,
            endpoint: config.endpoint.clone(),
        }
    }

    /// Public search page for profile links.
    pub fn profile_url(steam_id: &str) -> String {
        format!("https://communitybanlist.com/search/{}", steam_id)
    }
}

#[async_trait]
impl CommunityReputationProvider for CommunityBanListClient {
    fn name(&self) -> &'static str {
        "community_ban_list"
    }

    async fn lookup(&self, steam_id: &str) -> Result<CommunityLookup, ProviderError> {
        let payload = json!({
            "query": STEAM_USER_QUERY,
            "variables": { "id": steam_id },
        });

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        let body: GraphQlResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        if let Some(first) = body.errors.first() {
            return Err(ProviderError::Decode(first.message.clone()));
        }

        let data = body
            .data
            .ok_or_else(|| ProviderError::Decode("response has no data".to_string()))?;

        Ok(match data.steam_user {
            None => CommunityLookup::NotListed,
            Some(user) => CommunityLookup::Listed(CommunityReputation {
                reputation_points: user.reputation_points.unwrap_or(0.0),
                risk_rating: user.risk_rating.unwrap_or(0.0),
                reputation_rank: user.reputation_rank,
                active_bans: user.active_bans.edges.len(),
                expired_bans: user.expired_bans.edges.len(),
            }),
        })
    }
}
