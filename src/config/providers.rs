//! Reputation provider configuration.

use serde::Deserialize;
use std::time::Duration;

use super::types::default_true;

/// Provider tables (`[providers.*]`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvidersConfig {
    /// BattleMetrics ban-count provider.
    #[serde(default)]
    pub battlemetrics: BattleMetricsConfig,
    /// Community Ban List reputation provider.
    #[serde(default)]
    pub community_ban_list: CommunityBanListConfig,
}

/// BattleMetrics ban API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BattleMetricsConfig {
    /// Query BattleMetrics for ban counts (default: true).
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Bearer token. Required while enabled.
    pub api_key: Option<String>,
    /// API root (default: "https://api.battlemetrics.com").
    #[serde(default = "default_battlemetrics_url")]
    pub base_url: String,
    /// Per-request timeout in seconds (default: 5).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BattleMetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            base_url: default_battlemetrics_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl BattleMetricsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Community Ban List GraphQL configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CommunityBanListConfig {
    /// Query the Community Ban List (default: true).
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// GraphQL endpoint (default: "https://communitybanlist.com/graphql").
    #[serde(default = "default_cbl_endpoint")]
    pub endpoint: String,
    /// Per-request timeout in seconds (default: 5).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CommunityBanListConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_cbl_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl CommunityBanListConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_battlemetrics_url() -> String {
    "https://api.battlemetrics.com".to_string()
}

fn default_cbl_endpoint() -> String {
    "https://communitybanlist.com/graphql".to_string()
}

fn default_timeout_secs() -> u64 {
    5
}
