//! Reputation aggregation across two external ban services.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  ReputationAggregator                    │
//! ├──────────────────────────────────────────────────────────┤
//! │  per member (all members joined):                        │
//! │   ┌──────────────────────┐   ┌─────────────────────────┐ │
//! │   │  BanCountProvider    │   │ CommunityReputation     │ │
//! │   │  (BattleMetrics)     │   │ Provider (CBL GraphQL)  │ │
//! │   │  fail -> 0 / 0       │   │ fail -> absent          │ │
//! │   └──────────────────────┘   └─────────────────────────┘ │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Provider failures and timeouts never leave this module: they are logged,
//! counted, and replaced with degraded values.

pub mod battlemetrics;
pub mod cbl;
pub mod keywords;

pub use battlemetrics::BattleMetricsClient;
pub use cbl::CommunityBanListClient;
pub use keywords::CheaterKeywords;

use super::cohort::Cohort;
use super::store::IdentityRecord;
use crate::error::ProviderError;
use async_trait::async_trait;
use futures_util::future::join_all;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// One ban as reported by the ban-count provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BanEntry {
    /// Record type; only `"ban"` entries count.
    pub kind: String,
    pub reason: String,
}

impl BanEntry {
    pub fn ban(reason: impl Into<String>) -> Self {
        Self {
            kind: "ban".to_string(),
            reason: reason.into(),
        }
    }
}

/// Ban totals for one account. `cheater_bans <= total_bans`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BanCounts {
    pub total_bans: u32,
    pub cheater_bans: u32,
}

impl BanCounts {
    /// Count `ban` entries and those whose reason matches a cheating keyword.
    pub fn tally(entries: &[BanEntry], keywords: &CheaterKeywords) -> Self {
        let mut counts = Self::default();
        for entry in entries.iter().filter(|e| e.kind == "ban") {
            counts.total_bans = counts.total_bans.saturating_add(1);
            if keywords.matches(&entry.reason) {
                counts.cheater_bans = counts.cheater_bans.saturating_add(1);
            }
        }
        counts
    }
}

/// Community Ban List profile figures.
#[derive(Debug, Clone, PartialEq)]
pub struct CommunityReputation {
    pub reputation_points: f64,
    /// 0 to 10.
    pub risk_rating: f64,
    pub reputation_rank: Option<u64>,
    pub active_bans: usize,
    pub expired_bans: usize,
}

/// Answer from the community reputation provider.
#[derive(Debug, Clone, PartialEq)]
pub enum CommunityLookup {
    Listed(CommunityReputation),
    /// The service answered and does not know the player.
    NotListed,
}

/// Per-member merged reputation. `None` fields mean unknown: the provider is
/// disabled, had no identifier to query, or failed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReputationReport {
    pub bans: Option<BanCounts>,
    pub community: Option<CommunityLookup>,
}

impl ReputationReport {
    pub fn total_bans(&self) -> u32 {
        self.bans.map_or(0, |b| b.total_bans)
    }

    pub fn cheater_bans(&self) -> u32 {
        self.bans.map_or(0, |b| b.cheater_bans)
    }

    pub fn is_cheater(&self) -> bool {
        self.cheater_bans() > 0
    }
}

/// True iff any member has at least one cheating ban.
pub fn cheater_detected(reports: &[ReputationReport]) -> bool {
    reports.iter().any(ReputationReport::is_cheater)
}

#[async_trait]
pub trait BanCountProvider: Send + Sync {
    /// Provider name for logs and metrics.
    fn name(&self) -> &'static str;

    /// All ban records for a player identifier.
    async fn fetch_bans(&self, identifier: &str) -> Result<Vec<BanEntry>, ProviderError>;
}

#[async_trait]
pub trait CommunityReputationProvider: Send + Sync {
    /// Provider name for logs and metrics.
    fn name(&self) -> &'static str;

    /// Reputation profile for a Steam ID.
    async fn lookup(&self, steam_id: &str) -> Result<CommunityLookup, ProviderError>;
}

/// Fans out reputation lookups for a cohort and merges the answers.
pub struct ReputationAggregator {
    bans: Option<(Arc<dyn BanCountProvider>, Duration)>,
    community: Option<(Arc<dyn CommunityReputationProvider>, Duration)>,
    keywords: CheaterKeywords,
}

impl ReputationAggregator {
    /// An aggregator with both providers disabled.
    pub fn new(keywords: CheaterKeywords) -> Self {
        Self {
            bans: None,
            community: None,
            keywords,
        }
    }

    pub fn with_ban_provider(mut self, provider: Arc<dyn BanCountProvider>, timeout: Duration) -> Self {
        self.bans = Some((provider, timeout));
        self
    }

    pub fn with_community_provider(
        mut self,
        provider: Arc<dyn CommunityReputationProvider>,
        timeout: Duration,
    ) -> Self {
        self.community = Some((provider, timeout));
        self
    }

    /// One report per member, in cohort order. Waits for every lookup.
    pub async fn aggregate(&self, cohort: &Cohort) -> Vec<ReputationReport> {
        join_all(cohort.members.iter().map(|member| self.report_for(member))).await
    }

    async fn report_for(&self, member: &IdentityRecord) -> ReputationReport {
        let (bans, community) = tokio::join!(self.ban_counts(member), self.community(member));
        ReputationReport { bans, community }
    }

    async fn ban_counts(&self, member: &IdentityRecord) -> Option<BanCounts> {
        let (provider, limit) = self.bans.as_ref()?;
        let Some(identifier) = member.preferred_id() else {
            debug!(player = %member.last_name, "No identifier for ban lookup");
            return None;
        };

        match bounded(*limit, provider.fetch_bans(identifier)).await {
            Ok(entries) => Some(BanCounts::tally(&entries, &self.keywords)),
            Err(e) => {
                degraded(provider.name(), identifier, &e);
                Some(BanCounts::default())
            }
        }
    }

    async fn community(&self, member: &IdentityRecord) -> Option<CommunityLookup> {
        let (provider, limit) = self.community.as_ref()?;
        let steam_id = member.steam_id.as_deref()?;

        match bounded(*limit, provider.lookup(steam_id)).await {
            Ok(CommunityLookup::NotListed) => {
                debug!(steam_id = %steam_id, "Player is not listed in the Community Ban List");
                Some(CommunityLookup::NotListed)
            }
            Ok(listed) => Some(listed),
            Err(e) => {
                degraded(provider.name(), steam_id, &e);
                None
            }
        }
    }
}

/// Apply the per-call timeout; expiry is a provider failure.
async fn bounded<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, ProviderError>>,
) -> Result<T, ProviderError> {
    tokio::time::timeout(limit, call)
        .await
        .unwrap_or(Err(ProviderError::Timeout))
}

fn degraded(provider: &'static str, identifier: &str, error: &ProviderError) {
    warn!(provider, identifier = %identifier, error = %error, "Reputation provider degraded");
    crate::metrics::record_provider_failure(provider, error.error_code());
}
