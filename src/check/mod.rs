//! Alt correlation and ban aggregation.
//!
//! # Pipeline
//!
//! ```text
//! command text ──► CommandParser ──► Resolver ──┐
//!                                               ▼
//! connect event ─(settling window)─► ip ──► CohortFetcher
//!                                               │
//!                                               ▼
//!                                    ReputationAggregator
//!                                               │
//!                              roster snapshot ─┤
//!                                               ▼
//!                                          decide() ──► Decision
//! ```
//!
//! Collaborators (identity store, live roster, reputation providers) are
//! injected as trait objects. Nothing is carried between checks.

pub mod cohort;
pub mod decision;
pub mod query;
pub mod reputation;
pub mod resolve;
pub mod store;

pub use cohort::{Cohort, CohortFetcher};
pub use decision::{AltPolicy, CheckOrigin, Decision, Escalation, decide};
pub use query::{CommandParser, IdentifierQuery};
pub use reputation::{ReputationAggregator, ReputationReport};
pub use resolve::Resolver;
pub use store::{IdentityRecord, IdentityStore};

use crate::error::{CheckError, CheckResult};
use crate::metrics;
use crate::roster::LiveRoster;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Runs the full alt-check pipeline.
pub struct AltChecker {
    resolver: Resolver,
    cohorts: CohortFetcher,
    aggregator: ReputationAggregator,
    roster: Arc<dyn LiveRoster>,
    policy: AltPolicy,
    settle_delay: Duration,
}

impl AltChecker {
    pub fn new(
        store: Arc<dyn IdentityStore>,
        roster: Arc<dyn LiveRoster>,
        aggregator: ReputationAggregator,
        policy: AltPolicy,
    ) -> Self {
        Self {
            resolver: Resolver::new(Arc::clone(&store), Arc::clone(&roster)),
            cohorts: CohortFetcher::new(store),
            aggregator,
            roster,
            policy,
            settle_delay: Duration::ZERO,
        }
    }

    /// Wait this long after a connect before reading the store.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Operator-requested check.
    pub async fn check(&self, query: &IdentifierQuery) -> CheckResult<Decision> {
        debug!(query = %query, "Alt check requested");
        let ip = self.resolver.resolve(query).await.inspect_err(not_found_metric)?;
        self.run(&ip, CheckOrigin::Command).await
    }

    /// Connect-triggered check for `player`, after the settling window.
    pub async fn check_connection(&self, player: IdentityRecord) -> CheckResult<Decision> {
        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }
        let Some(ip) = player.last_ip.clone() else {
            debug!(player = %player.last_name, "Connected player has no IP");
            return Err(CheckError::PlayerNotFound);
        };
        self.run(&ip, CheckOrigin::Connect(player)).await
    }

    async fn run(&self, ip: &str, origin: CheckOrigin) -> CheckResult<Decision> {
        let cohort = self.cohorts.fetch(ip).await?;
        if cohort.is_empty() {
            debug!(ip = %ip, "Empty cohort");
            metrics::record_not_found();
            return Err(CheckError::PlayerNotFound);
        }

        // A connect without alts produces no report, so skip the provider calls.
        let reports = if matches!(origin, CheckOrigin::Connect(_)) && !cohort.has_alts() {
            vec![ReputationReport::default(); cohort.len()]
        } else {
            self.aggregator.aggregate(&cohort).await
        };

        let roster = self.roster.snapshot();
        let decision = decide(cohort, reports, &roster, &origin, &self.policy);

        metrics::record_check(origin.label(), decision.cohort.has_alts());
        info!(
            origin = origin.label(),
            ip = %ip,
            members = decision.cohort.len(),
            should_kick = decision.should_kick,
            cheater = decision.cheater_detected,
            escalation = ?decision.escalation,
            "Alt check complete"
        );

        Ok(decision)
    }
}

fn not_found_metric(err: &CheckError) {
    if matches!(err, CheckError::PlayerNotFound) {
        metrics::record_not_found();
    }
}
