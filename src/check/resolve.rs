//! Identity resolution: identifier -> canonical IP.

use super::query::IdentifierQuery;
use super::store::{IdentityRecord, IdentityStore};
use crate::error::{CheckError, CheckResult};
use crate::roster::LiveRoster;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Upper bound on store rows considered for a name search.
const NAME_SEARCH_LIMIT: usize = 2;

/// Resolves an [`IdentifierQuery`] to the IP whose cohort should be checked.
pub struct Resolver {
    store: Arc<dyn IdentityStore>,
    roster: Arc<dyn LiveRoster>,
}

impl Resolver {
    pub fn new(store: Arc<dyn IdentityStore>, roster: Arc<dyn LiveRoster>) -> Self {
        Self { store, roster }
    }

    /// Resolve to an IP, or [`CheckError::PlayerNotFound`].
    pub async fn resolve(&self, query: &IdentifierQuery) -> CheckResult<String> {
        let record = match query {
            IdentifierQuery::Ip(ip) => return Ok(ip.clone()),
            IdentifierQuery::Name(name) => return self.resolve_name(name).await,
            IdentifierQuery::SteamId(id) => self.store.find_by_steam_id(id).await?,
            IdentifierQuery::PlatformId(id) => self.store.find_by_platform_id(id).await?,
        };

        record.and_then(|r| r.last_ip).ok_or_else(|| {
            debug!(query = %query, "No stored IP for identifier");
            CheckError::PlayerNotFound
        })
    }

    async fn resolve_name(&self, name: &str) -> CheckResult<String> {
        if let Some(session) = self.roster.find_by_name(name)
            && let Some(ip) = session.ip
        {
            debug!(name = %name, player = %session.name, "Resolved name from live roster");
            return Ok(ip);
        }

        let candidates = self.store.search_by_name(name, NAME_SEARCH_LIMIT).await?;
        first_distinct_platform(candidates)
            .and_then(|r| r.last_ip)
            .ok_or_else(|| {
                debug!(name = %name, "No player matches name");
                CheckError::PlayerNotFound
            })
    }
}

/// First record with a platform ID, after dropping repeated platform IDs.
fn first_distinct_platform(records: Vec<IdentityRecord>) -> Option<IdentityRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .find(|r| r.platform_id.as_ref().is_some_and(|id| seen.insert(id.clone())))
}
