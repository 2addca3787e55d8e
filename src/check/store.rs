//! Identity store abstraction.
//!
//! The player table is owned by whatever process logs connections; the alt
//! checker only reads snapshots of it.

use crate::db::DbError;
use async_trait::async_trait;
use serde::Serialize;

/// One known player account as last seen by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityRecord {
    pub steam_id: Option<String>,
    /// Primary key for liveness checks against the roster.
    pub platform_id: Option<String>,
    pub last_name: String,
    pub last_ip: Option<String>,
}

impl IdentityRecord {
    /// True if both records carry the same platform ID.
    pub fn same_platform_id(&self, other: &IdentityRecord) -> bool {
        matches!((&self.platform_id, &other.platform_id), (Some(a), Some(b)) if a == b)
    }

    /// Identifier used for ban lookups and kicks: platform ID, else Steam ID.
    pub fn preferred_id(&self) -> Option<&str> {
        self.platform_id.as_deref().or(self.steam_id.as_deref())
    }
}

#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Point lookup by Steam ID.
    async fn find_by_steam_id(&self, steam_id: &str) -> Result<Option<IdentityRecord>, DbError>;

    /// Point lookup by platform ID.
    async fn find_by_platform_id(
        &self,
        platform_id: &str,
    ) -> Result<Option<IdentityRecord>, DbError>;

    /// Substring name search restricted to records with a platform ID,
    /// grouped by platform ID, in store order, at most `limit` rows.
    async fn search_by_name(
        &self,
        pattern: &str,
        limit: usize,
    ) -> Result<Vec<IdentityRecord>, DbError>;

    /// All records whose last IP equals `ip`, in store order.
    async fn find_by_ip(&self, ip: &str) -> Result<Vec<IdentityRecord>, DbError>;
}
