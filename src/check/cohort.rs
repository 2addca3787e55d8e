//! Cohort lookup: every identity that last connected from one IP.

use super::store::{IdentityRecord, IdentityStore};
use crate::error::CheckResult;
use std::sync::Arc;
use tracing::debug;

/// Identity records sharing one IP, in store order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cohort {
    pub ip: String,
    pub members: Vec<IdentityRecord>,
}

impl Cohort {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Two or more accounts share the IP.
    pub fn has_alts(&self) -> bool {
        self.members.len() > 1
    }
}

pub struct CohortFetcher {
    store: Arc<dyn IdentityStore>,
}

impl CohortFetcher {
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self { store }
    }

    /// Fetch the cohort for `ip`. May be empty when the IP came from a live
    /// connection the store has not caught up with.
    pub async fn fetch(&self, ip: &str) -> CheckResult<Cohort> {
        let members = self.store.find_by_ip(ip).await?;
        debug!(ip = %ip, members = members.len(), "Fetched cohort");
        Ok(Cohort {
            ip: ip.to_string(),
            members,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::testing::{MemoryStore, record};
    use crate::check::{IdentifierQuery, Resolver};
    use crate::roster::SessionRoster;

    #[tokio::test]
    async fn test_fetch_keeps_store_order_and_is_repeatable() {
        let store = MemoryStore::new(vec![
            record(Some("B"), Some("pb"), "Bravo", "1.2.3.4"),
            record(Some("X"), Some("px"), "Xray", "9.9.9.9"),
            record(Some("A"), Some("pa"), "Alpha", "1.2.3.4"),
        ]);
        let fetcher = CohortFetcher::new(Arc::new(store));

        let first = fetcher.fetch("1.2.3.4").await.unwrap();
        let names: Vec<_> = first.members.iter().map(|m| m.last_name.as_str()).collect();
        assert_eq!(names, ["Bravo", "Alpha"]);
        assert!(first.has_alts());

        let second = fetcher.fetch("1.2.3.4").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_resolve_then_fetch_is_repeatable() {
        let store: Arc<dyn IdentityStore> = Arc::new(MemoryStore::new(vec![
            record(Some("A"), Some("pa"), "Smith", "1.2.3.4"),
            record(Some("B"), Some("pb"), "John Smith", "5.6.7.8"),
            record(Some("C"), Some("pc"), "Alt of Smith", "1.2.3.4"),
        ]));
        let resolver = Resolver::new(Arc::clone(&store), Arc::new(SessionRoster::new()));
        let fetcher = CohortFetcher::new(store);
        let query = IdentifierQuery::Name("Smith".into());

        let mut runs = Vec::new();
        for _ in 0..2 {
            let ip = resolver.resolve(&query).await.unwrap();
            runs.push(fetcher.fetch(&ip).await.unwrap());
        }
        assert_eq!(runs[0].ip, "1.2.3.4");
        assert_eq!(runs[0], runs[1]);
    }

    #[tokio::test]
    async fn test_unknown_ip_is_empty() {
        let fetcher = CohortFetcher::new(Arc::new(MemoryStore::default()));
        let cohort = fetcher.fetch("4.4.4.4").await.unwrap();
        assert!(cohort.is_empty());
        assert!(!cohort.has_alts());
    }
}
