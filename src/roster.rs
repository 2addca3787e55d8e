//! Live roster of players currently connected to the game server.
//!
//! Kept current by bridge events (full roster syncs, connects, disconnects).
//! Sessions are keyed by platform ID and remember join order so name lookups
//! are deterministic.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A connected player as reported by the game server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSession {
    pub name: String,
    pub platform_id: String,
    #[serde(default)]
    pub steam_id: Option<String>,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
}

impl PlayerSession {
    /// Role name without its kit suffix (`USA_Rifleman_01` -> `USA`).
    pub fn role_prefix(&self) -> Option<&str> {
        self.role.as_deref().and_then(|r| r.split('_').next())
    }
}

/// Read access to the currently connected players.
pub trait LiveRoster: Send + Sync {
    /// First session in join order matching the predicate.
    fn find(&self, predicate: &dyn Fn(&PlayerSession) -> bool) -> Option<PlayerSession>;

    /// All sessions in join order.
    fn snapshot(&self) -> Vec<PlayerSession>;

    /// Name lookup: exact match first, then case-insensitive substring.
    fn find_by_name(&self, name: &str) -> Option<PlayerSession> {
        if let Some(exact) = self.find(&|p| p.name == name) {
            return Some(exact);
        }
        let needle = name.to_lowercase();
        self.find(&|p| p.name.to_lowercase().contains(&needle))
    }
}

/// In-memory roster fed by the bridge.
#[derive(Default)]
pub struct SessionRoster {
    sessions: DashMap<String, (u64, PlayerSession)>,
    seq: AtomicU64,
}

impl SessionRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or refresh a session. A refresh keeps the original join position.
    pub fn upsert(&self, session: PlayerSession) {
        match self.sessions.entry(session.platform_id.clone()) {
            Entry::Occupied(mut entry) => entry.get_mut().1 = session,
            Entry::Vacant(entry) => {
                let seq = self.seq.fetch_add(1, Ordering::Relaxed);
                entry.insert((seq, session));
            }
        }
    }

    /// Remove a session; returns it if present.
    pub fn remove(&self, platform_id: &str) -> Option<PlayerSession> {
        self.sessions.remove(platform_id).map(|(_, (_, s))| s)
    }

    /// Replace the whole roster, keeping join order of the given list.
    pub fn replace(&self, players: Vec<PlayerSession>) {
        let keep: std::collections::HashSet<String> =
            players.iter().map(|p| p.platform_id.clone()).collect();
        self.sessions.retain(|key, _| keep.contains(key));
        for player in players {
            self.upsert(player);
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn ordered(&self) -> Vec<(u64, PlayerSession)> {
        let mut sessions: Vec<_> = self
            .sessions
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        sessions.sort_by_key(|(seq, _)| *seq);
        sessions
    }
}

impl LiveRoster for SessionRoster {
    fn find(&self, predicate: &dyn Fn(&PlayerSession) -> bool) -> Option<PlayerSession> {
        self.ordered()
            .into_iter()
            .map(|(_, s)| s)
            .find(|s| predicate(s))
    }

    fn snapshot(&self) -> Vec<PlayerSession> {
        self.ordered().into_iter().map(|(_, s)| s).collect()
    }
}

#[cfg(test)]
pub(crate) fn session(name: &str, platform_id: &str, ip: &str) -> PlayerSession {
    PlayerSession {
        name: name.to_string(),
        platform_id: platform_id.to_string(),
        steam_id: None,
        team_id: Some("1".to_string()),
        role: Some("USA_Rifleman_01".to_string()),
        ip: Some(ip.to_string()),
    }
}
