//! End-to-end alt checks over the SQLite store with scripted providers.

use altwatch::check::reputation::{
    BanCountProvider, BanEntry, CheaterKeywords, CommunityLookup, CommunityReputationProvider,
    ReputationAggregator, cheater_detected,
};
use altwatch::check::{AltChecker, AltPolicy, CommandParser, Escalation, IdentifierQuery, IdentityRecord};
use altwatch::config::default_cheater_keywords;
use altwatch::db::{Database, PlayerRepository};
use altwatch::error::{CheckError, ProviderError};
use altwatch::roster::{PlayerSession, SessionRoster};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

struct ScriptedBans {
    bans: HashMap<&'static str, Vec<BanEntry>>,
    down: Vec<&'static str>,
}

#[async_trait]
impl BanCountProvider for ScriptedBans {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn fetch_bans(&self, identifier: &str) -> Result<Vec<BanEntry>, ProviderError> {
        if self.down.iter().any(|id| *id == identifier) {
            return Err(ProviderError::Status(500));
        }
        Ok(self.bans.get(identifier).cloned().unwrap_or_default())
    }
}

struct SlowCommunity;

#[async_trait]
impl CommunityReputationProvider for SlowCommunity {
    fn name(&self) -> &'static str {
        "slow"
    }

    async fn lookup(&self, _steam_id: &str) -> Result<CommunityLookup, ProviderError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(CommunityLookup::NotListed)
    }
}

async fn seeded(rows: &[(Option<&str>, Option<&str>, &str, &str)]) -> PlayerRepository {
    let db = Database::new(":memory:").await.unwrap();
    let players = db.players();
    for (steam, platform, name, ip) in rows {
        players.record_seen(*steam, *platform, name, Some(*ip)).await.unwrap();
    }
    players
}

fn keywords() -> CheaterKeywords {
    CheaterKeywords::new(default_cheater_keywords()).unwrap()
}

fn online(name: &str, platform_id: &str, ip: &str) -> PlayerSession {
    PlayerSession {
        name: name.to_string(),
        platform_id: platform_id.to_string(),
        steam_id: None,
        team_id: Some("2".to_string()),
        role: Some("RUS_Medic_01".to_string()),
        ip: Some(ip.to_string()),
    }
}

#[tokio::test]
async fn name_query_picks_first_distinct_platform_id() {
    let store = seeded(&[
        (Some("76561198000000001"), Some("aaaa"), "Smith", "1.2.3.4"),
        (Some("76561198000000002"), Some("bbbb"), "John Smith", "5.6.7.8"),
        (Some("76561198000000003"), Some("cccc"), "Alt of Smith", "1.2.3.4"),
    ])
    .await;
    let checker = AltChecker::new(
        Arc::new(store),
        Arc::new(SessionRoster::new()),
        ReputationAggregator::new(keywords()),
        AltPolicy::default(),
    );

    let parser = CommandParser::new("!altcheck").unwrap();
    let query = parser.parse("!altcheck Smith").unwrap();
    assert_eq!(query, IdentifierQuery::Name("Smith".into()));

    let first = checker.check(&query).await.unwrap();
    let second = checker.check(&query).await.unwrap();
    assert_eq!(first.cohort.ip, "1.2.3.4");
    let names: Vec<_> = first.cohort.members.iter().map(|m| m.last_name.as_str()).collect();
    assert_eq!(names, vec!["Smith", "Alt of Smith"]);
    assert_eq!(first.cohort, second.cohort);
}

#[tokio::test]
async fn unknown_steam_id_is_not_found() {
    let store = seeded(&[(Some("76561198000000001"), Some("aaaa"), "Smith", "1.2.3.4")]).await;
    let checker = AltChecker::new(
        Arc::new(store),
        Arc::new(SessionRoster::new()),
        ReputationAggregator::new(keywords()),
        AltPolicy::default(),
    );
    let err = checker
        .check(&IdentifierQuery::SteamId("76561198999999999".into()))
        .await
        .unwrap_err();
    assert!(matches!(err, CheckError::PlayerNotFound));
}

#[tokio::test]
async fn connect_with_alt_kicks_the_newcomer() {
    let store = seeded(&[
        (Some("A"), None, "First", "1.2.3.4"),
        (Some("B"), None, "Second", "1.2.3.4"),
    ])
    .await;
    let policy = AltPolicy {
        kick_if_alt_detected: true,
        only_kick_online_alt: false,
        ..AltPolicy::default()
    };
    let checker = AltChecker::new(
        Arc::new(store),
        Arc::new(SessionRoster::new()),
        ReputationAggregator::new(keywords()),
        policy,
    );

    let newcomer = IdentityRecord {
        steam_id: Some("B".into()),
        platform_id: None,
        last_name: "Second".into(),
        last_ip: Some("1.2.3.4".into()),
    };
    let decision = checker.check_connection(newcomer.clone()).await.unwrap();
    assert!(decision.should_kick);
    assert_eq!(decision.kick_target, Some(newcomer));
}

#[tokio::test]
async fn online_only_policy_needs_another_member_online() {
    let store = seeded(&[
        (None, Some("p1"), "One", "1.2.3.4"),
        (None, Some("p2"), "Two", "1.2.3.4"),
    ])
    .await;
    let roster = Arc::new(SessionRoster::new());
    roster.upsert(online("Two", "p2", "1.2.3.4"));
    let policy = AltPolicy {
        kick_if_alt_detected: true,
        only_kick_online_alt: true,
        ..AltPolicy::default()
    };
    let checker = AltChecker::new(
        Arc::new(store),
        roster.clone(),
        ReputationAggregator::new(keywords()),
        policy,
    );
    let two = IdentityRecord {
        steam_id: None,
        platform_id: Some("p2".into()),
        last_name: "Two".into(),
        last_ip: Some("1.2.3.4".into()),
    };

    assert!(!checker.check_connection(two.clone()).await.unwrap().should_kick);

    roster.upsert(online("One", "p1", "1.2.3.4"));
    assert!(checker.check_connection(two).await.unwrap().should_kick);
}

#[tokio::test]
async fn provider_failures_degrade_per_member() {
    let store = seeded(&[
        (Some("76561198000000001"), Some("p1"), "One", "1.2.3.4"),
        (Some("76561198000000002"), Some("p2"), "Two", "1.2.3.4"),
        (Some("76561198000000003"), Some("p3"), "Three", "1.2.3.4"),
    ])
    .await;
    let bans = ScriptedBans {
        bans: HashMap::from([
            ("p1", vec![BanEntry::ban("Teamkilling")]),
            ("p3", vec![BanEntry::ban("Triche / aimbot"), BanEntry::ban("Toxicity")]),
        ]),
        down: vec!["p2"],
    };
    let aggregator = ReputationAggregator::new(keywords())
        .with_ban_provider(Arc::new(bans), Duration::from_secs(1))
        .with_community_provider(Arc::new(SlowCommunity), Duration::from_millis(50));
    let policy = AltPolicy {
        enable_cheater_alt_kicks: true,
        ..AltPolicy::default()
    };
    let checker = AltChecker::new(Arc::new(store), Arc::new(SessionRoster::new()), aggregator, policy);

    let decision = checker
        .check(&IdentifierQuery::Ip("1.2.3.4".into()))
        .await
        .unwrap();

    assert_eq!(decision.reports.len(), 3);
    let totals: Vec<_> = decision.reports.iter().map(|r| (r.total_bans(), r.cheater_bans())).collect();
    assert_eq!(totals, vec![(1, 0), (0, 0), (2, 1)]);
    assert!(decision.reports.iter().all(|r| r.community.is_none()));

    assert!(decision.cheater_detected);
    assert!(cheater_detected(&decision.reports));
    assert_eq!(decision.cheater_member.map(|m| m.last_name), Some("Three".to_string()));
    assert_eq!(decision.escalation, Escalation::Kick);
    assert!(!decision.should_kick);
}

#[tokio::test]
async fn single_member_never_escalates() {
    let store = seeded(&[(Some("76561198000000001"), Some("p1"), "Solo", "9.9.9.9")]).await;
    let bans = ScriptedBans {
        bans: HashMap::from([("p1", vec![BanEntry::ban("cheating")])]),
        down: Vec::new(),
    };
    let policy = AltPolicy {
        kick_if_alt_detected: true,
        only_kick_online_alt: false,
        enable_cheater_alt_kicks: true,
        role_ping_for_cheater_alt: true,
    };
    let checker = AltChecker::new(
        Arc::new(store),
        Arc::new(SessionRoster::new()),
        ReputationAggregator::new(keywords()).with_ban_provider(Arc::new(bans), Duration::from_secs(1)),
        policy,
    );

    let decision = checker.check(&IdentifierQuery::PlatformId("p1".into())).await.unwrap();
    assert_eq!(decision.reports[0].cheater_bans(), 1);
    assert!(!decision.should_kick);
    assert_eq!(decision.escalation, Escalation::None);
    assert_eq!(decision.cheater_member, None);
}
