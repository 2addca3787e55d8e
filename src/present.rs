//! Rendering of check results for in-game chat and the messaging channel.
//!
//! Nothing here performs I/O; the gateway turns the rendered values into
//! bridge actions.

use crate::check::reputation::{BattleMetricsClient, CommunityBanListClient, CommunityLookup};
use crate::check::{Decision, IdentityRecord, ReputationReport};
use crate::config::AltCheckConfig;
use crate::roster::PlayerSession;
use serde::{Deserialize, Serialize};

pub const COLOR_NOT_FOUND: u32 = 0xFF9900;
pub const COLOR_ALTS: u32 = 0xFF0000;
pub const COLOR_CLEAN: u32 = 0x00FF00;

/// Zero-width space; used to pad field names the way the channel renders them.
const ZWSP: &str = "\u{200b}";

/// Rich message for the messaging channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

impl EmbedField {
    fn new(name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            inline,
        }
    }
}

// ============================================================================
// In-game chat
// ============================================================================

pub const CHAT_NOT_FOUND: &str = "Unable to find player";

/// Warn text for the requesting admin.
pub fn chat_summary(decision: &Decision) -> String {
    if !decision.cohort.has_alts() {
        return "No Alts found!".to_string();
    }
    let mut text = format!("Alts for IP: {}\n", decision.cohort.ip);
    for (i, member) in decision.cohort.members.iter().enumerate() {
        text.push_str(&format!("\n{}. {}", i + 1, member.last_name));
    }
    text
}

// ============================================================================
// Links and notices
// ============================================================================

/// Markdown links to the player's Steam, BattleMetrics and CBL pages.
pub fn profile_links(steam_id: Option<&str>, platform_id: Option<&str>) -> String {
    let mut links = Vec::with_capacity(3);
    if let Some(steam) = steam_id {
        links.push(format!("[Steam](https://steamcommunity.com/profiles/{})", steam));
    }
    if let Some(id) = platform_id.or(steam_id) {
        links.push(format!("[BattleMetrics]({})", BattleMetricsClient::profile_url(id)));
    }
    if let Some(steam) = steam_id {
        links.push(format!("[CBL]({})", CommunityBanListClient::profile_url(steam)));
    }
    links.join(" | ")
}

/// Admin-channel notice after a cheater alt was kicked.
pub fn cheater_kicked_notice(member: &IdentityRecord) -> String {
    let id = member.preferred_id().unwrap_or_default();
    format!(
        "Cheater ALT detected and kicked: {}\nBattleMetrics Profile: {}",
        member.last_name,
        BattleMetricsClient::profile_url(id)
    )
}

/// Admin-channel notice pinging the moderator role.
pub fn role_ping_notice(role_id: &str, member: &IdentityRecord) -> String {
    let id = member.preferred_id().unwrap_or_default();
    format!(
        "<@&{}> Cheater ALT detected: {}\nBattleMetrics Profile: {}",
        role_id,
        member.last_name,
        BattleMetricsClient::profile_url(id)
    )
}

pub fn blocked_ip_embed(platform_id: &str, ip: &str) -> Embed {
    Embed {
        title: "Player Kicked for Restricted IP".to_string(),
        description: Some(format!(
            "Player with ID: {} has been kicked for using a restricted IP: {}.",
            platform_id, ip
        )),
        color: COLOR_ALTS,
        fields: Vec::new(),
    }
}

pub fn not_found_embed() -> Embed {
    Embed {
        title: "Unable to find player".to_string(),
        description: Some("Player hasn't been found in the database!".to_string()),
        color: COLOR_NOT_FOUND,
        fields: Vec::new(),
    }
}

// ============================================================================
// Messaging-channel embeds
// ============================================================================

/// Display switches for check embeds.
#[derive(Debug, Clone, Copy)]
pub struct Presenter {
    pub show_cheater_bans: bool,
    pub show_cbl_info: bool,
}

impl From<&AltCheckConfig> for Presenter {
    fn from(config: &AltCheckConfig) -> Self {
        Self {
            show_cheater_bans: config.show_cheater_bans,
            show_cbl_info: config.show_cbl_info,
        }
    }
}

impl Presenter {
    /// Embed answering a messaging-channel command.
    pub fn command_embed(&self, decision: &Decision) -> Embed {
        if decision.cohort.has_alts() {
            self.alts_embed(decision)
        } else {
            self.single_embed(decision)
        }
    }

    /// Embed announcing alts of a player who just connected.
    pub fn connect_embed(&self, player: &IdentityRecord, decision: &Decision) -> Embed {
        let mut embed = self.alts_embed(decision);
        embed.title = format!("Alts found for connected player: {}", player.last_name);
        embed.description = Some(format!(
            "{}\n{}",
            profile_links(player.steam_id.as_deref(), player.platform_id.as_deref()),
            ZWSP
        ));
        let kicked = if decision.should_kick { "YES" } else { "NO" };
        embed.fields.insert(0, EmbedField::new("Player Kicked?", kicked, false));
        embed
    }

    fn alts_embed(&self, decision: &Decision) -> Embed {
        let mut fields = vec![EmbedField::new("IP", decision.cohort.ip.clone(), true)];
        for (i, (member, report, session)) in decision.members().enumerate() {
            fields.push(EmbedField::new(
                format!("{}\n{}. {}", ZWSP, i + 1, member.last_name),
                self.member_details(member, report, session),
                false,
            ));
        }
        Embed {
            title: format!("Alts for IP: {}", decision.cohort.ip),
            description: Some("Alts found.".to_string()),
            color: COLOR_ALTS,
            fields,
        }
    }

    fn member_details(
        &self,
        member: &IdentityRecord,
        report: &ReputationReport,
        session: Option<&PlayerSession>,
    ) -> String {
        let online = match session {
            Some(s) => format!(
                "YES\n**Team: **{} ({})",
                s.team_id.as_deref().unwrap_or("?"),
                s.role_prefix().unwrap_or("?")
            ),
            None => "NO".to_string(),
        };

        let mut text = format!(
            "{}\n**SteamID: **`{}`\n**EOS ID: **`{}`\n**Is Online: **{}\n**Bans: **{}",
            profile_links(member.steam_id.as_deref(), member.platform_id.as_deref()),
            member.steam_id.as_deref().unwrap_or("N/A"),
            member.platform_id.as_deref().unwrap_or("N/A"),
            online,
            ban_total(report)
        );
        if self.show_cheater_bans {
            text.push_str(&format!("\n**Cheater Bans: **{}", cheater_flag(report)));
        }
        if self.show_cbl_info {
            text.push_str(&community_inline(report.community.as_ref()));
        }
        text
    }

    fn single_embed(&self, decision: &Decision) -> Embed {
        let default_report = ReputationReport::default();
        let Some(member) = decision.cohort.members.first() else {
            return not_found_embed();
        };
        let report = decision.reports.first().unwrap_or(&default_report);

        let cheater = if self.show_cheater_bans {
            cheater_flag(report)
        } else {
            "N/A"
        };
        let mut fields = vec![
            EmbedField::new("SteamID", member.steam_id.as_deref().unwrap_or("N/A"), true),
            EmbedField::new("EOSID", member.platform_id.as_deref().unwrap_or("N/A"), true),
            EmbedField::new("Name", member.last_name.clone(), true),
            EmbedField::new("IP", member.last_ip.as_deref().unwrap_or("N/A"), true),
            EmbedField::new("Bans", ban_total(report), true),
            EmbedField::new("Cheater Bans", cheater, true),
        ];
        if self.show_cbl_info {
            fields.push(EmbedField::new(
                "Community Ban List Info",
                "--------------------------------",
                false,
            ));
            match report.community.as_ref() {
                Some(CommunityLookup::Listed(r)) => {
                    fields.push(EmbedField::new("Reputation Points", r.reputation_points.to_string(), true));
                    fields.push(EmbedField::new("Risk Rating", format!("{} / 10", r.risk_rating), true));
                    fields.push(EmbedField::new("Reputation Rank", rank(r.reputation_rank), true));
                    fields.push(EmbedField::new("Active Bans", r.active_bans.to_string(), true));
                    fields.push(EmbedField::new("Expired Bans", r.expired_bans.to_string(), true));
                }
                Some(CommunityLookup::NotListed) => {
                    fields.push(EmbedField::new(
                        "Community Ban List Info",
                        "Player not found on Community Ban List",
                        false,
                    ));
                }
                None => {
                    fields.push(EmbedField::new(
                        "Community Ban List Info",
                        "Community Ban List info unavailable",
                        false,
                    ));
                }
            }
        }

        Embed {
            title: format!("{} doesn't have alts!", member.last_name),
            description: Some(profile_links(
                member.steam_id.as_deref(),
                member.platform_id.as_deref(),
            )),
            color: COLOR_CLEAN,
            fields,
        }
    }
}

fn community_inline(community: Option<&CommunityLookup>) -> String {
    match community {
        Some(CommunityLookup::Listed(r)) => format!(
            "\n**Reputation Points: **{}\n**Risk Rating: **{} / 10\n**Reputation Rank: **{}\n**Active Bans: **{}\n**Expired Bans: **{}",
            r.reputation_points,
            r.risk_rating,
            rank(r.reputation_rank),
            r.active_bans,
            r.expired_bans
        ),
        Some(CommunityLookup::NotListed) => "\n**Player not found on Community Ban List**".to_string(),
        None => "\n**Community Ban List info unavailable**".to_string(),
    }
}

fn rank(rank: Option<u64>) -> String {
    rank.map_or_else(|| "N/A".to_string(), |r| format!("#{}", r))
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

/// Ban count, or "N/A" when no ban data was fetched.
fn ban_total(report: &ReputationReport) -> String {
    report
        .bans
        .map_or_else(|| "N/A".to_string(), |b| b.total_bans.to_string())
}

fn cheater_flag(report: &ReputationReport) -> &'static str {
    match report.bans {
        Some(_) => yes_no(report.is_cheater()),
        None => "N/A",
    }
}
