//! Alt-check policy and command configuration.

use ipnet::IpNet;
use serde::Deserialize;
use std::net::IpAddr;
use std::time::Duration;

use super::types::default_true;

/// Alt-check configuration (`[altcheck]` table).
#[derive(Debug, Clone, Deserialize)]
pub struct AltCheckConfig {
    /// Command that triggers a check (default: "!altcheck").
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
    /// Messaging channel that receives connect-time alt reports.
    #[serde(default)]
    pub channel_id: String,
    /// Messaging channel for cheater escalations.
    #[serde(default)]
    pub admin_channel_id: Option<String>,
    /// In-game chat channel operators issue commands from.
    #[serde(default = "default_admin_chat")]
    pub admin_chat: String,
    /// User ID of the messaging bot itself; its own messages are ignored.
    #[serde(default)]
    pub bot_user_id: Option<String>,
    /// Kick a connecting player when an alt shares their IP.
    #[serde(default)]
    pub kick_if_alt_detected: bool,
    /// Only kick when another cohort member is currently online.
    #[serde(default = "default_true")]
    pub only_kick_online_alt: bool,
    /// Kick reason for alt kicks.
    #[serde(default = "default_kick_reason")]
    pub kick_reason: String,
    /// Kick cohort members with cheating bans.
    #[serde(default)]
    pub enable_cheater_alt_kicks: bool,
    /// Kick reason for cheater kicks.
    #[serde(default = "default_cheater_kick_reason")]
    pub cheater_kick_reason: String,
    /// Ping a role instead of kicking when a cheater alt is found.
    #[serde(default)]
    pub role_ping_for_cheater_alt: bool,
    /// Role pinged by `role_ping_for_cheater_alt`.
    #[serde(default)]
    pub ping_role_id: Option<String>,
    /// Show the cheater-ban flag in reports.
    #[serde(default = "default_true")]
    pub show_cheater_bans: bool,
    /// Show Community Ban List data in reports.
    #[serde(default = "default_true")]
    pub show_cbl_info: bool,
    /// Settling window between a connect event and the cohort lookup.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    /// IPs or CIDR nets kicked on sight.
    #[serde(default)]
    pub blocked_ips: Vec<String>,
    /// Kick reason for blocked IPs.
    #[serde(default = "default_blocked_ip_kick_reason")]
    pub blocked_ip_kick_reason: String,
    /// Case-insensitive substrings marking a ban reason as cheating.
    #[serde(default = "default_cheater_keywords")]
    pub cheater_keywords: Vec<String>,
}

impl Default for AltCheckConfig {
    fn default() -> Self {
        Self {
            command_prefix: default_command_prefix(),
            channel_id: String::new(),
            admin_channel_id: None,
            admin_chat: default_admin_chat(),
            bot_user_id: None,
            kick_if_alt_detected: false,
            only_kick_online_alt: true,
            kick_reason: default_kick_reason(),
            enable_cheater_alt_kicks: false,
            cheater_kick_reason: default_cheater_kick_reason(),
            role_ping_for_cheater_alt: false,
            ping_role_id: None,
            show_cheater_bans: true,
            show_cbl_info: true,
            settle_delay_ms: default_settle_delay_ms(),
            blocked_ips: Vec::new(),
            blocked_ip_kick_reason: default_blocked_ip_kick_reason(),
            cheater_keywords: default_cheater_keywords(),
        }
    }
}

impl AltCheckConfig {
    /// Settling window as a [`Duration`].
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Parse `blocked_ips` into networks. Bare addresses become host nets.
    pub fn blocked_nets(&self) -> Result<Vec<IpNet>, String> {
        self.blocked_ips.iter().map(|entry| parse_net(entry)).collect()
    }
}

fn parse_net(entry: &str) -> Result<IpNet, String> {
    let entry = entry.trim();
    if let Ok(net) = entry.parse::<IpNet>() {
        return Ok(net);
    }
    entry
        .parse::<IpAddr>()
        .map(IpNet::from)
        .map_err(|_| entry.to_string())
}

fn default_command_prefix() -> String {
    "!altcheck".to_string()
}

fn default_admin_chat() -> String {
    "ChatAdmin".to_string()
}

fn default_kick_reason() -> String {
    "ALT detected. Protection kick".to_string()
}

fn default_cheater_kick_reason() -> String {
    "Cheater ALT detected. Protection kick".to_string()
}

fn default_settle_delay_ms() -> u64 {
    3000
}

fn default_blocked_ip_kick_reason() -> String {
    "Nice Try.".to_string()
}

/// Default cheating keywords (English, German, French, Spanish, Portuguese,
/// Polish, Russian, Ukrainian, Chinese).
pub fn default_cheater_keywords() -> Vec<String> {
    [
        "cheat", "aimbot", "wallhack", "esp hack", "speedhack", "no recoil",
        "betrug", "schummel", "triche", "tricheur", "trampa", "tramposo", "trapaça",
        "oszust", "читер", "взлом", "читак", "作弊", "外挂", "开挂",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
