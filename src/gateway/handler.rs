//! Bridge event handling.
//!
//! Roster bookkeeping is applied in arrival order by [`EventHandler::observe`];
//! checks run through [`EventHandler::handle`] on their own task and return the
//! actions to send back to the bridge.

use super::GatewayError;
use super::protocol::{Action, ServerEvent};
use crate::check::{AltChecker, CommandParser, Decision, Escalation, IdentityRecord};
use crate::config::AltCheckConfig;
use crate::db::PlayerRepository;
use crate::error::CheckError;
use crate::metrics;
use crate::present::{self, Presenter};
use crate::roster::{PlayerSession, SessionRoster};
use ipnet::IpNet;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct EventHandler {
    checker: Arc<AltChecker>,
    roster: Arc<SessionRoster>,
    recorder: Option<PlayerRepository>,
    parser: CommandParser,
    presenter: Presenter,
    blocked: Vec<IpNet>,
    config: AltCheckConfig,
}

impl EventHandler {
    /// `recorder` is set when connections should be written to the store.
    pub fn new(
        config: &AltCheckConfig,
        checker: Arc<AltChecker>,
        roster: Arc<SessionRoster>,
        recorder: Option<PlayerRepository>,
    ) -> Result<Self, GatewayError> {
        Ok(Self {
            checker,
            roster,
            recorder,
            parser: CommandParser::new(&config.command_prefix)?,
            presenter: Presenter::from(config),
            blocked: config.blocked_nets().map_err(GatewayError::BlockedIp)?,
            config: config.clone(),
        })
    }

    /// Update the live roster. Returns true if the event needs [`Self::handle`].
    pub fn observe(&self, event: &ServerEvent) -> bool {
        match event {
            ServerEvent::Roster { players } => {
                self.roster.replace(players.clone());
                metrics::set_online_players(self.roster.len());
                debug!(players = players.len(), "Roster synced");
                false
            }
            ServerEvent::PlayerConnected { player } => {
                self.roster.upsert(player.clone());
                metrics::set_online_players(self.roster.len());
                true
            }
            ServerEvent::PlayerDisconnected { platform_id } => {
                self.roster.remove(platform_id);
                metrics::set_online_players(self.roster.len());
                false
            }
            ServerEvent::Chat { .. } | ServerEvent::DiscordMessage { .. } => true,
        }
    }

    pub async fn handle(&self, event: ServerEvent) -> Vec<Action> {
        match event {
            ServerEvent::Chat {
                chat,
                name,
                platform_id,
                message,
            } => self.on_chat(&chat, &name, &platform_id, &message).await,
            ServerEvent::PlayerConnected { player } => self.on_connect(player).await,
            ServerEvent::DiscordMessage {
                channel_id,
                author_id,
                author_name,
                content,
            } => {
                self.on_discord_message(&channel_id, &author_id, &author_name, &content)
                    .await
            }
            ServerEvent::Roster { .. } | ServerEvent::PlayerDisconnected { .. } => Vec::new(),
        }
    }

    async fn on_chat(&self, chat: &str, name: &str, platform_id: &str, message: &str) -> Vec<Action> {
        if chat != self.config.admin_chat {
            return Vec::new();
        }
        let Some(query) = self.parser.parse(message) else {
            return Vec::new();
        };
        info!(requester = %name, query = %query, "In-game alt check requested");

        let reply = |message: String| Action::Warn {
            player_id: platform_id.to_string(),
            message,
        };

        match self.checker.check(&query).await {
            Ok(decision) => {
                let mut actions = vec![reply(present::chat_summary(&decision))];
                self.escalate(&decision, &mut actions);
                actions
            }
            Err(CheckError::PlayerNotFound) => vec![reply(present::CHAT_NOT_FOUND.to_string())],
            Err(e) => {
                warn!(query = %query, error = %e, "Alt check failed");
                Vec::new()
            }
        }
    }

    async fn on_discord_message(
        &self,
        channel_id: &str,
        author_id: &str,
        author_name: &str,
        content: &str,
    ) -> Vec<Action> {
        if self.config.bot_user_id.as_deref() == Some(author_id) {
            return Vec::new();
        }
        let Some(query) = self.parser.parse(content) else {
            return Vec::new();
        };
        info!(requester = %author_name, query = %query, "Channel alt check requested");

        match self.checker.check(&query).await {
            Ok(decision) => {
                let mut actions = vec![Action::embed(channel_id, self.presenter.command_embed(&decision))];
                self.escalate(&decision, &mut actions);
                actions
            }
            Err(CheckError::PlayerNotFound) => {
                vec![Action::embed(channel_id, present::not_found_embed())]
            }
            Err(e) => {
                warn!(query = %query, error = %e, "Alt check failed");
                Vec::new()
            }
        }
    }

    async fn on_connect(&self, player: PlayerSession) -> Vec<Action> {
        let Some(ip) = player.ip.clone() else {
            debug!(player = %player.name, "Connect event without IP");
            return Vec::new();
        };

        if let Some(repo) = &self.recorder
            && let Err(e) = repo
                .record_seen(
                    player.steam_id.as_deref(),
                    Some(player.platform_id.as_str()),
                    &player.name,
                    Some(ip.as_str()),
                )
                .await
        {
            warn!(player = %player.name, error = %e, "Failed to record connection");
        }

        if self.is_blocked(&ip) {
            info!(player = %player.name, ip = %ip, "Kicking player on blocked IP");
            metrics::record_kick("blocked_ip");
            return vec![
                Action::Kick {
                    player_id: player.platform_id.clone(),
                    reason: self.config.blocked_ip_kick_reason.clone(),
                },
                Action::embed(
                    &self.config.channel_id,
                    present::blocked_ip_embed(&player.platform_id, &ip),
                ),
            ];
        }

        let connecting = IdentityRecord {
            steam_id: player.steam_id.clone(),
            platform_id: Some(player.platform_id.clone()),
            last_name: player.name.clone(),
            last_ip: Some(ip),
        };

        let decision = match self.checker.check_connection(connecting.clone()).await {
            Ok(decision) => decision,
            Err(CheckError::PlayerNotFound) => {
                debug!(player = %player.name, "Connected player not in store yet");
                return Vec::new();
            }
            Err(e) => {
                warn!(player = %player.name, error = %e, "Connect alt check failed");
                return Vec::new();
            }
        };

        if !decision.cohort.has_alts() {
            return Vec::new();
        }

        let mut actions = Vec::new();
        if decision.should_kick
            && let Some(id) = decision.kick_target.as_ref().and_then(IdentityRecord::preferred_id)
        {
            metrics::record_kick("alt");
            actions.push(Action::Kick {
                player_id: id.to_string(),
                reason: self.config.kick_reason.clone(),
            });
        }
        actions.push(Action::embed(
            &self.config.channel_id,
            self.presenter.connect_embed(&connecting, &decision),
        ));
        self.escalate(&decision, &mut actions);
        actions
    }

    fn escalate(&self, decision: &Decision, actions: &mut Vec<Action>) {
        let Some(cheater) = &decision.cheater_member else {
            return;
        };
        match decision.escalation {
            Escalation::None => {}
            Escalation::Kick => {
                let Some(id) = cheater.preferred_id() else {
                    return;
                };
                // The connecting player may already be kicked as the alt.
                let already_kicked = actions
                    .iter()
                    .any(|a| matches!(a, Action::Kick { player_id, .. } if player_id == id));
                if !already_kicked {
                    info!(player = %cheater.last_name, "Kicking cheater alt");
                    metrics::record_kick("cheater_alt");
                    actions.push(Action::Kick {
                        player_id: id.to_string(),
                        reason: self.config.cheater_kick_reason.clone(),
                    });
                }
                if let Some(admin) = &self.config.admin_channel_id {
                    actions.push(Action::text(admin, present::cheater_kicked_notice(cheater)));
                }
            }
            Escalation::RolePing => {
                if let (Some(admin), Some(role)) =
                    (&self.config.admin_channel_id, &self.config.ping_role_id)
                {
                    metrics::record_role_ping();
                    actions.push(Action::text(admin, present::role_ping_notice(role, cheater)));
                }
            }
        }
    }

    fn is_blocked(&self, ip: &str) -> bool {
        ip.parse::<IpAddr>()
            .is_ok_and(|addr| self.blocked.iter().any(|net| net.contains(&addr)))
    }
}
