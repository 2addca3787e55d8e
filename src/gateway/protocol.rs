//! Bridge wire format: one JSON object per line, tagged by `type`.

use crate::present::Embed;
use crate::roster::PlayerSession;
use serde::{Deserialize, Serialize};

/// Events pushed by the bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// In-game chat line.
    Chat {
        /// Chat channel, e.g. `ChatAll` or `ChatAdmin`.
        chat: String,
        name: String,
        platform_id: String,
        message: String,
    },
    PlayerConnected {
        player: PlayerSession,
    },
    PlayerDisconnected {
        platform_id: String,
    },
    /// Full roster sync; replaces the live roster.
    Roster {
        players: Vec<PlayerSession>,
    },
    /// Message posted in the messaging service.
    DiscordMessage {
        channel_id: String,
        author_id: String,
        #[serde(default)]
        author_name: String,
        content: String,
    },
}

impl ServerEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Chat { .. } => "chat",
            Self::PlayerConnected { .. } => "player_connected",
            Self::PlayerDisconnected { .. } => "player_disconnected",
            Self::Roster { .. } => "roster",
            Self::DiscordMessage { .. } => "discord_message",
        }
    }
}

/// Actions the bridge executes on our behalf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Private warning to a player.
    Warn { player_id: String, message: String },
    Kick { player_id: String, reason: String },
    DiscordMessage {
        channel_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        embed: Option<Embed>,
    },
}

impl Action {
    pub fn text(channel_id: &str, content: String) -> Self {
        Self::DiscordMessage {
            channel_id: channel_id.to_string(),
            content: Some(content),
            embed: None,
        }
    }

    pub fn embed(channel_id: &str, embed: Embed) -> Self {
        Self::DiscordMessage {
            channel_id: channel_id.to_string(),
            content: None,
            embed: Some(embed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_event_from_bridge_json() {
        let line = r#"{"type":"player_connected","player":{"name":"Bob","platform_id":"0002a10386a1405e9a8e8f4cd3b1e2f1","steam_id":"76561198000000002","ip":"1.2.3.4"}}"#;
        let event: ServerEvent = serde_json::from_str(line).unwrap();
        let ServerEvent::PlayerConnected { player } = event else {
            panic!("wrong variant");
        };
        assert_eq!(player.name, "Bob");
        assert_eq!(player.ip.as_deref(), Some("1.2.3.4"));
        assert_eq!(player.team_id, None);
    }

    #[test]
    fn test_chat_event_kind() {
        let line = r#"{"type":"chat","chat":"ChatAdmin","name":"Op","platform_id":"x","message":"!altcheck Bob"}"#;
        let event: ServerEvent = serde_json::from_str(line).unwrap();
        assert_eq!(event.kind(), "chat");
    }

    #[test]
    fn test_unknown_event_type_is_rejected() {
        assert!(serde_json::from_str::<ServerEvent>(r#"{"type":"squad_created"}"#).is_err());
    }

    #[test]
    fn test_action_wire_shape() {
        let kick = Action::Kick {
            player_id: "p".into(),
            reason: "Nice Try.".into(),
        };
        assert_eq!(
            serde_json::to_string(&kick).unwrap(),
            r#"{"type":"kick","player_id":"p","reason":"Nice Try."}"#
        );
        let text = serde_json::to_value(Action::text("42", "hi".into())).unwrap();
        assert_eq!(text["type"], "discord_message");
        assert!(text.get("embed").is_none());
    }
}
