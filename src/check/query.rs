//! Command grammar: `<prefix> <identifier>`.
//!
//! The identifier is classified by an ordered list of typed matchers. The
//! first matcher that accepts the payload wins; `Name` accepts everything, so
//! a payload that almost looks like an ID still resolves as a name.

use regex::Regex;
use std::fmt;

/// A classified identifier from an alt-check command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifierQuery {
    /// 17-digit Steam-style ID.
    SteamId(String),
    /// 32-character platform (EOS) ID.
    PlatformId(String),
    /// Dotted-quad IPv4 literal.
    Ip(String),
    /// Anything else, treated as a (partial) player name.
    Name(String),
}

impl IdentifierQuery {
    /// Static kind label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SteamId(_) => "steam_id",
            Self::PlatformId(_) => "platform_id",
            Self::Ip(_) => "ip",
            Self::Name(_) => "name",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Self::SteamId(v) | Self::PlatformId(v) | Self::Ip(v) | Self::Name(v) => v,
        }
    }
}

impl fmt::Display for IdentifierQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.kind(), self.value())
    }
}

type Matcher = fn(&str) -> Option<IdentifierQuery>;

/// Priority order: numeric ID, platform ID, IP, name.
const MATCHERS: [Matcher; 4] = [match_steam_id, match_platform_id, match_ip, match_name];

fn match_steam_id(payload: &str) -> Option<IdentifierQuery> {
    (payload.len() == 17 && payload.bytes().all(|b| b.is_ascii_digit()))
        .then(|| IdentifierQuery::SteamId(payload.to_string()))
}

fn match_platform_id(payload: &str) -> Option<IdentifierQuery> {
    (payload.len() == 32 && payload.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_'))
        .then(|| IdentifierQuery::PlatformId(payload.to_string()))
}

fn match_ip(payload: &str) -> Option<IdentifierQuery> {
    let octets: Vec<&str> = payload.split('.').collect();
    let shaped = octets.len() == 4
        && octets
            .iter()
            .all(|o| (1..=3).contains(&o.len()) && o.bytes().all(|b| b.is_ascii_digit()));
    shaped.then(|| IdentifierQuery::Ip(payload.to_string()))
}

fn match_name(payload: &str) -> Option<IdentifierQuery> {
    Some(IdentifierQuery::Name(payload.to_string()))
}

/// Classify a bare identifier (no command prefix).
pub fn classify(payload: &str) -> Option<IdentifierQuery> {
    if payload.is_empty() {
        return None;
    }
    MATCHERS.iter().find_map(|matcher| matcher(payload))
}

/// Parser for `<prefix> <identifier>` command lines.
#[derive(Debug, Clone)]
pub struct CommandParser {
    pattern: Regex,
}

impl CommandParser {
    /// Build a parser for the given command prefix (matched case-insensitively).
    pub fn new(prefix: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(r"(?i)^{} (.+)$", regex::escape(prefix)))?;
        Ok(Self { pattern })
    }

    /// Parse a raw chat line. `None` means the line is not an alt-check command.
    pub fn parse(&self, raw: &str) -> Option<IdentifierQuery> {
        let payload = self.pattern.captures(raw)?.get(1)?.as_str();
        classify(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> CommandParser {
        CommandParser::new("!altcheck").unwrap()
    }

    #[test]
    fn test_steam_id() {
        assert_eq!(
            parser().parse("!altcheck 76561198000000001"),
            Some(IdentifierQuery::SteamId("76561198000000001".into()))
        );
    }

    #[test]
    fn test_platform_id() {
        let id = "0002a1b2c3d4e5f60718293a4b5c6d7e";
        assert_eq!(
            parser().parse(&format!("!altcheck {}", id)),
            Some(IdentifierQuery::PlatformId(id.into()))
        );
    }

    #[test]
    fn test_thirty_two_digits_is_platform_id_not_steam_id() {
        let id = "12345678901234567890123456789012";
        assert!(matches!(
            parser().parse(&format!("!altcheck {}", id)),
            Some(IdentifierQuery::PlatformId(_))
        ));
    }

    #[test]
    fn test_ip_shape_only() {
        assert_eq!(
            parser().parse("!altcheck 1.2.3.4"),
            Some(IdentifierQuery::Ip("1.2.3.4".into()))
        );
        // No range validation beyond the 1-3 digit octet shape.
        assert_eq!(
            parser().parse("!altcheck 999.2.3.4"),
            Some(IdentifierQuery::Ip("999.2.3.4".into()))
        );
        assert!(matches!(
            parser().parse("!altcheck 1.2.3.4/24"),
            Some(IdentifierQuery::Name(_))
        ));
    }

    #[test]
    fn test_names_fall_through() {
        assert_eq!(
            parser().parse("!altcheck John Smith"),
            Some(IdentifierQuery::Name("John Smith".into()))
        );
        // 16 digits: looks like an ID, is a name.
        assert_eq!(
            parser().parse("!altcheck 7656119800000000"),
            Some(IdentifierQuery::Name("7656119800000000".into()))
        );
        // 17 digits followed by a space and more text is a name.
        assert!(matches!(
            parser().parse("!altcheck 76561198000000001 x"),
            Some(IdentifierQuery::Name(_))
        ));
    }

    #[test]
    fn test_no_match() {
        assert_eq!(parser().parse("hello there"), None);
        assert_eq!(parser().parse("!altcheck"), None);
        assert_eq!(parser().parse("!altcheckfoo"), None);
        assert_eq!(parser().parse("say !altcheck foo"), None);
    }

    #[test]
    fn test_prefix_is_case_insensitive_and_escaped() {
        assert!(parser().parse("!ALTCHECK Smith").is_some());
        let dotted = CommandParser::new(".alt").unwrap();
        assert!(dotted.parse(".alt Smith").is_some());
        assert!(dotted.parse("xalt Smith").is_none());
    }

    #[test]
    fn test_every_seventeen_digit_string_is_steam_id() {
        for seed in [0u64, 1, 42, 99_999_999_999_999_999] {
            let id = format!("{:017}", seed % 100_000_000_000_000_000);
            assert!(matches!(classify(&id), Some(IdentifierQuery::SteamId(_))), "{}", id);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(IdentifierQuery::Ip("1.2.3.4".into()).to_string(), "ip=1.2.3.4");
    }
}
