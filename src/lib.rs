//! altwatch - alt account correlation and ban aggregation for game servers.
//!
//! Operators look up a player by Steam ID, platform ID, IP or name; the daemon
//! finds every account that last connected from the same IP, enriches each
//! with ban and community reputation data, and decides whether to kick or
//! escalate. Connecting players are checked automatically.
//!
//! The game server and the messaging service are reached through a bridge
//! (see [`gateway`]); the alt-check core in [`check`] has no I/O of its own
//! beyond the injected collaborators.

pub mod check;
pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod http;
pub mod metrics;
pub mod present;
pub mod roster;
