//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Root config struct and loading (Config, ServerConfig, DatabaseConfig)
//! - [`altcheck`]: Alt-check policy and command options (AltCheckConfig)
//! - [`providers`]: Reputation provider options (BattleMetricsConfig, CommunityBanListConfig)
//! - [`validation`]: Startup validation of required options

mod altcheck;
mod providers;
mod types;
mod validation;

pub use altcheck::{AltCheckConfig, default_cheater_keywords};
pub use providers::{BattleMetricsConfig, CommunityBanListConfig, ProvidersConfig};
pub use types::{Config, ConfigError, DatabaseConfig, ServerConfig};
pub use validation::{ValidationError, validate};
