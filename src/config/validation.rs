//! Configuration validation.
//!
//! Validates configuration at startup; a failing config keeps the alt checker
//! from activating at all.

use super::Config;
use std::path::Path;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("altcheck.command_prefix is required")]
    MissingCommandPrefix,
    #[error("altcheck.channel_id is required")]
    MissingChannelId,
    #[error("altcheck.admin_channel_id is required when enable_cheater_alt_kicks or role_ping_for_cheater_alt is set")]
    MissingAdminChannelId,
    #[error("altcheck.ping_role_id is required when role_ping_for_cheater_alt is set")]
    MissingPingRoleId,
    #[error("altcheck.blocked_ips entry is not an IP or CIDR net: '{0}'")]
    InvalidBlockedIp(String),
    #[error("providers.battlemetrics.api_key is required while the provider is enabled")]
    MissingBattleMetricsApiKey,
    #[error("database.path parent directory does not exist: {0}")]
    DatabasePathInvalid(String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let altcheck = &config.altcheck;

    if altcheck.command_prefix.trim().is_empty() {
        errors.push(ValidationError::MissingCommandPrefix);
    }
    if altcheck.channel_id.trim().is_empty() {
        errors.push(ValidationError::MissingChannelId);
    }

    let escalates = altcheck.enable_cheater_alt_kicks || altcheck.role_ping_for_cheater_alt;
    if escalates && is_blank(altcheck.admin_channel_id.as_deref()) {
        errors.push(ValidationError::MissingAdminChannelId);
    }
    if altcheck.role_ping_for_cheater_alt && is_blank(altcheck.ping_role_id.as_deref()) {
        errors.push(ValidationError::MissingPingRoleId);
    }

    if let Err(entry) = altcheck.blocked_nets() {
        errors.push(ValidationError::InvalidBlockedIp(entry));
    }

    let battlemetrics = &config.providers.battlemetrics;
    if battlemetrics.enabled && is_blank(battlemetrics.api_key.as_deref()) {
        errors.push(ValidationError::MissingBattleMetricsApiKey);
    }

    let db_path = Path::new(&config.database.path);
    if config.database.path != ":memory:"
        && let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        errors.push(ValidationError::DatabasePathInvalid(config.database.path.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}
