//! Prometheus metrics for altwatch.
//!
//! Exposed on the HTTP endpoint served by [`crate::http`]. Every recorder is a
//! no-op until [`init`] has run, so library users and tests need not call it.
//!
//! - `altwatch_checks_total{origin}` - Completed alt checks
//! - `altwatch_alts_detected_total{origin}` - Checks whose cohort had alts
//! - `altwatch_player_not_found_total` - Lookups that resolved to nothing
//! - `altwatch_provider_failures_total{provider,error}` - Degraded reputation lookups
//! - `altwatch_kicks_total{reason}` - Kick actions issued
//! - `altwatch_role_pings_total` - Cheater role pings issued
//! - `altwatch_online_players` - Live roster size
//! - `altwatch_bridge_connections` - Connected bridges

use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Counters
// ========================================================================

pub static CHECKS: OnceLock<IntCounterVec> = OnceLock::new();

pub static ALTS_DETECTED: OnceLock<IntCounterVec> = OnceLock::new();

pub static PLAYER_NOT_FOUND: OnceLock<IntCounter> = OnceLock::new();

/// Reputation lookups replaced with degraded values.
pub static PROVIDER_FAILURES: OnceLock<IntCounterVec> = OnceLock::new();

/// Kicks by reason (`alt`, `cheater_alt`, `blocked_ip`).
pub static KICKS: OnceLock<IntCounterVec> = OnceLock::new();

pub static ROLE_PINGS: OnceLock<IntCounter> = OnceLock::new();

// ========================================================================
// Gauges
// ========================================================================

pub static ONLINE_PLAYERS: OnceLock<IntGauge> = OnceLock::new();

pub static BRIDGE_CONNECTIONS: OnceLock<IntGauge> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Call once at startup, before the metrics endpoint is served.
pub fn init() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            match $init {
                Ok(m) => {
                    if let Err(e) = r.register(Box::new(m.clone())) {
                        tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                    }
                    let _ = $metric.set(m);
                }
                Err(e) => {
                    tracing::warn!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                }
            }
        };
    }

    register!(CHECKS, IntCounterVec::new(Opts::new("altwatch_checks_total", "Completed alt checks"), &["origin"]));
    register!(ALTS_DETECTED, IntCounterVec::new(Opts::new("altwatch_alts_detected_total", "Alt checks that found alts"), &["origin"]));
    register!(PLAYER_NOT_FOUND, IntCounter::new("altwatch_player_not_found_total", "Alt checks that found no player"));
    register!(PROVIDER_FAILURES, IntCounterVec::new(Opts::new("altwatch_provider_failures_total", "Degraded reputation lookups"), &["provider", "error"]));
    register!(KICKS, IntCounterVec::new(Opts::new("altwatch_kicks_total", "Kick actions issued"), &["reason"]));
    register!(ROLE_PINGS, IntCounter::new("altwatch_role_pings_total", "Cheater role pings issued"));
    register!(ONLINE_PLAYERS, IntGauge::new("altwatch_online_players", "Players in the live roster"));
    register!(BRIDGE_CONNECTIONS, IntGauge::new("altwatch_bridge_connections", "Connected game-server bridges"));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Recorders
// ============================================================================

pub fn record_check(origin: &str, has_alts: bool) {
    if let Some(m) = CHECKS.get() {
        m.with_label_values(&[origin]).inc();
    }
    if has_alts && let Some(m) = ALTS_DETECTED.get() {
        m.with_label_values(&[origin]).inc();
    }
}

pub fn record_not_found() {
    if let Some(m) = PLAYER_NOT_FOUND.get() {
        m.inc();
    }
}

pub fn record_provider_failure(provider: &str, error: &str) {
    if let Some(m) = PROVIDER_FAILURES.get() {
        m.with_label_values(&[provider, error]).inc();
    }
}

pub fn record_kick(reason: &str) {
    if let Some(m) = KICKS.get() {
        m.with_label_values(&[reason]).inc();
    }
}

pub fn record_role_ping() {
    if let Some(m) = ROLE_PINGS.get() {
        m.inc();
    }
}

pub fn set_online_players(count: usize) {
    if let Some(m) = ONLINE_PLAYERS.get() {
        m.set(i64::try_from(count).unwrap_or(i64::MAX));
    }
}

pub fn bridge_connected() {
    if let Some(m) = BRIDGE_CONNECTIONS.get() {
        m.inc();
    }
}

pub fn bridge_disconnected() {
    if let Some(m) = BRIDGE_CONNECTIONS.get() {
        m.dec();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorders_show_up_in_output() {
        init();
        record_check("command", true);
        record_provider_failure("battlemetrics", "timeout");
        record_kick("alt");

        let text = gather_metrics();
        assert!(text.contains("altwatch_checks_total{origin=\"command\"}"));
        assert!(text.contains("altwatch_alts_detected_total{origin=\"command\"}"));
        assert!(text.contains("provider=\"battlemetrics\""));
        assert!(text.contains("altwatch_kicks_total{reason=\"alt\"}"));
    }
}
