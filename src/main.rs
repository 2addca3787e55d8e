//! altwatchd - alt correlation and ban aggregation daemon.

use altwatch::check::reputation::{
    BattleMetricsClient, CheaterKeywords, CommunityBanListClient, ReputationAggregator,
};
use altwatch::check::{AltChecker, AltPolicy};
use altwatch::config::{self, Config};
use altwatch::db::Database;
use altwatch::gateway::{EventHandler, Gateway};
use altwatch::roster::SessionRoster;
use altwatch::{http, metrics};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::env::var("ALTWATCH_LOG_FORMAT").is_ok_and(|f| f == "json") {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "altwatch.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = config::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        return Err(anyhow::anyhow!(
            "Refusing to start with {} configuration error(s). See error messages above.",
            errors.len()
        ));
    }

    info!(
        listen = %config.server.listen,
        prefix = %config.altcheck.command_prefix,
        "Starting altwatch"
    );

    let db = Database::new(&config.database.path).await?;

    // Reputation providers
    let keywords = CheaterKeywords::new(config.altcheck.cheater_keywords.iter().cloned())?;
    let mut aggregator = ReputationAggregator::new(keywords);

    let battlemetrics = &config.providers.battlemetrics;
    if battlemetrics.enabled {
        aggregator = aggregator.with_ban_provider(
            Arc::new(BattleMetricsClient::new(battlemetrics)),
            battlemetrics.timeout(),
        );
    } else {
        info!("BattleMetrics provider disabled");
    }

    let cbl = &config.providers.community_ban_list;
    if cbl.enabled && config.altcheck.show_cbl_info {
        aggregator = aggregator
            .with_community_provider(Arc::new(CommunityBanListClient::new(cbl)), cbl.timeout());
    } else {
        info!("Community Ban List provider disabled");
    }

    let roster = Arc::new(SessionRoster::new());
    let checker = AltChecker::new(
        Arc::new(db.players()),
        roster.clone(),
        aggregator,
        AltPolicy::from(&config.altcheck),
    )
    .with_settle_delay(config.altcheck.settle_delay());

    let recorder = config.database.record_connections.then(|| db.players());
    let handler = EventHandler::new(&config.altcheck, Arc::new(checker), roster, recorder)?;

    // Convention: metrics_port = 0 disables the HTTP endpoint (used by tests).
    let metrics_port = config.server.metrics_port.unwrap_or(9091);
    if metrics_port == 0 {
        info!("Metrics disabled");
    } else {
        metrics::init();
        tokio::spawn(async move {
            http::run_http_server(metrics_port).await;
        });
        info!(port = metrics_port, "Prometheus HTTP server started");
    }

    let gateway = Gateway::bind(config.server.listen, Arc::new(handler)).await?;
    gateway.run().await?;

    Ok(())
}
