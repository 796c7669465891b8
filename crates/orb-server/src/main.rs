//! OrbFood Media Server - Main entry point

use anyhow::Result;
use orb_common::logging::{init_logging, LogConfig};
use tracing::info;

use orb_server::{api, config::Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up .env before logging so LOG_* variables apply
    dotenvy::dotenv().ok();

    let log_config = LogConfig::builder()
        .log_file_prefix("orb-server")
        .filter_directives("orb_server=debug,tower_http=debug")
        .build()
        .merge_env()?;

    let _log_guard = init_logging(&log_config)?;

    info!("Starting OrbFood Media Server");

    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );
    info!(
        kinds = ?config.cleanup.field_map.kinds().collect::<Vec<_>>(),
        concurrency = config.cleanup.concurrency,
        "Cleanup webhook configured"
    );

    api::serve(config).await
}
