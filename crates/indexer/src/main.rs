use anyhow::{Context, Result};
use common::networks::ChartsConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{config::Config, indexer::Indexer};

mod config;
mod indexer;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load();
    let charts = ChartsConfig::load(&config.charts_config).with_context(|| {
        format!(
            "failed to load networks from {}",
            config.charts_config.display()
        )
    })?;
    info!(
        networks = charts.networks.len(),
        resolutions = charts.resolutions.len(),
        output = %config.output_dir.display(),
        "chart indexer starting"
    );

    let indexer = Indexer::new(config, charts);
    tokio::select! {
        res = indexer.run() => res,
        _ = tokio::signal::ctrl_c() => {
            info!("shutting down");
            Ok(())
        }
    }
}
