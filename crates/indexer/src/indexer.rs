use anyhow::{Context, Result};
use charts::{
    AggregationDriver, CycleScheduler, RunOutcome, Severity, daemon::DaemonClient,
};
use common::networks::{ChartsConfig, Network};
use tracing::{debug, error, info, warn};

use crate::config::Config;

/// what one pass over every (resolution, network) pair did
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub cycles: usize,
    pub idle: usize,
    pub skipped: usize,
}

#[derive(Clone)]
pub struct Indexer {
    config: Config,
    charts: ChartsConfig,
}

impl Indexer {
    pub fn new(config: Config, charts: ChartsConfig) -> Self {
        Indexer { config, charts }
    }

    pub async fn run(&self) -> Result<()> {
        if self.config.run_once {
            self.run_once().await?;
            return Ok(());
        }
        let mut interval = tokio::time::interval(self.config.interval);
        loop {
            interval.tick().await;
            if let Err(err) = self.run_once().await {
                error!("chart pass error: {err:?}");
            }
        }
    }

    async fn run_once(&self) -> Result<PassSummary> {
        let indexer = self.clone();
        let summary = tokio::task::spawn_blocking(move || indexer.run_pass()).await??;
        info!(
            cycles = summary.cycles,
            idle = summary.idle,
            skipped = summary.skipped,
            "chart pass finished"
        );
        Ok(summary)
    }

    /// resolutions outer, networks inner, a skipped network never stops the pass
    pub fn run_pass(&self) -> Result<PassSummary> {
        let scheduler = CycleScheduler::new(self.charts.protocol);
        let mut summary = PassSummary::default();
        for resolution in &self.charts.resolutions {
            for network in &self.charts.networks {
                let client = DaemonClient::new(&self.daemon_rpc(network), self.config.rpc_timeout);
                let driver = AggregationDriver::new(client, scheduler, self.config.fetch_delay);
                match driver.run(network, &self.config.output_dir, resolution) {
                    Ok(RunOutcome::CaughtUp { cycles, height }) => {
                        info!(
                            network = %network.name,
                            resolution = %resolution.suffix,
                            cycles,
                            height,
                            "charts up to date"
                        );
                        summary.cycles += cycles;
                    }
                    Ok(RunOutcome::InsufficientDepth {
                        checkpoint,
                        chain_height,
                        ..
                    }) => {
                        debug!(
                            network = %network.name,
                            resolution = %resolution.suffix,
                            checkpoint,
                            chain_height,
                            "waiting for a full cycle"
                        );
                        summary.idle += 1;
                    }
                    Err(err) if err.severity() == Severity::Fatal => {
                        return Err(err).with_context(|| {
                            format!(
                                "charts for {} ({}) are unusable",
                                network.name, resolution.suffix
                            )
                        });
                    }
                    Err(err) => {
                        warn!(
                            network = %network.name,
                            resolution = %resolution.suffix,
                            error = %err,
                            "skipping network"
                        );
                        summary.skipped += 1;
                    }
                }
            }
        }
        Ok(summary)
    }

    fn daemon_rpc(&self, network: &Network) -> String {
        if self.config.daemon_localhost {
            network.localhost_rpc()
        } else {
            network.daemon_rpc.clone()
        }
    }
}
