use std::{path::Path, thread, time::Duration};

use chrono::DateTime;
use common::{networks::Network, protocol::Resolution};
use tracing::{debug, info};

use crate::{
    BlockSource, CycleAccumulator, commit::ChartSet, errors::ChartsError,
    schedule::CycleScheduler,
};

/// how one (network, resolution) run ended
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// fewer new blocks than one cycle needs, nothing was touched
    InsufficientDepth {
        checkpoint: u64,
        chain_height: u64,
        blocks_per_cycle: u64,
    },
    /// replayed up to the block before the tip
    CaughtUp { cycles: usize, height: u64 },
}

/// replays blocks from the last checkpoint and commits one point per closed cycle
pub struct AggregationDriver<S> {
    source: S,
    scheduler: CycleScheduler,
    fetch_delay: Duration,
}

impl<S: BlockSource> AggregationDriver<S> {
    pub fn new(source: S, scheduler: CycleScheduler, fetch_delay: Duration) -> Self {
        AggregationDriver {
            source,
            scheduler,
            fetch_delay,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// `output_dir` holds one directory per network
    pub fn run(
        &self,
        network: &Network,
        output_dir: &Path,
        resolution: &Resolution,
    ) -> Result<RunOutcome, ChartsError> {
        let dir = output_dir.join(network.dir_name());
        let mut set = ChartSet::open(&dir, &resolution.suffix)?;
        let start = set.checkpoint();
        let chain_height = self.source.chain_height()?;
        let mut blocks_per_cycle = self
            .scheduler
            .blocks_per_cycle(start.height, resolution.cycle_seconds);

        // chain_height - checkpoint + 1 < blocks_per_cycle
        if chain_height + 1 < start.height + blocks_per_cycle {
            debug!(
                network = %network.name,
                resolution = %resolution.suffix,
                checkpoint = start.height,
                chain_height,
                blocks_per_cycle,
                "not enough new blocks for a cycle"
            );
            return Ok(RunOutcome::InsufficientDepth {
                checkpoint: start.height,
                chain_height,
                blocks_per_cycle,
            });
        }

        // the previous cycle's closing timestamp, as committed
        let reference = set.last_timestamp()?;
        let mut acc = CycleAccumulator::new(
            *self.scheduler.params(),
            start.blockchain_size,
            reference,
        );
        let mut cycles = 0;
        let mut height = start.height;
        info!(
            network = %network.name,
            resolution = %resolution.suffix,
            from = start.height + 1,
            to = chain_height.saturating_sub(1),
            "catching up"
        );

        // the tip can still be reorganized away, stop right before it
        for current in start.height + 1..chain_height {
            if !self.fetch_delay.is_zero() {
                thread::sleep(self.fetch_delay);
            }
            let block = self.source.block_by_height(current)?;
            acc.observe(&block);
            if !CycleScheduler::closes_cycle(current, blocks_per_cycle) {
                continue;
            }
            let point = acc.close_cycle(&block, blocks_per_cycle, resolution.cycle_seconds);
            let checkpoint = set.commit(&point)?;
            blocks_per_cycle = self
                .scheduler
                .blocks_per_cycle(current, resolution.cycle_seconds);
            cycles += 1;
            height = checkpoint.height;
            info!(
                network = %network.name,
                resolution = %resolution.suffix,
                height,
                timestamp = %render_timestamp(point.timestamp),
                "committed cycle"
            );
        }
        Ok(RunOutcome::CaughtUp { cycles, height })
    }
}

fn render_timestamp(ts: u64) -> String {
    i64::try_from(ts)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| ts.to_string())
}
