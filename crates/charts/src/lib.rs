pub mod accumulator;
pub mod chart;
pub mod checkpoint;
pub mod commit;
pub mod daemon;
pub mod driver;
pub mod errors;
pub mod metrics;
pub mod schedule;
#[cfg(test)]
pub(crate) mod testing;

pub use accumulator::CycleAccumulator;
pub use driver::{AggregationDriver, RunOutcome};
pub use errors::{ChartsError, Severity};
pub use metrics::{CyclePoint, Metric};
pub use schedule::CycleScheduler;

use serde::{Deserialize, Serialize};

/// the per-block fields the chart job consumes
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub height: u64,
    pub timestamp: u64,
    pub size: u64,
    pub difficulty: u64,
    pub penalty: f64,
    pub base_reward: u64,
    pub size_median: u64,
    pub already_generated_coins: u64,
    pub already_generated_transactions: u64,
    /// index 0 is the coinbase
    pub transactions: Vec<TxRecord>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxRecord {
    pub amount_out: u64,
    pub fee: u64,
    pub size: u64,
}

/// request/response access to a network's blocks
pub trait BlockSource {
    /// current chain height as reported by the node, the tip is still mutable
    fn chain_height(&self) -> Result<u64, ChartsError>;

    fn block_by_height(&self, height: u64) -> Result<BlockRecord, ChartsError>;
}

impl<S: BlockSource + ?Sized> BlockSource for &S {
    fn chain_height(&self) -> Result<u64, ChartsError> {
        (**self).chain_height()
    }

    fn block_by_height(&self, height: u64) -> Result<BlockRecord, ChartsError> {
        (**self).block_by_height(height)
    }
}
