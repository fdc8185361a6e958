use common::protocol::ProtocolParams;

/// decides cycle lengths and where cycle boundaries fall
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CycleScheduler {
    params: ProtocolParams,
}

impl CycleScheduler {
    pub fn new(params: ProtocolParams) -> Self {
        CycleScheduler { params }
    }

    pub fn params(&self) -> &ProtocolParams {
        &self.params
    }

    pub fn block_time_target(&self, height: u64) -> u64 {
        self.params.block_time_target(height)
    }

    /// number of blocks covering `cycle_seconds` at the block-time target of `height`,
    /// has to be recomputed at every boundary since the fork can land mid-run
    pub fn blocks_per_cycle(&self, height: u64, cycle_seconds: u64) -> u64 {
        cycle_seconds / self.block_time_target(height)
    }

    /// whether `height` closes the cycle currently built with `blocks_per_cycle` blocks
    pub fn closes_cycle(height: u64, blocks_per_cycle: u64) -> bool {
        blocks_per_cycle > 1 && height % blocks_per_cycle == 1
    }

    /// genesis is a boundary with nothing before it to diff against
    pub fn is_genesis(height: u64) -> bool {
        height == 1
    }
}
