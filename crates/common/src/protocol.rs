use crate::constants::{
    BLOCK_TIME_AFTER_FORK, BLOCK_TIME_BEFORE_FORK, DAILY_CYCLE_SECS, DAILY_SUFFIX,
    HARDFORK_HEIGHT, HOURLY_CYCLE_SECS, HOURLY_SUFFIX,
};
use serde::{Deserialize, Serialize};

/// protocol-wide consensus constants the cycle math depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolParams {
    pub hardfork_height: u64,
    pub block_time_before_fork: u64,
    pub block_time_after_fork: u64,
}

impl Default for ProtocolParams {
    fn default() -> Self {
        ProtocolParams {
            hardfork_height: HARDFORK_HEIGHT,
            block_time_before_fork: BLOCK_TIME_BEFORE_FORK,
            block_time_after_fork: BLOCK_TIME_AFTER_FORK,
        }
    }
}

impl ProtocolParams {
    /// target seconds per block in effect at `height`
    pub fn block_time_target(&self, height: u64) -> u64 {
        if height >= self.hardfork_height {
            self.block_time_after_fork
        } else {
            self.block_time_before_fork
        }
    }
}

/// a named sampling period, every resolution gets its own charts and checkpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub suffix: String,
    pub cycle_seconds: u64,
}

impl Resolution {
    pub fn new(suffix: &str, cycle_seconds: u64) -> Self {
        Resolution {
            suffix: suffix.to_string(),
            cycle_seconds,
        }
    }

    pub fn daily() -> Self {
        Self::new(DAILY_SUFFIX, DAILY_CYCLE_SECS)
    }

    pub fn hourly() -> Self {
        Self::new(HOURLY_SUFFIX, HOURLY_CYCLE_SECS)
    }

    pub fn defaults() -> Vec<Self> {
        vec![Self::daily(), Self::hourly()]
    }
}
