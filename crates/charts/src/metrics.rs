use serde::{Deserialize, Serialize};

/// every chart series written per (network, resolution)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Hashrate,
    BlockchainSize,
    TransactionsCountAll,
    TransactionsCount,
    TransactionsOutputs,
    TransactionsFees,
    TransactionsSizeAvg,
    TransactionsFusionCount,
    BlockReward,
    BlockCurrentTxsMedianMax,
    BlocksSizeAvg,
    BlocksTimeAvg,
    BlocksPenaltyPercentage,
    GeneratedCoins,
    Difficulty,
}

impl Metric {
    pub const COUNT: usize = 15;

    pub fn all() -> [Metric; Metric::COUNT] {
        [
            Metric::Hashrate,
            Metric::BlockchainSize,
            Metric::TransactionsCountAll,
            Metric::TransactionsCount,
            Metric::TransactionsOutputs,
            Metric::TransactionsFees,
            Metric::TransactionsSizeAvg,
            Metric::TransactionsFusionCount,
            Metric::BlockReward,
            Metric::BlockCurrentTxsMedianMax,
            Metric::BlocksSizeAvg,
            Metric::BlocksTimeAvg,
            Metric::BlocksPenaltyPercentage,
            Metric::GeneratedCoins,
            Metric::Difficulty,
        ]
    }

    /// chart file name without the resolution suffix
    pub fn file_stem(&self) -> &'static str {
        match self {
            Metric::Hashrate => "hashrate",
            Metric::BlockchainSize => "blockchain_size",
            Metric::TransactionsCountAll => "transactions_count_all",
            Metric::TransactionsCount => "transactions_count",
            Metric::TransactionsOutputs => "transactions_outputs",
            Metric::TransactionsFees => "transactions_fees",
            Metric::TransactionsSizeAvg => "transactions_size_avg",
            Metric::TransactionsFusionCount => "transactions_fusion_count",
            Metric::BlockReward => "block_reward",
            Metric::BlockCurrentTxsMedianMax => "block_current_txs_median_max",
            Metric::BlocksSizeAvg => "blocks_size_avg",
            Metric::BlocksTimeAvg => "blocks_time_avg",
            Metric::BlocksPenaltyPercentage => "blocks_penalty_percentage",
            Metric::GeneratedCoins => "generated_coins",
            // historical file name, the series holds the closing block's difficulty
            Metric::Difficulty => "difficulty_avg",
        }
    }

    pub fn file_name(&self, suffix: &str) -> String {
        format!("{}_{suffix}.json", self.file_stem())
    }
}

/// one closed cycle, one value per metric
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CyclePoint {
    pub height: u64,
    pub timestamp: u64,
    pub hashrate: u64,
    pub blockchain_size: u64,
    pub transactions_count_all: u64,
    pub transactions_count: u64,
    pub transactions_outputs: u64,
    pub transactions_fees: u64,
    pub transactions_size_avg: u64,
    pub transactions_fusion_count: u64,
    pub block_reward: u64,
    pub block_current_txs_median_max: u64,
    pub blocks_size_avg: u64,
    pub blocks_time_avg: u64,
    pub blocks_penalty_percentage: u64,
    pub generated_coins: u64,
    pub difficulty: u64,
}

impl CyclePoint {
    pub fn value(&self, metric: Metric) -> u64 {
        match metric {
            Metric::Hashrate => self.hashrate,
            Metric::BlockchainSize => self.blockchain_size,
            Metric::TransactionsCountAll => self.transactions_count_all,
            Metric::TransactionsCount => self.transactions_count,
            Metric::TransactionsOutputs => self.transactions_outputs,
            Metric::TransactionsFees => self.transactions_fees,
            Metric::TransactionsSizeAvg => self.transactions_size_avg,
            Metric::TransactionsFusionCount => self.transactions_fusion_count,
            Metric::BlockReward => self.block_reward,
            Metric::BlockCurrentTxsMedianMax => self.block_current_txs_median_max,
            Metric::BlocksSizeAvg => self.blocks_size_avg,
            Metric::BlocksTimeAvg => self.blocks_time_avg,
            Metric::BlocksPenaltyPercentage => self.blocks_penalty_percentage,
            Metric::GeneratedCoins => self.generated_coins,
            Metric::Difficulty => self.difficulty,
        }
    }
}
