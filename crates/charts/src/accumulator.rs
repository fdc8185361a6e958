use common::protocol::ProtocolParams;

use crate::{BlockRecord, CyclePoint, schedule::CycleScheduler};

/// allowance for source clocks running behind the previous cycle's reference
pub const TIMESTAMP_REGRESSION_ALLOWANCE: i64 = 60 * 60;

/// running totals of the cycle currently being built, no I/O in here
#[derive(Clone, Debug, PartialEq)]
pub struct CycleAccumulator {
    params: ProtocolParams,
    transactions_count: u64,
    transactions_outputs: u64,
    transactions_fees: u64,
    transactions_size: u64,
    fusion_count: u64,
    size_median_max: u64,
    blocks_size: u64,
    difficulty: u64,
    blocks_with_penalty: u64,
    // closing timestamp of the previous cycle, survives resets
    reference_timestamp: Option<u64>,
    // survives resets, restored from the checkpoint on resume
    blockchain_size: u64,
}

impl CycleAccumulator {
    /// `reference_timestamp` is the last committed point's timestamp, `None` on a fresh chart
    pub fn new(
        params: ProtocolParams,
        blockchain_size: u64,
        reference_timestamp: Option<u64>,
    ) -> Self {
        CycleAccumulator {
            params,
            transactions_count: 0,
            transactions_outputs: 0,
            transactions_fees: 0,
            transactions_size: 0,
            fusion_count: 0,
            size_median_max: 0,
            blocks_size: 0,
            difficulty: 0,
            blocks_with_penalty: 0,
            reference_timestamp,
            blockchain_size,
        }
    }

    pub fn blockchain_size(&self) -> u64 {
        self.blockchain_size
    }

    pub fn reference_timestamp(&self) -> Option<u64> {
        self.reference_timestamp
    }

    pub fn observe(&mut self, block: &BlockRecord) {
        if self.reference_timestamp.is_none() {
            self.reference_timestamp = Some(block.timestamp);
        }
        self.blocks_size = self.blocks_size.saturating_add(block.size);
        self.blockchain_size = self.blockchain_size.saturating_add(block.size);
        self.difficulty = self.difficulty.saturating_add(block.difficulty);
        self.size_median_max = self.size_median_max.max(block.size_median);
        if block.penalty != 0.0 {
            self.blocks_with_penalty += 1;
        }
        for tx in block.transactions.iter().skip(1) {
            if tx.fee != 0 {
                self.transactions_outputs = self.transactions_outputs.saturating_add(tx.amount_out);
                self.transactions_fees = self.transactions_fees.saturating_add(tx.fee);
                self.transactions_size = self.transactions_size.saturating_add(tx.size);
                self.transactions_count += 1;
            } else {
                self.fusion_count += 1;
            }
        }
    }

    /// turns the totals into one point closed by `block` (already observed) and resets
    pub fn close_cycle(
        &mut self,
        block: &BlockRecord,
        blocks_per_cycle: u64,
        cycle_seconds: u64,
    ) -> CyclePoint {
        let reference = self.reference_timestamp.unwrap_or(block.timestamp);
        let (hashrate, blocks_time_avg) = if CycleScheduler::is_genesis(block.height) {
            (0, 0)
        } else {
            let elapsed = elapsed_seconds(reference, block.timestamp, blocks_per_cycle);
            let target = self.params.block_time_target(block.height);
            let blocks_time_avg = (target as u128 * elapsed as u128)
                .checked_div(cycle_seconds as u128)
                .unwrap_or(0) as u64;
            (self.difficulty / elapsed.max(1), blocks_time_avg)
        };
        let transactions_size_avg = self
            .transactions_size
            .checked_div(self.transactions_count)
            .unwrap_or(0);

        let point = CyclePoint {
            height: block.height,
            timestamp: block.timestamp,
            hashrate,
            blockchain_size: self.blockchain_size,
            transactions_count_all: block.already_generated_transactions,
            transactions_count: self.transactions_count,
            transactions_outputs: self.transactions_outputs,
            transactions_fees: self.transactions_fees,
            transactions_size_avg,
            transactions_fusion_count: self.fusion_count,
            block_reward: block.base_reward,
            block_current_txs_median_max: self.size_median_max,
            blocks_size_avg: self.blocks_size.checked_div(blocks_per_cycle).unwrap_or(0),
            blocks_time_avg,
            blocks_penalty_percentage: self
                .blocks_with_penalty
                .saturating_mul(100)
                .checked_div(blocks_per_cycle)
                .unwrap_or(0),
            generated_coins: block.already_generated_coins,
            difficulty: block.difficulty,
        };
        self.reset(block.timestamp);
        point
    }

    fn reset(&mut self, closing_timestamp: u64) {
        *self = CycleAccumulator::new(self.params, self.blockchain_size, Some(closing_timestamp));
    }
}

/// seconds between the previous cycle's closing timestamp and this one,
/// a regressed clock gets an hour of slack and falls back to one second per block
pub fn elapsed_seconds(reference: u64, closing: u64, blocks_per_cycle: u64) -> u64 {
    let mut elapsed = closing as i64 - reference as i64;
    if elapsed < 0 {
        elapsed += TIMESTAMP_REGRESSION_ALLOWANCE;
        if elapsed < 0 {
            elapsed = blocks_per_cycle as i64;
        }
    }
    elapsed as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TxRecord;
    use crate::testing::{block, coinbase, tx};

    fn params() -> ProtocolParams {
        ProtocolParams {
            hardfork_height: 1_000,
            block_time_before_fork: 60,
            block_time_after_fork: 120,
        }
    }

    #[test]
    fn fusion_and_coinbase_classification() {
        let mut acc = CycleAccumulator::new(params(), 0, None);
        let mut b = block(2, 1_000);
        b.transactions = vec![
            // fee-bearing coinbase must still be skipped
            TxRecord {
                amount_out: 900,
                fee: 7,
                size: 80,
            },
            tx(500, 10, 300),
            tx(200, 0, 1_000),
            tx(50, 0, 2_000),
        ];
        acc.observe(&b);
        let point = acc.close_cycle(&b, 10, 600);
        assert_eq!(point.transactions_count, 1);
        assert_eq!(point.transactions_outputs, 500);
        assert_eq!(point.transactions_fees, 10);
        assert_eq!(point.transactions_size_avg, 300);
        assert_eq!(point.transactions_fusion_count, 2);
    }

    #[test]
    fn elapsed_regression_correction() {
        assert_eq!(elapsed_seconds(10_000, 10_600, 10), 600);
        // N - P + 3600
        assert_eq!(elapsed_seconds(10_000, 9_000, 10), 2_600);
        assert_eq!(elapsed_seconds(10_000, 6_400, 10), 0);
        // still negative, falls back to blocks per cycle
        assert_eq!(elapsed_seconds(10_000, 5_000, 10), 10);
    }

    #[test]
    fn regressed_timestamp_feeds_hashrate() {
        // previous cycle closed at 10_000
        let mut acc = CycleAccumulator::new(params(), 0, Some(10_000));
        let mut first = block(12, 10_060);
        first.difficulty = 1_300;
        let mut last = block(21, 9_000);
        last.difficulty = 1_300;
        acc.observe(&first);
        acc.observe(&last);
        let point = acc.close_cycle(&last, 10, 600);
        assert_eq!(point.hashrate, 2_600 / 2_600);
        assert_eq!(point.blocks_time_avg, 60 * 2_600 / 600);
        // the regressed block becomes the next reference
        assert_eq!(acc.reference_timestamp(), Some(9_000));

        let mut acc = CycleAccumulator::new(params(), 0, Some(10_000));
        let mut wild = block(21, 1_000);
        wild.difficulty = 1_000;
        acc.observe(&first);
        acc.observe(&wild);
        let point = acc.close_cycle(&wild, 10, 600);
        assert_eq!(point.hashrate, 2_300 / 10);
    }

    #[test]
    fn genesis_emits_zero_rates() {
        let mut acc = CycleAccumulator::new(params(), 0, None);
        let mut genesis = block(1, 1_500);
        genesis.difficulty = 1;
        genesis.size = 400;
        acc.observe(&genesis);
        let point = acc.close_cycle(&genesis, 10, 600);
        assert_eq!(point.hashrate, 0);
        assert_eq!(point.blocks_time_avg, 0);
        assert_eq!(point.timestamp, 1_500);
        assert_eq!(point.blockchain_size, 400);
        assert_eq!(point.blocks_size_avg, 40);
    }

    #[test]
    fn twenty_block_cycle() {
        // genesis closed at 1_060
        let mut acc = CycleAccumulator::new(params(), 500, Some(1_060));
        let mut blocks = Vec::new();
        for height in 2..=20u64 {
            let mut b = block(height, 1_000 + height * 60);
            b.difficulty = 100;
            b.size = 500;
            let (amount, fee, size) = if height == 20 {
                (500, 10, 110)
            } else {
                (250, 5, 105)
            };
            b.transactions = vec![coinbase(), tx(amount, fee, size)];
            blocks.push(b);
        }
        for b in &blocks {
            acc.observe(b);
        }
        let closing = blocks.last().unwrap();
        let point = acc.close_cycle(closing, 19, 19 * 60);
        assert_eq!(point.transactions_count, 19);
        assert_eq!(point.transactions_fees, 100);
        assert_eq!(point.transactions_outputs, 5_000);
        assert_eq!(point.transactions_size_avg, 2_000 / 19);
        assert_eq!(point.transactions_size_avg, 105);
        assert_eq!(point.blocks_size_avg, 500);
        // 19 intervals of 60s since the genesis point
        assert_eq!(point.hashrate, 1_900 / (19 * 60));
        assert_eq!(point.blocks_time_avg, 60);
        assert_eq!(point.blockchain_size, 20 * 500);
    }

    #[test]
    fn evenly_spaced_blocks_report_target_time() {
        let mut acc = CycleAccumulator::new(params(), 0, None);
        let mut times = Vec::new();
        for height in 1..=31u64 {
            let mut b = block(height, 5_000 + height * 60);
            b.difficulty = 60;
            acc.observe(&b);
            if CycleScheduler::closes_cycle(height, 10) {
                let point = acc.close_cycle(&b, 10, 600);
                times.push((point.blocks_time_avg, point.hashrate));
            }
        }
        assert_eq!(times, vec![(0, 0), (60, 1), (60, 1), (60, 1)]);
    }

    #[test]
    fn sums_saturate() {
        let mut acc = CycleAccumulator::new(params(), u64::MAX - 10, Some(1_000));
        let mut b = block(11, 1_600);
        b.size = 100;
        b.transactions = vec![coinbase(), tx(u64::MAX, 1, 10), tx(u64::MAX, 1, 10)];
        acc.observe(&b);
        let point = acc.close_cycle(&b, 10, 600);
        assert_eq!(point.transactions_outputs, u64::MAX);
        assert_eq!(point.blockchain_size, u64::MAX);
        assert_eq!(point.transactions_count, 2);
    }

    #[test]
    fn pass_through_and_max_fields() {
        let mut acc = CycleAccumulator::new(params(), 0, None);
        let mut a = block(1_005, 1_000);
        a.size_median = 300;
        a.penalty = 0.25;
        let mut b = block(1_006, 1_120);
        b.size_median = 200;
        b.difficulty = 77;
        b.base_reward = 1_234;
        b.already_generated_coins = 9_999;
        b.already_generated_transactions = 4_321;
        acc.observe(&a);
        acc.observe(&b);
        let point = acc.close_cycle(&b, 4, 480);
        assert_eq!(point.block_current_txs_median_max, 300);
        assert_eq!(point.blocks_penalty_percentage, 25);
        assert_eq!(point.block_reward, 1_234);
        assert_eq!(point.generated_coins, 9_999);
        assert_eq!(point.transactions_count_all, 4_321);
        // closing block difficulty, not an average
        assert_eq!(point.difficulty, 77);
        // post-fork block time target
        assert_eq!(point.blocks_time_avg, 120 * 120 / 480);
    }

    #[test]
    fn reset_keeps_blockchain_size_and_closing_timestamp() {
        let mut acc = CycleAccumulator::new(params(), 10_000, None);
        let mut a = block(11, 1_000);
        a.size = 250;
        a.transactions = vec![coinbase(), tx(1, 1, 1)];
        acc.observe(&a);
        acc.close_cycle(&a, 10, 600);
        assert_eq!(acc.blockchain_size(), 10_250);
        assert_eq!(acc.reference_timestamp(), Some(1_000));

        let b = block(12, 1_060);
        acc.observe(&b);
        assert_eq!(acc.reference_timestamp(), Some(1_000));
        let point = acc.close_cycle(&b, 10, 600);
        assert_eq!(point.transactions_count, 0);
        assert_eq!(point.transactions_size_avg, 0);
        assert_eq!(point.blockchain_size, 10_250);
        assert_eq!(point.blocks_time_avg, 60 * 60 / 600);
    }
}
