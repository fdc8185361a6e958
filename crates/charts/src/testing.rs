use std::{cell::RefCell, collections::BTreeMap};

use crate::{BlockRecord, BlockSource, ChartsError, TxRecord};

pub(crate) const GENESIS_TS: u64 = 1_500_000_000;

pub(crate) fn coinbase() -> TxRecord {
    TxRecord {
        amount_out: 1_000_000,
        fee: 0,
        size: 90,
    }
}

pub(crate) fn tx(amount_out: u64, fee: u64, size: u64) -> TxRecord {
    TxRecord {
        amount_out,
        fee,
        size,
    }
}

/// bare block carrying only a coinbase
pub(crate) fn block(height: u64, timestamp: u64) -> BlockRecord {
    BlockRecord {
        height,
        timestamp,
        transactions: vec![coinbase()],
        ..Default::default()
    }
}

/// deterministic block with a bit of everything in it
pub(crate) fn sample_block(height: u64) -> BlockRecord {
    let mut b = block(height, GENESIS_TS + height * 60 + height % 4);
    b.size = 300 + (height % 7) * 10;
    b.difficulty = 1_000 + height;
    b.size_median = 1_000 + (height % 11) * 3;
    b.base_reward = 5_000_000 - height;
    b.already_generated_coins = height * 5_000_000;
    b.already_generated_transactions = height * 3;
    if height % 13 == 0 {
        b.penalty = 0.5;
    }
    for i in 0..(height % 3) {
        let fee = if (height + i) % 5 == 0 { 0 } else { 10 + i };
        b.transactions.push(tx(1_000 * (i + 1), fee, 200 + height % 50));
    }
    b
}

pub(crate) struct MockChain {
    blocks: BTreeMap<u64, BlockRecord>,
    height: u64,
    offline: bool,
    fail_at: Option<u64>,
    fetched: RefCell<Vec<u64>>,
}

impl MockChain {
    /// blocks `1..=tip`, the reported chain height is `tip + 1`
    pub fn new(tip: u64, make: impl Fn(u64) -> BlockRecord) -> Self {
        MockChain {
            blocks: (1..=tip).map(|h| (h, make(h))).collect(),
            height: tip + 1,
            offline: false,
            fail_at: None,
            fetched: RefCell::new(Vec::new()),
        }
    }

    pub fn with_height(mut self, height: u64) -> Self {
        self.height = height;
        self
    }

    pub fn failing_at(mut self, height: u64) -> Self {
        self.fail_at = Some(height);
        self
    }

    pub fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    pub fn fetched(&self) -> Vec<u64> {
        self.fetched.borrow().clone()
    }
}

impl BlockSource for MockChain {
    fn chain_height(&self) -> Result<u64, ChartsError> {
        if self.offline {
            return Err(ChartsError::EmptyResponse("mock://getheight".into()));
        }
        Ok(self.height)
    }

    fn block_by_height(&self, height: u64) -> Result<BlockRecord, ChartsError> {
        self.fetched.borrow_mut().push(height);
        if self.fail_at == Some(height) {
            return Err(ChartsError::EmptyResponse("mock://json_rpc".into()));
        }
        self.blocks
            .get(&height)
            .cloned()
            .ok_or_else(|| ChartsError::Rpc {
                endpoint: "mock://json_rpc".into(),
                message: format!("no block at {height}"),
            })
    }
}
