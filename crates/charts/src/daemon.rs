//! Block access through a node daemon's HTTP api:
//!
//! - `GET  {rpc}/getheight` -> `{"height": .., "status": "OK"}`
//! - `POST {rpc}/json_rpc` with method `f_block_json` -> `result.block`

use std::time::Duration;

use serde::{Deserialize, Deserializer, de};
use serde_json::{Value, json};
use tracing::debug;

use crate::{BlockRecord, BlockSource, TxRecord, errors::ChartsError};

#[derive(Clone)]
pub struct DaemonClient {
    endpoint: String,
    agent: ureq::Agent,
}

impl DaemonClient {
    pub fn new(daemon_rpc: &str, timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        DaemonClient {
            endpoint: daemon_rpc.trim_end_matches('/').to_string(),
            agent,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn get_json(&self, url: &str) -> Result<Value, ChartsError> {
        let mut res = self.agent.get(url).call().map_err(|source| ChartsError::Unreachable {
            endpoint: url.to_string(),
            source,
        })?;
        let body = res
            .body_mut()
            .read_to_string()
            .map_err(|source| ChartsError::Unreachable {
                endpoint: url.to_string(),
                source,
            })?;
        parse_body(url, &body)
    }

    fn post_json(&self, url: &str, body: &Value) -> Result<Value, ChartsError> {
        let mut res = self
            .agent
            .post(url)
            .send_json(body)
            .map_err(|source| ChartsError::Unreachable {
                endpoint: url.to_string(),
                source,
            })?;
        let body = res
            .body_mut()
            .read_to_string()
            .map_err(|source| ChartsError::Unreachable {
                endpoint: url.to_string(),
                source,
            })?;
        parse_body(url, &body)
    }
}

impl BlockSource for DaemonClient {
    fn chain_height(&self) -> Result<u64, ChartsError> {
        let url = format!("{}/getheight", self.endpoint);
        let value = self.get_json(&url)?;
        decode_height(&url, value)
    }

    fn block_by_height(&self, height: u64) -> Result<BlockRecord, ChartsError> {
        let url = format!("{}/json_rpc", self.endpoint);
        let body = json!({
            "method": "f_block_json",
            "params": { "hash": height.to_string() }
        });
        debug!(height, endpoint = %self.endpoint, "fetching block");
        let value = self.post_json(&url, &body)?;
        decode_block(&url, height, value)
    }
}

fn parse_body(endpoint: &str, body: &str) -> Result<Value, ChartsError> {
    if body.trim().is_empty() {
        return Err(ChartsError::EmptyResponse(endpoint.to_string()));
    }
    serde_json::from_str(body).map_err(|source| ChartsError::MalformedResponse {
        endpoint: endpoint.to_string(),
        source,
    })
}

pub(crate) fn decode_height(endpoint: &str, value: Value) -> Result<u64, ChartsError> {
    #[derive(Deserialize)]
    struct ChainHeight {
        height: u64,
    }
    let res: ChainHeight = serde_json::from_value(value).map_err(|err| ChartsError::Decode {
        endpoint: endpoint.to_string(),
        what: "chain height",
        reason: err.to_string(),
    })?;
    Ok(res.height)
}

pub(crate) fn decode_block(
    endpoint: &str,
    height: u64,
    mut value: Value,
) -> Result<BlockRecord, ChartsError> {
    if let Some(err) = value.get("error").filter(|e| !e.is_null()) {
        let message = err
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| err.to_string());
        return Err(ChartsError::Rpc {
            endpoint: endpoint.to_string(),
            message,
        });
    }
    let block = value
        .get_mut("result")
        .and_then(|r| r.get_mut("block"))
        .map(Value::take)
        .ok_or_else(|| ChartsError::Decode {
            endpoint: endpoint.to_string(),
            what: "block",
            reason: format!("no result.block for height {height}"),
        })?;
    let block: WireBlock = serde_json::from_value(block).map_err(|err| ChartsError::Decode {
        endpoint: endpoint.to_string(),
        what: "block",
        reason: format!("height {height}: {err}"),
    })?;
    Ok(block.into_record(height))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireBlock {
    #[serde(deserialize_with = "u64_from_str_or_num")]
    already_generated_coins: u64,
    already_generated_transactions: u64,
    base_reward: u64,
    block_size: u64,
    difficulty: u64,
    #[serde(default)]
    penalty: f64,
    size_median: u64,
    timestamp: u64,
    #[serde(default)]
    transactions: Vec<WireTx>,
}

#[derive(Deserialize)]
struct WireTx {
    amount_out: u64,
    fee: u64,
    size: u64,
}

impl WireBlock {
    fn into_record(self, height: u64) -> BlockRecord {
        BlockRecord {
            height,
            timestamp: self.timestamp,
            size: self.block_size,
            difficulty: self.difficulty,
            penalty: self.penalty,
            base_reward: self.base_reward,
            size_median: self.size_median,
            already_generated_coins: self.already_generated_coins,
            already_generated_transactions: self.already_generated_transactions,
            transactions: self
                .transactions
                .into_iter()
                .map(|tx| TxRecord {
                    amount_out: tx.amount_out,
                    fee: tx.fee,
                    size: tx.size,
                })
                .collect(),
        }
    }
}

fn u64_from_str_or_num<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Str(String),
    }
    match Raw::deserialize(deserializer)? {
        Raw::Num(v) => Ok(v),
        Raw::Str(s) => s.trim().parse::<u64>().map_err(de::Error::custom),
    }
}
