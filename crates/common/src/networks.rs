//! tracked networks and the static configuration the chart job
//! runs against, loaded from a toml file:
//!
//! ```toml
//! [protocol]
//! hardfork_height = 1009827
//!
//! [[resolutions]]
//! suffix = "1d"
//! cycle_seconds = 86400
//!
//! [[networks]]
//! name = "Karbo"
//! daemon_rpc = "http://node.example:32348/"
//! ```
//!
//! `protocol` and `resolutions` fall back to the built-in defaults.

use crate::errors::ConfigError;
use crate::protocol::{ProtocolParams, Resolution};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    pub name: String,
    #[serde(alias = "daemonrpc")]
    pub daemon_rpc: String,
}

impl Network {
    pub fn new(name: &str, daemon_rpc: &str) -> Self {
        Network {
            name: name.to_string(),
            daemon_rpc: daemon_rpc.to_string(),
        }
    }

    /// directory name of the network under the charts output dir
    pub fn dir_name(&self) -> String {
        self.name.to_lowercase()
    }

    /// same endpoint with the host swapped for localhost, scheme and port kept
    pub fn localhost_rpc(&self) -> String {
        let (scheme, rest) = match self.daemon_rpc.split_once("://") {
            Some((scheme, rest)) => (scheme, rest),
            None => ("http", self.daemon_rpc.as_str()),
        };
        let (authority, path) = match rest.find('/') {
            Some(idx) => rest.split_at(idx),
            None => (rest, ""),
        };
        match authority.rsplit_once(':') {
            Some((_, port)) => format!("{scheme}://localhost:{port}{path}"),
            None => format!("{scheme}://localhost{path}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartsConfig {
    #[serde(default)]
    pub protocol: ProtocolParams,
    #[serde(default = "Resolution::defaults")]
    pub resolutions: Vec<Resolution>,
    #[serde(default, alias = "pools")]
    pub networks: Vec<Network>,
}

impl ChartsConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ChartsConfig =
            toml::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let protocol = &self.protocol;
        if protocol.block_time_before_fork == 0 || protocol.block_time_after_fork == 0 {
            return Err(ConfigError::Invalid(
                "block time targets must be positive".into(),
            ));
        }
        if self.networks.is_empty() {
            return Err(ConfigError::Invalid("no networks configured".into()));
        }
        let mut names = HashSet::new();
        for network in &self.networks {
            if network.name.trim().is_empty() || network.daemon_rpc.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "network entry {network:?} needs a name and a daemon_rpc"
                )));
            }
            if !names.insert(network.dir_name()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate network name {}",
                    network.name
                )));
            }
        }
        let mut suffixes = HashSet::new();
        for resolution in &self.resolutions {
            if resolution.suffix.trim().is_empty() {
                return Err(ConfigError::Invalid("empty resolution suffix".into()));
            }
            if !suffixes.insert(resolution.suffix.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate resolution {}",
                    resolution.suffix
                )));
            }
            // h % 1 never equals 1, a cycle needs at least two blocks
            let slowest = protocol
                .block_time_before_fork
                .max(protocol.block_time_after_fork);
            if resolution.cycle_seconds / slowest < 2 {
                return Err(ConfigError::Invalid(format!(
                    "resolution {} is shorter than two blocks",
                    resolution.suffix
                )));
            }
        }
        Ok(())
    }
}

impl std::str::FromStr for ChartsConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: ChartsConfig = toml::from_str(s).map_err(|source| ConfigError::Parse {
            path: "<inline>".into(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }
}
