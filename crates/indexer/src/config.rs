use std::{path::PathBuf, time::Duration};

use common::{
    constants::{
        DEFAULT_CONFIG_PATH, DEFAULT_FETCH_DELAY_MS, DEFAULT_OUTPUT_DIR, DEFAULT_REFRESH_SECS,
        DEFAULT_RPC_TIMEOUT_SECS,
    },
    env::{get_env_var, parse_flag},
};

#[derive(Clone, Debug)]
pub struct Config {
    pub charts_config: PathBuf,
    pub output_dir: PathBuf,
    pub fetch_delay: Duration,
    pub rpc_timeout: Duration,
    pub daemon_localhost: bool,
    pub run_once: bool,
    pub interval: Duration,
}

impl Config {
    pub fn load() -> Self {
        Self::from_lookup(|key| get_env_var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parsed = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());
        let flag = |key: &str| lookup(key).is_some_and(|v| parse_flag(&v));
        let charts_config = lookup("CHARTS_CONFIG")
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.into())
            .into();
        let output_dir = lookup("CHARTS_OUTPUT_DIR")
            .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.into())
            .into();
        let fetch_delay = Duration::from_millis(
            parsed("CHARTS_FETCH_DELAY_MS").unwrap_or(DEFAULT_FETCH_DELAY_MS),
        );
        let rpc_timeout = parsed("CHARTS_RPC_TIMEOUT_SECS")
            .filter(|v| *v > 0)
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(DEFAULT_RPC_TIMEOUT_SECS));
        let interval = parsed("CHARTS_REFRESH_SECS")
            .filter(|v| *v > 0)
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(DEFAULT_REFRESH_SECS));
        Config {
            charts_config,
            output_dir,
            fetch_delay,
            rpc_timeout,
            daemon_localhost: flag("CHARTS_DAEMON_LOCALHOST"),
            run_once: flag("CHARTS_RUN_ONCE"),
            interval,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn unset_vars_fall_back_to_defaults() {
        let config = config(&[]);
        assert_eq!(config.charts_config, PathBuf::from("charts.toml"));
        assert_eq!(config.output_dir, PathBuf::from("charts_output"));
        assert_eq!(config.fetch_delay, Duration::from_millis(10));
        assert_eq!(config.rpc_timeout, Duration::from_secs(30));
        assert_eq!(config.interval, Duration::from_secs(600));
        assert!(!config.daemon_localhost);
        assert!(!config.run_once);
    }

    #[test]
    fn env_vars_override_defaults() {
        let config = config(&[
            ("CHARTS_CONFIG", "/etc/charts/pools.toml"),
            ("CHARTS_OUTPUT_DIR", "/var/www/charts"),
            ("CHARTS_FETCH_DELAY_MS", "0"),
            ("CHARTS_RPC_TIMEOUT_SECS", "5"),
            ("CHARTS_REFRESH_SECS", "nope"),
            ("CHARTS_DAEMON_LOCALHOST", "True"),
            ("CHARTS_RUN_ONCE", "1"),
        ]);
        assert_eq!(config.charts_config, PathBuf::from("/etc/charts/pools.toml"));
        assert_eq!(config.output_dir, PathBuf::from("/var/www/charts"));
        assert_eq!(config.fetch_delay, Duration::ZERO);
        assert_eq!(config.rpc_timeout, Duration::from_secs(5));
        assert_eq!(config.interval, Duration::from_secs(600));
        assert!(config.daemon_localhost);
        assert!(config.run_once);
    }
}
