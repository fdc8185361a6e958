// protocol: block-time target switches at the hard-fork height
pub const HARDFORK_HEIGHT: u64 = 1_009_827;
pub const BLOCK_TIME_BEFORE_FORK: u64 = 60;
pub const BLOCK_TIME_AFTER_FORK: u64 = 120;

// resolutions (target cycle duration in seconds)
pub const DAILY_SUFFIX: &str = "1d";
pub const DAILY_CYCLE_SECS: u64 = 24 * 60 * 60;
pub const HOURLY_SUFFIX: &str = "1h";
pub const HOURLY_CYCLE_SECS: u64 = 60 * 60;

// runtime defaults
pub const DEFAULT_CONFIG_PATH: &str = "charts.toml";
pub const DEFAULT_OUTPUT_DIR: &str = "charts_output";
pub const DEFAULT_FETCH_DELAY_MS: u64 = 10; // don't hammer the daemon
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_REFRESH_SECS: u64 = 600;
