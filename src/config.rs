use dotenv::dotenv;
use std::env;
use std::str::FromStr;

use crate::domain::services::orderbook::orderbook_worker::DEFAULT_CHANNEL_CAPACITY;

const APP_ID: &str = "APP_ID";
const LOG_LEVEL: &str = "LOG_LEVEL";
const ORDERBOOK_CHANNEL_CAPACITY: &str = "ORDERBOOK_CHANNEL_CAPACITY";
const DEPTH_LEVELS: &str = "DEPTH_LEVELS";

const DEFAULT_APP_ID: &str = "limit-orderbook";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_DEPTH_LEVELS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub app_id: String,
    pub log_level: String,
    pub channel_capacity: usize,
    pub depth_levels: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            app_id: DEFAULT_APP_ID.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            depth_levels: DEFAULT_DEPTH_LEVELS,
        }
    }
}

impl Config {
    pub fn from_env() -> Config {
        match Self::try_from_env() {
            Ok(config) => config,
            Err(err) => panic!("{}", err),
        }
    }

    pub fn try_from_env() -> Result<Config, String> {
        // Load .env file
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset keys fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Config, String> {
        let app_id = lookup(APP_ID).unwrap_or_else(|| DEFAULT_APP_ID.to_string());
        let log_level = lookup(LOG_LEVEL).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        let channel_capacity =
            parse_var(&lookup, ORDERBOOK_CHANNEL_CAPACITY)?.unwrap_or(DEFAULT_CHANNEL_CAPACITY);
        if channel_capacity == 0 {
            return Err(format!("{} must be greater than zero", ORDERBOOK_CHANNEL_CAPACITY));
        }

        let depth_levels = parse_var(&lookup, DEPTH_LEVELS)?.unwrap_or(DEFAULT_DEPTH_LEVELS);

        Ok(Config {
            app_id,
            log_level,
            channel_capacity,
            depth_levels,
        })
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, String> {
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|_| format!("failed to parse environment variable {}: {}", key, raw))
        })
        .transpose()
}
