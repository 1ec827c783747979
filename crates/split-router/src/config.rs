use eyre::{Result, WrapErr};
use std::time::Duration;

use crate::part_count::PartCountMode;

pub const DEFAULT_API_URL: &str = "https://api.splitrouter.io/v1";
pub const DEFAULT_API_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_PART_COUNT: u32 = 5;

/// Routing API connection settings
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub path_endpoint: String,
    pub min_amount_endpoint: String,
    /// Default `authen-key`, overridden by per call headers
    pub authen_key: Option<String>,
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            path_endpoint: "/path".to_string(),
            min_amount_endpoint: "/min-amount".to_string(),
            authen_key: None,
            timeout: DEFAULT_API_TIMEOUT,
        }
    }
}

/// Configuration for the split router
#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub api: ApiConfig,
    pub default_part_count: u32,
    pub part_count_mode: PartCountMode,
    /// Liquidity source filter applied when a request carries none
    pub source_ids: Vec<String>,
    /// Protocol version filter applied when a request carries none
    pub type_ids: Vec<String>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            default_part_count: DEFAULT_PART_COUNT,
            part_count_mode: PartCountMode::Offline,
            source_ids: Vec::new(),
            type_ids: Vec::new(),
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl RouterConfig {
    /// Create from environment variables, loading `.env` first if present
    pub fn from_env() -> Result<Self> {
        let _ = dotenv::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup, unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("SPLIT_ROUTER_API_URL") {
            config.api.base_url = url;
        }

        if let Some(key) = lookup("SPLIT_ROUTER_AUTHEN_KEY").filter(|k| !k.is_empty()) {
            config.api.authen_key = Some(key);
        }

        if let Some(timeout_str) = lookup("SPLIT_ROUTER_API_TIMEOUT_SECS") {
            let secs = timeout_str
                .parse::<u64>()
                .wrap_err_with(|| format!("invalid SPLIT_ROUTER_API_TIMEOUT_SECS {timeout_str:?}"))?;
            config.api.timeout = Duration::from_secs(secs);
        }

        if let Some(parts) = lookup("SPLIT_ROUTER_PART_COUNT") {
            let parsed = parts
                .parse::<u32>()
                .wrap_err_with(|| format!("invalid SPLIT_ROUTER_PART_COUNT {parts:?}"))?;
            if parsed == 0 {
                return Err(eyre::eyre!("SPLIT_ROUTER_PART_COUNT must be at least 1"));
            }
            config.default_part_count = parsed;
        }

        if let Some(mode) = lookup("SPLIT_ROUTER_PART_COUNT_MODE") {
            config.part_count_mode = mode.parse().map_err(|e: String| eyre::eyre!(e))?;
        }

        if let Some(ids) = lookup("SPLIT_ROUTER_SOURCE_IDS") {
            config.source_ids = split_list(&ids);
        }

        if let Some(ids) = lookup("SPLIT_ROUTER_TYPE_IDS") {
            config.type_ids = split_list(&ids);
        }

        Ok(config)
    }
}
