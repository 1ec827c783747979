use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::api::{CallOptions, MinAmountTable, RoutingApi};
use crate::error::{RoutingApiError, SwapError};
use crate::metrics;
use crate::networks::NetworkConfig;

/// How the number of parts is chosen when the caller does not force one
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartCountMode {
    /// High value token list only
    #[default]
    Offline,
    /// Minimum amount data from the routing API, falling back to offline
    Online,
}

impl FromStr for PartCountMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "offline" => Ok(PartCountMode::Offline),
            "online" => Ok(PartCountMode::Online),
            other => Err(format!("unknown part count mode {other:?}, expected offline or online")),
        }
    }
}

impl fmt::Display for PartCountMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartCountMode::Offline => write!(f, "offline"),
            PartCountMode::Online => write!(f, "online"),
        }
    }
}

/// Cached minimum amount table. Readers share the cached copy, a single
/// refresh runs at a time, and nothing expires until [`MinAmountCache::clear`].
#[derive(Debug, Default)]
pub struct MinAmountCache {
    table: RwLock<Option<Arc<MinAmountTable>>>,
    refresh: Mutex<()>,
}

impl MinAmountCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_fetch(
        &self,
        api: &dyn RoutingApi,
        options: &CallOptions,
    ) -> Result<Arc<MinAmountTable>, RoutingApiError> {
        if let Some(table) = self.table.read().await.as_ref() {
            return Ok(table.clone());
        }

        let _refresh = self.refresh.lock().await;
        // Another task may have filled the cache while we waited
        if let Some(table) = self.table.read().await.as_ref() {
            return Ok(table.clone());
        }

        let table = Arc::new(api.get_min_amounts(options).await?);
        debug!(entries = table.entries.len(), "Cached minimum amount table");
        *self.table.write().await = Some(table.clone());
        Ok(table)
    }

    pub async fn clear(&self) {
        *self.table.write().await = None;
    }

    pub async fn is_populated(&self) -> bool {
        self.table.read().await.is_some()
    }
}

/// Inputs of a single part count decision
#[derive(Clone, Copy, Debug)]
pub struct PartCountQuery<'a> {
    pub network: &'a NetworkConfig,
    pub src: Address,
    pub dst: Address,
    pub amount_in: U256,
    pub force: Option<u32>,
}

/// Chooses how many parts a trade is split into
#[derive(Clone, Copy, Debug)]
pub struct PartCountSelector {
    default_part_count: u32,
    mode: PartCountMode,
}

impl PartCountSelector {
    pub fn new(default_part_count: u32, mode: PartCountMode) -> Result<Self, SwapError> {
        if default_part_count == 0 {
            return Err(SwapError::InvalidPartCount(default_part_count));
        }
        Ok(Self { default_part_count, mode })
    }

    pub fn default_part_count(&self) -> u32 {
        self.default_part_count
    }

    pub fn mode(&self) -> PartCountMode {
        self.mode
    }

    /// Split only when one side of the pair is a listed high value token
    pub fn offline(&self, network: &NetworkConfig, src: Address, dst: Address) -> u32 {
        if network.is_high_value(src) || network.is_high_value(dst) {
            self.default_part_count
        } else {
            1
        }
    }

    pub async fn select(
        &self,
        query: PartCountQuery<'_>,
        api: &dyn RoutingApi,
        cache: &MinAmountCache,
        options: &CallOptions,
    ) -> Result<u32, SwapError> {
        if let Some(forced) = query.force {
            if forced == 0 {
                return Err(SwapError::InvalidPartCount(forced));
            }
            return Ok(forced);
        }

        let offline = self.offline(query.network, query.src, query.dst);
        if self.mode == PartCountMode::Offline {
            return Ok(offline);
        }

        let table = match cache.get_or_fetch(api, options).await {
            Ok(table) => table,
            Err(e) => {
                metrics::record_api_error(e.endpoint(), e.is_timeout());
                warn!(error = %e, fallback = offline, "Minimum amount lookup failed, using offline part count");
                return Ok(offline);
            }
        };

        let token = query.network.lookup_address(query.src);
        match table.min_amount_for(query.network.chain_id, token) {
            Some(min_amount) => {
                let parts = if query.amount_in >= min_amount { self.default_part_count } else { 1 };
                debug!(
                    token = %token,
                    min_amount = %min_amount,
                    amount_in = %query.amount_in,
                    parts,
                    "Online part count"
                );
                Ok(parts)
            }
            None => Ok(offline),
        }
    }
}
