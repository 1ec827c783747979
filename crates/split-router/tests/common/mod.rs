#![allow(dead_code)]

use alloy_primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use parking_lot::Mutex;
use split_router::api::{MinAmountTable, PathQuery, AUTHEN_KEY_HEADER};
use split_router::networks::{NetworkConfig, BOTANIX_MAINNET_CHAIN_ID, NATIVE_PLACEHOLDER};
use split_router::simulator::SimulationError;
use split_router::types::{PathHop, PathSet};
use split_router::{
    CallOptions, RouterConfig, RoutingApi, RoutingApiError, SplitOutcome, SplitQuery, SplitRouter, Token,
};
use std::sync::Arc;

pub const USDC_E: &str = "0x29ee6138dd4c9815f46d34a4a1ed48f46758a402";
pub const MID_TOKEN: Address = Address::repeat_byte(0x5a);

pub enum PathReply {
    Paths(PathSet),
    Unavailable,
}

/// Routing API returning canned paths and recording every query with its `authen-key`
pub struct StubRoutingApi {
    reply: PathReply,
    pub queries: Mutex<Vec<PathQuery>>,
    pub authen_keys: Mutex<Vec<Option<String>>>,
}

impl StubRoutingApi {
    pub fn with_paths(paths: PathSet) -> Arc<Self> {
        Arc::new(Self {
            reply: PathReply::Paths(paths),
            queries: Mutex::new(Vec::new()),
            authen_keys: Mutex::new(Vec::new()),
        })
    }

    pub fn unavailable() -> Arc<Self> {
        Arc::new(Self {
            reply: PathReply::Unavailable,
            queries: Mutex::new(Vec::new()),
            authen_keys: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl RoutingApi for StubRoutingApi {
    async fn get_paths(&self, query: &PathQuery, options: &CallOptions) -> Result<PathSet, RoutingApiError> {
        self.queries.lock().push(query.clone());
        let key = options.headers.get(AUTHEN_KEY_HEADER).and_then(|v| v.to_str().ok()).map(str::to_string);
        self.authen_keys.lock().push(key);
        match &self.reply {
            PathReply::Paths(paths) => Ok(paths.clone()),
            PathReply::Unavailable => Err(RoutingApiError::Status {
                endpoint: "stub/path".to_string(),
                status: 500,
                body: "internal error".to_string(),
            }),
        }
    }

    async fn get_min_amounts(&self, _: &CallOptions) -> Result<MinAmountTable, RoutingApiError> {
        Ok(MinAmountTable::default())
    }
}

/// Split query returning a fixed outcome, or reverting when none is set
pub struct StubSplitQuery {
    outcome: Option<SplitOutcome>,
    pub calls: Mutex<Vec<(U256, u32)>>,
}

impl StubSplitQuery {
    pub fn returning(amount_out: u128, distribution: &[u64]) -> Arc<Self> {
        Arc::new(Self {
            outcome: Some(SplitOutcome {
                amount_out: U256::from(amount_out),
                distribution: distribution.iter().map(|w| U256::from(*w)).collect(),
            }),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn reverting() -> Arc<Self> {
        Arc::new(Self { outcome: None, calls: Mutex::new(Vec::new()) })
    }
}

#[async_trait]
impl SplitQuery for StubSplitQuery {
    async fn query_split(
        &self,
        _: &NetworkConfig,
        amount_in: U256,
        _: Bytes,
        parts: u32,
    ) -> Result<SplitOutcome, SimulationError> {
        self.calls.lock().push((amount_in, parts));
        self.outcome
            .clone()
            .ok_or_else(|| SimulationError::Decode(alloy_sol_types::Error::Other("execution reverted".into())))
    }
}

pub fn router(api: Arc<StubRoutingApi>, query: Arc<StubSplitQuery>) -> SplitRouter {
    SplitRouter::builder(RouterConfig::default())
        .routing_api(api)
        .split_query(query)
        .build()
        .unwrap()
}

pub fn native_btc() -> Token {
    Token::new(NATIVE_PLACEHOLDER.to_string(), "BTC", "Bitcoin", 18, BOTANIX_MAINNET_CHAIN_ID)
}

pub fn wrapped_btc() -> Token {
    let wrapped = NetworkConfig::botanix_mainnet().wrapped_native;
    Token::new(wrapped.to_string(), "pBTC", "Pegged BTC", 18, BOTANIX_MAINNET_CHAIN_ID)
}

pub fn usdc_e() -> Token {
    Token::new(USDC_E, "USDC.e", "Bridged USDC", 6, BOTANIX_MAINNET_CHAIN_ID)
}

pub fn hop(src: Address, dest: Address, source_id: &str, type_id: &str, fee: u32) -> PathHop {
    PathHop {
        src,
        dest,
        source_id: source_id.to_string(),
        type_id: type_id.to_string(),
        pool: Address::repeat_byte(fee as u8),
        fee,
        path: Bytes::new(),
    }
}

/// Two candidates from wrapped BTC to USDC.e: a direct V3 pool and a two hop V2 route
pub fn btc_usdc_paths() -> PathSet {
    let wrapped = NetworkConfig::botanix_mainnet().wrapped_native;
    let usdc: Address = USDC_E.parse().unwrap();

    let direct = vec![hop(wrapped, usdc, "1", "2", 500)];
    let via_mid = vec![hop(wrapped, MID_TOKEN, "1", "1", 3000), hop(MID_TOKEN, usdc, "2", "1", 2500)];

    PathSet {
        hops: direct.iter().chain(via_mid.iter()).cloned().collect(),
        valid_path: vec![direct, via_mid],
    }
}
