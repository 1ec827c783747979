use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::SwapError;

pub const BOTANIX_MAINNET_CHAIN_ID: u64 = 3637;
pub const BOTANIX_TESTNET_CHAIN_ID: u64 = 3636;

/// Placeholder used by the routing API and wallets for the chain's native asset
pub const NATIVE_PLACEHOLDER: Address = address!("eeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee");

/// Pool interface a hop is executed against
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProtocolVersion {
    V2,
    V3,
}

impl ProtocolVersion {
    /// Map a routing API `typeId` onto a pool interface. Only `2` is concentrated
    /// liquidity; every other id is driven through the V2 interface.
    pub fn from_type_id(type_id: &str) -> Self {
        match type_id.trim() {
            "2" => ProtocolVersion::V3,
            _ => ProtocolVersion::V2,
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolVersion::V2 => write!(f, "V2"),
            ProtocolVersion::V3 => write!(f, "V3"),
        }
    }
}

/// One row of the `(sourceId, protocol) -> router` table
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterEntry {
    pub source_id: String,
    pub protocol: ProtocolVersion,
    pub router: Address,
}

/// Static per-chain deployment data
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    pub chain_id: u64,
    pub name: String,
    pub rpc_url: String,
    /// Aggregation router that executes the reconstructed routes
    pub router: Address,
    /// Contract exposing the read-only split query
    pub split_query: Address,
    pub native: Address,
    pub wrapped_native: Address,
    #[serde(default)]
    pub high_value_tokens: Vec<Address>,
    #[serde(default)]
    pub routers: Vec<RouterEntry>,
    #[serde(default)]
    pub default_source_ids: Vec<String>,
    #[serde(default)]
    pub default_type_ids: Vec<String>,
}

impl NetworkConfig {
    pub fn botanix_mainnet() -> Self {
        Self {
            chain_id: BOTANIX_MAINNET_CHAIN_ID,
            name: "botanix".to_string(),
            rpc_url: "https://rpc.botanixlabs.com".to_string(),
            router: address!("35c6905c917d329668b2c8e771ca1789f28bf014"),
            split_query: address!("788a23b977f064ca3481605f2521d168bece8604"),
            native: NATIVE_PLACEHOLDER,
            wrapped_native: address!("0d2437f93fed6ea64ef01ccde385fb1263910c56"),
            high_value_tokens: vec![
                NATIVE_PLACEHOLDER,
                // pBTC
                address!("0d2437f93fed6ea64ef01ccde385fb1263910c56"),
                // USDC.e
                address!("29ee6138dd4c9815f46d34a4a1ed48f46758a402"),
                // USDT
                address!("aac057d5031aa1de22f3317557109df25b4b4dd0"),
                // WBTC
                address!("c9da92ad2b5dd133d55c8030e551666668d16dc7"),
            ],
            routers: vec![
                RouterEntry {
                    source_id: "1".to_string(),
                    protocol: ProtocolVersion::V2,
                    router: address!("cd01074602ae9b08104fb4cbcc358023d051d856"),
                },
                RouterEntry {
                    source_id: "1".to_string(),
                    protocol: ProtocolVersion::V3,
                    router: address!("bba718aa2d329b4993f4eb720a916460d26d5529"),
                },
                RouterEntry {
                    source_id: "2".to_string(),
                    protocol: ProtocolVersion::V2,
                    router: address!("47ab4ca7e285067599027de3bc748723d0bc5799"),
                },
            ],
            default_source_ids: vec!["1".to_string(), "2".to_string()],
            default_type_ids: vec!["1".to_string(), "2".to_string()],
        }
    }

    pub fn botanix_testnet() -> Self {
        Self {
            chain_id: BOTANIX_TESTNET_CHAIN_ID,
            name: "botanix-testnet".to_string(),
            rpc_url: "https://node.botanixlabs.dev".to_string(),
            router: address!("42febd5212901fea2052c57109803ce3382297df"),
            split_query: address!("41ce50f8b268098f15d0cdf3d62977bfd91063b1"),
            native: NATIVE_PLACEHOLDER,
            wrapped_native: address!("10111175aa254dc342bd5eae1fc923f3d55e8a80"),
            high_value_tokens: vec![
                NATIVE_PLACEHOLDER,
                address!("10111175aa254dc342bd5eae1fc923f3d55e8a80"),
                address!("f9982a4e64b8c81b795eb026c375b2d8f21ef680"),
            ],
            routers: vec![
                RouterEntry {
                    source_id: "1".to_string(),
                    protocol: ProtocolVersion::V2,
                    router: address!("7d84d4f456090d85aa06d55d6314df829f8a0163"),
                },
                RouterEntry {
                    source_id: "1".to_string(),
                    protocol: ProtocolVersion::V3,
                    router: address!("8817946860207c6f004a39881cc384ba667104ca"),
                },
            ],
            default_source_ids: vec!["1".to_string()],
            default_type_ids: vec!["1".to_string(), "2".to_string()],
        }
    }

    pub fn is_native(&self, token: Address) -> bool {
        token == self.native
    }

    pub fn is_wrapped_native(&self, token: Address) -> bool {
        token == self.wrapped_native
    }

    /// Address used when asking for liquidity: the native asset has no pools,
    /// so it is looked up through its wrapped token.
    pub fn lookup_address(&self, token: Address) -> Address {
        if self.is_native(token) {
            self.wrapped_native
        } else {
            token
        }
    }

    pub fn is_high_value(&self, token: Address) -> bool {
        let lookup = self.lookup_address(token);
        self.high_value_tokens.iter().any(|t| *t == token || *t == lookup)
    }

    /// Router for a liquidity source, or `Address::ZERO` when the pair is unknown
    pub fn router_for(&self, source_id: &str, protocol: ProtocolVersion) -> Address {
        self.routers
            .iter()
            .find(|entry| entry.source_id == source_id.trim() && entry.protocol == protocol)
            .map(|entry| entry.router)
            .unwrap_or(Address::ZERO)
    }
}

/// Chain id keyed lookup of network deployments
#[derive(Clone, Debug)]
pub struct NetworkRegistry {
    networks: HashMap<u64, NetworkConfig>,
}

impl Default for NetworkRegistry {
    fn default() -> Self {
        Self::empty()
            .with_network(NetworkConfig::botanix_mainnet())
            .with_network(NetworkConfig::botanix_testnet())
    }
}

impl NetworkRegistry {
    pub fn empty() -> Self {
        Self { networks: HashMap::new() }
    }

    pub fn with_network(mut self, network: NetworkConfig) -> Self {
        self.insert(network);
        self
    }

    pub fn insert(&mut self, network: NetworkConfig) {
        self.networks.insert(network.chain_id, network);
    }

    /// Load a registry from a JSON array of network configs
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let networks: Vec<NetworkConfig> = serde_json::from_str(json)?;
        Ok(networks.into_iter().fold(Self::empty(), Self::with_network))
    }

    pub fn get(&self, chain_id: u64) -> Result<&NetworkConfig, SwapError> {
        self.networks
            .get(&chain_id)
            .ok_or(SwapError::NetworkNotSupported(chain_id))
    }

    pub fn chain_ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.networks.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
