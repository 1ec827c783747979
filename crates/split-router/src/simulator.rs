use alloy_network::Ethereum;
use alloy_primitives::{Bytes, TxKind, U256};
use alloy_provider::{Provider, RootProvider};
use alloy_rpc_types_eth::{TransactionInput, TransactionRequest};
use alloy_sol_types::SolCall;
use alloy_transport::TransportError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

use crate::encoder::getSplitRouteCall;
use crate::metrics;
use crate::networks::NetworkConfig;

/// Gas ceiling for the read-only split query
pub const SIMULATION_GAS_LIMIT: u64 = 50_000_000;

/// Optimal output and per path weights reported by the split query
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SplitOutcome {
    pub amount_out: U256,
    pub distribution: Vec<U256>,
}

impl SplitOutcome {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        self.amount_out.is_zero() || self.distribution.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("invalid rpc url {url:?} for chain {chain_id}")]
    InvalidRpcUrl { chain_id: u64, url: String },

    #[error("split query call failed: {0}")]
    Rpc(#[from] TransportError),

    #[error("failed to decode split query result: {0}")]
    Decode(#[from] alloy_sol_types::Error),

    #[error("split query reported {got} weights for {expected} paths")]
    DistributionMismatch { expected: usize, got: usize },

    #[error("split query weights add up to more than {parts} parts")]
    DistributionOverflow { parts: u32 },
}

/// Executes the on-chain split query
#[async_trait]
pub trait SplitQuery: Send + Sync {
    async fn query_split(
        &self,
        network: &NetworkConfig,
        amount_in: U256,
        routes: Bytes,
        parts: u32,
    ) -> Result<SplitOutcome, SimulationError>;
}

/// `eth_call` based split query with one HTTP provider per chain, built on first use
#[derive(Default)]
pub struct RpcSplitQuery {
    providers: Mutex<HashMap<u64, RootProvider<Ethereum>>>,
}

impl RpcSplitQuery {
    pub fn new() -> Self {
        Self::default()
    }

    fn provider_for(&self, network: &NetworkConfig) -> Result<RootProvider<Ethereum>, SimulationError> {
        let mut providers = self.providers.lock();
        if let Some(provider) = providers.get(&network.chain_id) {
            return Ok(provider.clone());
        }

        let url = network.rpc_url.parse::<url::Url>().map_err(|_| SimulationError::InvalidRpcUrl {
            chain_id: network.chain_id,
            url: network.rpc_url.clone(),
        })?;
        let provider = RootProvider::<Ethereum>::new_http(url);
        debug!(chain_id = network.chain_id, rpc_url = %network.rpc_url, "Created split query provider");

        providers.insert(network.chain_id, provider.clone());
        Ok(provider)
    }
}

#[async_trait]
impl SplitQuery for RpcSplitQuery {
    async fn query_split(
        &self,
        network: &NetworkConfig,
        amount_in: U256,
        routes: Bytes,
        parts: u32,
    ) -> Result<SplitOutcome, SimulationError> {
        let provider = self.provider_for(network)?;

        let call = getSplitRouteCall { amountIn: amount_in, routes, parts: U256::from(parts) };
        let tx = TransactionRequest {
            to: Some(TxKind::Call(network.split_query)),
            input: TransactionInput::new(call.abi_encode().into()),
            gas: Some(SIMULATION_GAS_LIMIT),
            ..Default::default()
        };

        let output = provider.call(tx).await?;
        let decoded = getSplitRouteCall::abi_decode_returns(&output)?;

        Ok(SplitOutcome {
            amount_out: decoded.route.amountOut,
            distribution: decoded.route.distribution,
        })
    }
}

/// Run the split query, degrading every failure into a zero outcome.
///
/// A distribution whose length differs from `path_count` cannot be mapped back
/// onto the candidate paths and is discarded too, as is one whose weights add up
/// to more than `parts`.
pub async fn simulate_split(
    query: &dyn SplitQuery,
    network: &NetworkConfig,
    amount_in: U256,
    routes: Bytes,
    parts: u32,
    path_count: usize,
) -> SplitOutcome {
    let outcome = query
        .query_split(network, amount_in, routes, parts)
        .await
        .and_then(|outcome| {
            if outcome.distribution.len() != path_count && !outcome.distribution.is_empty() {
                return Err(SimulationError::DistributionMismatch {
                    expected: path_count,
                    got: outcome.distribution.len(),
                });
            }
            let total = outcome.distribution.iter().try_fold(U256::ZERO, |acc, w| acc.checked_add(*w));
            if !total.is_some_and(|total| total <= U256::from(parts)) {
                return Err(SimulationError::DistributionOverflow { parts });
            }
            Ok(outcome)
        });

    match outcome {
        Ok(outcome) => {
            debug!(
                chain_id = network.chain_id,
                amount_out = %outcome.amount_out,
                distribution = ?outcome.distribution,
                parts,
                "Split query succeeded"
            );
            outcome
        }
        Err(e) => {
            warn!(chain_id = network.chain_id, error = %e, "Split query failed, treating as no route");
            metrics::record_simulation_failure(network.chain_id);
            SplitOutcome::zero()
        }
    }
}
