use alloy_primitives::U256;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::api::{CallOptions, PathQuery, RoutingApi, RoutingApiClient};
use crate::config::RouterConfig;
use crate::encoder::encode_routes;
use crate::error::SwapError;
use crate::metrics;
use crate::networks::{NetworkConfig, NetworkRegistry};
use crate::part_count::{MinAmountCache, PartCountQuery, PartCountSelector};
use crate::reconstruct::reconstruct;
use crate::simulator::{simulate_split, RpcSplitQuery, SplitQuery};
use crate::token::{from_token_amount, validate_pair, Token};
use crate::types::{BatchItem, CandidatePath, Quote, SwapRequest, SwapResult};
use crate::wrap::{detect_wrap, wrap_result};

/// Route aggregation entry points.
///
/// Owns its routing API client, split query backend and minimum amount cache,
/// so independent routers never share state.
pub struct SplitRouter {
    config: RouterConfig,
    networks: NetworkRegistry,
    api: Arc<dyn RoutingApi>,
    split_query: Arc<dyn SplitQuery>,
    selector: PartCountSelector,
    min_amounts: MinAmountCache,
}

pub struct SplitRouterBuilder {
    config: RouterConfig,
    networks: Option<NetworkRegistry>,
    api: Option<Arc<dyn RoutingApi>>,
    split_query: Option<Arc<dyn SplitQuery>>,
}

impl SplitRouterBuilder {
    pub fn networks(mut self, networks: NetworkRegistry) -> Self {
        self.networks = Some(networks);
        self
    }

    pub fn routing_api(mut self, api: Arc<dyn RoutingApi>) -> Self {
        self.api = Some(api);
        self
    }

    pub fn split_query(mut self, split_query: Arc<dyn SplitQuery>) -> Self {
        self.split_query = Some(split_query);
        self
    }

    pub fn build(self) -> eyre::Result<SplitRouter> {
        let selector = PartCountSelector::new(self.config.default_part_count, self.config.part_count_mode)?;

        let api: Arc<dyn RoutingApi> = match self.api {
            Some(api) => api,
            None => Arc::new(RoutingApiClient::new(&self.config.api)?),
        };
        let split_query = self.split_query.unwrap_or_else(|| Arc::new(RpcSplitQuery::new()));
        let networks = self.networks.unwrap_or_default();

        info!(
            chains = ?networks.chain_ids(),
            default_part_count = selector.default_part_count(),
            part_count_mode = %selector.mode(),
            "Split router ready"
        );

        Ok(SplitRouter {
            config: self.config,
            networks,
            api,
            split_query,
            selector,
            min_amounts: MinAmountCache::new(),
        })
    }
}

impl SplitRouter {
    pub fn builder(config: RouterConfig) -> SplitRouterBuilder {
        SplitRouterBuilder { config, networks: None, api: None, split_query: None }
    }

    /// Router with the HTTP routing client, RPC split query and built-in networks
    pub fn new(config: RouterConfig) -> eyre::Result<Self> {
        Self::builder(config).build()
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn networks(&self) -> &NetworkRegistry {
        &self.networks
    }

    /// Best split route for a single request
    pub async fn get_swap_route(&self, request: &SwapRequest, options: &CallOptions) -> Result<SwapResult, SwapError> {
        let started = Instant::now();
        let result = self.route(request, options).await;

        let outcome = match &result {
            Ok(r) if r.is_wrap.is_some() => "wrap",
            Ok(r) if r.is_amount_out_error => "no_liquidity",
            Ok(_) => "ok",
            Err(e) => e.code(),
        };
        metrics::record_request(request.chain_id, outcome, started.elapsed());

        if let Err(e) = &result {
            warn!(chain_id = request.chain_id, code = e.code(), error = %e, "Swap route request failed");
        }
        result
    }

    /// Route every request concurrently with the same call options. Failures are reported per item.
    pub async fn get_swap_routes(&self, requests: &[SwapRequest], options: &CallOptions) -> Vec<BatchItem> {
        let results = join_all(requests.iter().map(|request| self.get_swap_route(request, options))).await;

        let items: Vec<BatchItem> = results.into_iter().map(BatchItem::from).collect();
        debug!(
            requests = items.len(),
            failed = items.iter().filter(|item| !item.success).count(),
            "Batch route fetch finished"
        );
        items
    }

    pub async fn get_quote(&self, request: &SwapRequest, options: &CallOptions) -> Result<Quote, SwapError> {
        self.get_swap_route(request, options).await.map(|result| Quote::from(&result))
    }

    /// Route with the liquidity source and protocol filters of the chain's defaults
    pub async fn get_swap_route_for_chain(
        &self,
        src_token: Token,
        dst_token: Token,
        amount_in: &str,
        chain_id: u64,
    ) -> Result<SwapResult, SwapError> {
        let mut request = SwapRequest::new(amount_in, src_token, dst_token, chain_id);
        // Unknown chains are rejected by the regular pipeline, after token and amount checks
        if let Ok(network) = self.networks.get(chain_id) {
            request = request
                .with_source_ids(network.default_source_ids.clone())
                .with_type_ids(network.default_type_ids.clone());
        }
        self.get_swap_route(&request, &CallOptions::default()).await
    }

    pub async fn clear_min_amount_cache(&self) {
        self.min_amounts.clear().await;
        debug!("Cleared minimum amount cache");
    }

    async fn route(&self, request: &SwapRequest, options: &CallOptions) -> Result<SwapResult, SwapError> {
        let (src, dst) = validate_pair(&request.src_token, &request.dst_token)?;
        let amount_in = from_token_amount(&request.amount_in, request.src_token.decimals)?;
        let network = self.networks.get(request.chain_id)?;
        let out_decimals = request.dst_token.decimals;

        if let Some(kind) = detect_wrap(network, src, dst) {
            info!(chain_id = network.chain_id, kind = %kind, amount_in = %amount_in, "Native wrap shortcut");
            metrics::record_wrap(network.chain_id, &kind.to_string());
            return Ok(wrap_result(network, kind, src, dst, amount_in, out_decimals));
        }

        let part_count = self
            .selector
            .select(
                PartCountQuery { network, src, dst, amount_in, force: request.force_part_count },
                self.api.as_ref(),
                &self.min_amounts,
                options,
            )
            .await?;

        let query = PathQuery {
            src: network.lookup_address(src),
            dest: network.lookup_address(dst),
            amount: amount_in,
            type_ids: request.type_ids.clone().unwrap_or_else(|| self.config.type_ids.clone()),
            source_ids: request.source_ids.clone().unwrap_or_else(|| self.config.source_ids.clone()),
        };

        let paths = self.api.get_paths(&query, options).await.map_err(|e| {
            metrics::record_api_error(e.endpoint(), e.is_timeout());
            SwapError::api(e)
        })?;

        if paths.is_empty() {
            info!(chain_id = network.chain_id, src = %query.src, dest = %query.dest, "No liquidity for pair");
            return Ok(no_liquidity(network, amount_in, part_count, out_decimals));
        }

        let candidates: Vec<CandidatePath> = paths.valid_path.into_iter().filter(|path| !path.is_empty()).collect();
        let encoded = match encode_routes(&candidates) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!(chain_id = network.chain_id, error = %e, "Could not encode candidate paths");
                return Ok(no_liquidity(network, amount_in, part_count, out_decimals));
            }
        };

        debug!(
            chain_id = network.chain_id,
            candidates = candidates.len(),
            part_count,
            amount_in = %amount_in,
            "Simulating split"
        );
        let outcome =
            simulate_split(self.split_query.as_ref(), network, amount_in, encoded, part_count, candidates.len())
                .await;

        let result = reconstruct(network, &candidates, &outcome, amount_in, part_count);
        if result.is_amount_out_error {
            metrics::record_no_liquidity(network.chain_id);
        }
        Ok(result.with_output_decimals(out_decimals))
    }
}

fn no_liquidity(network: &NetworkConfig, amount_in: U256, part_count: u32, decimals: u8) -> SwapResult {
    metrics::record_no_liquidity(network.chain_id);
    SwapResult::no_liquidity(amount_in, part_count).with_output_decimals(decimals)
}
