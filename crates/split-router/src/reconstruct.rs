use alloy_primitives::U256;
use tracing::{debug, warn};

use crate::networks::{NetworkConfig, ProtocolVersion};
use crate::simulator::SplitOutcome;
use crate::types::{AmountFactor, CandidatePath, ExecutionRoute, RouteHop, SwapResult, PART_SCALE};

/// Share of `total` assigned to a path with weight `weight` out of `part_count`.
/// Rounds toward zero, the remainder stays unallocated.
pub fn allocate(total: U256, weight: U256, part_count: u32) -> U256 {
    if part_count == 0 {
        return U256::ZERO;
    }
    total.saturating_mul(weight) / U256::from(part_count)
}

/// Hop descriptors for one candidate path
pub fn build_route(network: &NetworkConfig, path: &CandidatePath, weight: U256, part_count: u32) -> ExecutionRoute {
    let last = path.len().saturating_sub(1);
    let hops = path
        .iter()
        .enumerate()
        .map(|(i, hop)| {
            let protocol = hop.protocol();
            let first = i == 0;

            let router = network.router_for(&hop.source_id, protocol);
            if router.is_zero() {
                warn!(
                    chain_id = network.chain_id,
                    source_id = %hop.source_id,
                    protocol = %protocol,
                    pool = %hop.pool,
                    "No router registered for liquidity source"
                );
            }

            RouteHop {
                router,
                pool: hop.pool,
                token_in: hop.src,
                token_out: hop.dest,
                from_user: first && protocol != ProtocolVersion::V3 && !network.is_wrapped_native(hop.src),
                to_user: i == last && !network.is_wrapped_native(hop.dest),
                part: if first { allocate(PART_SCALE, weight, part_count) } else { PART_SCALE },
                amount_factor: AmountFactor::from_fee(hop.fee),
                protocol,
                source_id: hop.source_id.clone(),
                path: hop.path.clone(),
            }
        })
        .collect();

    ExecutionRoute { hops }
}

/// Turn the split query outcome into the final route set.
///
/// Every path is built against its raw weight first, then entries with a zero
/// weight are dropped from all four parallel arrays at once. The result carries
/// no formatted output amount yet, see [`SwapResult::with_output_decimals`].
pub fn reconstruct(
    network: &NetworkConfig,
    paths: &[CandidatePath],
    outcome: &SplitOutcome,
    amount_in: U256,
    part_count: u32,
) -> SwapResult {
    if outcome.is_zero() {
        return SwapResult::no_liquidity(amount_in, part_count);
    }

    let routes: Vec<ExecutionRoute> = paths
        .iter()
        .zip(&outcome.distribution)
        .map(|(path, weight)| build_route(network, path, *weight, part_count))
        .collect();
    let amount_out_routes: Vec<U256> =
        outcome.distribution.iter().map(|w| allocate(outcome.amount_out, *w, part_count)).collect();
    let amount_in_parts: Vec<U256> =
        outcome.distribution.iter().map(|w| allocate(amount_in, *w, part_count)).collect();

    let mut result = SwapResult {
        amount_out_bn: outcome.amount_out,
        amount_in_bn: amount_in,
        part_count,
        ..Default::default()
    };

    for (((route, weight), out), inp) in routes
        .into_iter()
        .zip(&outcome.distribution)
        .zip(amount_out_routes)
        .zip(amount_in_parts)
    {
        if weight.is_zero() {
            continue;
        }
        result.routes.push(route);
        result.distributions.push(*weight);
        result.amount_out_routes.push(out);
        result.amount_in_parts.push(inp);
    }

    if result.routes.is_empty() {
        return SwapResult::no_liquidity(amount_in, part_count);
    }

    debug!(
        chain_id = network.chain_id,
        candidates = paths.len(),
        used = result.routes.len(),
        amount_out = %result.amount_out_bn,
        "Reconstructed split routes"
    );
    result
}
