use alloy_primitives::{Address, Bytes, U256};

use crate::networks::{NetworkConfig, ProtocolVersion};
use crate::types::{AmountFactor, ExecutionRoute, RouteHop, SwapResult, WrapKind, PART_SCALE};

/// Recognize a pure native <-> wrapped native conversion
pub fn detect_wrap(network: &NetworkConfig, src: Address, dst: Address) -> Option<WrapKind> {
    if network.is_native(src) && network.is_wrapped_native(dst) {
        Some(WrapKind::Wrap)
    } else if network.is_wrapped_native(src) && network.is_native(dst) {
        Some(WrapKind::Unwrap)
    } else {
        None
    }
}

/// Synthetic 1:1 single hop result through the network router
pub fn wrap_result(
    network: &NetworkConfig,
    kind: WrapKind,
    src: Address,
    dst: Address,
    amount_in: U256,
    decimals: u8,
) -> SwapResult {
    let hop = RouteHop {
        router: network.router,
        pool: network.wrapped_native,
        token_in: src,
        token_out: dst,
        from_user: true,
        to_user: true,
        part: PART_SCALE,
        amount_factor: AmountFactor::from_fee(0),
        protocol: ProtocolVersion::V2,
        source_id: String::new(),
        path: Bytes::new(),
    };

    SwapResult {
        routes: vec![ExecutionRoute { hops: vec![hop] }],
        distributions: vec![U256::from(1)],
        amount_out_routes: vec![amount_in],
        amount_out_bn: amount_in,
        amount_out: String::new(),
        amount_in_parts: vec![amount_in],
        amount_in_bn: amount_in,
        part_count: 1,
        is_amount_out_error: false,
        is_wrap: Some(kind),
    }
    .with_output_decimals(decimals)
}
