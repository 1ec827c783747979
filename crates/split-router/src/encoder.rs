use alloy_primitives::{Bytes, U256};
use alloy_sol_types::{sol, SolValue};
use thiserror::Error;

use crate::types::{CandidatePath, PathHop};

// Split query interface
sol! {
    struct SplitHop {
        address src;
        address dest;
        uint256 typeId;
        uint256 sourceId;
        bytes path;
    }

    struct SplitRoute {
        uint256 amountOut;
        uint256[] distribution;
    }

    function getSplitRoute(
        uint256 amountIn,
        bytes calldata routes,
        uint256 parts
    ) external view returns (bool valid, SplitRoute memory route);
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("no candidate paths to encode")]
    EmptyPathSet,

    #[error("typeId {0:?} is not an unsigned integer")]
    InvalidTypeId(String),

    #[error("sourceId {0:?} is not an unsigned integer")]
    InvalidSourceId(String),
}

fn parse_id(raw: &str) -> Option<U256> {
    U256::from_str_radix(raw.trim(), 10).ok()
}

fn to_split_hop(hop: &PathHop) -> Result<SplitHop, EncodeError> {
    let type_id = parse_id(&hop.type_id).ok_or_else(|| EncodeError::InvalidTypeId(hop.type_id.clone()))?;
    let source_id =
        parse_id(&hop.source_id).ok_or_else(|| EncodeError::InvalidSourceId(hop.source_id.clone()))?;

    Ok(SplitHop {
        src: hop.src,
        dest: hop.dest,
        typeId: type_id,
        sourceId: source_id,
        path: hop.path.clone(),
    })
}

/// ABI encode the candidate paths as `SplitHop[][]`, one inner array per path,
/// in the order the split query reports its distribution.
pub fn encode_routes(paths: &[CandidatePath]) -> Result<Bytes, EncodeError> {
    if paths.is_empty() {
        return Err(EncodeError::EmptyPathSet);
    }

    let routes = paths
        .iter()
        .map(|path| path.iter().map(to_split_hop).collect::<Result<Vec<_>, _>>())
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Bytes::from(routes.abi_encode()))
}
