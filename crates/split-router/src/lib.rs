//! Split route aggregation for DEX swaps.
//!
//! A request is normalized, checked for the native wrap shortcut, assigned a
//! part count, matched against candidate paths from the routing API, and
//! simulated with the on-chain split query. The returned distribution is then
//! turned into per path execution routes and amount allocations.

pub mod api;
pub mod config;
pub mod encoder;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod networks;
pub mod part_count;
pub mod reconstruct;
pub mod router;
pub mod simulator;
pub mod token;
pub mod types;
pub mod wrap;

pub use api::{CallOptions, PathQuery, RoutingApi, RoutingApiClient};
pub use config::{ApiConfig, RouterConfig};
pub use error::{RoutingApiError, SwapError};
pub use networks::{NetworkConfig, NetworkRegistry, ProtocolVersion};
pub use part_count::{MinAmountCache, PartCountMode, PartCountSelector};
pub use router::{SplitRouter, SplitRouterBuilder};
pub use simulator::{RpcSplitQuery, SplitOutcome, SplitQuery};
pub use token::Token;
pub use types::{BatchItem, ExecutionRoute, Quote, RouteHop, SwapRequest, SwapResult, WrapKind};
