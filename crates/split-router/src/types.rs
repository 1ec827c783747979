use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_with::{serde_as, DisplayFromStr};
use std::fmt;

use crate::error::SwapError;
use crate::networks::ProtocolVersion;
use crate::token::{to_token_amount, Token};

/// Fixed-point scale of [`RouteHop::part`], 1e18 means the whole balance
pub const PART_SCALE: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// A single swap request
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    /// Human readable input amount, e.g. "1.5"
    pub amount_in: String,
    pub src_token: Token,
    pub dst_token: Token,
    pub chain_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_part_count: Option<u32>,
    /// Liquidity source filter, falls back to the router configuration when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ids: Option<Vec<String>>,
    /// Protocol version filter, falls back to the router configuration when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_ids: Option<Vec<String>>,
}

impl SwapRequest {
    pub fn new(amount_in: impl Into<String>, src_token: Token, dst_token: Token, chain_id: u64) -> Self {
        Self {
            amount_in: amount_in.into(),
            src_token,
            dst_token,
            chain_id,
            force_part_count: None,
            source_ids: None,
            type_ids: None,
        }
    }

    pub fn with_part_count(mut self, parts: u32) -> Self {
        self.force_part_count = Some(parts);
        self
    }

    pub fn with_source_ids(mut self, source_ids: Vec<String>) -> Self {
        self.source_ids = Some(source_ids);
        self
    }

    pub fn with_type_ids(mut self, type_ids: Vec<String>) -> Self {
        self.type_ids = Some(type_ids);
        self
    }
}

/// One pool edge as returned by the path API
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathHop {
    pub src: Address,
    pub dest: Address,
    #[serde(deserialize_with = "string_or_number")]
    pub source_id: String,
    #[serde(deserialize_with = "string_or_number")]
    pub type_id: String,
    pub pool: Address,
    /// Pool fee in hundredths of a basis point (3000 = 0.3%)
    #[serde(default, deserialize_with = "fee_string_or_number")]
    pub fee: u32,
    /// Protocol specific routing metadata, passed through untouched
    #[serde(default)]
    pub path: Bytes,
}

impl PathHop {
    pub fn protocol(&self) -> ProtocolVersion {
        ProtocolVersion::from_type_id(&self.type_id)
    }
}

/// Ordered hops leading from the source to the destination token
pub type CandidatePath = Vec<PathHop>;

/// Path API payload: every hop considered plus the ranked valid paths
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSet {
    #[serde(default)]
    pub hops: Vec<PathHop>,
    #[serde(default, rename = "validPath")]
    pub valid_path: Vec<CandidatePath>,
}

impl PathSet {
    /// No hop or no complete path means there is no liquidity for the pair
    pub fn is_empty(&self) -> bool {
        self.hops.is_empty() || self.valid_path.iter().all(|path| path.is_empty())
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(u64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(text) => text,
        Id::Number(number) => number.to_string(),
    })
}

fn fee_string_or_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = string_or_number(deserializer)?;
    raw.trim()
        .parse::<u32>()
        .map_err(|_| serde::de::Error::custom(format!("invalid fee {raw:?}")))
}

/// Fee adjusted multiplier on a base of 10000, stored in hundredths so that
/// sub basis point fees keep full precision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct AmountFactor {
    hundredths: u64,
}

impl AmountFactor {
    pub const BASE: u64 = 10_000;

    /// `10000 - fee / 100`
    pub fn from_fee(fee: u32) -> Self {
        Self { hundredths: (Self::BASE * 100).saturating_sub(fee as u64) }
    }

    pub fn hundredths(&self) -> u64 {
        self.hundredths
    }

    pub fn as_f64(&self) -> f64 {
        self.hundredths as f64 / 100.0
    }
}

impl fmt::Display for AmountFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.hundredths / 100;
        let frac = self.hundredths % 100;
        match frac {
            0 => write!(f, "{whole}"),
            _ if frac % 10 == 0 => write!(f, "{whole}.{}", frac / 10),
            _ => write!(f, "{whole}.{frac:02}"),
        }
    }
}

impl Serialize for AmountFactor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Hop descriptor consumed by the transaction building layer
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteHop {
    pub router: Address,
    pub pool: Address,
    pub token_in: Address,
    pub token_out: Address,
    /// Input is pulled from the end user rather than the router balance
    pub from_user: bool,
    /// Output is delivered to the end user rather than kept by the router
    pub to_user: bool,
    /// Share of the available balance, scaled by [`PART_SCALE`]
    #[serde_as(as = "DisplayFromStr")]
    pub part: U256,
    pub amount_factor: AmountFactor,
    pub protocol: ProtocolVersion,
    pub source_id: String,
    pub path: Bytes,
}

impl RouteHop {
    /// False when the router table had no entry and the zero address was used
    pub fn has_known_router(&self) -> bool {
        self.router != Address::ZERO
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExecutionRoute {
    pub hops: Vec<RouteHop>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WrapKind {
    Wrap,
    Unwrap,
}

impl fmt::Display for WrapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WrapKind::Wrap => write!(f, "wrap"),
            WrapKind::Unwrap => write!(f, "unwrap"),
        }
    }
}

/// Route set for one request. Integer amounts serialize as decimal strings.
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapResult {
    pub routes: Vec<ExecutionRoute>,
    #[serde_as(as = "Vec<DisplayFromStr>")]
    pub distributions: Vec<U256>,
    #[serde_as(as = "Vec<DisplayFromStr>")]
    pub amount_out_routes: Vec<U256>,
    #[serde(rename = "amountOutBN")]
    #[serde_as(as = "DisplayFromStr")]
    pub amount_out_bn: U256,
    /// `amount_out_bn` formatted with the destination token decimals
    pub amount_out: String,
    #[serde_as(as = "Vec<DisplayFromStr>")]
    pub amount_in_parts: Vec<U256>,
    #[serde(rename = "amountInBN")]
    #[serde_as(as = "DisplayFromStr")]
    pub amount_in_bn: U256,
    pub part_count: u32,
    pub is_amount_out_error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_wrap: Option<WrapKind>,
}

impl SwapResult {
    /// Soft failure returned when no route could be produced
    pub fn no_liquidity(amount_in: U256, part_count: u32) -> Self {
        Self {
            amount_out: "0".to_string(),
            amount_in_bn: amount_in,
            part_count,
            is_amount_out_error: true,
            ..Default::default()
        }
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    pub fn with_output_decimals(mut self, decimals: u8) -> Self {
        self.amount_out = to_token_amount(self.amount_out_bn, decimals);
        self
    }
}

/// Reduced view of a route: output amount and how many paths it uses
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub amount_out: String,
    #[serde(rename = "amountOutBN")]
    #[serde_as(as = "DisplayFromStr")]
    pub amount_out_bn: U256,
    pub route_count: usize,
    pub is_amount_out_error: bool,
}

impl From<&SwapResult> for Quote {
    fn from(result: &SwapResult) -> Self {
        Self {
            amount_out: result.amount_out.clone(),
            amount_out_bn: result.amount_out_bn,
            route_count: result.route_count(),
            is_amount_out_error: result.is_amount_out_error,
        }
    }
}

/// Per request outcome of a batch fetch
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItem {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<SwapResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl From<Result<SwapResult, SwapError>> for BatchItem {
    fn from(result: Result<SwapResult, SwapError>) -> Self {
        match result {
            Ok(data) => Self { success: true, data: Some(data), error: None, code: None },
            Err(err) => Self {
                success: false,
                data: None,
                error: Some(err.to_string()),
                code: Some(err.code().to_string()),
            },
        }
    }
}
