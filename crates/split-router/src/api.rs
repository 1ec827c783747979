use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, ClientBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::error::RoutingApiError;
use crate::types::PathSet;

/// Header carrying the routing API key
pub const AUTHEN_KEY_HEADER: &str = "authen-key";

/// Parameters of a path lookup, already in base units with native assets substituted
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathQuery {
    pub src: Address,
    pub dest: Address,
    pub amount: U256,
    pub type_ids: Vec<String>,
    pub source_ids: Vec<String>,
}

/// Per call overrides. Headers given here win over the configured defaults.
#[derive(Clone, Debug, Default)]
pub struct CallOptions {
    pub headers: HeaderMap,
}

impl CallOptions {
    pub fn with_authen_key(key: &str) -> Self {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(key) {
            headers.insert(AUTHEN_KEY_HEADER, value);
        }
        Self { headers }
    }
}

/// Minimum input, in base units, above which splitting a trade pays off
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinAmountEntry {
    pub chain_id: u64,
    pub address: String,
    pub min_amount: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MinAmountTable {
    pub entries: Vec<MinAmountEntry>,
}

impl MinAmountTable {
    /// Threshold for a token, `None` when missing or unparsable
    pub fn min_amount_for(&self, chain_id: u64, token: Address) -> Option<U256> {
        self.entries
            .iter()
            .filter(|entry| entry.chain_id == chain_id)
            .find(|entry| entry.address.trim().parse::<Address>().ok() == Some(token))
            .and_then(|entry| U256::from_str_radix(entry.min_amount.trim(), 10).ok())
    }
}

/// Remote routing data used by the aggregator
#[async_trait]
pub trait RoutingApi: Send + Sync {
    async fn get_paths(&self, query: &PathQuery, options: &CallOptions) -> Result<PathSet, RoutingApiError>;

    async fn get_min_amounts(&self, options: &CallOptions) -> Result<MinAmountTable, RoutingApiError>;
}

#[derive(Deserialize)]
struct ApiEnvelope<T> {
    data: T,
}

/// Serialize a list parameter the way the path API expects: `["1","2"]` with
/// only the quotes percent-encoded.
pub fn encode_array_param(values: &[String]) -> String {
    let items: Vec<String> = values
        .iter()
        .map(|value| format!("%22{}%22", value.replace('"', "%22")))
        .collect();
    format!("[{}]", items.join(","))
}

/// Build the path query string. Empty filters are omitted rather than sent as `[]`.
pub fn build_path_query(query: &PathQuery) -> String {
    let mut params = vec![
        format!("src={}", query.src),
        format!("dest={}", query.dest),
        format!("amount={}", query.amount),
    ];
    if !query.type_ids.is_empty() {
        params.push(format!("typeId={}", encode_array_param(&query.type_ids)));
    }
    if !query.source_ids.is_empty() {
        params.push(format!("sourceId={}", encode_array_param(&query.source_ids)));
    }
    params.join("&")
}

/// HTTP client for the path finding and minimum amount endpoints
#[derive(Debug, Clone)]
pub struct RoutingApiClient {
    client: Client,
    path_url: String,
    min_amount_url: String,
    authen_key: Option<String>,
    timeout: Duration,
}

impl RoutingApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, RoutingApiError> {
        let base = config.base_url.trim_end_matches('/');
        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RoutingApiError::Transport { endpoint: base.to_string(), source: e })?;

        debug!(
            base_url = %base,
            timeout_secs = config.timeout.as_secs(),
            authenticated = config.authen_key.is_some(),
            "Initialized routing API client"
        );

        Ok(Self {
            client,
            path_url: format!("{}/{}", base, config.path_endpoint.trim_start_matches('/')),
            min_amount_url: format!("{}/{}", base, config.min_amount_endpoint.trim_start_matches('/')),
            authen_key: config.authen_key.clone(),
            timeout: config.timeout,
        })
    }

    pub fn path_url(&self) -> &str {
        &self.path_url
    }

    pub fn min_amount_url(&self) -> &str {
        &self.min_amount_url
    }

    /// Headers for a call: explicit per call headers, then the configured key
    pub fn resolve_headers(&self, options: &CallOptions) -> HeaderMap {
        let mut headers = options.headers.clone();
        if !headers.contains_key(AUTHEN_KEY_HEADER) {
            if let Some(value) = self.authen_key.as_deref().and_then(|k| HeaderValue::from_str(k).ok()) {
                headers.insert(AUTHEN_KEY_HEADER, value);
            }
        }
        headers
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        url: &str,
        options: &CallOptions,
    ) -> Result<T, RoutingApiError> {
        let started = Instant::now();
        let response = self
            .client
            .get(url)
            .headers(self.resolve_headers(options))
            .send()
            .await
            .map_err(|e| RoutingApiError::from_reqwest(endpoint, self.timeout, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RoutingApiError::from_reqwest(endpoint, self.timeout, e))?;

        debug!(
            endpoint = %endpoint,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            body_len = body.len(),
            "Routing API responded"
        );

        if !status.is_success() {
            warn!(endpoint = %endpoint, status = status.as_u16(), "Routing API returned error status");
            return Err(RoutingApiError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str::<ApiEnvelope<T>>(&body)
            .map(|envelope| envelope.data)
            .map_err(|e| RoutingApiError::Decode { endpoint: endpoint.to_string(), source: e })
    }
}

#[async_trait]
impl RoutingApi for RoutingApiClient {
    async fn get_paths(&self, query: &PathQuery, options: &CallOptions) -> Result<PathSet, RoutingApiError> {
        let url = format!("{}?{}", self.path_url, build_path_query(query));
        let paths: PathSet = self.get_json(&self.path_url, &url, options).await?;
        debug!(
            src = %query.src,
            dest = %query.dest,
            hops = paths.hops.len(),
            paths = paths.valid_path.len(),
            "Fetched candidate paths"
        );
        Ok(paths)
    }

    async fn get_min_amounts(&self, options: &CallOptions) -> Result<MinAmountTable, RoutingApiError> {
        self.get_json(&self.min_amount_url, &self.min_amount_url, options).await
    }
}
