use std::time::Duration;
use thiserror::Error;

/// Message attached to every routing failure surfaced to callers
pub const ROUTE_FETCH_FAILED: &str = "failed to fetch swap route";

/// Failures talking to the remote routing API
#[derive(Debug, Error)]
pub enum RoutingApiError {
    #[error("request to {endpoint} timed out after {timeout:?}")]
    Timeout { endpoint: String, timeout: Duration },

    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} responded with status {status}: {body}")]
    Status { endpoint: String, status: u16, body: String },

    #[error("failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl RoutingApiError {
    pub fn endpoint(&self) -> &str {
        match self {
            Self::Timeout { endpoint, .. }
            | Self::Transport { endpoint, .. }
            | Self::Status { endpoint, .. }
            | Self::Decode { endpoint, .. } => endpoint,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Classify a reqwest failure, keeping timeouts distinguishable
    pub(crate) fn from_reqwest(endpoint: &str, timeout: Duration, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout { endpoint: endpoint.to_string(), timeout }
        } else {
            Self::Transport { endpoint: endpoint.to_string(), source: err }
        }
    }
}

/// Error taxonomy returned by the routing entry points
#[derive(Debug, Error)]
pub enum SwapError {
    #[error("invalid tokens: {0}")]
    InvalidTokens(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid part count {0}, must be at least 1")]
    InvalidPartCount(u32),

    #[error("network {0} is not supported")]
    NetworkNotSupported(u64),

    #[error("{message}: {source}")]
    Api {
        message: String,
        #[source]
        source: RoutingApiError,
    },

    /// Reserved for callers that want to turn a soft no-liquidity result into a hard error
    #[error("insufficient liquidity: {0}")]
    InsufficientLiquidity(String),
}

impl SwapError {
    pub fn api(source: RoutingApiError) -> Self {
        Self::Api { message: ROUTE_FETCH_FAILED.to_string(), source }
    }

    /// Stable machine-readable code for the error kind
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidTokens(_) => "INVALID_TOKENS",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::InvalidPartCount(_) => "INVALID_PART_COUNT",
            Self::NetworkNotSupported(_) => "NETWORK_NOT_SUPPORTED",
            Self::Api { .. } => "API_ERROR",
            Self::InsufficientLiquidity(_) => "INSUFFICIENT_LIQUIDITY",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(SwapError::InvalidTokens("same".into()).code(), "INVALID_TOKENS");
        assert_eq!(SwapError::NetworkNotSupported(1).code(), "NETWORK_NOT_SUPPORTED");

        let err = SwapError::api(RoutingApiError::Status {
            endpoint: "https://api.example/path".into(),
            status: 502,
            body: "bad gateway".into(),
        });
        assert_eq!(err.code(), "API_ERROR");
        assert!(err.to_string().starts_with(ROUTE_FETCH_FAILED));
        assert!(err.to_string().contains("https://api.example/path"));
    }

    #[test]
    fn test_timeout_is_flagged() {
        let err = RoutingApiError::Timeout {
            endpoint: "https://api.example/path".into(),
            timeout: Duration::from_secs(30),
        };
        assert!(err.is_timeout());
        assert_eq!(err.endpoint(), "https://api.example/path");
    }
}
