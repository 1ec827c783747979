mod common;

use alloy_primitives::{Address, U256};
use common::*;
use split_router::api::PathQuery;
use split_router::networks::BOTANIX_MAINNET_CHAIN_ID;
use split_router::{
    ApiConfig, CallOptions, PartCountMode, RouterConfig, RoutingApi, RoutingApiClient, RoutingApiError, SplitRouter,
    SwapRequest, Token,
};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

fn http_response(status: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    )
}

/// Answer one connection per canned response, in order, after `delay`.
/// Resolves to the raw request heads that were received.
async fn serve(responses: Vec<String>, delay: Duration) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let mut requests = Vec::new();
        for response in responses {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 16 * 1024];
            let mut read = 0;
            loop {
                let n = socket.read(&mut buf[read..]).await.unwrap_or(0);
                if n == 0 {
                    break;
                }
                read += n;
                if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            requests.push(String::from_utf8_lossy(&buf[..read]).to_string());

            tokio::time::sleep(delay).await;
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
        requests
    });

    (format!("http://{addr}/v1"), handle)
}

fn client(base_url: &str, timeout: Duration) -> RoutingApiClient {
    RoutingApiClient::new(&ApiConfig { base_url: base_url.to_string(), timeout, ..ApiConfig::default() }).unwrap()
}

fn path_query() -> PathQuery {
    PathQuery {
        src: "0x0d2437f93fed6ea64ef01ccde385fb1263910c56".parse().unwrap(),
        dest: USDC_E.parse().unwrap(),
        amount: U256::from(1_500_000_000_000_000_000u128),
        type_ids: vec!["1".to_string(), "2".to_string()],
        source_ids: vec![],
    }
}

const PATH_BODY: &str = r#"{"data": {
    "hops": [
        {"src": "0x0d2437f93fed6ea64ef01ccde385fb1263910c56", "dest": "0x29ee6138dd4c9815f46d34a4a1ed48f46758a402",
         "sourceId": 1, "typeId": "2", "pool": "0x1111111111111111111111111111111111111111", "fee": 500, "path": "0x"}
    ],
    "validPath": [[
        {"src": "0x0d2437f93fed6ea64ef01ccde385fb1263910c56", "dest": "0x29ee6138dd4c9815f46d34a4a1ed48f46758a402",
         "sourceId": 1, "typeId": "2", "pool": "0x1111111111111111111111111111111111111111", "fee": 500, "path": "0x"}
    ]]
}}"#;

#[tokio::test]
async fn test_path_request_wire_format() {
    let (base, server) = serve(vec![http_response("200 OK", PATH_BODY)], Duration::ZERO).await;

    let paths = client(&base, Duration::from_secs(5))
        .get_paths(&path_query(), &CallOptions::with_authen_key("secret-key"))
        .await
        .unwrap();

    assert_eq!(paths.hops.len(), 1);
    assert_eq!(paths.valid_path.len(), 1);
    assert_eq!(paths.valid_path[0][0].source_id, "1");
    assert_eq!(paths.valid_path[0][0].fee, 500);

    let requests = server.await.unwrap();
    let request = requests[0].to_ascii_lowercase();
    assert!(request.starts_with("get /v1/path?src=0x0d2437f93fed6ea64ef01ccde385fb1263910c56&dest="));
    assert!(request.contains("&amount=1500000000000000000"));
    assert!(request.contains("&typeid=[%221%22,%222%22]"));
    assert!(!request.contains("sourceid"));
    assert!(request.contains("authen-key: secret-key"));
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let (base, server) = serve(vec![http_response("500 Internal Server Error", "{}")], Duration::ZERO).await;

    let err = client(&base, Duration::from_secs(5))
        .get_paths(&path_query(), &CallOptions::default())
        .await
        .unwrap_err();

    match &err {
        RoutingApiError::Status { status, .. } => assert_eq!(*status, 500),
        other => panic!("unexpected error {other:?}"),
    }
    assert!(err.endpoint().ends_with("/v1/path"));
    assert!(!server.await.unwrap()[0].to_ascii_lowercase().contains("authen-key"));
}

#[tokio::test]
async fn test_slow_api_times_out() {
    let (base, server) = serve(vec![http_response("200 OK", PATH_BODY)], Duration::from_secs(3)).await;

    let err = client(&base, Duration::from_millis(200))
        .get_paths(&path_query(), &CallOptions::default())
        .await
        .unwrap_err();

    assert!(err.is_timeout(), "expected timeout, got {err:?}");
    server.abort();
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let (base, _server) = serve(vec![http_response("200 OK", r#"{"hops": []}"#)], Duration::ZERO).await;

    let err = client(&base, Duration::from_secs(5))
        .get_paths(&path_query(), &CallOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, RoutingApiError::Decode { .. }));
}

#[tokio::test]
async fn test_router_surfaces_http_failure_as_api_error() {
    let (base, _server) = serve(vec![http_response("503 Service Unavailable", "")], Duration::ZERO).await;
    let mut config = RouterConfig::default();
    config.api.base_url = base;
    let router = SplitRouter::builder(config).split_query(StubSplitQuery::returning(1, &[5])).build().unwrap();

    let request = SwapRequest::new("1", native_btc(), usdc_e(), BOTANIX_MAINNET_CHAIN_ID);
    let err = router.get_swap_route(&request, &CallOptions::default()).await.unwrap_err();

    assert_eq!(err.code(), "API_ERROR");
}

#[tokio::test]
async fn test_online_part_count_uses_cached_minimums() {
    let unlisted: Address = MID_TOKEN;
    let min_amounts = format!(
        r#"{{"data": [{{"chainId": {BOTANIX_MAINNET_CHAIN_ID}, "address": "{unlisted}", "minAmount": "1000000000000000000"}}]}}"#
    );
    let (base, server) = serve(
        vec![
            http_response("200 OK", &min_amounts),
            http_response("200 OK", PATH_BODY),
            http_response("200 OK", PATH_BODY),
        ],
        Duration::ZERO,
    )
    .await;

    let mut config = RouterConfig { part_count_mode: PartCountMode::Online, ..RouterConfig::default() };
    config.api.base_url = base;
    let query = StubSplitQuery::returning(1_000, &[1]);
    let router = SplitRouter::builder(config).split_query(query.clone()).build().unwrap();

    let src = Token::new(unlisted.to_string(), "MID", "", 18, BOTANIX_MAINNET_CHAIN_ID);
    let dst = Token::new(Address::repeat_byte(0x6b).to_string(), "OTHER", "", 18, BOTANIX_MAINNET_CHAIN_ID);

    // Above the threshold the default part count is used, below it the trade is not split
    let above = SwapRequest::new("2", src.clone(), dst.clone(), BOTANIX_MAINNET_CHAIN_ID);
    assert_eq!(router.get_swap_route(&above, &CallOptions::default()).await.unwrap().part_count, 5);
    let below = SwapRequest::new("0.5", src, dst, BOTANIX_MAINNET_CHAIN_ID);
    assert_eq!(router.get_swap_route(&below, &CallOptions::default()).await.unwrap().part_count, 1);

    let requests = server.await.unwrap();
    assert!(requests[0].starts_with("GET /v1/min-amount "));
    assert!(requests[1].starts_with("GET /v1/path?"));
    assert!(requests[2].starts_with("GET /v1/path?"));
    assert_eq!(query.calls.lock().iter().map(|(_, parts)| *parts).collect::<Vec<_>>(), vec![5, 1]);
}
