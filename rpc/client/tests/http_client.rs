use mockito::{Matcher, Server};
use rpc_client::{RpcClient, RpcCredentials};
use rpc_core::{ChainReader, RpcError};
use serde_json::json;
use std::time::Duration;

const BLOCK_HASH: &str = "0000000000000000000320283a032748cef8227873ff4872689bf23f1cda83a5";

fn client_for(server: &Server) -> RpcClient {
    RpcClient::new(
        &server.url(),
        Some(RpcCredentials::new("user", "pass")),
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn test_current_height_uses_getblockcount() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_header("authorization", "Basic dXNlcjpwYXNz")
        .match_body(Matcher::PartialJson(json!({ "method": "getblockcount" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "result": 840123, "error": null, "id": 1 }).to_string())
        .create_async()
        .await;

    let client = client_for(&server);
    assert_eq!(client.current_height().await.unwrap(), 840123);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_block_version_resolves_hash_then_header() {
    let mut server = Server::new_async().await;
    let hash_mock = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({ "method": "getblockhash", "params": [700000] })))
        .with_status(200)
        .with_body(json!({ "result": BLOCK_HASH, "error": null, "id": 1 }).to_string())
        .create_async()
        .await;
    let header_mock = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({ "method": "getblockheader", "params": [BLOCK_HASH, true] })))
        .with_status(200)
        .with_body(
            json!({
                "result": {
                    "hash": BLOCK_HASH,
                    "confirmations": 12,
                    "height": 700000,
                    "version": 536870916,
                    "versionHex": "20000004",
                    "time": 1631333672,
                    "previousblockhash": "0000000000000000000590fc0f3eba193a278534220b2b37e9849e1a770ca959"
                },
                "error": null,
                "id": 2
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server);
    assert_eq!(client.block_version_at(700000).await.unwrap(), 0x2000_0004);
    hash_mock.assert_async().await;
    header_mock.assert_async().await;
}

#[tokio::test]
async fn test_rpc_error_body_on_server_error_status() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/")
        .with_status(500)
        .with_body(
            json!({
                "result": null,
                "error": { "code": -8, "message": "Block height out of range" },
                "id": 1
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.block_version_at(99_999_999).await.unwrap_err();
    assert_eq!(
        err,
        RpcError::Rpc { code: -8, message: "Block height out of range".to_string() }
    );
}

#[tokio::test]
async fn test_unauthorized_status() {
    let mut server = Server::new_async().await;
    server.mock("POST", "/").with_status(401).create_async().await;

    let client = client_for(&server);
    assert_eq!(client.current_height().await.unwrap_err(), RpcError::Unauthorized);
}

#[tokio::test]
async fn test_non_json_error_page_maps_to_http_status() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/")
        .with_status(503)
        .with_body("<html>Service Unavailable</html>")
        .create_async()
        .await;

    let client = client_for(&server);
    assert_eq!(client.current_height().await.unwrap_err(), RpcError::Http { status: 503 });
}

#[tokio::test]
async fn test_malformed_success_body() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/")
        .with_status(200)
        .with_body(json!({ "result": "not-a-number", "error": null, "id": 1 }).to_string())
        .create_async()
        .await;

    let client = client_for(&server);
    assert!(matches!(client.current_height().await, Err(RpcError::Decode(_))));
}

#[tokio::test]
async fn test_null_result_without_error() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/")
        .with_status(200)
        .with_body(json!({ "result": null, "error": null, "id": 1 }).to_string())
        .create_async()
        .await;

    let client = client_for(&server);
    assert_eq!(
        client.current_height().await.unwrap_err(),
        RpcError::MissingResult("getblockcount".to_string())
    );
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let client = RpcClient::new("http://127.0.0.1:1", None, Duration::from_secs(2)).unwrap();
    let err = client.current_height().await.unwrap_err();
    assert!(matches!(err, RpcError::Network(_) | RpcError::Timeout(_)), "unexpected {:?}", err);
}
