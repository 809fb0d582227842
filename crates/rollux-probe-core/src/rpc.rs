//! JSON-RPC client
//!
//! Every call is a single HTTP POST with a fixed JSON-RPC 2.0 envelope. Any
//! failure (connect, status, body, missing result) is reported as `None` by
//! [`RpcTransport::call`]; [`HttpRpcClient::request`] keeps the reason.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::endpoint::NodeEndpoint;
use crate::error::{ProbeError, RpcError};
use crate::report::BlockHandle;

/// Source of JSON-RPC results
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Call `method` on `endpoint`. `None` means the result could not be
    /// determined, not that it was empty.
    async fn call(
        &self,
        endpoint: &NodeEndpoint,
        method: &str,
        params: Vec<Value>,
    ) -> Option<Value>;
}

/// JSON-RPC over HTTP POST
#[derive(Clone)]
pub struct HttpRpcClient {
    client: Client,
}

impl HttpRpcClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Client with a per-request timeout instead of the transport default
    pub fn with_timeout(timeout: Duration) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProbeError::Client(e.to_string()))?;
        Ok(Self { client })
    }

    pub async fn request(
        &self,
        endpoint: &NodeEndpoint,
        method: &str,
        params: Vec<Value>,
    ) -> Result<Value, RpcError> {
        let payload = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1,
        });

        let response = self
            .client
            .post(endpoint.url().clone())
            .json(&payload)
            .send()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        if response.status() != StatusCode::OK {
            return Err(RpcError::Status(response.status().as_u16()));
        }

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| RpcError::Decode(e.to_string()))?;

        match (body.result, body.error) {
            (Some(result), _) => Ok(result),
            (None, Some(error)) => Err(RpcError::Node {
                code: error.code,
                message: error.message,
            }),
            (None, None) => Err(RpcError::MissingResult),
        }
    }
}

impl Default for HttpRpcClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RpcTransport for HttpRpcClient {
    async fn call(
        &self,
        endpoint: &NodeEndpoint,
        method: &str,
        params: Vec<Value>,
    ) -> Option<Value> {
        match self.request(endpoint, method, params).await {
            Ok(result) => Some(result),
            Err(e) => {
                tracing::debug!(endpoint = %endpoint, method, error = %e, "RPC call failed");
                None
            }
        }
    }
}

// `result: null` deserializes to None, same as a missing field
#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Parse a JSON-RPC quantity such as `0x3e8`
pub fn parse_quantity(raw: &str) -> Option<u64> {
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);
    if digits.is_empty() {
        return None;
    }
    u64::from_str_radix(digits, 16).ok()
}

/// Current chain head via `eth_blockNumber`
pub async fn block_number(rpc: &dyn RpcTransport, endpoint: &NodeEndpoint) -> Option<u64> {
    let result = rpc.call(endpoint, "eth_blockNumber", vec![]).await?;
    let head = result.as_str().and_then(parse_quantity);
    if head.is_none() {
        tracing::debug!(endpoint = %endpoint, %result, "unparseable block number");
    }
    head
}

/// Hash of block `number` via `eth_getBlockByNumber`, header only
pub async fn block_by_number(
    rpc: &dyn RpcTransport,
    endpoint: &NodeEndpoint,
    number: u64,
) -> BlockHandle {
    let params = vec![json!(format!("{:#x}", number)), json!(false)];
    let hash = rpc
        .call(endpoint, "eth_getBlockByNumber", params)
        .await
        .and_then(|block| block.get("hash").and_then(Value::as_str).map(str::to_string))
        .filter(|hash| !hash.is_empty());

    BlockHandle { number, hash }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedRpc;
    use axum::{http::StatusCode as AxumStatus, routing::post, Json, Router};
    use std::net::SocketAddr;

    async fn node_stub(Json(req): Json<Value>) -> Result<Json<Value>, AxumStatus> {
        // reject anything that isn't the fixed envelope
        if req["jsonrpc"] != "2.0" || req["id"] != 1 || !req["params"].is_array() {
            return Err(AxumStatus::BAD_REQUEST);
        }
        let result = match req["method"].as_str() {
            Some("eth_blockNumber") => json!("0x3e8"),
            Some("eth_getBlockByNumber") if req["params"] == json!(["0x3e8", false]) => {
                json!({ "number": "0x3e8", "hash": "0xabc" })
            }
            Some("eth_getBlockByNumber") => Value::Null,
            _ => {
                return Ok(Json(json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "error": { "code": -32601, "message": "method not found" },
                })))
            }
        };
        Ok(Json(json!({ "jsonrpc": "2.0", "id": 1, "result": result })))
    }

    async fn spawn_stub() -> SocketAddr {
        let app = Router::new()
            .route("/", post(node_stub))
            .route(
                "/broken",
                post(|| async { (AxumStatus::INTERNAL_SERVER_ERROR, "boom") }),
            )
            .route("/garbage", post(|| async { "not json" }))
            .route(
                "/null",
                post(|| async { Json(json!({ "jsonrpc": "2.0", "id": 1, "result": null })) }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn endpoint(addr: SocketAddr, path: &str) -> NodeEndpoint {
        NodeEndpoint::parse(&format!("http://{}{}", addr, path)).unwrap()
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("0x3e8"), Some(1000));
        assert_eq!(parse_quantity("0X0"), Some(0));
        assert_eq!(parse_quantity("ff"), Some(255));
        assert_eq!(parse_quantity("0x"), None);
        assert_eq!(parse_quantity(""), None);
        assert_eq!(parse_quantity("0xzz"), None);
    }

    #[tokio::test]
    async fn test_request_envelope() {
        let addr = spawn_stub().await;
        let client = HttpRpcClient::new();

        let result = client
            .request(&endpoint(addr, "/"), "eth_blockNumber", vec![])
            .await
            .unwrap();
        assert_eq!(result, json!("0x3e8"));
    }

    #[tokio::test]
    async fn test_block_helpers() {
        let addr = spawn_stub().await;
        let client = HttpRpcClient::new();
        let node = endpoint(addr, "/");

        assert_eq!(block_number(&client, &node).await, Some(1000));

        let block = block_by_number(&client, &node, 1000).await;
        assert_eq!(block, BlockHandle { number: 1000, hash: Some("0xabc".into()) });

        // unknown block comes back as `result: null`
        let block = block_by_number(&client, &node, 2000).await;
        assert_eq!(block, BlockHandle { number: 2000, hash: None });
    }

    #[tokio::test]
    async fn test_failures_collapse_to_absent() {
        let addr = spawn_stub().await;
        let client = HttpRpcClient::new();

        let err = client
            .request(&endpoint(addr, "/broken"), "eth_blockNumber", vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, RpcError::Status(500)));

        let err = client
            .request(&endpoint(addr, "/garbage"), "eth_blockNumber", vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, RpcError::Decode(_)));

        let err = client
            .request(&endpoint(addr, "/null"), "eth_getBlockByNumber", vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, RpcError::MissingResult));

        let err = client
            .request(&endpoint(addr, "/"), "eth_unknown", vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, RpcError::Node { code: -32601, .. }));

        for path in ["/broken", "/garbage", "/null"] {
            assert_eq!(client.call(&endpoint(addr, path), "eth_blockNumber", vec![]).await, None);
        }
        assert_eq!(block_number(&client, &endpoint(addr, "/broken")).await, None);
        assert_eq!(block_by_number(&client, &endpoint(addr, "/null"), 7).await.hash, None);
    }

    #[tokio::test]
    async fn test_connection_refused_is_absent() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpRpcClient::new();
        assert_eq!(client.call(&endpoint(addr, "/"), "eth_blockNumber", vec![]).await, None);
    }

    #[tokio::test]
    async fn test_malformed_block_number_is_absent_not_zero() {
        let node = NodeEndpoint::parse("http://node.test").unwrap();
        let rpc = ScriptedRpc::new()
            .script(&node, "eth_blockNumber", vec![Some(json!("latest"))]);
        assert_eq!(block_number(&rpc, &node).await, None);

        let rpc = ScriptedRpc::new().script(&node, "eth_blockNumber", vec![Some(json!(1000))]);
        assert_eq!(block_number(&rpc, &node).await, None);
    }

    #[tokio::test]
    async fn test_block_by_number_hex_params() {
        let node = NodeEndpoint::parse("http://node.test").unwrap();
        let rpc = ScriptedRpc::new().script(
            &node,
            "eth_getBlockByNumber",
            vec![Some(json!({ "hash": "0xabc" }))],
        );

        block_by_number(&rpc, &node, 1000).await;
        let calls = rpc.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].params, vec![json!("0x3e8"), json!(false)]);
    }
}
