//! JSON-RPC 2.0 over WebSocket for the node's custom RPC methods.
//!
//! # Responsibilities
//! - Hold one WebSocket connection to the node
//! - Issue one request at a time and wait for the matching response
//! - Map JSON-RPC errors, timeouts and closed connections to [`ChainError`]

use futures_util::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::chain::types::{ChainError, ChainResult};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    /// Absent on subscription notifications.
    id: Option<u64>,
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// Sequential JSON-RPC client.
pub struct RpcTransport {
    socket: Mutex<Socket>,
    next_id: AtomicU64,
    timeout: Duration,
}

impl RpcTransport {
    /// Connect to a `ws://` or `wss://` endpoint.
    pub async fn connect(url: &str, request_timeout: Duration) -> ChainResult<Self> {
        let (socket, _) = connect_async(url).await?;
        tracing::debug!(url = %url, "RPC transport connected");
        Ok(Self {
            socket: Mutex::new(socket),
            next_id: AtomicU64::new(1),
            timeout: request_timeout,
        })
    }

    /// Call `method` and decode its result.
    pub async fn request<R: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> ChainResult<R> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let payload = serde_json::to_string(&JsonRpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        })?;

        let mut socket = self.socket.lock().await;
        socket.send(Message::Text(payload.into())).await?;

        let result = timeout(self.timeout, Self::await_response(&mut socket, id, method)).await;
        let value = match result {
            Ok(value) => value?,
            Err(_) => {
                return Err(ChainError::Timeout {
                    method: method.to_string(),
                    secs: self.timeout.as_secs(),
                })
            }
        };

        Ok(serde_json::from_value(value)?)
    }

    async fn await_response(
        socket: &mut Socket,
        id: u64,
        method: &str,
    ) -> ChainResult<serde_json::Value> {
        while let Some(message) = socket.next().await {
            let text = match message? {
                Message::Text(text) => text,
                Message::Ping(payload) => {
                    socket.send(Message::Pong(payload)).await?;
                    continue;
                }
                Message::Close(_) => break,
                _ => continue,
            };

            let response: JsonRpcResponse = serde_json::from_str(text.as_str())?;
            if response.id != Some(id) {
                tracing::trace!(expected = id, got = ?response.id, "Skipping unrelated message");
                continue;
            }

            if let Some(error) = response.error {
                return Err(ChainError::Rpc {
                    method: method.to_string(),
                    code: error.code,
                    message: error.message,
                });
            }
            return Ok(response.result.unwrap_or(serde_json::Value::Null));
        }

        Err(ChainError::Closed(method.to_string()))
    }
}

impl std::fmt::Debug for RpcTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcTransport")
            .field("timeout_secs", &self.timeout.as_secs())
            .finish()
    }
}
