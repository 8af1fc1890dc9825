//! MCP (Model Context Protocol) request handling, independent of transport.
//!
//! Tools generate Gateway API and Kuadrant manifests; resources serve the
//! Kuadrant reference docs through the shared [`DocCache`].
//!
//! Protocol: JSON-RPC 2.0. Messages without an `id` are notifications and get
//! no response.

pub mod resources;
pub mod tools;

use futures::FutureExt;
use kuadrant_core::{Catalog, DocCache};
use serde_json::{json, Value};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, warn};

pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "kuadrant-mcp";

const PARSE_ERROR: i64 = -32700;
const INVALID_REQUEST: i64 = -32600;
const INTERNAL_ERROR: i64 = -32603;

/// Failure of a single JSON-RPC request.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("{0}")]
    InvalidParams(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl RpcError {
    pub fn code(&self) -> i64 {
        match self {
            RpcError::MethodNotFound(_) => -32601,
            RpcError::InvalidParams(_) => -32602,
            RpcError::Internal(_) => INTERNAL_ERROR,
        }
    }
}

fn error_response(id: Value, code: i64, message: String) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {"code": code, "message": message},
    })
}

/// Response for input that never became a JSON-RPC message, so has no id.
pub(crate) fn parse_error(detail: impl std::fmt::Display) -> Value {
    error_response(Value::Null, PARSE_ERROR, format!("Parse error: {detail}"))
}

/// Shared by every transport; cheap to hold behind an `Arc` across tasks.
pub struct McpServer {
    cache: Arc<DocCache>,
    catalog: Catalog,
}

impl McpServer {
    pub fn new(cache: Arc<DocCache>, catalog: Catalog) -> Self {
        Self { cache, catalog }
    }

    pub fn cache(&self) -> &DocCache {
        &self.cache
    }

    /// Parse one raw JSON-RPC message and produce a response (if any).
    pub async fn dispatch(&self, raw: &str) -> Option<Value> {
        match serde_json::from_str(raw) {
            Ok(msg) => self.handle(msg).await,
            Err(e) => {
                warn!("Parse error: {e}");
                Some(parse_error(e))
            }
        }
    }

    /// [`dispatch`](Self::dispatch) for transports that run each message on
    /// its own task. A panic while handling a request still answers the
    /// caller with an internal error carrying the request id.
    pub async fn dispatch_guarded(&self, raw: &str) -> Option<Value> {
        match AssertUnwindSafe(self.dispatch(raw)).catch_unwind().await {
            Ok(response) => response,
            Err(payload) => {
                let reason = payload
                    .downcast_ref::<&str>()
                    .copied()
                    .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
                    .unwrap_or("unknown panic");
                error!(reason, "Request handler panicked");

                let id = serde_json::from_str::<Value>(raw)
                    .ok()
                    .and_then(|msg| msg.get("id").cloned())?;
                Some(error_response(
                    id,
                    INTERNAL_ERROR,
                    "Internal error: request handler panicked".to_string(),
                ))
            }
        }
    }

    /// Handle an already-parsed JSON-RPC message.
    pub async fn handle(&self, msg: Value) -> Option<Value> {
        if !msg.is_object() {
            return Some(error_response(
                Value::Null,
                INVALID_REQUEST,
                "Invalid Request: expected a JSON object".to_string(),
            ));
        }

        let method = msg["method"].as_str().unwrap_or("").to_string();

        // Notifications have no "id" field and must not be answered
        let Some(id) = msg.get("id").cloned() else {
            debug!(method, "Notification received");
            return None;
        };

        let params = match msg.get("params") {
            Some(p) if !p.is_null() => p.clone(),
            _ => Value::Object(Default::default()),
        };

        match self.route(&method, params).await {
            Ok(result) => Some(json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": result,
            })),
            Err(e) => {
                warn!(method, code = e.code(), "Request failed: {e}");
                Some(error_response(id, e.code(), e.to_string()))
            }
        }
    }

    async fn route(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        match method {
            "initialize" => Ok(json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {
                    "tools": {},
                    "resources": {}
                },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": env!("CARGO_PKG_VERSION")
                },
                "instructions": "Kuadrant MCP generates Gateway API and Kuadrant policy manifests. \
                    Use create_gateway and create_httproute for routing, then attach \
                    create_dnspolicy, create_tlspolicy, create_ratelimitpolicy or \
                    create_authpolicy. Read the kuadrant://docs/* resources for reference material, \
                    kuadrant://examples/* for complete setups and kuadrant://troubleshooting \
                    when a policy is not enforced."
            })),

            "ping" => Ok(json!({})),

            "tools/list" => Ok(tools::tools_schema()),

            "tools/call" => {
                let name = params["name"]
                    .as_str()
                    .ok_or_else(|| RpcError::InvalidParams("name required".into()))?;
                let args = match params.get("arguments") {
                    Some(a) if !a.is_null() => a.clone(),
                    _ => Value::Object(Default::default()),
                };
                tools::call_tool(name, args)
            }

            "resources/list" => Ok(resources::list(&self.catalog)),

            "resources/read" => {
                let uri = params["uri"]
                    .as_str()
                    .ok_or_else(|| RpcError::InvalidParams("uri required".into()))?;
                resources::read(&self.catalog, &self.cache, uri).await
            }

            _ => Err(RpcError::MethodNotFound(method.to_string())),
        }
    }
}
