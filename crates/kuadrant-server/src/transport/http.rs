//! JSON-RPC over HTTP: one request per `POST /mcp`.

use crate::mcp::McpServer;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub server: Arc<McpServer>,
    pub start_time: Instant,
}

/// JSON response wrapper
#[derive(Serialize)]
pub struct JsonResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> JsonResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

#[derive(Serialize)]
pub(crate) struct HealthData {
    status: &'static str,
    version: &'static str,
    uptime_secs: u64,
    cached_documents: usize,
    fresh_documents: usize,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/mcp", post(rpc))
        .route("/health", get(health))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(server: Arc<McpServer>, addr: SocketAddr) -> anyhow::Result<()> {
    let state = AppState {
        server,
        start_time: Instant::now(),
    };
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Starting HTTP server on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

/// The body is taken as text so malformed JSON gets a JSON-RPC parse error
/// instead of an HTTP rejection. Notifications are acknowledged with 202.
async fn rpc(State(state): State<AppState>, body: String) -> Response {
    match state.server.dispatch_guarded(&body).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

pub(crate) async fn health(State(state): State<AppState>) -> Json<JsonResponse<HealthData>> {
    let stats = state.server.cache().stats().await;
    Json(JsonResponse::ok(HealthData {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.start_time.elapsed().as_secs(),
        cached_documents: stats.entries,
        fresh_documents: stats.fresh,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::testing::{make_server, panicking_fetcher, FixedFetcher};
    use serde_json::{json, Value};

    async fn spawn_app(fetcher: FixedFetcher) -> String {
        let state = AppState {
            server: Arc::new(make_server(Arc::new(fetcher))),
            start_time: Instant::now(),
        };
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, create_router(state)).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_rpc_tools_call() {
        let base = spawn_app(FixedFetcher::default()).await;
        let resp: Value = reqwest::Client::new()
            .post(format!("{base}/mcp"))
            .json(&json!({
                "jsonrpc": "2.0",
                "id": 7,
                "method": "tools/call",
                "params": {
                    "name": "create_authpolicy",
                    "arguments": {"name": "a", "namespace": "ns", "targetRef": {"kind": "HTTPRoute", "name": "r"}}
                }
            }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(resp["id"], 7);
        let text = resp["result"]["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("kind: AuthPolicy"));
    }

    #[tokio::test]
    async fn test_rpc_notification_accepted() {
        let base = spawn_app(FixedFetcher::default()).await;
        let resp = reqwest::Client::new()
            .post(format!("{base}/mcp"))
            .body(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), reqwest::StatusCode::ACCEPTED);
        assert!(resp.text().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rpc_parse_error() {
        let base = spawn_app(FixedFetcher::default()).await;
        let resp: Value = reqwest::Client::new()
            .post(format!("{base}/mcp"))
            .body("{oops")
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(resp["error"]["code"], -32700);
    }

    #[tokio::test]
    async fn test_rpc_handler_panic_is_internal_error() {
        let base = spawn_app(panicking_fetcher()).await;
        let resp: Value = reqwest::Client::new()
            .post(format!("{base}/mcp"))
            .json(&json!({
                "jsonrpc": "2.0",
                "id": "read-1",
                "method": "resources/read",
                "params": {"uri": "kuadrant://docs/telemetrypolicy"}
            }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(resp["id"], "read-1");
        assert_eq!(resp["error"]["code"], -32603);
    }

    #[tokio::test]
    async fn test_concurrent_resource_reads() {
        let fetcher = FixedFetcher::with(
            "kuadrant-operator/main/doc/reference/tokenratelimitpolicy.md",
            "# TokenRateLimitPolicy",
        );
        let base = spawn_app(fetcher).await;
        let client = reqwest::Client::new();

        let requests = (0..8).map(|id| {
            let client = client.clone();
            let url = format!("{base}/mcp");
            async move {
                client
                    .post(url)
                    .json(&json!({
                        "jsonrpc": "2.0",
                        "id": id,
                        "method": "resources/read",
                        "params": {"uri": "kuadrant://docs/tokenratelimitpolicy"}
                    }))
                    .send()
                    .await
                    .unwrap()
                    .json::<Value>()
                    .await
                    .unwrap()
            }
        });

        for resp in futures::future::join_all(requests).await {
            assert_eq!(resp["result"]["contents"][0]["text"], "# TokenRateLimitPolicy");
        }

        let health: Value = client
            .get(format!("{base}/health"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(health["success"], true);
        assert_eq!(health["data"]["status"], "ok");
        assert_eq!(health["data"]["cached_documents"], 1);
        assert_eq!(health["data"]["fresh_documents"], 1);
    }
}
