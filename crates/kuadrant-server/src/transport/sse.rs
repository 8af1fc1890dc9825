//! JSON-RPC over server-sent events.
//!
//! `GET /sse` opens a session. Its first event is `endpoint`, whose data is
//! the URL the client posts requests to (`/sse?sessionid=<id>`). Every POST is
//! acknowledged with 202 and its response arrives later on the stream as a
//! `message` event. A session ends when the client drops the stream.

use super::http::{health, AppState};
use crate::mcp::McpServer;
use async_stream::stream;
use axum::{
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::get,
    Router,
};
use futures::Stream;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, RwLock};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};
use uuid::Uuid;

const SESSION_BUFFER: usize = 64;

type Sessions = Arc<RwLock<HashMap<String, mpsc::Sender<Value>>>>;

#[derive(Clone)]
pub struct SseState {
    pub app: AppState,
    pub sessions: Sessions,
}

impl SseState {
    pub fn new(server: Arc<McpServer>) -> Self {
        Self {
            app: AppState {
                server,
                start_time: Instant::now(),
            },
            sessions: Arc::default(),
        }
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl FromRef<SseState> for AppState {
    fn from_ref(state: &SseState) -> Self {
        state.app.clone()
    }
}

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    sessionid: Option<String>,
}

pub fn create_router(state: SseState) -> Router {
    Router::new()
        .route("/sse", get(open_session).post(post_message))
        .route("/health", get(health))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(server: Arc<McpServer>, addr: SocketAddr) -> anyhow::Result<()> {
    let app = create_router(SseState::new(server));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Starting SSE server on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn open_session(
    State(state): State<SseState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let session_id = Uuid::now_v7().simple().to_string();
    let (tx, mut rx) = mpsc::channel::<Value>(SESSION_BUFFER);
    state
        .sessions
        .write()
        .await
        .insert(session_id.clone(), tx.clone());
    info!(session = %session_id, "SSE session opened");

    // Forget the session once the client stops reading its stream
    let sessions = state.sessions.clone();
    let closing_id = session_id.clone();
    tokio::spawn(async move {
        tx.closed().await;
        sessions.write().await.remove(&closing_id);
        info!(session = %closing_id, "SSE session closed");
    });

    let endpoint = format!("/sse?sessionid={session_id}");
    let events = stream! {
        yield Ok(Event::default().event("endpoint").data(endpoint));
        while let Some(message) = rx.recv().await {
            yield Ok(Event::default().event("message").data(message.to_string()));
        }
    };

    Sse::new(events).keep_alive(KeepAlive::default())
}

async fn post_message(
    State(state): State<SseState>,
    Query(query): Query<SessionQuery>,
    body: String,
) -> Response {
    let Some(session_id) = query.sessionid else {
        return (StatusCode::BAD_REQUEST, "missing sessionid").into_response();
    };
    let Some(tx) = state.sessions.read().await.get(&session_id).cloned() else {
        return (StatusCode::NOT_FOUND, "session not found").into_response();
    };

    let server = state.app.server.clone();
    tokio::spawn(async move {
        if let Some(response) = server.dispatch_guarded(&body).await {
            if tx.send(response).await.is_err() {
                debug!(session = %session_id, "Session closed, dropping response");
            }
        }
    });

    StatusCode::ACCEPTED.into_response()
}
