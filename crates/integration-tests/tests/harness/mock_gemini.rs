//! Mock Gemini backend for integration tests
//!
//! Serves `streamGenerateContent` with a scripted reply and records every
//! request it receives.

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;

/// What the mock answers with
#[derive(Debug, Clone)]
pub enum Reply {
    /// 200 with a chunked body, one write per chunk
    Stream(Vec<String>),
    /// Error status with a body
    Status(StatusCode, String),
    /// Status with no body at all
    Empty(StatusCode),
    /// Error status whose body breaks off after the first chunk
    BrokenStatus(StatusCode),
}

/// One request as the mock saw it
#[derive(Debug, Clone)]
pub struct Captured {
    /// `{model}:{action}` path segment
    pub target: String,
    /// Query parameters
    pub query: HashMap<String, String>,
    /// Request headers
    pub headers: HeaderMap,
    /// JSON request body
    pub body: serde_json::Value,
}

/// Mock server handle; shuts the server down on drop
pub struct MockGemini {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    reply: Reply,
    requests: Mutex<Vec<Captured>>,
}

impl MockGemini {
    /// Start a mock answering every request with `reply`
    pub async fn start(reply: Reply) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            reply,
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/v1beta/models/{target}", routing::post(handle_generate))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Start a mock streaming `chunks` as separate body writes
    pub async fn streaming(chunks: &[&str]) -> anyhow::Result<Self> {
        Self::start(Reply::Stream(chunks.iter().map(|c| (*c).to_owned()).collect())).await
    }

    /// Base URL to configure the client with
    pub fn base_url(&self) -> String {
        format!("http://{}/v1beta", self.addr)
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<Captured> {
        self.state.requests.lock().unwrap().clone()
    }
}

impl Drop for MockGemini {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_generate(
    State(state): State<Arc<MockState>>,
    Path(target): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Response {
    state.requests.lock().unwrap().push(Captured {
        target,
        query,
        headers,
        body,
    });

    match state.reply.clone() {
        Reply::Stream(chunks) => {
            // Pause between writes so chunks reach the client separately
            let body = futures_util::stream::iter(chunks).then(|chunk| async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Ok::<_, Infallible>(chunk)
            });
            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from_stream(body))
                .unwrap()
        }
        Reply::Status(status, body) => (status, body).into_response(),
        Reply::Empty(status) => status.into_response(),
        Reply::BrokenStatus(status) => {
            let body = futures_util::stream::iter([
                Ok(r#"{"error":{"code":"#.to_owned()),
                Err(std::io::Error::other("connection reset")),
            ]);
            Response::builder()
                .status(status)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from_stream(body))
                .unwrap()
        }
    }
}
