//! Test utilities for tally-core
//!
//! A mock AI server speaking both the Ollama and the OpenAI chat completions
//! APIs, for backend and CLI tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

/// Default analysis returned by the mock server
pub const DEFAULT_REPLY: &str =
    "## Overview\n\nSpending is **under control** this period.\n\n- Keep an eye on dining out";

struct MockState {
    reply: String,
    fail_status: Option<StatusCode>,
    prompts: Mutex<Vec<String>>,
}

/// Mock AI server for testing
pub struct MockAiServer {
    addr: SocketAddr,
    state: Arc<MockState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockAiServer {
    /// Start the mock server on an available port with the default reply
    pub async fn start() -> Self {
        Self::spawn(DEFAULT_REPLY.to_string(), None).await
    }

    /// Start a server that answers every generation with `reply`
    pub async fn start_with_reply(reply: &str) -> Self {
        Self::spawn(reply.to_string(), None).await
    }

    /// Start a server that answers every request with `status`
    pub async fn start_failing(status: u16) -> Self {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::spawn(String::new(), Some(status)).await
    }

    async fn spawn(reply: String, fail_status: Option<StatusCode>) -> Self {
        let state = Arc::new(MockState {
            reply,
            fail_status,
            prompts: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/api/tags", get(handle_tags))
            .route("/api/generate", post(handle_generate))
            .route("/v1/models", get(handle_models))
            .route("/v1/chat/completions", post(handle_chat))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Prompts received so far, in arrival order
    pub fn prompts(&self) -> Vec<String> {
        self.state.prompts.lock().unwrap().clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockAiServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn failure(state: &MockState) -> Option<Response> {
    state
        .fail_status
        .map(|status| (status, "mock failure").into_response())
}

/// Ollama tags endpoint (health check)
async fn handle_tags(State(state): State<Arc<MockState>>) -> Response {
    if let Some(resp) = failure(&state) {
        return resp;
    }
    Json(TagsResponse {
        models: vec![ModelInfo {
            name: "llama3.2:latest".to_string(),
        }],
    })
    .into_response()
}

/// Ollama generate endpoint
async fn handle_generate(
    State(state): State<Arc<MockState>>,
    Json(request): Json<GenerateRequest>,
) -> Response {
    if let Some(resp) = failure(&state) {
        return resp;
    }
    state.prompts.lock().unwrap().push(request.prompt);
    Json(GenerateResponse {
        model: request.model,
        response: state.reply.clone(),
        done: true,
    })
    .into_response()
}

/// OpenAI models endpoint (health check)
async fn handle_models(State(state): State<Arc<MockState>>) -> Response {
    if let Some(resp) = failure(&state) {
        return resp;
    }
    Json(serde_json::json!({
        "object": "list",
        "data": [{ "id": "local-model", "object": "model" }]
    }))
    .into_response()
}

/// OpenAI chat completions endpoint
async fn handle_chat(
    State(state): State<Arc<MockState>>,
    Json(request): Json<ChatRequest>,
) -> Response {
    if let Some(resp) = failure(&state) {
        return resp;
    }
    if let Some(message) = request.messages.into_iter().last() {
        state.prompts.lock().unwrap().push(message.content);
    }
    Json(serde_json::json!({
        "model": request.model,
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": state.reply },
            "finish_reason": "stop"
        }]
    }))
    .into_response()
}

#[derive(Serialize)]
struct TagsResponse {
    models: Vec<ModelInfo>,
}

#[derive(Serialize)]
struct ModelInfo {
    name: String,
}

#[derive(Deserialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
}

#[derive(Serialize)]
struct GenerateResponse {
    model: String,
    response: String,
    done: bool,
}

#[derive(Deserialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}
