//! HTTP API over the checkout log.
//!
//! | Method | Path        | Description                          |
//! |--------|-------------|--------------------------------------|
//! | GET    | `/`         | Every block, pretty-printed JSON     |
//! | POST   | `/`         | Append a checkout event              |
//! | POST   | `/new`      | Assign a catalog id to a book        |
//! | GET    | `/validate` | Walk the whole chain                 |
//! | GET    | `/health`   | Liveness probe                       |

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bookchain_core::Book;
use bookchain_log::{Block, ChainError, CheckoutEvent, SharedChain};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

/// State handed to every handler
#[derive(Clone)]
pub struct AppState {
    /// The one chain this process writes to
    pub chain: SharedChain,
}

/// Errors surfaced to HTTP clients
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Body could not be decoded
    #[error("invalid request body: {0}")]
    BadRequest(String),
    /// The chain refused the block
    #[error(transparent)]
    Chain(#[from] ChainError),
    /// Response could not be encoded
    #[error("response encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Chain(_) | Self::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Body of every error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable reason
    pub error: String,
}

/// Response of `GET /validate`
#[derive(Debug, Serialize, Deserialize)]
pub struct ValidateResponse {
    /// Whether the whole chain checked out
    pub ok: bool,
    /// Number of blocks checked
    pub length: usize,
    /// First violation, if any
    pub error: Option<String>,
    /// Index of the offending block, if any
    pub position: Option<usize>,
}

/// Response of `GET /health`
#[derive(Debug, Serialize, Deserialize)]
pub struct Health {
    /// Always "ok"
    pub status: String,
}

/// Build the router with tracing
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_blocks).post(write_block))
        .route("/new", post(new_book))
        .route("/validate", get(validate_chain))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /
async fn list_blocks(State(state): State<AppState>) -> Result<Response, ApiError> {
    let blocks = state.chain.snapshot();
    let body = serde_json::to_string_pretty(&blocks)?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

/// POST /
async fn write_block(
    State(state): State<AppState>,
    payload: Result<Json<CheckoutEvent>, JsonRejection>,
) -> Result<(StatusCode, Json<Block<CheckoutEvent>>), ApiError> {
    let Json(event) = payload.inspect_err(|rejection| {
        tracing::warn!(error = %rejection.body_text(), "could not decode checkout");
    })?;

    match state.chain.append(event) {
        Ok(block) => {
            tracing::info!(
                position = block.position(),
                hash = %block.hash(),
                book_id = %block.data().book_id,
                "block appended"
            );
            Ok((StatusCode::CREATED, Json(block)))
        }
        Err(err) => {
            tracing::warn!(error = %err, "append rejected");
            Err(err.into())
        }
    }
}

/// POST /new
async fn new_book(payload: Result<Json<Book>, JsonRejection>) -> Result<Json<Book>, ApiError> {
    let Json(book) = payload.inspect_err(|rejection| {
        tracing::warn!(error = %rejection.body_text(), "could not decode book");
    })?;
    let book = book.with_derived_id();
    tracing::debug!(isbn = %book.isbn, id = ?book.id, "catalog id derived");
    Ok(Json(book))
}

/// GET /validate
async fn validate_chain(State(state): State<AppState>) -> Json<ValidateResponse> {
    let blocks = state.chain.snapshot();
    let result = bookchain_log::validate_blocks(&blocks);
    if let Err(err) = &result {
        tracing::error!(error = %err, "chain failed validation");
    }
    Json(ValidateResponse {
        ok: result.is_ok(),
        length: blocks.len(),
        position: result.as_ref().err().and_then(ChainError::position),
        error: result.err().map(|e| e.to_string()),
    })
}

/// GET /health
async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
    })
}

/// The HTTP server
pub struct ApiServer {
    config: ServerConfig,
    state: AppState,
}

impl ApiServer {
    /// Create a server over `chain`
    #[must_use]
    pub fn new(config: ServerConfig, chain: SharedChain) -> Self {
        Self {
            config,
            state: AppState { chain },
        }
    }

    /// Router for this server's state
    #[must_use]
    pub fn router(&self) -> Router {
        create_router(self.state.clone())
    }

    /// Bind and serve until Ctrl-C
    ///
    /// # Errors
    ///
    /// Returns error if the address cannot be bound or the server fails
    pub async fn serve(self) -> std::io::Result<()> {
        log_chain(&self.state.chain);

        let listener = TcpListener::bind(self.config.bind).await?;
        tracing::info!(addr = %listener.local_addr()?, "listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

/// Dump every block at debug level
pub fn log_chain(chain: &SharedChain) {
    for block in chain.snapshot() {
        tracing::debug!(
            position = block.position(),
            prev_hash = %block.prev_hash().map(|h| h.to_hex()).unwrap_or_default(),
            data = ?block.data(),
            hash = %block.hash(),
            "block"
        );
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
