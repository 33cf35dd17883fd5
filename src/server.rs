//! HTTP boundary: one endpoint that turns `{url?, text?}` into a gist.

use crate::agent;
use crate::config::Config;
use crate::content::{GistRequest, InputError};
use crate::error::{ErrorKind, GistError};
use crate::extractor::ContentExtractor;
use crate::reasoning::LazyReasoning;
use crate::summary::GistResult;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Shared state for request handlers
pub struct AppState {
    pub extractor: ContentExtractor,
    pub reasoning: LazyReasoning,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self, GistError> {
        Ok(Self {
            extractor: ContentExtractor::new(&config.extractor)?,
            reasoning: LazyReasoning::new(config.clone()),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: ErrorKind,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

impl IntoResponse for GistError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        match kind {
            ErrorKind::InvalidInput => warn!(error = %self, "rejected request"),
            ErrorKind::Configuration | ErrorKind::Internal => {
                error!(?kind, error = %self, "gist request failed")
            }
        }
        let body = ErrorBody {
            error: self.to_string(),
            kind,
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/gist", post(create_gist))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API until the process is stopped
pub async fn serve(config: &Config, addr: &str) -> anyhow::Result<()> {
    let state = Arc::new(AppState::from_config(config)?);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn create_gist(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GistRequest>, JsonRejection>,
) -> Result<Json<GistResult>, GistError> {
    let Json(request) = payload.map_err(|rejection| InputError::Body(rejection.body_text()))?;
    request.validate()?;
    let reasoning = state.reasoning.get().await?;

    let content = state.extractor.extract(&request).await?;
    let gist = agent::summarize(reasoning, &content).await?;

    Ok(Json(gist))
}
