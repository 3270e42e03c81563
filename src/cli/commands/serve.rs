//! HTTP API server.
//!
//! Serves `GET /quote`. The server starts accepting requests right away and
//! answers 503 until the language model has been initialized by the startup
//! task. The model handle is set once and read-only afterwards.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::QotdError;
use crate::orchestrator::Orchestrator;
use crate::quote::{Quote, QuoteRequest};
use axum::{
    extract::{Query, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::{Arc, OnceLock};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tracing::{error, info, warn};

/// Shared application state.
#[derive(Default)]
pub struct AppState {
    orchestrator: OnceLock<Orchestrator>,
}

impl AppState {
    /// State with the model already initialized.
    pub fn ready(orchestrator: Orchestrator) -> Self {
        let state = Self::default();
        // Freshly created, so the cell is empty
        let _ = state.orchestrator.set(orchestrator);
        state
    }

    /// Publish the initialized pipeline. Returns false if it was already set.
    pub fn initialize(&self, orchestrator: Orchestrator) -> bool {
        self.orchestrator.set(orchestrator).is_ok()
    }

    pub fn is_ready(&self) -> bool {
        self.orchestrator.get().is_some()
    }

    fn orchestrator(&self) -> Option<&Orchestrator> {
        self.orchestrator.get()
    }
}

/// Run the HTTP API server.
pub async fn run_serve(
    host: Option<String>,
    port: Option<u16>,
    settings: Settings,
) -> anyhow::Result<()> {
    let state = Arc::new(AppState::default());
    let app = build_router(state.clone(), &settings.server.cors_origins)?;

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tokio::spawn(initialize_model(state, settings.clone()));

    Output::header("Quote of the Day AI API");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Quote", "GET  /quote?topic=<topic>&grade_level=<level>");
    Output::kv("Health", "GET  /health");
    println!();
    Output::kv("Model", &format!("{} @ {}", settings.llm.model, settings.llm.base_url));
    Output::kv("CORS origins", &settings.server.cors_origins.join(", "));
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Startup task: connect to the model and publish the pipeline.
///
/// On failure the server keeps running and answers 503.
async fn initialize_model(state: Arc<AppState>, settings: Settings) {
    match Orchestrator::connect(&settings).await {
        Ok(orchestrator) => {
            let model = orchestrator.model_name().to_string();
            if state.initialize(orchestrator) {
                info!("Language model {} initialized successfully", model);
            } else {
                warn!("Language model was already initialized");
            }
        }
        Err(e) => {
            error!("Error initializing language model: {}", e);
            warn!(
                "Ensure the Ollama server is running at {} and the model is available \
                 (ollama pull {})",
                settings.llm.base_url, settings.llm.model
            );
        }
    }
}

/// Build the router with CORS restricted to the given origins.
pub fn build_router(state: Arc<AppState>, cors_origins: &[String]) -> anyhow::Result<Router> {
    Ok(Router::new()
        .route("/quote", get(get_quote))
        .route("/health", get(health))
        .layer(cors_layer(cors_origins)?)
        .with_state(state))
}

/// Exact-match origin list; any method and header from those origins, with credentials.
fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|origin| {
            if origin.trim() == "*" {
                anyhow::bail!("Wildcard CORS origin cannot be combined with credentials");
            }
            HeaderValue::from_str(origin.trim())
                .map_err(|e| anyhow::anyhow!("Invalid CORS origin {:?}: {}", origin, e))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

// === Response Types ===

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    model_ready: bool,
}

/// Errors surfaced by the quote endpoint.
enum ApiError {
    NotReady,
    Pipeline(QotdError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::NotReady => (
                StatusCode::SERVICE_UNAVAILABLE,
                "AI service is not ready. Language model not loaded.".to_string(),
            ),
            ApiError::Pipeline(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Internal AI error: {}", e),
            ),
        };

        (status, Json(ErrorResponse { detail })).into_response()
    }
}

// === Handlers ===

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        model_ready: state.is_ready(),
    })
}

async fn get_quote(
    State(state): State<Arc<AppState>>,
    Query(request): Query<QuoteRequest>,
) -> Result<Json<Quote>, ApiError> {
    let orchestrator = state.orchestrator().ok_or(ApiError::NotReady)?;

    match orchestrator.get_quote(&request).await {
        Ok(quote) => Ok(Json(quote)),
        Err(e) => {
            error!("An error occurred during quote generation: {}", e);
            Err(ApiError::Pipeline(e))
        }
    }
}
