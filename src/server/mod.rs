// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP API
//!
//! Exposes the generator as a single endpoint:
//! `POST /api/generate-csp` with `{ "url": "...", "use_wildcards": true }`
//! returns `{ "csp": "..." }` on success, or a structured error with a
//! short label and a human-readable detail string on failure.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::{Error, Result};
use crate::generator::CspGenerator;

/// Generation request body
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    /// Target URL (protocol-less inputs are normalized)
    pub url: String,
    /// Generalize known CDN subdomains to wildcards (default true)
    #[serde(default = "default_wildcards")]
    pub use_wildcards: bool,
}

fn default_wildcards() -> bool {
    true
}

/// Successful generation response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The generated policy string
    pub csp: String,
}

/// Structured failure response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short error label
    pub error: String,
    /// Human-readable detail
    pub details: String,
}

/// API error wrapper mapping the taxonomy onto HTTP status codes
struct ApiError(Error);

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0 {
            Error::InvalidInput { .. } | Error::Url(_) => StatusCode::BAD_REQUEST,
            Error::NavigationTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            Error::NameResolution { .. } | Error::Protocol { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.0.label().to_string(),
            details: self.0.detail(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Build the API router around a generator
pub fn router(generator: CspGenerator) -> Router {
    Router::new()
        .route("/api/generate-csp", post(generate_handler))
        .with_state(Arc::new(generator))
}

async fn generate_handler(
    State(generator): State<Arc<CspGenerator>>,
    Json(request): Json<GenerateRequest>,
) -> std::result::Result<Json<GenerateResponse>, ApiError> {
    info!(url = %request.url, wildcards = request.use_wildcards, "API request");

    match generator.generate(&request.url, request.use_wildcards).await {
        Ok(csp) => Ok(Json(GenerateResponse { csp })),
        Err(e) => {
            error!(url = %request.url, error = %e, "generation failed");
            Err(ApiError(e))
        }
    }
}

/// Run the API server until the listener fails
pub async fn serve(generator: CspGenerator, port: u16) -> Result<()> {
    let app = router(generator);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "API server listening");
    axum::serve(listener, app)
        .await
        .map_err(|e| Error::other(format!("server error: {}", e)))
}
