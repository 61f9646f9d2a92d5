/// Health check endpoint
///
/// # Endpoint
///
/// ```text
/// GET /healthz
/// ```
///
/// # Response
///
/// ```json
/// {
///   "ok": true,
///   "version": "0.1.0",
///   "backend": "postgres",
///   "database": "connected"
/// }
/// ```
///
/// Always answers 200; a failed store ping shows up as `ok: false` and
/// `database: "disconnected"`.

use crate::app::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub version: String,

    /// Storage backend (`postgres` or `memory`)
    pub backend: String,

    /// Database status
    pub database: String,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let connected = match state.store.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the database");
            false
        }
    };

    Json(HealthResponse {
        ok: connected,
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: state.store.backend().to_string(),
        database: if connected { "connected" } else { "disconnected" }.to_string(),
    })
}
