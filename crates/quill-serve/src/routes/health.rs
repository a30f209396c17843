//! Health check.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
}

/// `GET /health`
///
/// Always returns 200; the body reports whether ClickHouse is reachable.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match state.clickhouse.query("SELECT 1").execute().await {
        Ok(()) => "ok",
        Err(err) => {
            tracing::warn!(error = %err, "health check database ping failed");
            "unavailable"
        }
    };

    Json(HealthResponse {
        status: "ok",
        database,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_response_serializes_flat() {
        let body = serde_json::to_string(&HealthResponse {
            status: "ok",
            database: "unavailable",
        })
        .unwrap();
        assert_eq!(body, r#"{"status":"ok","database":"unavailable"}"#);
    }
}
