//! Operational routes mounted next to the entity routers.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use sqlx::PgPool;

#[derive(Debug, Serialize)]
struct Status {
    status: &'static str,
    /// Omitted when the service runs without a database.
    #[serde(skip_serializing_if = "Option::is_none")]
    database: Option<&'static str>,
}

async fn health() -> Json<Status> {
    Json(Status {
        status: "ok",
        database: None,
    })
}

/// 200 when the pool answers a round-trip (or there is no pool), 503 otherwise.
async fn ready(State(pool): State<Option<PgPool>>) -> (StatusCode, Json<Status>) {
    let Some(pool) = pool else {
        return (StatusCode::OK, Json(Status { status: "ok", database: None }));
    };
    match sqlx::query("SELECT 1").execute(&pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(Status {
                status: "ok",
                database: Some("ok"),
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(Status {
                    status: "degraded",
                    database: Some("unavailable"),
                }),
            )
        }
    }
}

async fn version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GET /health, GET /ready and GET /version. `/ready` checks `pool` when one is given.
pub fn common_routes(pool: Option<PgPool>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/version", get(version))
        .with_state(pool)
}
