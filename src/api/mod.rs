//! Availability REST API
//!
//! HTTP API layer for the availability store, built with Axum.
//!
//! # Endpoints
//!
//! ## Entities
//! - `GET /api/v1/availability` - List entities
//! - `POST /api/v1/availability` - Create an entity
//! - `GET /api/v1/availability/:id` - Entity storage summary
//! - `DELETE /api/v1/availability/:id` - Remove an entity
//!
//! ## Ranges
//! - `PUT /api/v1/availability/:id/range` - Mark `[from, to)` available or not
//! - `GET /api/v1/availability/:id/range` - Query `[from, to)` at any resolution
//!
//! ## Single units
//! - `PUT /api/v1/availability/:id/at` - Mark the unit containing `at`
//! - `GET /api/v1/availability/:id/at` - Read the unit containing `at`
//!
//! ## Health
//! - `GET /health/live` - Liveness check
//! - `GET /health/ready` - Readiness check
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,no_run
//! use availability::api::{serve, AppState};
//! use availability::config::Config;
//! use availability::store::MemoryCollection;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let store = Arc::new(MemoryCollection::new());
//!
//!     let state = AppState::new(store, config.api.clone(), config.store.clone());
//!     serve(state, &config.api).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{ApiConfig, AppState};

use axum::{
    http::HeaderValue,
    routing::{get, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route(
            "/availability",
            get(routes::availability::list_availabilities)
                .post(routes::availability::create_availability),
        )
        .route(
            "/availability/:id",
            get(routes::availability::get_availability)
                .delete(routes::availability::delete_availability),
        )
        .route(
            "/availability/:id/range",
            put(routes::availability::set_range).get(routes::availability::get_range),
        )
        .route(
            "/availability/:id/at",
            put(routes::availability::set_at).get(routes::availability::get_at),
        );

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let cors = cors_layer(&state.config.cors_origins);
    let timeout = Duration::from_secs(state.config.request_timeout_secs);

    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

/// Permissive when no origins are configured
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Availability API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Availability API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::store::MemoryCollection;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::Value;
    use tower::util::ServiceExt;

    fn create_test_app_with(store_config: StoreConfig) -> Router {
        create_test_app_full(ApiConfig::default(), store_config)
    }

    fn create_test_app_full(api_config: ApiConfig, store_config: StoreConfig) -> Router {
        let store = Arc::new(MemoryCollection::new());
        let state = AppState::new(store, api_config, store_config);
        build_router(state)
    }

    fn create_test_app() -> Router {
        create_test_app_with(StoreConfig::default())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn json(method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_live() {
        let app = create_test_app();
        let response = app.oneshot(get("/health/live")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_ready() {
        let app = create_test_app();
        let response = app.oneshot(get("/health/ready")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_full() {
        let app = create_test_app();
        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["entities"], 0);
    }

    #[tokio::test]
    async fn test_list_empty() {
        let app = create_test_app();
        let response = app.oneshot(get("/api/v1/availability")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["total"], 0);
    }

    #[tokio::test]
    async fn test_create_and_conflict() {
        let app = create_test_app();

        let response = app
            .clone()
            .oneshot(json(
                "POST",
                "/api/v1/availability",
                r#"{"id": "room-1", "resolution": "15min"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["resolution"], "15min");
        assert_eq!(body["segments"], 0);

        let response = app
            .oneshot(json("POST", "/api/v1/availability", r#"{"id": "room-1"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_resolution() {
        let app = create_test_app();

        let response = app
            .clone()
            .oneshot(json(
                "POST",
                "/api/v1/availability",
                r#"{"id": "a", "resolution": "fortnight"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        // 7 minutes do not divide a day
        let response = app
            .oneshot(json(
                "POST",
                "/api/v1/availability",
                r#"{"id": "a", "resolution": "420s"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_set_and_query_range() {
        let app = create_test_app();

        let response = app
            .clone()
            .oneshot(json(
                "PUT",
                "/api/v1/availability/desk/range",
                r#"{"from": "2024-03-04T09:00:00Z", "to": "2024-03-04T09:15:00Z", "available": true}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["resolution"], "5min");

        let response = app
            .clone()
            .oneshot(get(
                "/api/v1/availability/desk/range?from=2024-03-04T08:55:00Z&to=2024-03-04T09:20:00Z",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["available"], serde_json::json!([0, 1, 1, 1, 0]));
        assert_eq!(body["count"], 3);
        assert_eq!(body["all"], false);

        let response = app
            .oneshot(get(
                "/api/v1/availability/desk/range?from=2024-03-04T09:00:00Z&to=2024-03-04T10:00:00Z&resolution=15min&policy=any",
            ))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["resolution"], "15min");
        assert_eq!(body["internal_resolution"], "5min");
        assert_eq!(body["available"], serde_json::json!([1, 0, 0, 0]));
    }

    #[tokio::test]
    async fn test_query_validation() {
        let app = create_test_app();
        app.clone()
            .oneshot(json(
                "PUT",
                "/api/v1/availability/desk/at",
                r#"{"at": "2024-03-04T09:00:00Z", "available": true}"#,
            ))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(get(
                "/api/v1/availability/desk/range?from=2024-03-04T09:00:00Z&to=2024-03-04T10:00:00Z&policy=mostly",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(get(
                "/api/v1/availability/desk/range?from=2024-03-04T09:00:00Z&to=2024-03-04T10:00:00Z&resolution=420s",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_set_and_get_at() {
        let app = create_test_app();

        let response = app
            .clone()
            .oneshot(json(
                "PUT",
                "/api/v1/availability/desk/at",
                r#"{"at": "2024-03-04T09:02:30Z", "available": true}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(get("/api/v1/availability/desk/at?at=2024-03-04T09:04:59Z"))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["available"], true);

        let response = app
            .oneshot(get("/api/v1/availability/desk/at?at=2024-03-04T09:05:00Z"))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["available"], false);
    }

    #[tokio::test]
    async fn test_unknown_entity() {
        let app = create_test_app();

        let response = app
            .clone()
            .oneshot(get("/api/v1/availability/ghost"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(get("/api/v1/availability/ghost/at?at=2024-03-04T09:00:00Z"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_write_without_auto_create() {
        let app = create_test_app_with(StoreConfig {
            auto_create: false,
            ..StoreConfig::default()
        });

        let response = app
            .oneshot(json(
                "PUT",
                "/api/v1/availability/desk/at",
                r#"{"at": "2024-03-04T09:00:00Z", "available": true}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete() {
        let app = create_test_app();
        app.clone()
            .oneshot(json("POST", "/api/v1/availability", r#"{"id": "room"}"#))
            .await
            .unwrap();

        let delete = || {
            Request::builder()
                .method("DELETE")
                .uri("/api/v1/availability/room")
                .body(Body::empty())
                .unwrap()
        };

        let response = app.clone().oneshot(delete()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(delete()).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_range_limit() {
        let app = create_test_app_full(
            ApiConfig {
                max_units: 100,
                ..ApiConfig::default()
            },
            StoreConfig::default(),
        );

        // A year at 5 minute units is far over the limit, and nothing is created
        let response = app
            .clone()
            .oneshot(json(
                "PUT",
                "/api/v1/availability/desk/range",
                r#"{"from": "2024-01-01T00:00:00Z", "to": "2025-01-01T00:00:00Z", "available": true}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .clone()
            .oneshot(get("/api/v1/availability/desk"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .clone()
            .oneshot(json(
                "PUT",
                "/api/v1/availability/desk/range",
                r#"{"from": "2024-03-04T09:00:00Z", "to": "2024-03-04T10:00:00Z", "available": true}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(get(
                "/api/v1/availability/desk/range?from=2024-03-04T09:00:00Z&to=2024-03-04T10:00:00Z",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // An hour at one second units is 3600 units
        let response = app
            .oneshot(get(
                "/api/v1/availability/desk/range?from=2024-03-04T09:00:00Z&to=2024-03-04T10:00:00Z&resolution=sec",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let app = create_test_app();
        let response = app
            .oneshot(json("PUT", "/api/v1/availability/desk/range", "not json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
