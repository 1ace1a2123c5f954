//! HTTP control surface.
//!
//! Thin glue over [`ExchangeManager`]: request parsing, the bearer-token
//! gate, and error-to-status mapping live here and nowhere deeper. No core
//! type knows about HTTP.

pub mod auth;
pub mod handlers;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::error::ManagerError;
use crate::manager::ExchangeManager;

use self::auth::require_token;
use self::handlers::*;

/// State injected into every handler.
#[derive(Clone)]
pub struct ApiState {
    pub manager: Arc<ExchangeManager>,
    pub api_key: String,
}

/// Build the full management router.
pub fn router(state: ApiState, request_timeout: Duration) -> Router {
    let protected = Router::new()
        .route("/system/reload", post(system_reload))
        .route("/exchanges", get(list_exchanges).post(declare_exchange))
        .route(
            "/exchanges/{name}",
            get(get_exchange).put(update_exchange).delete(delete_exchange),
        )
        .route("/exchanges/{name}/status", get(exchange_status))
        .route("/exchanges/{name}/reload", post(reload_exchange))
        .route(
            "/exchanges/{name}/consumers",
            get(list_consumers).post(bind_consumer),
        )
        .route(
            "/exchanges/{name}/consumers/{consumer_id}",
            axum::routing::delete(unbind_consumer),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_token));

    Router::new()
        .route("/system/status", get(system_status))
        .merge(protected)
        .with_state(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
}

/// Response-side wrapper mapping core errors onto HTTP statuses.
pub struct ApiError(pub ManagerError);

impl From<ManagerError> for ApiError {
    fn from(err: ManagerError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ManagerError::Validation { .. } => StatusCode::BAD_REQUEST,
            ManagerError::AlreadyExists(_) => StatusCode::CONFLICT,
            ManagerError::NotFound(_) | ManagerError::ConsumerNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            ManagerError::Broker { .. } => StatusCode::BAD_GATEWAY,
            ManagerError::DrainTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            ManagerError::PartialFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(serde_json::json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}
