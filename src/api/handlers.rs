//! Management endpoint handlers.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::api::{ApiError, ApiState};
use crate::exchange::{Consumer, Exchange, ExchangeDefinition, NewConsumer};
use crate::orchestrator::ConsumerStatus;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub exchanges: usize,
    pub consumer_processes: usize,
}

#[derive(Serialize)]
pub struct ReloadOutcome {
    pub reloaded: usize,
}

pub async fn system_status(State(state): State<ApiState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        exchanges: state.manager.exchanges().len(),
        consumer_processes: state.manager.processes().count(),
    })
}

pub async fn system_reload(
    State(state): State<ApiState>,
) -> Result<Json<ReloadOutcome>, ApiError> {
    let reloaded = state.manager.reload_all().await?;
    Ok(Json(ReloadOutcome { reloaded }))
}

pub async fn list_exchanges(State(state): State<ApiState>) -> Json<Vec<Exchange>> {
    Json(state.manager.list())
}

pub async fn declare_exchange(
    State(state): State<ApiState>,
    Json(def): Json<ExchangeDefinition>,
) -> Result<Json<Exchange>, ApiError> {
    let exchange = state.manager.declare(def).await?;
    Ok(Json(exchange))
}

pub async fn get_exchange(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> Result<Json<Exchange>, ApiError> {
    let exchange = state.manager.get(&name)?;
    Ok(Json(exchange))
}

pub async fn update_exchange(
    State(state): State<ApiState>,
    Path(name): Path<String>,
    Json(mut def): Json<ExchangeDefinition>,
) -> Result<Json<Exchange>, ApiError> {
    // The path identifies the exchange; the body carries the new fields.
    def.name = name;
    let exchange = state.manager.update(def).await?;
    Ok(Json(exchange))
}

pub async fn delete_exchange(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.manager.delete(&name).await?;
    Ok(Json(serde_json::json!({ "deleted": name })))
}

pub async fn exchange_status(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<ConsumerStatus>>, ApiError> {
    let rows = state.manager.status(&name).await?;
    Ok(Json(rows))
}

pub async fn reload_exchange(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.manager.reload_exchange(&name).await?;
    Ok(Json(serde_json::json!({ "reloaded": name })))
}

pub async fn list_consumers(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<Consumer>>, ApiError> {
    let consumers = state.manager.consumers(&name)?;
    Ok(Json(consumers))
}

pub async fn bind_consumer(
    State(state): State<ApiState>,
    Path(name): Path<String>,
    Json(request): Json<NewConsumer>,
) -> Result<Json<Consumer>, ApiError> {
    let consumer = state.manager.bind_consumer(&name, request)?;
    Ok(Json(consumer))
}

pub async fn unbind_consumer(
    State(state): State<ApiState>,
    Path((name, consumer_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.manager.unbind_consumer(&name, &consumer_id)?;
    Ok(Json(serde_json::json!({ "unbound": consumer_id })))
}
