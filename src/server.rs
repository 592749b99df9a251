//! HTTP surface: the authorization endpoint plus a REST face over the
//! storage router.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{Method, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::config::{AllowList, AppConfig};
use crate::error::StorageError;
use crate::oracle::AllowListOracle;
use crate::router::StorageRouter;
use crate::storage::FileStringStore;
use crate::types::{NewRestaurant, normalize_org_name};

#[derive(Clone)]
pub struct AppState {
    pub router: Arc<StorageRouter>,
    pub allow_list: AllowList,
    /// Table name used when probing user-supplied connections.
    pub table: String,
}

/// Build the application router over prepared state.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/health", get(health))
        .route("/api/auth", post(check_authorization).get(auth_method_not_allowed))
        .route("/restaurants", get(list_restaurants).post(add_restaurant))
        .route(
            "/restaurants/{id}",
            axum::routing::put(update_restaurant).delete(delete_restaurant),
        )
        .route(
            "/custom-config",
            get(custom_config_status)
                .post(save_custom_config)
                .delete(remove_custom_config),
        )
        .layer(cors)
        .with_state(state)
}

/// Wire real adapters from config and serve until shutdown.
pub async fn start_server(config: AppConfig) {
    let string_store = Arc::new(FileStringStore::new(config.data_dir.clone()));
    let oracle = Arc::new(AllowListOracle::new(config.allow_list.clone()));
    let state = AppState {
        router: Arc::new(StorageRouter::from_config(&config, string_store, oracle)),
        allow_list: config.allow_list.clone(),
        table: config.table.clone(),
    };

    let address = format!("0.0.0.0:{}", config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address)
        .await
        .expect("failed to bind listen address");
    info!("Server running on {address}");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    info!("Server shutting down");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

// ── Handlers ──

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "makan-where"
    }))
}

/// `POST /api/auth`: is this organization allow-listed for the shared
/// store? A missing or blank username is the caller's error.
async fn check_authorization(
    State(state): State<AppState>,
    Json(payload): Json<serde_json::Value>,
) -> Response {
    let username = payload["username"].as_str().unwrap_or_default();
    if username.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "Username is required" })),
        )
            .into_response();
    }

    let normalized = normalize_org_name(username);
    let is_authorized = state.allow_list.contains(&normalized);

    Json(serde_json::json!({
        "isAuthorized": is_authorized,
        "username": normalized,
        "timestamp": Utc::now().to_rfc3339(),
    }))
    .into_response()
}

async fn auth_method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(serde_json::json!({ "error": "Method not allowed" })),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
struct OrgQuery {
    org: Option<String>,
}

impl OrgQuery {
    fn require(self) -> Result<String, StorageError> {
        match self.org {
            Some(org) if !org.trim().is_empty() => Ok(org),
            _ => Err(StorageError::validation("Organization name is required")),
        }
    }
}

async fn list_restaurants(
    State(state): State<AppState>,
    Query(query): Query<OrgQuery>,
) -> Result<Response, StorageError> {
    let org = query.require()?;
    let restaurants = state.router.list(&org).await?;
    Ok(Json(restaurants).into_response())
}

async fn add_restaurant(
    State(state): State<AppState>,
    Query(query): Query<OrgQuery>,
    Json(restaurant): Json<NewRestaurant>,
) -> Result<Response, StorageError> {
    let org = query.require()?;
    let added = state.router.add(&org, restaurant).await?;
    Ok((StatusCode::CREATED, Json(added)).into_response())
}

async fn update_restaurant(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<OrgQuery>,
    Json(restaurant): Json<NewRestaurant>,
) -> Result<Response, StorageError> {
    let org = query.require()?;
    let updated = state.router.update(&org, &id, restaurant).await?;
    Ok(Json(updated).into_response())
}

async fn delete_restaurant(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<OrgQuery>,
) -> Result<Response, StorageError> {
    let org = query.require()?;
    state.router.delete(&org, &id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

#[derive(Debug, Deserialize)]
struct CustomConfigBody {
    url: String,
    key: String,
}

async fn custom_config_status(
    State(state): State<AppState>,
    Query(query): Query<OrgQuery>,
) -> Result<Response, StorageError> {
    let org = query.require()?;
    Ok(Json(serde_json::json!({
        "hasConfig": state.router.has_custom_config(&org),
    }))
    .into_response())
}

/// One-time setup for a user-supplied store: probe the connection, then
/// persist it. Validation failures come back 400 with the precise reason
/// (bad credential, missing table, unreachable host).
async fn save_custom_config(
    State(state): State<AppState>,
    Query(query): Query<OrgQuery>,
    Json(body): Json<CustomConfigBody>,
) -> Result<Response, StorageError> {
    let org = query.require()?;
    if body.url.trim().is_empty() || body.key.trim().is_empty() {
        return Err(StorageError::validation(
            "Please fill in both URL and API key",
        ));
    }

    if let Err(reason) = state
        .router
        .validate_custom_connection(body.url.trim(), body.key.trim(), state.table.as_str())
        .await
    {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": reason.to_string() })),
        )
            .into_response());
    }

    state
        .router
        .custom_configs()
        .save(&org, body.url.trim(), body.key.trim())?;
    Ok(Json(serde_json::json!({ "hasConfig": true })).into_response())
}

async fn remove_custom_config(
    State(state): State<AppState>,
    Query(query): Query<OrgQuery>,
) -> Result<Response, StorageError> {
    let org = query.require()?;
    state.router.custom_configs().remove(&org)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

impl IntoResponse for StorageError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // log the full chain before it collapses into a user-facing summary
        match &self {
            StorageError::Backend { message, cause } => {
                error!(%message, %cause, "storage operation failed");
            }
            other => error!(error = %other, "storage operation failed"),
        }

        let message = match &self {
            // curated summaries stay; incidental internals do not leak
            StorageError::Serialization(_) | StorageError::AuthorizationCheckFailed => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
