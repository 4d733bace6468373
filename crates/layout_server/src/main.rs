use std::{io::ErrorKind, net::SocketAddr, path::PathBuf, sync::Arc};

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde_json::Value;
use shared::{
    error::{ApiError, ErrorCode},
    Resource,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;

use config::load_settings;

struct AppState {
    data_dir: PathBuf,
}

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings();
    if !settings.data_dir.is_dir() {
        warn!(data_dir = %settings.data_dir.display(), "data directory does not exist yet");
    }

    let app = build_router(Arc::new(AppState {
        data_dir: settings.data_dir.clone(),
    }));

    let addr: SocketAddr = settings.bind_addr.parse()?;
    info!(%addr, data_dir = %settings.data_dir.display(), "layout server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(Resource::Layout.path(), get(get_layout))
        .route(Resource::Components.path(), get(get_components))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn get_layout(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    read_resource(&state, Resource::Layout).await
}

async fn get_components(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    read_resource(&state, Resource::Components).await
}

/// Serves the fixture file as-is; any well-formed JSON passes through.
async fn read_resource(state: &AppState, resource: Resource) -> ApiResult<Json<Value>> {
    let path = state.data_dir.join(resource.file_name());
    let raw = tokio::fs::read_to_string(&path).await.map_err(|err| {
        if err.kind() == ErrorKind::NotFound {
            warn!(path = %path.display(), "{resource} fixture missing");
            api_error(
                StatusCode::NOT_FOUND,
                ErrorCode::NotFound,
                format!("no {resource} document available"),
            )
        } else {
            error!(path = %path.display(), error = %err, "failed to read {resource} fixture");
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::Internal,
                format!("failed to read {resource} document"),
            )
        }
    })?;

    let body = serde_json::from_str(&raw).map_err(|err| {
        error!(path = %path.display(), error = %err, "{resource} fixture is not valid json");
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::Internal,
            format!("{resource} document is not valid json"),
        )
    })?;
    Ok(Json(body))
}

fn api_error(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
) -> (StatusCode, Json<ApiError>) {
    (status, Json(ApiError::new(code, message)))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
