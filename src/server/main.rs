//! HTTP server for administrative boundary analysis.
//!
//! Accepts a point, line or polygon as JSON and answers with the departments
//! and municipalities it falls in or crosses.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use mojon::config::Config;
use mojon::models::{GeometryKind, LineAnalysis, PointAnalysis, PolygonAnalysis};
use mojon::{ApiResponse, Locator, LocatorError, MemoryCatalog};

#[derive(Parser, Debug)]
#[command(name = "locator-server")]
#[command(about = "Administrative boundary locator server")]
struct Args {
    /// Path to TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address (overrides config)
    #[arg(short, long)]
    listen: Option<String>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Application state shared across handlers
struct AppState {
    locator: Locator,
    catalog: MemoryCatalog,
}

#[derive(Deserialize, Debug)]
struct GeometryRequest<C> {
    #[serde(rename = "type")]
    kind: Option<GeometryKind>,
    coordinates: C,
}

type ApiReply<T> = (StatusCode, Json<ApiResponse<T>>);

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Mojon Locator Server");

    let config = match &args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Config::load_from_file(path)
                .with_context(|| format!("Failed to load config {:?}", path))?
        }
        None => Config::default(),
    };

    let catalog = MemoryCatalog::from_config(&config.catalog)
        .context("Failed to load administrative catalog")?;

    // Read boundary files before taking traffic
    let locator = tokio::task::spawn_blocking({
        let config = config.clone();
        move || {
            let locator = Locator::from_config(&config);
            locator.store().preload();
            locator
        }
    })
    .await
    .context("Boundary preload task failed")?;

    info!(
        "Ready: {} departments, {} municipalities in catalog",
        catalog.department_count(),
        catalog.municipality_count()
    );

    let state = Arc::new(AppState { locator, catalog });

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/api/point/analyze", post(point_handler))
        .route("/api/line/analyze", post(line_handler))
        .route("/api/polygon/analyze", post(polygon_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listen = args.listen.unwrap_or(config.server.listen);
    info!("Starting server on {}", listen);

    let listener = tokio::net::TcpListener::bind(&listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let store = state.locator.store();
    Json(HealthResponse {
        status: "ok",
        department_boundaries: store.departments().len(),
        municipality_boundaries: store.municipalities().len(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    department_boundaries: usize,
    municipality_boundaries: usize,
}

async fn point_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GeometryRequest<Vec<f64>>>, JsonRejection>,
) -> ApiReply<PointAnalysis> {
    let request = match accept(payload, GeometryKind::Point) {
        Ok(request) => request,
        Err(reply) => return reply,
    };

    run_blocking(state, move |state| {
        state
            .locator
            .analyze_point(&request.coordinates, &state.catalog)
    })
    .await
}

async fn line_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GeometryRequest<Vec<Vec<f64>>>>, JsonRejection>,
) -> ApiReply<LineAnalysis> {
    let request = match accept(payload, GeometryKind::Line) {
        Ok(request) => request,
        Err(reply) => return reply,
    };

    run_blocking(state, move |state| {
        state
            .locator
            .analyze_line(&request.coordinates, &state.catalog)
    })
    .await
}

async fn polygon_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GeometryRequest<Vec<Vec<Vec<f64>>>>>, JsonRejection>,
) -> ApiReply<PolygonAnalysis> {
    let request = match accept(payload, GeometryKind::Polygon) {
        Ok(request) => request,
        Err(reply) => return reply,
    };

    run_blocking(state, move |state| {
        state
            .locator
            .analyze_polygon(&request.coordinates, &state.catalog)
    })
    .await
}

/// Unwrap a request body, rejecting malformed JSON and mismatched `type` tags
fn accept<C, T>(
    payload: Result<Json<GeometryRequest<C>>, JsonRejection>,
    expected: GeometryKind,
) -> Result<GeometryRequest<C>, ApiReply<T>> {
    let Json(request) = payload.map_err(|e| bad_request(e.body_text()))?;

    match request.kind {
        Some(kind) if kind != expected => Err(bad_request(format!(
            "expected {} geometry, got {}",
            expected, kind
        ))),
        _ => Ok(request),
    }
}

/// Run a CPU-bound analysis off the async workers
async fn run_blocking<T, F>(state: Arc<AppState>, f: F) -> ApiReply<T>
where
    T: Send + 'static,
    F: FnOnce(&AppState) -> Result<T, LocatorError> + Send + 'static,
{
    match tokio::task::spawn_blocking(move || f(&state)).await {
        Ok(result) => reply(result),
        Err(e) => {
            error!("Analysis task failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::failure("analysis task failed")),
            )
        }
    }
}

/// Validation errors are client errors; processing errors keep a 200 status
fn reply<T>(result: Result<T, LocatorError>) -> ApiReply<T> {
    match result {
        Ok(data) => (StatusCode::OK, Json(ApiResponse::ok(data))),
        Err(e) if e.is_validation() => bad_request(e.to_string()),
        Err(e) => (StatusCode::OK, Json(ApiResponse::failure(e.to_string()))),
    }
}

fn bad_request<T>(message: impl Into<String>) -> ApiReply<T> {
    (StatusCode::BAD_REQUEST, Json(ApiResponse::failure(message)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_type_is_optional() {
        let request: GeometryRequest<Vec<f64>> =
            serde_json::from_str(r#"{"coordinates": [-74.08, 4.6]}"#).unwrap();
        assert!(request.kind.is_none());

        let request: GeometryRequest<Vec<Vec<f64>>> =
            serde_json::from_str(r#"{"type": "line", "coordinates": [[-74.1, 4.6], [-74.0, 4.7]]}"#)
                .unwrap();
        assert_eq!(request.kind, Some(GeometryKind::Line));
        assert_eq!(request.coordinates.len(), 2);
    }

    #[test]
    fn test_validation_error_maps_to_bad_request() {
        let err = LocatorError::OutOfBounds { lng: 2.35, lat: 48.85 };
        let (status, Json(body)) = reply::<()>(Err(err));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body.success);
        assert!(body.error.is_some());
    }

    #[test]
    fn test_processing_error_keeps_ok_status() {
        let err = LocatorError::Processing {
            kind: GeometryKind::Polygon,
            message: "self-intersection".to_string(),
        };
        let (status, Json(body)) = reply::<()>(Err(err));
        assert_eq!(status, StatusCode::OK);
        assert!(!body.success);
        assert_eq!(
            body.error.as_deref(),
            Some("error analyzing polygon: self-intersection")
        );
    }

    #[test]
    fn test_mismatched_type_is_rejected() {
        let request = GeometryRequest {
            kind: Some(GeometryKind::Line),
            coordinates: vec![-74.08, 4.6],
        };
        let (status, Json(body)) =
            accept::<_, ()>(Ok(Json(request)), GeometryKind::Point).unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error.as_deref(), Some("expected point geometry, got line"));
    }
}
