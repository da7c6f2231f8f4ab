//! HTTP delivery for sdkpack.
//!
//! Serves `GET /aws-sdk-<version>[.min].js?<services>` by running the
//! assembly engine of the requested version, plus a `/health` probe.
//!
//! Built on Axum; responses are gzip-compressed when the client accepts it.

pub mod path;
pub mod versions;

pub use path::{parse_bundle_path, query_to_spec};
pub use versions::{ServedVersion, VersionRegistry};

use axum::{
    Router,
    extract::{Path, RawQuery, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

/// Shared application state for the gateway.
pub struct GatewayState {
    pub versions: VersionRegistry,
}

pub type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/{file}", get(bundle_handler))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server.
pub async fn start(config: sdkpack_config::AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let versions = VersionRegistry::load(&config).await?;
    if versions.is_empty() {
        tracing::warn!("No SDK versions to serve; every bundle request will be rejected");
    }
    info!(versions = ?versions.names(), "Loaded served versions");

    let app = build_router(Arc::new(GatewayState { versions }));

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    served_versions: Vec<String>,
}

async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        served_versions: state
            .versions
            .names()
            .into_iter()
            .map(str::to_string)
            .collect(),
    })
}

async fn bundle_handler(
    State(state): State<SharedState>,
    Path(file): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    let Some((version, minified)) = parse_bundle_path(&file) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let Some(served) = state.versions.get(version) else {
        return text_response(
            StatusCode::BAD_REQUEST,
            format!("Unsupported SDK version {version}"),
        );
    };

    let spec = query_to_spec(query.as_deref());
    debug!(version, minified, spec = spec.as_deref().unwrap_or(""), "Bundle requested");

    match served.engine(minified).build(spec.as_deref()).await {
        Ok(code) => {
            let etag = format!("\"{}\"", hex::encode(Sha256::digest(code.as_bytes())));
            let not_modified = headers
                .get(header::IF_NONE_MATCH)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| etag_matches(v, &etag));
            if not_modified {
                return (StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response();
            }
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/javascript; charset=utf-8".to_string()),
                    (header::ETAG, etag),
                ],
                code,
            )
                .into_response()
        }
        Err(e) if e.is_request_error() => text_response(StatusCode::BAD_REQUEST, e.to_string()),
        Err(e) => {
            error!(version, error = %e, "Bundle build failed");
            text_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// `If-None-Match` uses weak comparison: `*` or any listed tag, with or
/// without the `W/` prefix.
fn etag_matches(if_none_match: &str, etag: &str) -> bool {
    if_none_match.split(',').map(str::trim).any(|candidate| {
        candidate == "*" || candidate.strip_prefix("W/").unwrap_or(candidate) == etag
    })
}

fn text_response(status: StatusCode, body: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}
