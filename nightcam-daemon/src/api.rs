//! HTTP control API.
//!
//! | method | path              | response                                         |
//! |--------|-------------------|--------------------------------------------------|
//! | GET    | `/api/status`     | `{"status":"ok","mode":..,"night_mode":..}`      |
//! | GET    | `/api/night-mode` | `{"enabled":..}`                                 |
//! | POST   | `/api/night-mode` | `{"success":true,"enabled":..,"mode":..}` or 500 |
//! | GET    | `/`               | 301 to the WebRTC viewer                         |
//!
//! Everything else answers `404 {"error":"Not found"}`. Every response carries
//! permissive CORS headers and `OPTIONS` preflights are answered by the CORS layer.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use nightcam_core::{Mode, Settings};
use nightcam_switch::{Orchestrator, TransitionError};

/// Shared handler state.
#[derive(Clone)]
pub struct ApiState {
    orchestrator: Arc<Orchestrator>,
    viewer_port: u16,
    media_path: Arc<str>,
}

impl ApiState {
    pub fn new(orchestrator: Arc<Orchestrator>, settings: &Settings) -> Self {
        Self {
            orchestrator,
            viewer_port: settings.viewer_port,
            media_path: Arc::from(settings.media_path.as_str()),
        }
    }
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct StatusBody {
    status: &'static str,
    mode: Mode,
    night_mode: bool,
}

#[derive(Debug, Serialize)]
struct NightModeBody {
    enabled: bool,
}

/// `POST /api/night-mode` request. A missing `enabled` means day.
#[derive(Debug, Default, Deserialize)]
struct NightModeRequest {
    #[serde(default)]
    enabled: bool,
}

#[derive(Debug, Serialize)]
struct SwitchedBody {
    success: bool,
    enabled: bool,
    mode: Mode,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct FailureBody {
    success: bool,
    error: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
}

fn error_response(status: StatusCode, error: &'static str) -> Response {
    (status, Json(ErrorBody { error })).into_response()
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the control API router.
pub fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(viewer_redirect).fallback(not_found))
        .route("/api/status", get(status).fallback(not_found))
        .route(
            "/api/night-mode",
            get(night_mode).post(set_night_mode).fallback(not_found),
        )
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn status(State(state): State<ApiState>) -> Json<StatusBody> {
    let mode = state.orchestrator.mode();
    Json(StatusBody {
        status: "ok",
        mode,
        night_mode: mode.is_night(),
    })
}

async fn night_mode(State(state): State<ApiState>) -> Json<NightModeBody> {
    Json(NightModeBody {
        enabled: state.orchestrator.mode().is_night(),
    })
}

async fn set_night_mode(State(state): State<ApiState>, body: Bytes) -> Response {
    let request = match parse_request(&body) {
        Ok(request) => request,
        Err(err) => {
            tracing::warn!(error = %err, "rejected night-mode request");
            return error_response(StatusCode::BAD_REQUEST, "Invalid JSON");
        }
    };

    let enabled = request.enabled;
    let orchestrator = Arc::clone(&state.orchestrator);
    let outcome = tokio::task::spawn_blocking(move || orchestrator.set_night_mode(enabled)).await;

    match outcome {
        Ok(Ok(transition)) => {
            let mode = transition.mode();
            Json(SwitchedBody {
                success: true,
                enabled: mode.is_night(),
                mode,
                message: (!transition.changed()).then_some("No change needed"),
            })
            .into_response()
        }
        Ok(Err(err)) => {
            tracing::error!(error = %err, requested = enabled, "night-mode change failed");
            failure(failure_message(&err))
        }
        Err(err) => {
            tracing::error!(error = %err, "transition task aborted");
            failure("Transition aborted")
        }
    }
}

async fn viewer_redirect(State(state): State<ApiState>, headers: HeaderMap) -> Response {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let location = viewer_url(host, state.viewer_port, &state.media_path);
    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response()
}

async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

fn failure(error: &'static str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(FailureBody {
            success: false,
            error,
        }),
    )
        .into_response()
}

/// A blank body means day; anything else must be a JSON object.
fn parse_request(body: &[u8]) -> Result<NightModeRequest, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(NightModeRequest::default());
    }
    let value: serde_json::Value = serde_json::from_slice(body)?;
    if !value.is_object() {
        return Err(serde::de::Error::custom("expected a JSON object"));
    }
    serde_json::from_value(value)
}

fn failure_message(err: &TransitionError) -> &'static str {
    match err {
        TransitionError::Render { .. } => "Failed to render config",
        TransitionError::Persist(_) => "Failed to write config",
        TransitionError::Restart { .. } => "Failed to restart MediaMTX",
    }
}

/// `http://<host>:<viewer_port>/<media_path>/`, keeping the request's host name.
fn viewer_url(host: &str, viewer_port: u16, media_path: &str) -> String {
    let hostname = if host.starts_with('[') {
        // IPv6 literal: keep the brackets, drop any port after them.
        host.find(']').map_or(host, |end| &host[..=end])
    } else {
        host.rsplit_once(':').map_or(host, |(name, _port)| name)
    };
    format!("http://{hostname}:{viewer_port}/{media_path}/")
}
