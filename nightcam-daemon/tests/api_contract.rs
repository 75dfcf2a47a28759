use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use nightcam_core::{Mode, Settings};
use nightcam_daemon::{router, ApiState};
use nightcam_switch::{Orchestrator, RestartError, ServiceController};

#[derive(Default)]
struct FakeSystemctl {
    restarts: AtomicUsize,
    broken: AtomicBool,
}

impl ServiceController for FakeSystemctl {
    fn restart(&self, unit: &str) -> Result<(), RestartError> {
        self.restarts.fetch_add(1, Ordering::SeqCst);
        if self.broken.load(Ordering::SeqCst) {
            return Err(RestartError::Failed {
                command: format!("systemctl restart {unit}"),
                status: "exit status: 1".to_string(),
                output: "Job failed".to_string(),
            });
        }
        Ok(())
    }
}

struct Harness {
    _tmp: TempDir,
    settings: Settings,
    ctl: Arc<FakeSystemctl>,
    app: Router,
}

fn harness() -> Harness {
    let tmp = TempDir::new().expect("tmp");
    let settings = Settings {
        config_path: tmp.path().join("mediamtx.yml"),
        ..Settings::default()
    };
    let ctl = Arc::new(FakeSystemctl::default());
    let orchestrator =
        Arc::new(Orchestrator::from_settings(&settings, ctl.clone()).expect("orchestrator"));
    let app = router(ApiState::new(orchestrator, &settings));
    Harness {
        _tmp: tmp,
        settings,
        ctl,
        app,
    }
}

async fn send(app: &Router, method: Method, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.expect("request");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

// ---------------------------------------------------------------------------
// Read endpoints
// ---------------------------------------------------------------------------

#[tokio::test]
async fn status_starts_in_day() {
    let h = harness();
    let (status, body) = send(&h.app, Method::GET, "/api/status", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "mode": "day", "night_mode": false}));

    let (status, body) = send(&h.app, Method::GET, "/api/night-mode", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"enabled": false}));
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn enabling_night_mode_switches_and_reports() {
    let h = harness();
    let (status, body) =
        send(&h.app, Method::POST, "/api/night-mode", r#"{"enabled":true}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "enabled": true, "mode": "night"}));

    let (_, body) = send(&h.app, Method::GET, "/api/status", "").await;
    assert_eq!(body, json!({"status": "ok", "mode": "night", "night_mode": true}));
    assert_eq!(h.ctl.restarts.load(Ordering::SeqCst), 1);

    let written = std::fs::read_to_string(&h.settings.config_path).unwrap();
    assert!(written.contains("# Auto-generated - Mode: night"));
}

#[tokio::test]
async fn repeated_request_needs_no_change() {
    let h = harness();
    send(&h.app, Method::POST, "/api/night-mode", r#"{"enabled":true}"#).await;
    let (status, body) =
        send(&h.app, Method::POST, "/api/night-mode", r#"{"enabled":true}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"success": true, "enabled": true, "mode": "night", "message": "No change needed"})
    );
    assert_eq!(h.ctl.restarts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn empty_body_selects_day() {
    let h = harness();
    send(&h.app, Method::POST, "/api/night-mode", r#"{"enabled":true}"#).await;

    let (status, body) = send(&h.app, Method::POST, "/api/night-mode", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "enabled": false, "mode": "day"}));
}

#[tokio::test]
async fn restart_failure_is_500_and_mode_unchanged() {
    let h = harness();
    h.ctl.broken.store(true, Ordering::SeqCst);

    let (status, body) =
        send(&h.app, Method::POST, "/api/night-mode", r#"{"enabled":true}"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"success": false, "error": "Failed to restart MediaMTX"})
    );

    let (_, body) = send(&h.app, Method::GET, "/api/night-mode", "").await;
    assert_eq!(body, json!({"enabled": false}));
}

#[tokio::test]
async fn write_failure_is_500() {
    let tmp = TempDir::new().unwrap();
    // A directory where the config file should be makes the backup copy fail.
    let config_path = tmp.path().join("mediamtx.yml");
    std::fs::create_dir_all(&config_path).unwrap();
    let settings = Settings {
        config_path,
        ..Settings::default()
    };
    let ctl = Arc::new(FakeSystemctl::default());
    let orchestrator = Arc::new(Orchestrator::from_settings(&settings, ctl.clone()).unwrap());
    let app = router(ApiState::new(orchestrator.clone(), &settings));

    let (status, body) = send(&app, Method::POST, "/api/night-mode", r#"{"enabled":true}"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"success": false, "error": "Failed to write config"}));
    assert_eq!(ctl.restarts.load(Ordering::SeqCst), 0);
    assert_eq!(orchestrator.mode(), Mode::Day);
}

// ---------------------------------------------------------------------------
// Rejections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn malformed_body_is_rejected_before_the_orchestrator() {
    let h = harness();
    for body in [
        "{enabled: true",
        r#"{"enabled":"true"}"#,
        "42",
        "[true]",
        "[]",
        "null",
    ] {
        let (status, value) = send(&h.app, Method::POST, "/api/night-mode", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {body:?}");
        assert_eq!(value, json!({"error": "Invalid JSON"}));
    }
    assert_eq!(h.ctl.restarts.load(Ordering::SeqCst), 0);
    assert!(!h.settings.config_path.exists());
}

#[tokio::test]
async fn unknown_paths_are_404() {
    let h = harness();
    for (method, uri) in [
        (Method::GET, "/api/unknown"),
        (Method::POST, "/api/status"),
        (Method::POST, "/"),
        (Method::GET, "/api/night-mode/extra"),
    ] {
        let (status, body) = send(&h.app, method.clone(), uri, "").await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
        assert_eq!(body, json!({"error": "Not found"}));
    }
}

// ---------------------------------------------------------------------------
// Redirect and CORS
// ---------------------------------------------------------------------------

#[tokio::test]
async fn root_redirects_to_viewer() {
    let h = harness();
    let response = h
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/")
                .header(header::HOST, "nursery.local:5000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "http://nursery.local:8889/baby-monitor/"
    );
}

#[tokio::test]
async fn responses_allow_any_origin() {
    let h = harness();
    let response = h
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/status")
                .header(header::ORIGIN, "http://viewer.local")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
}

#[tokio::test]
async fn preflight_is_answered() {
    let h = harness();
    let response = h
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/night-mode")
                .header(header::ORIGIN, "http://viewer.local")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
    let methods = headers
        .get(header::ACCESS_CONTROL_ALLOW_METHODS)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(methods.contains("POST"), "allow-methods: {methods}");
}
