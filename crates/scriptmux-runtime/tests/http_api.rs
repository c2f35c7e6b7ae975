use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::util::ServiceExt;

use scriptmux_runtime::build_router;
use scriptmux_supervisor::lists::default_lists;
use scriptmux_supervisor::{Supervisor, SupervisorConfig};
use scriptmux_tmux::{Multiplexer, PaneTarget, Session, TmuxError};

/// In-memory multiplexer: a fixed session table and scripted captures that
/// repeat the last entry once exhausted.
struct FakeMux {
    sessions: Mutex<Vec<Session>>,
    captures: Mutex<VecDeque<String>>,
    capture_calls: AtomicUsize,
}

impl FakeMux {
    fn new(sessions: &[&str], captures: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            sessions: Mutex::new(sessions.iter().filter_map(|l| Session::from_line(l)).collect()),
            captures: Mutex::new(captures.iter().map(|c| c.to_string()).collect()),
            capture_calls: AtomicUsize::new(0),
        })
    }

    fn capture_calls(&self) -> usize {
        self.capture_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Multiplexer for FakeMux {
    async fn list_sessions(&self) -> Vec<Session> {
        self.sessions.lock().unwrap().clone()
    }

    async fn capture(&self, target: &PaneTarget) -> Result<String, TmuxError> {
        self.capture_calls.fetch_add(1, Ordering::SeqCst);
        if !self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .any(|s| s.name == target.session)
        {
            return Err(TmuxError::CommandFailed(format!(
                "exit code 1: can't find session: {}",
                target.session
            )));
        }
        let mut captures = self.captures.lock().unwrap();
        let text = if captures.len() > 1 {
            captures.pop_front()
        } else {
            captures.front().cloned()
        };
        Ok(text.unwrap_or_default())
    }

    async fn kill_session(&self, name: &str) -> bool {
        let mut sessions = self.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|s| s.name != name);
        sessions.len() != before
    }

    async fn start_session(&self, name: &str, _command: &str) -> Result<(), TmuxError> {
        let mut sessions = self.sessions.lock().unwrap();
        if sessions.iter().any(|s| s.name == name) {
            return Err(TmuxError::CommandFailed(format!(
                "exit code 1: duplicate session: {name}"
            )));
        }
        sessions.push(Session::from_line(&format!("{name}: 1 windows")).unwrap());
        Ok(())
    }
}

fn supervisor(dir: &tempfile::TempDir, mux: Arc<FakeMux>) -> Supervisor {
    let config = SupervisorConfig {
        script_dir: dir.path().to_path_buf(),
        poll_interval: Duration::from_millis(10),
        lists: default_lists(dir.path()),
        ..SupervisorConfig::default()
    };
    Supervisor::new(config, mux)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_check() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_router(supervisor(&dir, FakeMux::new(&[], &[])));
    let response = app.oneshot(get("/healthz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn list_sessions_returns_name_and_info() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_router(supervisor(
        &dir,
        FakeMux::new(&["build: 1 windows (created Tue Oct 14 09:12:01 2026)"], &[]),
    ));
    let response = app.oneshot(get("/api/sessions")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!([{
            "name": "build",
            "full_info": "build: 1 windows (created Tue Oct 14 09:12:01 2026)"
        }])
    );
}

#[tokio::test]
async fn list_sessions_empty() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_router(supervisor(&dir, FakeMux::new(&[], &[])));
    let response = app.oneshot(get("/api/sessions")).await.unwrap();
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn kill_reports_outcome() {
    let dir = tempfile::tempdir().unwrap();
    let mux = FakeMux::new(&["build: 1 windows"], &[]);
    let app = build_router(supervisor(&dir, Arc::clone(&mux)));

    let request = Request::builder()
        .method("DELETE")
        .uri("/api/sessions/build")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(body_json(response).await, json!({ "success": true }));

    let request = Request::builder()
        .method("DELETE")
        .uri("/api/sessions/build")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(body_json(response).await, json!({ "success": false }));
}

#[tokio::test]
async fn start_session_then_list() {
    let dir = tempfile::tempdir().unwrap();
    let mux = FakeMux::new(&[], &[]);
    let app = build_router(supervisor(&dir, Arc::clone(&mux)));

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/sessions",
            json!({ "name": "dl", "command": "download.sh" }),
        ))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["success"], json!(true));

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/sessions",
            json!({ "name": "dl", "command": "download.sh" }),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));
    assert!(body["message"].as_str().unwrap().contains("duplicate session"));
}

#[tokio::test]
async fn one_shot_output() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_router(supervisor(
        &dir,
        FakeMux::new(&["build: 1 windows"], &["compiling...\n"]),
    ));
    let response = app.oneshot(get("/api/sessions/build/output")).await.unwrap();
    assert_eq!(
        body_json(response).await,
        json!({ "output": "compiling...\n" })
    );
}

#[tokio::test]
async fn one_shot_output_of_missing_session_is_error_text() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_router(supervisor(&dir, FakeMux::new(&[], &[])));
    let response = app.oneshot(get("/api/sessions/gone/output")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let output = body_json(response).await["output"].as_str().unwrap().to_string();
    assert!(output.starts_with("Error capturing output"), "output: {output}");
    assert!(output.contains("can't find session: gone"));
}

#[tokio::test]
async fn run_missing_script() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_router(supervisor(&dir, FakeMux::new(&[], &[])));
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/scripts/run",
            json!({ "path": "nope.sh" }),
        ))
        .await
        .unwrap();
    assert_eq!(
        body_json(response).await,
        json!({ "success": false, "message": "Script file not found" })
    );
}

#[tokio::test]
async fn run_script_in_script_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("hello.sh"), "#!/bin/sh\necho hello\n").unwrap();
    let app = build_router(supervisor(&dir, FakeMux::new(&[], &[])));
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/scripts/run",
            json!({ "path": "hello.sh" }),
        ))
        .await
        .unwrap();
    assert_eq!(
        body_json(response).await,
        json!({ "success": true, "message": "Script executed successfully" })
    );
}

#[tokio::test]
async fn lists_read_and_write() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(".videos-env"),
        "QUALITY=720\ndeclare -a VIDEO_SOURCES=(\n\"https://example.com/a\"\n)\n",
    )
    .unwrap();
    let app = build_router(supervisor(&dir, FakeMux::new(&[], &[])));

    let response = app.clone().oneshot(get("/api/lists/videos")).await.unwrap();
    assert_eq!(
        body_json(response).await,
        json!({ "name": "videos", "entries": ["https://example.com/a"] })
    );

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/lists/videos",
            json!({ "entries": ["https://example.com/b", "  ", " https://example.com/c "] }),
        ))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["success"], json!(true));

    let content = std::fs::read_to_string(dir.path().join(".videos-env")).unwrap();
    assert_eq!(
        content,
        "QUALITY=720\ndeclare -a VIDEO_SOURCES=(\n\"https://example.com/b\"\n\"https://example.com/c\"\n)\n"
    );
}

#[tokio::test]
async fn write_list_without_file_fails_softly() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_router(supervisor(&dir, FakeMux::new(&[], &[])));
    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/lists/songs",
            json!({ "entries": ["x"] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));
    assert!(body["message"].as_str().unwrap().starts_with("Error updating songs"));
}

#[tokio::test]
async fn unknown_list_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_router(supervisor(&dir, FakeMux::new(&[], &[])));
    let response = app.oneshot(get("/api/lists/podcasts")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], json!("not_found"));
}

/// Read body frames until `want` data frames have arrived.
async fn read_frames(body: &mut Body, want: usize) -> Vec<String> {
    let mut frames = Vec::new();
    while frames.len() < want {
        let frame = tokio::time::timeout(Duration::from_secs(5), body.frame())
            .await
            .expect("timeout waiting for stream frame")
            .expect("stream ended")
            .expect("body error");
        if let Ok(data) = frame.into_data() {
            let text = String::from_utf8(data.to_vec()).unwrap();
            if text.starts_with("data:") || text.starts_with("event:") {
                frames.push(text);
            }
        }
    }
    frames
}

#[tokio::test]
async fn stream_emits_changes_only() {
    let dir = tempfile::tempdir().unwrap();
    let mux = FakeMux::new(
        &["build: 1 windows"],
        &["line1", "line1", "line1", "line1", "line1\nline2"],
    );
    let app = build_router(supervisor(&dir, Arc::clone(&mux)));

    let response = app.oneshot(get("/api/sessions/build/stream")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "text/event-stream"
    );

    let mut body = response.into_body();
    let frames = read_frames(&mut body, 2).await;
    assert_eq!(frames, ["data: line1\n\n", "data: line1\\nline2\n\n"]);
    assert!(mux.capture_calls() >= 5);
}

#[tokio::test]
async fn dropping_the_stream_stops_polling() {
    let dir = tempfile::tempdir().unwrap();
    let mux = FakeMux::new(&["build: 1 windows"], &["tick"]);
    let app = build_router(supervisor(&dir, Arc::clone(&mux)));

    let response = app.oneshot(get("/api/sessions/build/stream")).await.unwrap();
    let mut body = response.into_body();
    assert_eq!(read_frames(&mut body, 1).await, ["data: tick\n\n"]);
    drop(body);

    tokio::time::sleep(Duration::from_millis(50)).await;
    let settled = mux.capture_calls();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(mux.capture_calls(), settled, "stream kept polling after close");
}
