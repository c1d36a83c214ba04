//! End-to-end request scenarios through the router.

use axum::http::StatusCode;
use codejail_integration_tests::{has_binary, Harness};
use serde_json::json;

#[tokio::test]
async fn test_python_snippet_prints() {
    if !has_binary("python3") {
        return;
    }
    let harness = Harness::new();
    let (status, body) = harness
        .post("/code", json!({"language": "python", "code": "print(1+1)"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stdout"], "2\n");
    assert_eq!(body["exit_code"], 0);
    assert_eq!(body["timed_out"], false);
    let id = body["session_id"].as_str().unwrap();
    assert!(harness.session_dir(id).join("main.py").is_file());
}

#[tokio::test]
async fn test_broken_java_returns_compile_result() {
    if !has_binary("javac") {
        return;
    }
    let harness = Harness::new();
    let (status, body) = harness
        .post("/code", json!({"language": "java", "code": "int x = ;", "timeout": 60}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(body["exit_code"], 0);
    assert!(!body["stderr"].as_str().unwrap().is_empty());
    let id = body["session_id"].as_str().unwrap();
    assert!(!harness.session_dir(id).join("Main.class").exists());
}

#[tokio::test]
async fn test_escaping_write_leaves_filesystem_untouched() {
    let harness = Harness::new();
    let outside = harness.root().parent().unwrap().join("codejail-escape-target");

    let (status, body) = harness
        .post(
            "/files/write",
            json!({"path": "../codejail-escape-target", "content": "x"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "path_violation");
    assert!(!outside.exists());
    assert_eq!(std::fs::read_dir(harness.root()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_session_state_persists_across_requests() {
    let harness = Harness::new();

    let (status, body) = harness
        .post("/command", json!({"command": "echo persisted > note.txt"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exit_code"], 0);
    let id = body["session_id"].as_str().unwrap().to_string();

    let (status, body) = harness
        .post("/command", json!({"command": "cat note.txt", "session_id": id}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stdout"], "persisted\n");
    assert_eq!(body["session_id"], id.as_str());

    let (status, bytes) = harness
        .get(&format!("/files/download?path=.sessions/{}/note.txt", id))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"persisted\n");
}

#[tokio::test]
async fn test_timeout_reported_as_result() {
    let harness = Harness::new();
    let (status, body) = harness
        .post("/command", json!({"command": "sleep 30", "timeout": 1}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exit_code"], -1);
    assert_eq!(body["timed_out"], true);
    assert!(body["stderr"].as_str().unwrap().ends_with("\nprocess timeout"));
    assert!(body["duration_ms"].as_u64().unwrap() < 10_000);
}

#[tokio::test]
async fn test_session_delete_is_idempotent() {
    let harness = Harness::new();
    let (_, body) = harness.post("/sessions", json!({})).await;
    let id = body["session_id"].as_str().unwrap().to_string();
    assert!(harness.session_dir(&id).is_dir());

    for _ in 0..2 {
        let (status, body) = harness.delete(&format!("/sessions/{}", id)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["session_id"], id.as_str());
    }
    assert!(!harness.session_dir(&id).exists());
}

#[tokio::test]
async fn test_destroyed_session_comes_back_empty() {
    let harness = Harness::new();
    let (_, body) = harness
        .post("/command", json!({"command": ["touch", "left-behind"]}))
        .await;
    let id = body["session_id"].as_str().unwrap().to_string();
    assert!(harness.session_dir(&id).join("left-behind").exists());

    let (status, _) = harness.delete(&format!("/sessions/{}", id)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = harness
        .post("/command", json!({"command": ["ls", "-A"], "session_id": id}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stdout"], "");
    assert!(harness.session_dir(&id).is_dir());
}

/// Run a slow and a fast append in one session, the slow one polled first,
/// and return the order the lines landed in.
async fn append_order(harness: &Harness) -> Vec<String> {
    let (_, body) = harness.post("/sessions", json!({})).await;
    let id = body["session_id"].as_str().unwrap().to_string();

    let slow = harness.post(
        "/command",
        json!({"command": "sleep 0.5; echo a >> log", "session_id": id}),
    );
    let fast = harness.post(
        "/command",
        json!({"command": "echo b >> log", "session_id": id}),
    );
    let ((s1, _), (s2, _)) = tokio::join!(slow, fast);
    assert_eq!(s1, StatusCode::OK);
    assert_eq!(s2, StatusCode::OK);

    std::fs::read_to_string(harness.session_dir(&id).join("log"))
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_serialized_sessions_run_one_at_a_time() {
    let harness = Harness::with_config(|config| config.exec.serialize_sessions = true);
    assert_eq!(append_order(&harness).await, vec!["a", "b"]);
    assert!(harness.state.locks.is_empty());
}

#[tokio::test]
async fn test_unserialized_sessions_interleave() {
    let harness = Harness::new();
    assert_eq!(append_order(&harness).await, vec!["b", "a"]);
}

#[tokio::test]
async fn test_files_listing_includes_sessions_dir() {
    let harness = Harness::new();
    harness.post("/sessions", json!({})).await;
    harness
        .post("/files/write", json!({"path": "docs/readme.md", "content": "hi"}))
        .await;

    let (status, bytes) = harness.get("/files/list").await;
    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    let names: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec![".sessions", "docs"]);
}
