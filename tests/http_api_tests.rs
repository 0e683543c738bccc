// Integration tests for the HTTP API
//
// The router is exercised in-process via tower's oneshot; the audio panel
// runs on the synthetic capture source so the full record flow works
// without audio hardware.

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use voicebox::audio::{CaptureConfig, CaptureSource};
use voicebox::recorder::RecorderConfig;
use voicebox::transcribe::{PlaceholderTranscriber, PLACEHOLDER_TRANSCRIPT};
use voicebox::{create_router, AppState, AudioPanel};

fn test_app() -> Router {
    let capture_config = CaptureConfig {
        target_sample_rate: 1000,
        target_channels: 1,
        buffer_duration_ms: 50,
        ..CaptureConfig::default()
    };
    let recorder_config = RecorderConfig {
        fragment_duration_ms: 50,
        sample_rate: 1000,
        channels: 1,
    };

    let panel = Arc::new(AudioPanel::new(
        CaptureSource::Synthetic { frame_count: None },
        capture_config,
        recorder_config,
    ));

    create_router(AppState::new(panel, Arc::new(PlaceholderTranscriber)))
}

async fn body_json(response: Response) -> Result<Value> {
    let bytes = response.into_body().collect().await?.to_bytes();
    Ok(serde_json::from_slice(&bytes)?)
}

fn json_request(uri: &str, payload: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn multipart_request(uri: &str, field: &str, file_name: &str, bytes: &[u8]) -> Request<Body> {
    let boundary = "voicebox-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; \
             name=\"{field}\"; filename=\"{file_name}\"\r\n\
             Content-Type: audio/wav\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_health_check() -> Result<()> {
    let app = test_app();

    let response = app.oneshot(get("/health")).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await?.to_bytes();
    assert_eq!(&bytes[..], b"OK");
    Ok(())
}

#[tokio::test]
async fn test_chat_save_acknowledges_pair_count() -> Result<()> {
    let app = test_app();

    let payload = json!({
        "timestamp": "2026-08-07T09:00:00Z",
        "totalQuestions": 5,
        "conversations": [
            { "question": "Hello", "answer": "Hi there" },
            { "question": "Who are you?", "answer": "A test" },
            { "question": "How is the weather?", "answer": "Sunny" }
        ]
    });

    let response = app.oneshot(json_request("/api/chat/save", &payload)).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await?;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["conversationCount"], json!(3));
    assert!(body["data"]["savedAt"].is_string());
    assert!(body["message"].is_string());
    Ok(())
}

#[tokio::test]
async fn test_chat_save_rejects_non_array_conversations() -> Result<()> {
    let app = test_app();

    let payload = json!({
        "timestamp": "2026-08-07T09:00:00Z",
        "conversations": "not-an-array"
    });

    let response = app.oneshot(json_request("/api/chat/save", &payload)).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await?;
    assert!(body["error"].is_string());
    Ok(())
}

#[tokio::test]
async fn test_chat_save_rejects_missing_timestamp() -> Result<()> {
    let app = test_app();

    let payload = json!({
        "conversations": []
    });

    let response = app.oneshot(json_request("/api/chat/save", &payload)).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_chat_save_rejects_malformed_pairs() -> Result<()> {
    let app = test_app();

    let payload = json!({
        "timestamp": "2026-08-07T09:00:00Z",
        "conversations": [1, 2, 3]
    });

    let response = app.oneshot(json_request("/api/chat/save", &payload)).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_transcribe_requires_audio_field() -> Result<()> {
    let app = test_app();

    let request = multipart_request("/api/transcribe", "attachment", "notes.wav", b"data");
    let response = app.oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await?;
    assert!(body["error"].is_string());
    Ok(())
}

#[tokio::test]
async fn test_transcribe_returns_placeholder_without_credentials() -> Result<()> {
    let app = test_app();

    let request = multipart_request("/api/transcribe", "audio", "audio.wav", &[0u8; 64]);
    let response = app.oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await?;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["text"], json!(PLACEHOLDER_TRANSCRIPT));
    Ok(())
}

#[tokio::test]
async fn test_initial_audio_status() -> Result<()> {
    let app = test_app();

    let response = app.oneshot(get("/api/audio/status")).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await?;
    assert_eq!(body["microphone"]["is_on"], json!(false));
    assert_eq!(body["recording"]["is_recording"], json!(false));
    assert_eq!(body["recording"]["has_artifact"], json!(false));
    assert_eq!(body["speaker"]["is_on"], json!(true));
    Ok(())
}

#[tokio::test]
async fn test_record_start_without_mic_reports_error() -> Result<()> {
    let app = test_app();

    let response = app.oneshot(post("/api/audio/record/start")).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await?;
    assert_eq!(body["recording"]["is_recording"], json!(false));
    let error = body["recording"]["error"]
        .as_str()
        .expect("inline recording error");
    assert!(error.contains("microphone is off"), "got: {error}");
    Ok(())
}

#[tokio::test]
async fn test_submit_without_artifact_conflicts() -> Result<()> {
    let app = test_app();

    let response = app.oneshot(post("/api/audio/record/submit")).await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = body_json(response).await?;
    assert!(body["error"].is_string());
    Ok(())
}

#[tokio::test]
async fn test_record_flow_over_http() -> Result<()> {
    let app = test_app();

    // Turn the microphone on
    let response = app.clone().oneshot(post("/api/audio/mic/on")).await?;
    let body = body_json(response).await?;
    assert_eq!(body["microphone"]["is_on"], json!(true));

    // Start recording and let a few fragments arrive
    let response = app.clone().oneshot(post("/api/audio/record/start")).await?;
    let body = body_json(response).await?;
    assert_eq!(body["recording"]["is_recording"], json!(true));

    tokio::time::sleep(Duration::from_millis(200)).await;

    // Stop: the buffered fragments become the artifact
    let response = app.clone().oneshot(post("/api/audio/record/stop")).await?;
    let body = body_json(response).await?;
    assert_eq!(body["recording"]["is_recording"], json!(false));
    assert_eq!(body["recording"]["has_artifact"], json!(true));
    assert!(body["recording"]["artifact_bytes"].as_u64().unwrap() > 0);

    // Submit the artifact through the configured transcriber
    let response = app.clone().oneshot(post("/api/audio/record/submit")).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await?;
    assert_eq!(body["text"], json!(PLACEHOLDER_TRANSCRIPT));

    // Discard and release everything
    let response = app.clone().oneshot(post("/api/audio/record/clear")).await?;
    let body = body_json(response).await?;
    assert_eq!(body["recording"]["has_artifact"], json!(false));

    let response = app.oneshot(post("/api/audio/mic/off")).await?;
    let body = body_json(response).await?;
    assert_eq!(body["microphone"]["is_on"], json!(false));
    Ok(())
}
