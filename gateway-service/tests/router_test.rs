//! Handler tests driven through the router with a mock provider, covering
//! default-prompt selection and the recorded upload MIME types.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use gateway_service::config::{GatewayConfig, GeminiSettings, MediaTransport, UploadConfig};
use gateway_service::services::providers::mock::MockProvider;
use gateway_service::services::providers::ContentPart;
use gateway_service::startup::{router, AppState};
use http_body_util::BodyExt;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

const BOUNDARY: &str = "test-boundary";

fn test_state(provider: Arc<MockProvider>, transport: MediaTransport, dir: &str) -> AppState {
    AppState {
        config: GatewayConfig {
            common: service_core::config::Config { port: 0 },
            gemini: GeminiSettings {
                api_key: "test-key".to_string(),
                model: "gemini-2.5-flash".to_string(),
                base_url: "http://127.0.0.1:0".to_string(),
            },
            upload: UploadConfig {
                transport,
                dir: dir.to_string(),
            },
        },
        provider,
    }
}

fn canned_response() -> serde_json::Value {
    json!({ "candidates": [{ "content": { "parts": [{ "text": "ok" }] } }] })
}

fn multipart_body(
    field: &str,
    filename: &str,
    content_type: &str,
    data: &[u8],
    prompt: Option<&str>,
) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(prompt) = prompt {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"prompt\"\r\n\r\n{prompt}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn multipart_request(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("Failed to parse JSON")
}

#[tokio::test]
async fn default_prompt_is_used_when_none_supplied() {
    let provider = Arc::new(MockProvider::returning(canned_response()));
    let state = test_state(provider.clone(), MediaTransport::Inline, "unused");

    let body = multipart_body("image", "cat.png", "image/png", &[0u8; 16], None);
    let response = router(state)
        .oneshot(multipart_request("/generate-from-image", body))
        .await
        .unwrap();

    assert_eq!(StatusCode::OK, response.status());

    let calls = provider.generate_calls.lock().unwrap();
    assert_eq!(1, calls.len());
    assert_eq!(
        ContentPart::Text {
            text: "What's in this picture?".to_string()
        },
        calls[0][0]
    );
}

#[tokio::test]
async fn caller_prompt_overrides_the_default() {
    let provider = Arc::new(MockProvider::returning(canned_response()));
    let state = test_state(provider.clone(), MediaTransport::Inline, "unused");

    let body = multipart_body(
        "audio",
        "clip.wav",
        "audio/wav",
        &[0u8; 16],
        Some("Identify the speaker:"),
    );
    let response = router(state)
        .oneshot(multipart_request("/generate-from-audio", body))
        .await
        .unwrap();

    assert_eq!(StatusCode::OK, response.status());

    let calls = provider.generate_calls.lock().unwrap();
    assert_eq!(
        ContentPart::Text {
            text: "Identify the speaker:".to_string()
        },
        calls[0][0]
    );
}

#[tokio::test]
async fn mp3_override_is_applied_before_upload() {
    let provider = Arc::new(MockProvider::returning(canned_response()));
    let dir = format!("target/router-test-{}", Uuid::new_v4());
    tokio::fs::create_dir_all(&dir).await.unwrap();

    let state = test_state(provider.clone(), MediaTransport::FileApi, &dir);

    let body = multipart_body(
        "audio",
        "clip.mp3",
        "application/octet-stream",
        &[0u8; 16],
        None,
    );
    let response = router(state)
        .oneshot(multipart_request("/generate-from-audio", body))
        .await
        .unwrap();

    assert_eq!(StatusCode::OK, response.status());

    let uploads = provider.upload_calls.lock().unwrap();
    assert_eq!(1, uploads.len());
    assert_eq!("audio/mpeg", uploads[0].mime_type);

    // Staged file removed after the request.
    let mut entries = tokio::fs::read_dir(&dir).await.unwrap();
    assert!(entries.next_entry().await.unwrap().is_none());

    let _ = tokio::fs::remove_dir_all(&dir).await;
}

#[tokio::test]
async fn wav_upload_keeps_declared_mime_type() {
    let provider = Arc::new(MockProvider::returning(canned_response()));
    let dir = format!("target/router-test-{}", Uuid::new_v4());
    tokio::fs::create_dir_all(&dir).await.unwrap();

    let state = test_state(provider.clone(), MediaTransport::FileApi, &dir);

    let body = multipart_body("audio", "clip.wav", "audio/wav", &[0u8; 16], None);
    let response = router(state)
        .oneshot(multipart_request("/generate-from-audio", body))
        .await
        .unwrap();

    assert_eq!(StatusCode::OK, response.status());

    let uploads = provider.upload_calls.lock().unwrap();
    assert_eq!("audio/wav", uploads[0].mime_type);

    let _ = tokio::fs::remove_dir_all(&dir).await;
}

#[tokio::test]
async fn provider_error_message_is_surfaced_verbatim() {
    let provider = Arc::new(MockProvider::failing("quota exhausted"));
    let state = test_state(provider, MediaTransport::Inline, "unused");

    let request = Request::builder()
        .method("POST")
        .uri("/generate-text")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"prompt":"hello"}"#))
        .unwrap();

    let response = router(state).oneshot(request).await.unwrap();

    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, response.status());

    let body = response_json(response).await;
    assert_eq!(body["error"], "API error: quota exhausted");
}
