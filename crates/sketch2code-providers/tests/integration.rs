//! Provider integration tests.
//!
//! Mock-server tests run a throwaway axum app standing in for the model API.
//! Live tests are skipped when the corresponding API key env var is not set.
//! Run with: `cargo test -p sketch2code-providers --test integration`

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};

use sketch2code_core::types::DataUri;
use sketch2code_providers::{
    Credentials, GeminiProvider, OpenAiProvider, ProviderError, VisionProvider, VisionRequest,
};

#[derive(Clone, Default)]
struct Seen(Arc<Mutex<Vec<(HeaderMap, Value, String)>>>);

impl Seen {
    fn take(&self) -> Vec<(HeaderMap, Value, String)> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

/// Serve `app` on an ephemeral port and return its base URL.
async fn start_mock(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

fn request(model: &str) -> VisionRequest {
    VisionRequest {
        model: model.into(),
        prompt: "Build a pricing card".into(),
        image: DataUri::parse("data:image/png;base64,iVBORw0KGgo=").unwrap(),
        temperature: Some(0.2),
        max_tokens: 512,
    }
}

async fn chat_completions(
    State(seen): State<Seen>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    seen.0
        .lock()
        .unwrap()
        .push((headers, body, String::new()));
    Json(json!({
        "id": "chatcmpl-mock",
        "model": "mock-model",
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": "Sure!\n```json\n{\"html\":\"<div class=\\\"card\\\"></div>\",\"css\":\".card{}\"}\n```"
            },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 100, "completion_tokens": 20 }
    }))
}

#[tokio::test]
async fn test_openrouter_sends_multimodal_message_and_attribution() {
    let seen = Seen::default();
    let app = Router::new()
        .route("/v1/chat/completions", post(chat_completions))
        .with_state(seen.clone());
    let base = start_mock(app).await;

    let provider = OpenAiProvider::openrouter(Some(&base)).with_attribution(
        Some("https://sketch2code.example".into()),
        Some("Sketch2Code AI".into()),
    );
    let credentials = Credentials::ApiKey {
        api_key: "sk-or-test".into(),
    };
    let reply = provider
        .complete(&request("openai/gpt-4o-mini"), &credentials)
        .await
        .unwrap();

    assert!(reply.content.as_str().unwrap().contains("```json"));
    assert_eq!(reply.model.as_deref(), Some("mock-model"));
    assert_eq!(reply.usage.unwrap().output_tokens, Some(20));

    let calls = seen.take();
    assert_eq!(calls.len(), 1);
    let (headers, body, _) = &calls[0];
    assert_eq!(headers["authorization"], "Bearer sk-or-test");
    assert_eq!(headers["http-referer"], "https://sketch2code.example");
    assert_eq!(headers["x-title"], "Sketch2Code AI");
    assert_eq!(body["model"], "openai/gpt-4o-mini");
    assert_eq!(
        body["messages"][0]["content"][1]["image_url"]["url"],
        "data:image/png;base64,iVBORw0KGgo="
    );
}

#[tokio::test]
async fn test_ollama_sends_no_auth_header() {
    let seen = Seen::default();
    let app = Router::new()
        .route("/v1/chat/completions", post(chat_completions))
        .with_state(seen.clone());
    let base = start_mock(app).await;

    let provider = OpenAiProvider::ollama(Some(&base));
    provider
        .complete(&request("llava"), &Credentials::None)
        .await
        .unwrap();

    let calls = seen.take();
    assert!(calls[0].0.get("authorization").is_none());
    assert!(calls[0].0.get("x-title").is_none());
}

#[tokio::test]
async fn test_openai_requires_key() {
    let provider = OpenAiProvider::openai(Some("http://127.0.0.1:9"));
    let err = provider
        .complete(&request("gpt-4o-mini"), &Credentials::None)
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::MissingCredentials(_)));
}

#[tokio::test]
async fn test_upstream_error_keeps_status_and_body() {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(|| async { (StatusCode::TOO_MANY_REQUESTS, "rate limited") }),
    );
    let base = start_mock(app).await;

    let provider = OpenAiProvider::openai(Some(&base));
    let credentials = Credentials::ApiKey {
        api_key: "sk-test".into(),
    };
    let err = provider
        .complete(&request("gpt-4o-mini"), &credentials)
        .await
        .unwrap_err();
    match err {
        ProviderError::Upstream { status, body } => {
            assert_eq!(status, 429);
            assert_eq!(body, "rate limited");
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_gemini_inline_data_and_text_parts() {
    let seen = Seen::default();
    let app = Router::new()
        .route(
            "/v1beta/models/{call}",
            post(
                |State(seen): State<Seen>,
                 Path(call): Path<String>,
                 Query(query): Query<HashMap<String, String>>,
                 Json(body): Json<Value>| async move {
                    let key = query.get("key").cloned().unwrap_or_default();
                    seen.0
                        .lock()
                        .unwrap()
                        .push((HeaderMap::new(), body, format!("{call}|{key}")));
                    Json(json!({
                        "candidates": [{
                            "content": { "parts": [
                                { "text": "{\"html\":\"<form></form>\"," },
                                { "text": "\"css\":\"form{}\"}" }
                            ]},
                            "finishReason": "STOP"
                        }],
                        "modelVersion": "gemini-1.5-flash"
                    }))
                },
            ),
        )
        .with_state(seen.clone());
    let base = start_mock(app).await;

    let provider = GeminiProvider::new(Some(&base));
    let credentials = Credentials::ApiKey {
        api_key: "gm-test".into(),
    };
    let reply = provider
        .complete(&request("gemini-1.5-flash"), &credentials)
        .await
        .unwrap();

    let parts = reply.content.as_array().unwrap();
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[1]["text"], "\"css\":\"form{}\"}");

    let calls = seen.take();
    let (_, body, route) = &calls[0];
    assert_eq!(route, "gemini-1.5-flash:generateContent|gm-test");
    assert_eq!(body["contents"][0]["parts"][1]["inlineData"]["mimeType"], "image/png");
    assert_eq!(body["contents"][0]["parts"][1]["inlineData"]["data"], "iVBORw0KGgo=");
}

// --- Live API tests ---

fn openrouter_key() -> Option<String> {
    std::env::var("OPENROUTER_API_KEY")
        .ok()
        .filter(|k| !k.is_empty())
}

fn gemini_key() -> Option<String> {
    std::env::var("GEMINI_API_KEY")
        .ok()
        .filter(|k| !k.is_empty())
}

/// A 2x2 white PNG.
const TINY_PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAIAAAACCAIAAAD91JpzAAAAFklEQVR4nGP8//8/AwMDAxMDAwMDAwAkBgMBWTS5AgAAAABJRU5ErkJggg==";

fn live_request(model: &str) -> VisionRequest {
    VisionRequest {
        model: model.into(),
        prompt: "Reply with exactly the word 'hello'.".into(),
        image: DataUri::parse(TINY_PNG).unwrap(),
        temperature: Some(0.0),
        max_tokens: 50,
    }
}

#[tokio::test]
async fn test_openrouter_live() {
    let Some(api_key) = openrouter_key() else {
        eprintln!("Skipping: OPENROUTER_API_KEY not set");
        return;
    };

    let provider = OpenAiProvider::openrouter(None);
    let credentials = Credentials::ApiKey { api_key };
    let reply = provider
        .complete(&live_request("openai/gpt-4o-mini"), &credentials)
        .await;
    assert!(reply.is_ok(), "Completion failed: {:?}", reply.err());
}

#[tokio::test]
async fn test_gemini_live() {
    let Some(api_key) = gemini_key() else {
        eprintln!("Skipping: GEMINI_API_KEY not set");
        return;
    };

    let provider = GeminiProvider::new(None);
    let credentials = Credentials::ApiKey { api_key };
    let reply = provider
        .complete(&live_request("gemini-1.5-flash"), &credentials)
        .await;
    assert!(reply.is_ok(), "Completion failed: {:?}", reply.err());
}
