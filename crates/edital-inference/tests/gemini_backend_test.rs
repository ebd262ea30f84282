//! Integration tests for the Gemini backend against a mock HTTP server.

use std::sync::Arc;
use std::time::Duration;

use edital_core::{
    ContentSegment, ConversationTurn, Error, GenerationBackend, GenerationOptions,
    GenerationRequest,
};
use edital_inference::{
    classify, BackoffPolicy, FailureKind, GeminiBackend, GeminiConfig, GenerationExecutor,
    ModelAttemptPlan,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL_PATH: &str = "/models/gemini-2.5-flash:generateContent";

fn backend(server: &MockServer) -> GeminiBackend {
    GeminiBackend::new(GeminiConfig {
        base_url: server.uri(),
        api_key: Some("test-key".to_string()),
        timeout_seconds: 10,
    })
    .expect("Failed to create backend")
}

fn text_response(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
}

fn analysis_request() -> GenerationRequest {
    GenerationRequest {
        contents: vec![ConversationTurn::user(vec![
            ContentSegment::File {
                name: "edital.pdf".to_string(),
                mime_type: "application/pdf".to_string(),
                data: b"%PDF-1.7".to_vec(),
            },
            ContentSegment::text("Analise o edital."),
        ])],
        options: GenerationOptions {
            system_instruction: Some("Responda em JSON.".to_string()),
            temperature: Some(0.2),
            response_mime_type: Some("application/json".to_string()),
            max_output_tokens: None,
        },
    }
}

#[tokio::test]
async fn test_generate_sends_key_inline_data_and_options() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [
                    {"inlineData": {"mimeType": "application/pdf", "data": "JVBERi0xLjc="}},
                    {"text": "Analise o edital."}
                ]
            }],
            "systemInstruction": {"parts": [{"text": "Responda em JSON."}]},
            "generationConfig": {"responseMimeType": "application/json"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("{\"a\":1}")))
        .expect(1)
        .mount(&server)
        .await;

    let response = backend(&server)
        .generate("gemini-2.5-flash", &analysis_request())
        .await
        .expect("generation should succeed");
    assert_eq!(response.text, "{\"a\":1}");
}

#[tokio::test]
async fn test_overloaded_error_keeps_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_json(serde_json::json!({
            "error": {
                "code": 503,
                "message": "The model is overloaded. Please try again later.",
                "status": "UNAVAILABLE"
            }
        })))
        .mount(&server)
        .await;

    let err = backend(&server)
        .generate("gemini-2.5-flash", &analysis_request())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert!(err.to_string().contains("UNAVAILABLE"));
    assert_eq!(classify(&err), FailureKind::Overloaded);
}

#[tokio::test]
async fn test_invalid_key_is_not_retryable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT"
            }
        })))
        .mount(&server)
        .await;

    let err = backend(&server)
        .generate("gemini-2.5-flash", &analysis_request())
        .await
        .unwrap_err();
    assert_eq!(classify(&err), FailureKind::MissingApiKey);
    assert!(!classify(&err).is_retryable());
}

#[tokio::test]
async fn test_non_json_error_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let err = backend(&server)
        .generate("gemini-2.5-flash", &analysis_request())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(502));
    assert!(err.to_string().contains("Bad Gateway"));
}

#[tokio::test]
async fn test_blocked_prompt_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        })))
        .mount(&server)
        .await;

    let err = backend(&server)
        .generate("gemini-2.5-flash", &analysis_request())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Generation { status: None, .. }));
    assert!(err.to_string().contains("SAFETY"));
}

#[tokio::test]
async fn test_executor_falls_back_to_second_model_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/m1:generateContent"))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}
        })))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/models/m2:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("resposta")))
        .expect(1)
        .mount(&server)
        .await;

    let executor = GenerationExecutor::new(
        Arc::new(backend(&server)),
        BackoffPolicy {
            step: Duration::from_millis(5),
            cap: Duration::from_millis(20),
        },
    );
    let plan = ModelAttemptPlan::new(vec!["m1", "m2"], 2).unwrap();
    let outcome = executor.call(&plan, &analysis_request()).await.unwrap();

    assert_eq!(outcome.model, "m2");
    assert_eq!(outcome.response.text, "resposta");
    assert_eq!(outcome.attempts.len(), 3);
}
