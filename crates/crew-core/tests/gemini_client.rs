//! GeminiClient against a local mock server.

use serde_json::json;
use wiremock::matchers::{
    body_partial_json, header, method, path, query_param, query_param_is_missing,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crew_core::llm::{GenerateRequest, LlmClient, ToolDefinition, Turn};
use crew_core::{Error, GeminiClient, LlmConfig};

fn config() -> LlmConfig {
    LlmConfig {
        api_key: "test-key".to_string(),
        model: "gemini-1.5-flash".to_string(),
        base_url: None,
    }
}

fn request() -> GenerateRequest {
    GenerateRequest {
        model: "gemini-1.5-flash".to_string(),
        system_instruction: Some("You are an AI agent named Coder.".to_string()),
        history: vec![Turn::user("hello")],
        tools: vec![ToolDefinition::new(
            "run_command",
            "Run a shell command",
            json!({"type": "object", "properties": {"command": {"type": "string"}}}),
        )],
    }
}

#[tokio::test]
async fn test_generate_text_and_function_call() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-flash:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .and(query_param_is_missing("key"))
        .and(body_partial_json(json!({
            "systemInstruction": {"parts": [{"text": "You are an AI agent named Coder."}]},
            "contents": [{"role": "user", "parts": [{"text": "hello"}]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "Running it."},
                        {"functionCall": {"name": "run_command", "args": {"command": "ls"}}}
                    ]
                },
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 20, "candidatesTokenCount": 8}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::with_base_url(&config(), server.uri()).unwrap();
    let response = client.generate(&request()).await.unwrap();

    assert_eq!(response.text.as_deref(), Some("Running it."));
    assert_eq!(response.tool_calls.len(), 1);
    assert_eq!(response.tool_calls[0].name, "run_command");
    assert_eq!(response.tool_calls[0].args["command"], "ls");
    assert_eq!(response.usage.unwrap().input_tokens, 20);
}

#[tokio::test]
async fn test_rate_limit_is_classified() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {"code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED"}
        })))
        .mount(&server)
        .await;

    let client = GeminiClient::with_base_url(&config(), server.uri()).unwrap();
    let err = client.generate(&request()).await.unwrap_err();

    assert!(matches!(err, Error::RateLimited(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_zero_quota_is_classified() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {
                "code": 429,
                "message": "Quota exceeded for metric: generate_content_free_tier_requests, limit: 0",
                "status": "RESOURCE_EXHAUSTED"
            }
        })))
        .mount(&server)
        .await;

    let client = GeminiClient::with_base_url(&config(), server.uri()).unwrap();
    let err = client.generate(&request()).await.unwrap_err();

    assert!(err.is_quota_exhausted());
}

#[tokio::test]
async fn test_unknown_model_is_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": 404, "message": "models/gemini-9 is not found", "status": "NOT_FOUND"}
        })))
        .mount(&server)
        .await;

    let client = GeminiClient::with_base_url(&config(), server.uri()).unwrap();
    let err = client.generate(&request()).await.unwrap_err();

    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "models/gemini-9 is not found");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn test_list_models_follows_pages() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/models"))
        .and(query_param("pageToken", "next"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [{"name": "models/gemini-flash-latest", "displayName": "Gemini Flash Latest"}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/models"))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [{"name": "models/gemini-1.5-flash"}],
            "nextPageToken": "next"
        })))
        .mount(&server)
        .await;

    let client = GeminiClient::with_base_url(&config(), server.uri()).unwrap();
    let models = client.list_models().await.unwrap();

    let names: Vec<_> = models.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["models/gemini-1.5-flash", "models/gemini-flash-latest"]);
    assert_eq!(models[1].display_name.as_deref(), Some("Gemini Flash Latest"));
}
