//! Provider Adapter Integration Tests
//!
//! Runs the full build / call / parse / classify path against mock backends.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shell_assistant::adapters::{ProviderConfig, ProviderKind, FALLBACK_EXPLANATION};
use shell_assistant::{CommandContext, GenerationError, Orchestrator, Severity};

fn openai_body(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}
        ]
    })
}

fn anthropic_body(text: &str) -> serde_json::Value {
    json!({
        "id": "msg_1",
        "type": "message",
        "role": "assistant",
        "content": [{"type": "text", "text": text}],
        "stop_reason": "end_turn"
    })
}

fn ollama_body(response: &str) -> serde_json::Value {
    json!({"model": "llama3.1", "response": response, "done": true})
}

fn orchestrator(kind: ProviderKind, api_key: &str, base_url: String) -> Orchestrator {
    let config = ProviderConfig::new(kind, api_key, "test-model").with_base_url(base_url);
    Orchestrator::new(config).unwrap()
}

#[tokio::test]
async fn test_openai_structured_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({"model": "test-model", "max_tokens": 500})))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_body(
            r#"{"command": "ls -la", "explanation": "lists files"}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let orchestrator = orchestrator(ProviderKind::OpenAi, "sk-test", format!("{}/v1", server.uri()));
    let result = orchestrator
        .generate("list files in the current directory", None)
        .await
        .unwrap();

    assert_eq!(result.command(), "ls -la");
    assert_eq!(result.explanation(), Some("lists files"));
    assert_eq!(result.severity(), Severity::Safe);
    assert!(result.warning_message().is_none());
}

#[tokio::test]
async fn test_openrouter_command_only_gets_generic_explanation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(openai_body(r#"{"command": "ls -la"}"#)),
        )
        .mount(&server)
        .await;

    let orchestrator = orchestrator(
        ProviderKind::OpenRouter,
        "sk-or-test",
        format!("{}/api/v1", server.uri()),
    );
    let result = orchestrator
        .generate("list files in the current directory", None)
        .await
        .unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(
        json,
        json!({"command": "ls -la", "explanation": FALLBACK_EXPLANATION, "severity": "safe"})
    );
}

#[tokio::test]
async fn test_anthropic_plain_text_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "sk-ant-test"))
        .and(header("anthropic-version", "2023-06-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(anthropic_body("echo hello\n")))
        .expect(1)
        .mount(&server)
        .await;

    let orchestrator = orchestrator(
        ProviderKind::Anthropic,
        "sk-ant-test",
        format!("{}/v1", server.uri()),
    );
    let result = orchestrator.generate("say hello", None).await.unwrap();

    assert_eq!(result.command(), "echo hello");
    assert_eq!(result.explanation(), Some(FALLBACK_EXPLANATION));
    assert_eq!(result.severity(), Severity::Safe);
}

#[tokio::test]
async fn test_ollama_dangerous_command_flagged() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({"stream": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(ollama_body("rm -rf /tmp/*")))
        .expect(1)
        .mount(&server)
        .await;

    let orchestrator = orchestrator(ProviderKind::Ollama, "", server.uri());
    let context = CommandContext {
        cwd: Some("/home/dev".to_string()),
        shell: Some("zsh".to_string()),
        ..Default::default()
    };
    let result = orchestrator
        .generate("delete everything in tmp recursively", Some(context))
        .await
        .unwrap();

    assert_eq!(result.command(), "rm -rf /tmp/*");
    assert_eq!(result.severity(), Severity::Dangerous);
    let warning = result.warning_message().unwrap();
    assert!(warning.contains("Recursively removes files without confirmation"));
    assert!(!warning.contains("Deletes files,"));
}

#[tokio::test]
async fn test_ollama_prompt_carries_context() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ollama_body("pwd")))
        .mount(&server)
        .await;

    let orchestrator = orchestrator(ProviderKind::Ollama, "", server.uri());
    let context = CommandContext {
        os: Some("Darwin".to_string()),
        cwd: Some("/Users/dev".to_string()),
        ..Default::default()
    };
    orchestrator
        .generate("where am I", Some(context))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let prompt = body["prompt"].as_str().unwrap();
    assert!(prompt.contains("Context:\nCurrent directory: /Users/dev\nOS: Darwin"));
    assert!(prompt.ends_with("User request: where am I"));
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_non_success_status_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let orchestrator = orchestrator(ProviderKind::OpenAi, "sk-bad", server.uri());
    let err = orchestrator.generate("list files", None).await.unwrap_err();

    match err {
        GenerationError::Transport { status, message } => {
            assert_eq!(status, Some(401));
            assert!(message.contains("invalid api key"));
        }
        other => panic!("Expected Transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_envelope_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})))
        .mount(&server)
        .await;

    let orchestrator = orchestrator(ProviderKind::Anthropic, "sk-ant", server.uri());
    let err = orchestrator.generate("list files", None).await.unwrap_err();
    assert!(matches!(err, GenerationError::Parse(_)));
    assert!(err.is_backend_failure());
}

#[tokio::test]
async fn test_slow_backend_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ollama_body("ls"))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let config = ProviderConfig::new(ProviderKind::Ollama, "", "test-model")
        .with_base_url(server.uri())
        .with_timeout(Duration::from_millis(200));
    let orchestrator = Orchestrator::new(config).unwrap();

    let err = orchestrator.generate("list files", None).await.unwrap_err();
    assert!(matches!(err, GenerationError::Transport { status: None, .. }));
}

#[tokio::test]
async fn test_missing_credential_fails_before_any_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    for kind in [ProviderKind::OpenAi, ProviderKind::OpenRouter, ProviderKind::Anthropic] {
        let config = ProviderConfig::new(kind, "", "test-model").with_base_url(server.uri());
        let result = Orchestrator::new(config);
        assert!(matches!(result, Err(GenerationError::Configuration(_))));
    }
}
