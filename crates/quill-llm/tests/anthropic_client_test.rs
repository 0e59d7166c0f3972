use mockito::Matcher;
use quill_llm::{AnthropicClient, ChatClient, ChatRequest, LlmError, Message};

#[tokio::test]
async fn test_messages_request_headers_and_text() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/messages")
        .match_header("x-api-key", "ant-key")
        .match_header("anthropic-version", "2023-06-01")
        .match_body(Matcher::PartialJsonString(
            r#"{"model": "claude-3-5-sonnet-latest", "max_tokens": 1024}"#.to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "id": "msg_1",
                "type": "message",
                "content": [{"type": "text", "text": "three entries mention running"}],
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 20, "output_tokens": 5}
            }"#,
        )
        .create_async()
        .await;

    let client = AnthropicClient::new("ant-key").unwrap().with_base_url(server.url());
    let response = client
        .chat(ChatRequest::new(
            "claude-3-5-sonnet-latest",
            vec![Message::human("did i run?")],
        ))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(response.content, "three entries mention running");
    assert_eq!(response.usage.map(|u| u.total_tokens), Some(25));
}

#[tokio::test]
async fn test_server_error_is_provider_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/messages")
        .with_status(500)
        .with_body(r#"{"error": "overloaded"}"#)
        .create_async()
        .await;

    let client = AnthropicClient::new("ant-key").unwrap().with_base_url(server.url());
    let err = client
        .chat(ChatRequest::new("claude", vec![Message::human("hi")]))
        .await
        .unwrap_err();

    assert!(matches!(err, LlmError::Provider { status: 500, .. }));
    assert!(err.to_string().contains("anthropic API error (500)"));
}
