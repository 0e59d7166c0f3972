use quill_llm::{ChatClient, ChatRequest, LlmError, Message, OpenAIClient};

#[tokio::test]
async fn test_chat_returns_first_choice() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "id": "chatcmpl-1",
                "choices": [{"index": 0, "message": {"role": "assistant", "content": "you slept well"}, "finish_reason": "stop"}],
                "usage": {"prompt_tokens": 10, "completion_tokens": 4, "total_tokens": 14}
            }"#,
        )
        .create_async()
        .await;

    let client = OpenAIClient::new("sk-test").unwrap().with_base_url(server.url());
    let response = client
        .chat(ChatRequest::new("gpt-4o", vec![Message::human("how did i sleep?")]))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(response.content, "you slept well");
    assert_eq!(response.finish_reason.as_deref(), Some("stop"));
    assert_eq!(response.usage.map(|u| u.total_tokens), Some(14));
}

#[tokio::test]
async fn test_non_success_status_is_provider_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(429)
        .with_body("rate limited")
        .create_async()
        .await;

    let client = OpenAIClient::new("sk-test").unwrap().with_base_url(server.url());
    let err = client
        .chat(ChatRequest::new("gpt-4o", vec![Message::human("hi")]))
        .await
        .unwrap_err();

    match err {
        LlmError::Provider { provider, status, body } => {
            assert_eq!(provider, "openai");
            assert_eq!(status, 429);
            assert_eq!(body, "rate limited");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_choices_is_invalid_response() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices": []}"#)
        .create_async()
        .await;

    let client = OpenAIClient::new("sk-test").unwrap().with_base_url(server.url());
    let err = client
        .chat(ChatRequest::new("gpt-4o", vec![Message::human("hi")]))
        .await
        .unwrap_err();

    assert!(matches!(err, LlmError::InvalidResponse { .. }));
}
