use std::pin::Pin;

use futures::{Stream, StreamExt};
use quill_types::{ChatRequest, ChatResponse, SearchIteration, StreamEvent};

use crate::decoder::FrameDecoder;
use crate::error::StreamError;

/// Boxed stream of decoded events.
pub type EventResultStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, StreamError>> + Send>>;

/// Decode a raw byte stream into events.
///
/// Frames may be split anywhere across chunks. A transport error is yielded
/// once and ends the stream.
pub fn decode_events<S, B, E>(stream: S) -> EventResultStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut chunks = Box::pin(stream);
        let mut decoder = FrameDecoder::new();
        let mut failed = false;

        while let Some(chunk) = chunks.next().await {
            match chunk {
                Ok(bytes) => {
                    for event in decoder.feed(bytes.as_ref()) {
                        yield event;
                    }
                }
                Err(e) => {
                    yield Err(StreamError::StreamTransport(e.to_string()));
                    failed = true;
                    break;
                }
            }
        }

        if !failed {
            if let Some(event) = decoder.finish() {
                yield event;
            }
        }
    })
}

/// Drive callbacks from a raw byte stream.
///
/// `on_iteration` runs for every `search_iteration` event in arrival order;
/// `on_complete` runs exactly once, for the `chat_response` event, after which
/// the stream is no longer read. Any failure aborts the stream.
pub async fn consume_stream<S, B, E, I, C>(
    stream: S,
    mut on_iteration: I,
    on_complete: C,
) -> Result<ChatResponse, StreamError>
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
    I: FnMut(SearchIteration),
    C: FnOnce(&ChatResponse),
{
    let mut events = decode_events(stream);

    while let Some(event) = events.next().await {
        match event? {
            StreamEvent::SearchIteration(iteration) => on_iteration(iteration),
            StreamEvent::ChatResponse(response) => {
                on_complete(&response);
                return Ok(response);
            }
            StreamEvent::Error { message } => return Err(StreamError::Remote(message)),
        }
    }

    Err(StreamError::StreamTransport(
        "stream ended before a chat_response event".into(),
    ))
}

/// Consume a streamed HTTP response.
///
/// Non-2xx statuses and empty bodies fail with
/// [`StreamError::StreamTransport`].
pub async fn consume<I, C>(
    response: reqwest::Response,
    on_iteration: I,
    on_complete: C,
) -> Result<ChatResponse, StreamError>
where
    I: FnMut(SearchIteration),
    C: FnOnce(&ChatResponse),
{
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(StreamError::StreamTransport(format!("HTTP {}: {}", status, body)));
    }
    if response.content_length() == Some(0) {
        return Err(StreamError::StreamTransport("response has no body".into()));
    }

    consume_stream(response.bytes_stream(), on_iteration, on_complete).await
}

/// HTTP client for the streaming chat endpoint.
#[derive(Debug, Clone)]
pub struct ChatStreamClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl ChatStreamClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn stream_chat<I, C>(
        &self,
        request: &ChatRequest,
        on_iteration: I,
        on_complete: C,
    ) -> Result<ChatResponse, StreamError>
    where
        I: FnMut(SearchIteration),
        C: FnOnce(&ChatResponse),
    {
        let response = self
            .http_client
            .post(format!("{}/journal_chat/stream", self.base_url))
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .json(request)
            .send()
            .await
            .map_err(|e| StreamError::StreamTransport(e.to_string()))?;

        consume(response, on_iteration, on_complete).await
    }
}
