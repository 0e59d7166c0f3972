use quill_types::{ChatResponse, SearchIteration, StreamEvent};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::error::StreamError;

/// Receiving half handed to the HTTP layer.
pub type EventStream = ReceiverStream<StreamEvent>;

/// Open a bounded event channel for one turn.
///
/// The stream ends once the sink is dropped or a terminal event is sent.
pub fn open_stream(capacity: usize) -> (EventSink, EventStream) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (EventSink { tx }, ReceiverStream::new(rx))
}

/// Sending half owned by the orchestrator for the duration of one turn.
///
/// Terminal events consume the sink, so nothing can follow them.
#[derive(Debug)]
pub struct EventSink {
    tx: mpsc::Sender<StreamEvent>,
}

impl EventSink {
    /// Emit a progress event.
    ///
    /// Fails with [`StreamError::Disconnected`] once the client has gone away,
    /// which callers treat as cancellation.
    pub async fn iteration(&self, iteration: SearchIteration) -> Result<(), StreamError> {
        self.send(StreamEvent::SearchIteration(iteration)).await
    }

    pub async fn complete(self, response: ChatResponse) -> Result<(), StreamError> {
        self.send(StreamEvent::ChatResponse(response)).await
    }

    pub async fn fail(self, message: impl Into<String>) -> Result<(), StreamError> {
        self.send(StreamEvent::error(message)).await
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    async fn send(&self, event: StreamEvent) -> Result<(), StreamError> {
        self.tx
            .send(event)
            .await
            .map_err(|_| StreamError::Disconnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt;

    fn iteration(n: u32) -> SearchIteration {
        SearchIteration {
            iteration: n,
            tool: "vector_search".into(),
            reasoning: String::new(),
            query: None,
            results_count: 0,
            new_entries_added: 0,
        }
    }

    #[tokio::test]
    async fn test_stream_ends_after_terminal_event() {
        let (sink, mut stream) = open_stream(8);

        sink.iteration(iteration(1)).await.unwrap();
        sink.complete(ChatResponse {
            response: "done".into(),
            docs: vec![],
            thread_id: None,
        })
        .await
        .unwrap();

        assert!(matches!(stream.next().await, Some(StreamEvent::SearchIteration(_))));
        assert!(matches!(stream.next().await, Some(StreamEvent::ChatResponse(_))));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_dropped_receiver_is_disconnect() {
        let (sink, stream) = open_stream(1);
        drop(stream);

        assert!(sink.is_closed());
        assert_eq!(sink.iteration(iteration(1)).await, Err(StreamError::Disconnected));
    }
}
