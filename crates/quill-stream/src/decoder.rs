use quill_types::{ChatResponse, SearchIteration, StreamEvent};
use serde::Deserialize;

use crate::buffer::CircularLineBuffer;
use crate::error::StreamError;

#[derive(Deserialize)]
struct ErrorPayload {
    #[serde(alias = "message")]
    error: String,
}

/// Incremental frame decoder.
///
/// Feed it arbitrary byte chunks; it returns every event whose terminating
/// blank line has arrived. Comment lines (`:`) and unknown event names are
/// skipped.
pub struct FrameDecoder {
    lines: CircularLineBuffer,
    event: Option<String>,
    data: Vec<String>,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self {
            lines: CircularLineBuffer::with_capacity(4096),
            event: None,
            data: Vec::new(),
        }
    }

    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Result<StreamEvent, StreamError>> {
        self.lines.extend(bytes);

        let mut events = Vec::new();
        while let Some(line) = self.lines.next_line() {
            match line {
                Ok(line) => {
                    if let Some(event) = self.process_line(&line) {
                        events.push(event);
                    }
                }
                Err(e) => events.push(Err(e)),
            }
        }
        events
    }

    /// Flush a trailing frame that was not followed by a blank line.
    pub fn finish(&mut self) -> Option<Result<StreamEvent, StreamError>> {
        let mut pending = None;
        if let Some(line) = self.lines.take_remainder() {
            match line {
                Ok(line) => pending = self.process_line(&line),
                Err(e) => return Some(Err(e)),
            }
        }
        pending.or_else(|| self.dispatch())
    }

    fn process_line(&mut self, line: &str) -> Option<Result<StreamEvent, StreamError>> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<Result<StreamEvent, StreamError>> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        let name = event.unwrap_or_else(|| "message".to_string());

        let decoded = match name.as_str() {
            StreamEvent::SEARCH_ITERATION => {
                serde_json::from_str::<SearchIteration>(&data).map(StreamEvent::SearchIteration)
            }
            StreamEvent::CHAT_RESPONSE => {
                serde_json::from_str::<ChatResponse>(&data).map(StreamEvent::ChatResponse)
            }
            StreamEvent::ERROR => serde_json::from_str::<ErrorPayload>(&data)
                .map(|payload| StreamEvent::Error {
                    message: payload.error,
                }),
            other => {
                tracing::debug!(event = other, "Ignoring unknown stream event");
                return None;
            }
        };

        Some(decoded.map_err(|e| StreamError::MalformedStream {
            event: name,
            reason: e.to_string(),
        }))
    }
}
