//! Wire format for streamed chat turns.
//!
//! Each event is framed as
//!
//! ```text
//! event: <name>
//! data: <json>
//!
//! ```
//!
//! with names `search_iteration`, `chat_response` and `error`. The server side
//! hands the orchestrator an [`EventSink`]; the client side decodes frames
//! incrementally with [`FrameDecoder`] and dispatches them to callbacks.

mod buffer;
mod client;
mod decoder;
mod error;
mod frame;
mod server;

pub use buffer::CircularLineBuffer;
pub use client::{consume, consume_stream, decode_events, ChatStreamClient, EventResultStream};
pub use decoder::FrameDecoder;
pub use error::StreamError;
pub use frame::{encode_frame, event_payload};
pub use server::{open_stream, EventSink, EventStream};
