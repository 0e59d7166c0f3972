use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// A frame's data could not be decoded.
    #[error("Malformed {event} event: {reason}")]
    MalformedStream { event: String, reason: String },

    /// Non-2xx response, missing body, or the connection ended early.
    #[error("Stream transport error: {0}")]
    StreamTransport(String),

    /// The server reported a failed turn with an `error` event.
    #[error("Server reported an error: {0}")]
    Remote(String),

    /// The receiving side went away before the event could be delivered.
    #[error("Stream receiver disconnected")]
    Disconnected,
}
