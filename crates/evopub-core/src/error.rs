use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Event type must be a non-empty string")]
    EmptyEventType,

    #[error("Event type is a sentinel literal: {0}")]
    SentinelEventType(String),

    #[error("Payload must not be null")]
    NullPayload,

    #[error("Payload is a sentinel literal: {0}")]
    SentinelPayload(String),
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("No live connection to the stream transport")]
    NotConnected,

    #[error("Append to stream '{stream}' failed: {message}")]
    Append { stream: String, message: String },

    #[error("Append to stream '{stream}' timed out")]
    Timeout { stream: String },
}
