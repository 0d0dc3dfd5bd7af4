//! Error types for the application.

use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {message}")]
    IoError { path: String, message: String },

    #[error("Failed to parse config: {message}")]
    ParseError { message: String },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

/// OneBot transport errors (WebSocket side).
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Failed to connect to {url}: {source}")]
    ConnectFailed {
        url: String,
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Failed to encode action: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors that abort the handling of a single routed event.
///
/// These never escape the per-event boundary; they are logged and the
/// event is dropped.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("Chat room outbound channel closed")]
    ChatRoomClosed,

    #[error("Remote link outbound channel closed")]
    RemoteClosed,

    #[error("Malformed command result for '{command}': {source}")]
    MalformedResult {
        command: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type alias for routing operations.
pub type RouteResult<T> = std::result::Result<T, RouteError>;
