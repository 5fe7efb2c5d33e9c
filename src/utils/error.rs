//! The `error` module defines the process-level error type for `framerelay`.
//!
//! Per-connection failures never reach this type: a read or write error on a
//! session simply ends that session. What lands here is fatal to a command,
//! such as the listener failing to bind or the configuration being invalid.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
