use thiserror::Error;

/// Why an inbound frame was dropped by the normalizer.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("frame is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(String),
}

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("failed to encode command: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("channel is not connected")]
    NotConnected,

    #[error("command queue closed")]
    Closed,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key}={value} is invalid: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}
