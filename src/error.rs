//! Errors for the outer server surfaces. The vehicle actuator itself never fails.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("cannot read config {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),

    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error("bad command: {0}")]
    BadCommand(String),
}
