//! Bridge error types

use thiserror::Error;

/// Result type for bridge transport operations
pub type BridgeResult<T> = std::result::Result<T, BridgeError>;

/// Errors from talking to the host process.
///
/// These never cross [`OrderBridge`](crate::OrderBridge); the client logs
/// them and answers with the empty shape.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Failed to spawn host process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("Host executable not found at: {0}")]
    HostExeNotFound(String),

    #[error("Host process not running")]
    NotRunning,

    #[error("Failed to send command to host: {0}")]
    SendFailed(#[source] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Host returned error: {0}")]
    Host(String),

    #[error("Unexpected response to {0}")]
    UnexpectedResponse(&'static str),
}
