//! Error types for the call bridge.
//!
//! Every error here is fatal to at most its own call session; nothing
//! propagates across sessions or to the process.

use thiserror::Error;

/// Errors raised while running one call session.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The signed-URL issuer refused or failed the request
    #[error("Signed URL request failed: {0}")]
    SignedUrl(String),

    /// The agent-leg WebSocket could not be established
    #[error("Agent connection failed: {0}")]
    AgentConnect(String),

    /// Sending on the agent leg failed (leg closed or backpressured)
    #[error("Agent send failed: {0}")]
    AgentSend(String),

    /// The agent leg is already closed
    #[error("Agent leg closed")]
    AgentClosed,

    /// JSON (de)serialization failure
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Base64 audio payload could not be decoded
    #[error("Audio transcode failed: {0}")]
    Transcode(String),

    /// Invalid server configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_failures_map_to_serialization() {
        let err = serde_json::from_str::<u32>("not a number").unwrap_err();
        let bridged = BridgeError::from(err);
        assert!(matches!(bridged, BridgeError::Serialization(_)));
    }
}
