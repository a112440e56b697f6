//! Error types for the protocol layer.

/// Errors raised while turning events into frames or frames into events.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serializing an outbound event failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// An inbound frame was malformed, named an unknown event, or carried a
    /// payload of the wrong shape (including an unknown action kind).
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),
}
