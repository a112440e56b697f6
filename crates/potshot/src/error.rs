//! Unified error type for the Potshot server.

use potshot_protocol::ProtocolError;
use potshot_room::RoomError;
use potshot_transport::TransportError;

use crate::config::ConfigError;

/// Top-level error that wraps every layer's error.
///
/// `#[from]` on each variant lets `?` convert sub-crate errors directly.
#[derive(Debug, thiserror::Error)]
pub enum PotshotError {
    /// Socket-level failure (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A frame couldn't be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Room lookup, membership, or resolution failure.
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The server configuration couldn't be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
