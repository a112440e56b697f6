//! Error types for the room layer.

use potshot_protocol::{PlayerId, RoomCode};

/// Errors that can occur during room, matchmaking, and resolution operations.
///
/// `RoomNotFound` and `MatchNotFound` mean the triggering event is dropped
/// with no state change. `AlreadyJoined` is reported only to the offending
/// connection. `InvariantViolation` means the outcome table or the match
/// index is broken and must be logged loudly.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// No room with this code exists.
    #[error("room {0} not found")]
    RoomNotFound(RoomCode),

    /// The player has no active match in the room (never paired, drew
    /// "safe", or their match already ended).
    #[error("no active match for player {0}")]
    MatchNotFound(PlayerId),

    /// The player is already in this room.
    #[error("player {0} already joined room {1}")]
    AlreadyJoined(PlayerId, RoomCode),

    /// Internal state contradicts itself. Indicates a bug, never user input.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// A `GameConfig` value was rejected.
    #[error("invalid game config: {0}")]
    InvalidConfig(String),

    /// The room's command channel is full or closed.
    #[error("room {0} is unavailable")]
    Unavailable(RoomCode),
}
