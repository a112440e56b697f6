//! Identity types, actions, and routing targets.

use std::fmt;

use potshot_transport::ConnectionId;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Identifies a player for the lifetime of their connection.
///
/// A player *is* a connection here: the id is taken straight from the
/// transport's [`ConnectionId`], so it is unique and stable until the socket
/// closes. Serializes as a plain number.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl From<ConnectionId> for PlayerId {
    fn from(id: ConnectionId) -> Self {
        Self(id.into_inner())
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A room code chosen by whoever joins first. Serializes as a plain string.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RoomCode(pub String);

impl RoomCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoomCode {
    fn from(code: &str) -> Self {
        Self(code.to_string())
    }
}

impl From<String> for RoomCode {
    fn from(code: String) -> Self {
        Self(code)
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// The three secret moves a player can make in a round.
///
/// The derived ordering (`Raise < Steal < Shoot`) is what lets the resolver
/// key its outcome table on an unordered pair: sort the two actions, then
/// match on the sorted tuple.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Put `raise_amount` into the pot.
    Raise,
    /// Try to take the pot.
    Steal,
    /// Punish a stealer, or end the match outright.
    Shoot,
}

impl Action {
    /// Every action, in order.
    pub const ALL: [Action; 3] = [Action::Raise, Action::Steal, Action::Shoot];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raise => write!(f, "raise"),
            Self::Steal => write!(f, "steal"),
            Self::Shoot => write!(f, "shoot"),
        }
    }
}

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Who inside a room should receive an outbound event.
///
/// State transitions in the room layer return `(Recipient, ServerEvent)`
/// pairs instead of writing to sockets; the room actor fans them out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    /// Every player in the room.
    All,
    /// One specific player.
    Player(PlayerId),
    /// Every player in the room except this one.
    AllExcept(PlayerId),
}
