//! The per-room player record.

use potshot_protocol::{Action, PlayerId, PlayerView};

/// A player as stored in a room.
///
/// The room's player list is the only copy: matches refer to players by id,
/// so a wallet change is visible from either side of a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Can go negative: a raise is applied even when it can't be covered,
    /// and the match then ends.
    pub wallet: i64,
    /// This round's submitted action. `None` until the player acts, and
    /// cleared again once the round resolves.
    pub action: Option<Action>,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, wallet: i64) -> Self {
        Self {
            id,
            name: name.into(),
            wallet,
            action: None,
        }
    }

    /// The client-facing view. Never includes the pending action.
    pub fn view(&self) -> PlayerView {
        PlayerView {
            id: self.id,
            name: self.name.clone(),
            wallet: self.wallet,
        }
    }
}
