//! Game configuration and the per-match state machine.

use serde::{Deserialize, Serialize};

use crate::RoomError;

// ---------------------------------------------------------------------------
// GameConfig
// ---------------------------------------------------------------------------

/// Economy settings shared by every room on the server.
///
/// Field names are camelCase on the wire, so a `config.json` written as
/// `{"startingCurrency": 100, "startingPot": 10, "raiseAmount": 10}`
/// deserializes directly. Missing fields fall back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameConfig {
    /// Wallet balance a player starts with when they join a room.
    pub starting_currency: i64,

    /// Pot every new match starts with.
    pub starting_pot: i64,

    /// Stake per raise. Also the endgame threshold: a player whose wallet
    /// drops below this can no longer raise, and their match ends.
    pub raise_amount: i64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_currency: 100,
            starting_pot: 10,
            raise_amount: 10,
        }
    }
}

impl GameConfig {
    /// Rejects values the resolver can't work with.
    pub fn validate(&self) -> Result<(), RoomError> {
        if self.raise_amount <= 0 {
            return Err(RoomError::InvalidConfig(format!(
                "raiseAmount must be positive, got {}",
                self.raise_amount
            )));
        }
        if self.starting_currency < 0 {
            return Err(RoomError::InvalidConfig(format!(
                "startingCurrency must not be negative, got {}",
                self.starting_currency
            )));
        }
        if self.starting_pot < 0 {
            return Err(RoomError::InvalidConfig(format!(
                "startingPot must not be negative, got {}",
                self.starting_pot
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MatchState
// ---------------------------------------------------------------------------

/// Where a match is within a round.
///
/// ```text
/// AwaitingActions ──(both acted)──→ Resolving ──→ AwaitingActions
///                                       │
///                                       └──────→ Ended
/// ```
///
/// `Resolving` only exists while a submitted action is being processed;
/// outside of that a live match is always `AwaitingActions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchState {
    AwaitingActions,
    Resolving,
    Ended,
}

impl MatchState {
    /// Returns `true` once the match has reached a terminal outcome.
    pub fn is_ended(&self) -> bool {
        matches!(self, Self::Ended)
    }

    /// Returns `true` if moving to `target` is a legal transition.
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::AwaitingActions, Self::Resolving)
                | (Self::Resolving, Self::AwaitingActions)
                | (Self::Resolving, Self::Ended)
        )
    }
}

impl std::fmt::Display for MatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AwaitingActions => write!(f, "AwaitingActions"),
            Self::Resolving => write!(f, "Resolving"),
            Self::Ended => write!(f, "Ended"),
        }
    }
}
