//! Named events exchanged with clients, and the views they carry.
//!
//! Every frame is one JSON object of the form
//! `{"event": "<name>", "data": <payload>}`. The event names are the ones the
//! browser client listens for, spaces included.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Action, PlayerId, RoomCode};

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// What clients get to see of a player. A pending action is never included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub wallet: i64,
}

/// A room and its players in join order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomView {
    pub id: RoomCode,
    pub players: Vec<PlayerView>,
}

/// One participant's view of their match.
///
/// `me` is the recipient; it goes over the wire as `self`. `opponent` is
/// `None` for a player who drew no opponent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchView {
    #[serde(rename = "self")]
    pub me: PlayerView,
    pub opponent: Option<PlayerView>,
    pub pot: i64,
    pub ended: bool,
}

/// Terminal result of a match. `winner` is `None` on a draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub ended: bool,
    pub winner: Option<PlayerView>,
}

/// Payload of `round ended`: either the refreshed match for the next round,
/// or the final result.
///
/// Untagged, so `Continued` serializes as a bare [`MatchView`] and `Ended` as
/// `{ended: true, winner}`. `Continued` is listed first because a
/// `MatchResult` body lacks the `self` and `pot` fields a view requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoundOutcome {
    Continued(MatchView),
    Ended(MatchResult),
}

impl RoundOutcome {
    /// Builds the terminal outcome.
    pub fn ended(winner: Option<PlayerView>) -> Self {
        Self::Ended(MatchResult {
            ended: true,
            winner,
        })
    }

    /// Returns `true` if the match is over.
    pub fn is_ended(&self) -> bool {
        match self {
            Self::Continued(view) => view.ended,
            Self::Ended(result) => result.ended,
        }
    }
}

// ---------------------------------------------------------------------------
// Client → server
// ---------------------------------------------------------------------------

/// Events a client sends. Payload fields are camelCase on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    /// Join (creating if needed) the room with this code.
    #[serde(rename = "join room")]
    JoinRoom { room_id: RoomCode, name: String },

    /// Pair everyone in the room and start a round.
    #[serde(rename = "start game")]
    StartGame { room_id: RoomCode },

    /// Submit this round's secret action.
    #[serde(rename = "match action")]
    MatchAction { room_id: RoomCode, action: Action },
}

impl ClientEvent {
    /// The room this event is addressed to.
    pub fn room(&self) -> &RoomCode {
        match self {
            Self::JoinRoom { room_id, .. }
            | Self::StartGame { room_id }
            | Self::MatchAction { room_id, .. } => room_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Server → client
// ---------------------------------------------------------------------------

/// Events the server sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// To the joiner: their stored player record and the room as it is now.
    #[serde(rename = "joined room")]
    JoinedRoom { player: PlayerView, room: RoomView },

    /// To everyone else in the room.
    #[serde(rename = "player joined")]
    PlayerJoined(PlayerView),

    /// To a connection that tried to join a room it is already in.
    #[serde(rename = "already joined")]
    AlreadyJoined,

    /// Room-wide, before pairings go out.
    #[serde(rename = "starting game")]
    StartingGame,

    /// To a paired player: their side of the new match.
    #[serde(rename = "match found")]
    MatchFound(MatchView),

    /// To a player who drew no opponent.
    #[serde(rename = "safe")]
    Safe,

    /// Room-wide, every player's view keyed by player id.
    #[serde(rename = "game started")]
    GameStarted {
        matches: BTreeMap<PlayerId, MatchView>,
    },

    /// To the opponent of whoever just acted. Does not say which action.
    #[serde(rename = "opponent action")]
    OpponentAction,

    /// To both participants once a round resolves.
    #[serde(rename = "round ended")]
    RoundEnded(RoundOutcome),

    /// To the sender of a frame that couldn't be understood.
    #[serde(rename = "error")]
    Error { code: u16, message: String },
}

impl ServerEvent {
    /// The wire name of this event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::JoinedRoom { .. } => "joined room",
            Self::PlayerJoined(_) => "player joined",
            Self::AlreadyJoined => "already joined",
            Self::StartingGame => "starting game",
            Self::MatchFound(_) => "match found",
            Self::Safe => "safe",
            Self::GameStarted { .. } => "game started",
            Self::OpponentAction => "opponent action",
            Self::RoundEnded(_) => "round ended",
            Self::Error { .. } => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn alice() -> PlayerView {
        PlayerView {
            id: PlayerId(1),
            name: "alice".into(),
            wallet: 100,
        }
    }

    fn bob() -> PlayerView {
        PlayerView {
            id: PlayerId(2),
            name: "bob".into(),
            wallet: 90,
        }
    }

    #[test]
    fn test_join_room_uses_camel_case_payload() {
        let frame = json!({
            "event": "join room",
            "data": { "roomId": "den", "name": "alice" }
        });
        let event: ClientEvent = serde_json::from_value(frame).unwrap();
        assert_eq!(
            event,
            ClientEvent::JoinRoom {
                room_id: RoomCode::from("den"),
                name: "alice".into(),
            }
        );
        assert_eq!(event.room().as_str(), "den");
    }

    #[test]
    fn test_start_game_payload() {
        let event = ClientEvent::StartGame {
            room_id: RoomCode::from("den"),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json, json!({"event": "start game", "data": {"roomId": "den"}}));
    }

    #[test]
    fn test_unknown_client_event_is_rejected() {
        let frame = json!({"event": "leave room", "data": {"roomId": "den"}});
        let result: Result<ClientEvent, _> = serde_json::from_value(frame);
        assert!(result.is_err());
    }

    #[test]
    fn test_unit_events_carry_only_the_name() {
        for event in [
            ServerEvent::AlreadyJoined,
            ServerEvent::StartingGame,
            ServerEvent::Safe,
            ServerEvent::OpponentAction,
        ] {
            let json = serde_json::to_value(&event).unwrap();
            assert_eq!(json, json!({ "event": event.name() }));
        }
    }

    #[test]
    fn test_match_view_serializes_me_as_self() {
        let view = MatchView {
            me: alice(),
            opponent: Some(bob()),
            pot: 30,
            ended: false,
        };
        let json = serde_json::to_value(ServerEvent::MatchFound(view)).unwrap();

        assert_eq!(json["event"], "match found");
        assert_eq!(json["data"]["self"]["name"], "alice");
        assert_eq!(json["data"]["opponent"]["id"], 2);
        assert_eq!(json["data"]["pot"], 30);
        assert_eq!(json["data"]["ended"], false);
        assert!(json["data"]["self"].get("action").is_none());
    }

    #[test]
    fn test_round_ended_terminal_shape() {
        let event = ServerEvent::RoundEnded(RoundOutcome::ended(None));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            json!({"event": "round ended", "data": {"ended": true, "winner": null}})
        );
    }

    #[test]
    fn test_round_outcome_decodes_to_the_right_variant() {
        let continued = RoundOutcome::Continued(MatchView {
            me: alice(),
            opponent: Some(bob()),
            pot: 30,
            ended: false,
        });
        let ended = RoundOutcome::ended(Some(bob()));

        for outcome in [continued, ended] {
            let bytes = serde_json::to_vec(&outcome).unwrap();
            let decoded: RoundOutcome = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(decoded, outcome);
        }
    }

    #[test]
    fn test_game_started_keys_matches_by_player_id() {
        let mut matches = BTreeMap::new();
        matches.insert(
            PlayerId(1),
            MatchView {
                me: alice(),
                opponent: None,
                pot: 10,
                ended: false,
            },
        );
        let json =
            serde_json::to_value(ServerEvent::GameStarted { matches }).unwrap();
        assert!(json["data"]["matches"]["1"]["opponent"].is_null());
    }
}
