//! Rooms, matchmaking, and round resolution for Potshot.
//!
//! # Key types
//!
//! - [`Room`]: players, live matches, and the join / start / action
//!   transitions, as a plain state machine returning outbound events
//! - [`pair_players`]: shuffles a room and cuts it into 1v1 pairs
//! - [`resolve_round`]: the raise / steal / shoot outcome table
//! - [`RoomRegistry`]: creates rooms on first join, routes events to them
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`GameConfig`]: starting wallet, starting pot, raise amount

mod actor;
mod config;
mod error;
mod matchmaker;
mod player;
mod registry;
mod resolver;
mod room;

pub use actor::{PlayerSender, RoomHandle, RoomInfo};
pub use config::{GameConfig, MatchState};
pub use error::RoomError;
pub use matchmaker::{Pairing, pair_players};
pub use player::Player;
pub use registry::RoomRegistry;
pub use resolver::{Resolution, Termination, depletion, resolve_round};
pub use room::{Match, MatchId, Outbound, Room};
