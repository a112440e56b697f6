//! Wire protocol for Potshot.
//!
//! - **Types** ([`PlayerId`], [`RoomCode`], [`Action`], [`Recipient`]):
//!   identities and the three round actions.
//! - **Events** ([`ClientEvent`], [`ServerEvent`]) and the views they carry
//!   ([`PlayerView`], [`RoomView`], [`MatchView`], [`RoundOutcome`]).
//! - **Codec** ([`Codec`], [`JsonCodec`]): frames to events and back.
//!
//! ```text
//! Transport (frames) → Protocol (events) → Room (game state)
//! ```

mod codec;
mod error;
mod events;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use events::{
    ClientEvent, MatchResult, MatchView, PlayerView, RoomView, RoundOutcome,
    ServerEvent,
};
pub use types::{Action, PlayerId, Recipient, RoomCode};
