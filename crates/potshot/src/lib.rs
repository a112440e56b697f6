//! # Potshot
//!
//! A room-based bluffing game server. Players join a room over WebSocket,
//! get paired off at random, and play rounds where each side secretly
//! chooses to raise, steal, or shoot.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use potshot::prelude::*;
//!
//! # async fn run() -> Result<(), PotshotError> {
//! let config = ServerConfig::load()?;
//! let server = PotshotServerBuilder::from_config(config).build().await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::{ConfigError, DEFAULT_BIND_ADDR, ServerConfig};
pub use error::PotshotError;
pub use server::{PotshotServer, PotshotServerBuilder};

pub mod prelude {
    //! Everything needed to configure and run a server.

    pub use crate::{
        ConfigError, PotshotError, PotshotServer, PotshotServerBuilder,
        ServerConfig,
    };
    pub use potshot_protocol::{
        Action, ClientEvent, MatchView, PlayerId, PlayerView, RoomCode,
        RoundOutcome, ServerEvent,
    };
    pub use potshot_room::GameConfig;
}
