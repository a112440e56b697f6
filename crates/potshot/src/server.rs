//! `PotshotServer` builder and accept loop.
//!
//! Ties the layers together: transport → protocol → room registry.

use std::sync::Arc;

use potshot_protocol::{Codec, JsonCodec};
use potshot_room::{GameConfig, RoomRegistry};
use potshot_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::PotshotError;
use crate::config::ServerConfig;
use crate::handler::handle_connection;

/// Shared state handed to every connection task.
///
/// The registry lock is held only long enough to look up or create a room
/// handle. Everything after that goes through the room's own actor.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) rooms: Mutex<RoomRegistry>,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a Potshot server.
///
/// ```rust,no_run
/// use potshot::prelude::*;
///
/// # async fn run() -> Result<(), PotshotError> {
/// let server = PotshotServer::builder()
///     .bind("0.0.0.0:3000")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct PotshotServerBuilder {
    bind_addr: String,
    game: GameConfig,
}

impl PotshotServerBuilder {
    /// Creates a builder with the default bind address and economy.
    pub fn new() -> Self {
        Self::from_config(ServerConfig::default())
    }

    /// Creates a builder from a loaded [`ServerConfig`].
    pub fn from_config(config: ServerConfig) -> Self {
        Self {
            bind_addr: config.bind_addr,
            game: config.game,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the economy every room on this server uses.
    pub fn game_config(mut self, game: GameConfig) -> Self {
        self.game = game;
        self
    }

    /// Validates the game config and binds the listener.
    pub async fn build(self) -> Result<PotshotServer<JsonCodec>, PotshotError> {
        self.game.validate()?;
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            rooms: Mutex::new(RoomRegistry::new(self.game)),
            codec: JsonCodec,
        });

        Ok(PotshotServer { transport, state })
    }
}

impl Default for PotshotServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Potshot server. Call [`run()`](Self::run) to start serving.
pub struct PotshotServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl PotshotServer<JsonCodec> {
    pub fn builder() -> PotshotServerBuilder {
        PotshotServerBuilder::new()
    }
}

impl<C: Codec> PotshotServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Accepts connections forever, one handler task per connection.
    pub async fn run(mut self) -> Result<(), PotshotError> {
        match self.local_addr() {
            Ok(addr) => tracing::info!(%addr, "potshot server running"),
            Err(_) => tracing::info!("potshot server running"),
        }

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
