//! Room registry: owns every room on the server, keyed by room code.

use std::collections::HashMap;

use potshot_protocol::{Action, PlayerId, PlayerView, RoomCode};

use crate::actor::spawn_room;
use crate::{GameConfig, PlayerSender, RoomError, RoomHandle, RoomInfo};

/// Default command channel size for room actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Creates rooms on first use and routes events to them.
///
/// Callers only ever get [`RoomHandle`]s back; the rooms themselves live
/// inside their actors.
pub struct RoomRegistry {
    rooms: HashMap<RoomCode, RoomHandle>,
    config: GameConfig,
}

impl RoomRegistry {
    /// Creates an empty registry. Every room it creates uses `config`.
    pub fn new(config: GameConfig) -> Self {
        Self {
            rooms: HashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Returns the room with this code, creating an empty one if needed.
    pub fn get_or_create_room(&mut self, code: &RoomCode) -> RoomHandle {
        if let Some(handle) = self.rooms.get(code) {
            return handle.clone();
        }
        let handle = spawn_room(code.clone(), self.config, DEFAULT_CHANNEL_SIZE);
        self.rooms.insert(code.clone(), handle.clone());
        tracing::info!(room = %code, "room created");
        handle
    }

    /// Returns the room with this code.
    ///
    /// # Errors
    /// [`RoomError::RoomNotFound`] if nobody has joined it yet.
    pub fn room(&self, code: &RoomCode) -> Result<RoomHandle, RoomError> {
        self.rooms
            .get(code)
            .cloned()
            .ok_or_else(|| RoomError::RoomNotFound(code.clone()))
    }

    /// Joins a player to a room, creating the room on first join.
    pub async fn join(
        &mut self,
        code: &RoomCode,
        player_id: PlayerId,
        name: String,
        sender: PlayerSender,
    ) -> Result<PlayerView, RoomError> {
        let handle = self.get_or_create_room(code);
        handle.join(player_id, name, sender).await
    }

    /// Starts (or restarts) the game in a room.
    pub async fn start_game(&self, code: &RoomCode) -> Result<(), RoomError> {
        self.room(code)?.start_game().await
    }

    /// Routes a player's action to a room.
    pub async fn submit_action(
        &self,
        code: &RoomCode,
        player_id: PlayerId,
        action: Action,
    ) -> Result<(), RoomError> {
        self.room(code)?.submit_action(player_id, action).await
    }

    /// Returns info about a room.
    pub async fn room_info(&self, code: &RoomCode) -> Result<RoomInfo, RoomError> {
        self.room(code)?.info().await
    }

    /// Shuts a room down and forgets it.
    pub async fn remove_room(&mut self, code: &RoomCode) -> Result<(), RoomError> {
        let handle = self
            .rooms
            .remove(code)
            .ok_or_else(|| RoomError::RoomNotFound(code.clone()))?;
        let _ = handle.shutdown().await;
        tracing::info!(room = %code, "room removed");
        Ok(())
    }

    /// Returns the number of rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Lists all room codes.
    pub fn room_codes(&self) -> Vec<RoomCode> {
        self.rooms.keys().cloned().collect()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}
