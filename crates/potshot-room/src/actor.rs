//! Room actor: a Tokio task that owns one [`Room`] and applies commands to
//! it one at a time.
//!
//! All mutations of a room's players and matches happen inside its actor,
//! so events for the same room are serialized without a lock, while
//! different rooms run independently.

use std::collections::HashMap;

use potshot_protocol::{Action, PlayerId, PlayerView, Recipient, RoomCode, ServerEvent};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::{mpsc, oneshot};

use crate::room::Outbound;
use crate::{GameConfig, Room, RoomError};

/// Channel sender delivering outbound events to one connection.
pub type PlayerSender = mpsc::UnboundedSender<ServerEvent>;

/// Commands sent to a room actor through its channel.
pub(crate) enum RoomCommand {
    Join {
        player_id: PlayerId,
        name: String,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<PlayerView, RoomError>>,
    },
    Start,
    Action {
        player_id: PlayerId,
        action: Action,
    },
    GetInfo {
        reply: oneshot::Sender<RoomInfo>,
    },
    Shutdown,
}

/// A snapshot of room metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub code: RoomCode,
    pub player_count: usize,
    /// Matches that haven't ended yet.
    pub active_matches: usize,
}

/// Handle to a running room actor. Cheap to clone.
#[derive(Clone)]
pub struct RoomHandle {
    code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// Adds a player and registers where their events should go.
    ///
    /// On [`RoomError::AlreadyJoined`] the room has already sent
    /// `already joined` through `sender`; the error is informational.
    pub async fn join(
        &self,
        player_id: PlayerId,
        name: String,
        sender: PlayerSender,
    ) -> Result<PlayerView, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Join {
            player_id,
            name,
            sender,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Asks the room to pair its players (fire-and-forget).
    pub async fn start_game(&self) -> Result<(), RoomError> {
        self.send(RoomCommand::Start).await
    }

    /// Delivers a player's action (fire-and-forget).
    pub async fn submit_action(
        &self,
        player_id: PlayerId,
        action: Action,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::Action { player_id, action }).await
    }

    /// Requests the current room info.
    ///
    /// Commands are processed in order, so once this returns every command
    /// sent before it has been applied and its events dispatched.
    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::GetInfo { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Tells the room to shut down.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.send(RoomCommand::Shutdown).await
    }

    async fn send(&self, cmd: RoomCommand) -> Result<(), RoomError> {
        self.sender.send(cmd).await.map_err(|_| self.unavailable())
    }

    fn unavailable(&self) -> RoomError {
        RoomError::Unavailable(self.code.clone())
    }
}

struct RoomActor {
    room: Room,
    /// Per-player outbound channels.
    senders: HashMap<PlayerId, PlayerSender>,
    rng: StdRng,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    async fn run(mut self) {
        tracing::info!(room = %self.room.code(), "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    player_id,
                    name,
                    sender,
                    reply,
                } => {
                    let result = self.handle_join(player_id, name, sender);
                    let _ = reply.send(result);
                }
                RoomCommand::Start => self.handle_start(),
                RoomCommand::Action { player_id, action } => {
                    self.handle_action(player_id, action);
                }
                RoomCommand::GetInfo { reply } => {
                    let _ = reply.send(self.info());
                }
                RoomCommand::Shutdown => {
                    tracing::info!(room = %self.room.code(), "room shutting down");
                    break;
                }
            }
        }

        tracing::info!(room = %self.room.code(), "room actor stopped");
    }

    fn handle_join(
        &mut self,
        player_id: PlayerId,
        name: String,
        sender: PlayerSender,
    ) -> Result<PlayerView, RoomError> {
        match self.room.join(player_id, name) {
            Ok(msgs) => {
                self.senders.insert(player_id, sender);
                self.dispatch(msgs);
                self.room
                    .player(player_id)
                    .map(|p| p.view())
                    .ok_or_else(|| {
                        RoomError::InvariantViolation(format!(
                            "player {player_id} missing right after joining"
                        ))
                    })
            }
            Err(e) => {
                tracing::debug!(
                    room = %self.room.code(),
                    %player_id,
                    "duplicate join rejected"
                );
                let _ = sender.send(ServerEvent::AlreadyJoined);
                Err(e)
            }
        }
    }

    fn handle_start(&mut self) {
        let msgs = self.room.start_game(&mut self.rng);
        self.dispatch(msgs);
    }

    fn handle_action(&mut self, player_id: PlayerId, action: Action) {
        if !self.room.contains(player_id) {
            tracing::warn!(
                room = %self.room.code(),
                %player_id,
                "action from non-member, ignoring"
            );
            return;
        }

        match self.room.submit_action(player_id, action) {
            Ok(msgs) => self.dispatch(msgs),
            Err(RoomError::InvariantViolation(reason)) => {
                tracing::error!(
                    room = %self.room.code(),
                    %player_id,
                    %action,
                    %reason,
                    "round resolution failed"
                );
            }
            Err(e) => {
                tracing::debug!(
                    room = %self.room.code(),
                    %player_id,
                    error = %e,
                    "action dropped"
                );
            }
        }
    }

    /// Fans outbound events out to the right connections.
    fn dispatch(&self, msgs: Vec<Outbound>) {
        for (recipient, event) in msgs {
            match recipient {
                Recipient::All => {
                    for player in self.room.players() {
                        self.send_to(player.id, event.clone());
                    }
                }
                Recipient::Player(id) => self.send_to(id, event),
                Recipient::AllExcept(excluded) => {
                    for player in self.room.players() {
                        if player.id != excluded {
                            self.send_to(player.id, event.clone());
                        }
                    }
                }
            }
        }
    }

    /// Silently drops the event if the connection is gone.
    fn send_to(&self, player_id: PlayerId, event: ServerEvent) {
        if let Some(sender) = self.senders.get(&player_id) {
            let _ = sender.send(event);
        }
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            code: self.room.code().clone(),
            player_count: self.room.players().len(),
            active_matches: self.room.active_matches(),
        }
    }
}

/// Spawns a room actor and returns a handle to it.
///
/// `channel_size` bounds the command queue; senders wait when it is full.
pub(crate) fn spawn_room(
    code: RoomCode,
    config: GameConfig,
    channel_size: usize,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = RoomActor {
        room: Room::new(code.clone(), config),
        senders: HashMap::new(),
        rng: StdRng::from_os_rng(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle { code, sender: tx }
}
