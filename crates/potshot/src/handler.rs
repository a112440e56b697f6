//! Per-connection handler.
//!
//! Each accepted connection gets its own task. The connection id becomes
//! the player id, and the task owns an outbound channel that room actors
//! push events into. The loop waits on both sides at once:
//!
//! - inbound frame → decode a [`ClientEvent`] → route to the room
//! - outbound event from a room → encode → send

use std::sync::Arc;

use potshot_protocol::{Action, ClientEvent, Codec, PlayerId, RoomCode, ServerEvent};
use potshot_room::{PlayerSender, RoomError};
use potshot_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::PotshotError;
use crate::server::ServerState;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), PotshotError> {
    let conn_id = conn.id();
    let player_id = PlayerId::from(conn_id);
    tracing::debug!(%conn_id, %player_id, "handling new connection");

    let result = serve(&conn, &state, player_id).await;

    // Rooms may still hold this player's sender; events sent after this
    // point are dropped with the receiver.
    if let Err(e) = conn.close().await {
        tracing::debug!(%player_id, error = %e, "close after disconnect failed");
    }
    result
}

/// Runs the connection until the peer goes away or a send fails.
async fn serve<C: Codec>(
    conn: &WebSocketConnection,
    state: &ServerState<C>,
    player_id: PlayerId,
) -> Result<(), PotshotError> {
    let (outbound, mut events) = mpsc::unbounded_channel::<ServerEvent>();

    loop {
        tokio::select! {
            inbound = conn.recv() => {
                let data = match inbound {
                    Ok(Some(data)) => data,
                    Ok(None) => {
                        tracing::info!(%player_id, "connection closed cleanly");
                        return Ok(());
                    }
                    Err(e) => {
                        tracing::debug!(%player_id, error = %e, "recv error");
                        return Ok(());
                    }
                };

                let event: ClientEvent = match state.codec.decode(&data) {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::debug!(%player_id, error = %e, "failed to decode event");
                        send_error(conn, &state.codec, 400, &e.to_string()).await?;
                        continue;
                    }
                };

                handle_event(state, player_id, &outbound, event).await;
            }
            Some(event) = events.recv() => {
                send_event(conn, &state.codec, &event).await?;
            }
        }
    }
}

/// Routes one decoded event to its room.
///
/// Dropped events (unknown room, no match) are logged and otherwise
/// ignored; the client gets no reply for them.
async fn handle_event<C: Codec>(
    state: &ServerState<C>,
    player_id: PlayerId,
    outbound: &PlayerSender,
    event: ClientEvent,
) {
    let result = match event {
        ClientEvent::JoinRoom { room_id, name } => {
            join_room(state, player_id, outbound, room_id, name).await
        }
        ClientEvent::StartGame { room_id } => start_game(state, room_id).await,
        ClientEvent::MatchAction { room_id, action } => {
            match_action(state, player_id, room_id, action).await
        }
    };

    match result {
        Ok(()) => {}
        // Already reported to this connection by the room.
        Err(RoomError::AlreadyJoined(..)) => {}
        Err(e @ (RoomError::RoomNotFound(_) | RoomError::MatchNotFound(_))) => {
            tracing::debug!(%player_id, error = %e, "event dropped");
        }
        Err(e) => {
            tracing::error!(%player_id, error = %e, "event failed");
        }
    }
}

async fn join_room<C: Codec>(
    state: &ServerState<C>,
    player_id: PlayerId,
    outbound: &PlayerSender,
    room_id: RoomCode,
    name: String,
) -> Result<(), RoomError> {
    // Lock only to find the room; the join itself goes through the actor.
    let room = state.rooms.lock().await.get_or_create_room(&room_id);
    let player = room.join(player_id, name, outbound.clone()).await?;
    tracing::info!(room = %room_id, %player_id, name = %player.name, "player joined");
    Ok(())
}

async fn start_game<C: Codec>(
    state: &ServerState<C>,
    room_id: RoomCode,
) -> Result<(), RoomError> {
    let room = state.rooms.lock().await.room(&room_id)?;
    room.start_game().await?;
    tracing::info!(room = %room_id, "game start requested");
    Ok(())
}

async fn match_action<C: Codec>(
    state: &ServerState<C>,
    player_id: PlayerId,
    room_id: RoomCode,
    action: Action,
) -> Result<(), RoomError> {
    let room = state.rooms.lock().await.room(&room_id)?;
    tracing::debug!(room = %room_id, %player_id, %action, "action received");
    room.submit_action(player_id, action).await
}

async fn send_event(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    event: &ServerEvent,
) -> Result<(), PotshotError> {
    let bytes = codec.encode(event)?;
    conn.send(&bytes).await?;
    Ok(())
}

/// Sends an `error` event to this connection only.
async fn send_error(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    code: u16,
    message: &str,
) -> Result<(), PotshotError> {
    let event = ServerEvent::Error {
        code,
        message: message.to_string(),
    };
    send_event(conn, codec, &event).await
}
