//! End-to-end tests: real WebSocket clients against a running server.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use potshot::prelude::*;
use serde_json::{Value, json};
use tokio_tungstenite::tungstenite::Message;

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Starts a server on a random port and returns the address.
async fn start_server() -> String {
    start_server_with(GameConfig::default()).await
}

async fn start_server_with(game: GameConfig) -> String {
    let server = PotshotServerBuilder::new()
        .bind("127.0.0.1:0")
        .game_config(game)
        .build()
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    tokio::time::sleep(Duration::from_millis(10)).await;
    addr
}

async fn connect(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    ws
}

async fn send(ws: &mut ClientWs, event: &str, data: Value) {
    let frame = json!({ "event": event, "data": data }).to_string();
    ws.send(Message::text(frame)).await.expect("send should succeed");
}

async fn send_raw(ws: &mut ClientWs, frame: &str) {
    ws.send(Message::text(frame.to_string()))
        .await
        .expect("send should succeed");
}

/// Next JSON event from the server, failing after a second of silence.
async fn recv(ws: &mut ClientWs) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(1), ws.next())
            .await
            .expect("timed out waiting for an event")
            .expect("stream ended")
            .expect("websocket error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).expect("server sent invalid JSON");
        }
    }
}

/// Reads events until one named `name` arrives and returns it.
async fn recv_until(ws: &mut ClientWs, name: &str) -> Value {
    loop {
        let event = recv(ws).await;
        if event["event"] == name {
            return event;
        }
    }
}

/// Asserts nothing arrives for a short while.
async fn assert_silent(ws: &mut ClientWs) {
    let next = tokio::time::timeout(Duration::from_millis(100), ws.next()).await;
    assert!(next.is_err(), "expected silence, got {next:?}");
}

async fn join(ws: &mut ClientWs, room: &str, name: &str) -> Value {
    send(ws, "join room", json!({ "roomId": room, "name": name })).await;
    recv_until(ws, "joined room").await
}

/// Two clients joined to `room` and paired by a started game.
async fn paired(addr: &str, room: &str) -> (ClientWs, ClientWs) {
    let mut alice = connect(addr).await;
    let mut bob = connect(addr).await;
    join(&mut alice, room, "alice").await;
    join(&mut bob, room, "bob").await;
    recv_until(&mut alice, "player joined").await;

    send(&mut alice, "start game", json!({ "roomId": room })).await;
    recv_until(&mut alice, "game started").await;
    recv_until(&mut bob, "game started").await;
    (alice, bob)
}

async fn act(ws: &mut ClientWs, room: &str, action: &str) {
    send(ws, "match action", json!({ "roomId": room, "action": action })).await;
}

// =========================================================================
// Joining
// =========================================================================

#[tokio::test]
async fn test_join_returns_player_and_room() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    let event = join(&mut ws, "den", "alice").await;

    let data = &event["data"];
    assert_eq!(data["player"]["name"], "alice");
    assert_eq!(data["player"]["wallet"], 100);
    assert_eq!(data["room"]["id"], "den");
    assert_eq!(data["room"]["players"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_second_join_is_announced_to_the_room() {
    let addr = start_server().await;
    let mut alice = connect(&addr).await;
    let mut bob = connect(&addr).await;

    join(&mut alice, "den", "alice").await;
    let joined = join(&mut bob, "den", "bob").await;
    let announced = recv(&mut alice).await;

    let players = joined["data"]["room"]["players"].as_array().unwrap();
    assert_eq!(players[0]["name"], "alice");
    assert_eq!(players[1]["name"], "bob");
    assert_eq!(announced["event"], "player joined");
    assert_eq!(announced["data"]["name"], "bob");
}

#[tokio::test]
async fn test_duplicate_join_is_rejected() {
    let addr = start_server().await;
    let mut alice = connect(&addr).await;
    let mut bob = connect(&addr).await;
    join(&mut alice, "den", "alice").await;
    join(&mut bob, "den", "bob").await;
    recv_until(&mut alice, "player joined").await;

    send(&mut alice, "join room", json!({ "roomId": "den", "name": "alice" })).await;

    assert_eq!(recv(&mut alice).await["event"], "already joined");
    assert_silent(&mut bob).await;
}

#[tokio::test]
async fn test_configured_starting_wallet() {
    let game = GameConfig {
        starting_currency: 40,
        ..GameConfig::default()
    };
    let addr = start_server_with(game).await;
    let mut ws = connect(&addr).await;

    let event = join(&mut ws, "den", "alice").await;
    assert_eq!(event["data"]["player"]["wallet"], 40);
}

// =========================================================================
// Games
// =========================================================================

#[tokio::test]
async fn test_start_game_pairs_two_players() {
    let addr = start_server().await;
    let mut alice = connect(&addr).await;
    let mut bob = connect(&addr).await;
    join(&mut alice, "den", "alice").await;
    join(&mut bob, "den", "bob").await;
    recv_until(&mut alice, "player joined").await;

    send(&mut bob, "start game", json!({ "roomId": "den" })).await;

    for ws in [&mut alice, &mut bob] {
        assert_eq!(recv(ws).await["event"], "starting game");
        let found = recv(ws).await;
        assert_eq!(found["event"], "match found");
        assert_eq!(found["data"]["pot"], 10);
        assert_eq!(found["data"]["ended"], false);
        assert!(found["data"]["opponent"].is_object());
        let started = recv(ws).await;
        assert_eq!(started["event"], "game started");
        assert_eq!(started["data"]["matches"].as_object().unwrap().len(), 2);
    }
}

#[tokio::test]
async fn test_lone_player_is_safe() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;
    join(&mut ws, "den", "alice").await;

    send(&mut ws, "start game", json!({ "roomId": "den" })).await;

    assert_eq!(recv(&mut ws).await["event"], "starting game");
    assert_eq!(recv(&mut ws).await["event"], "safe");
    assert_eq!(recv(&mut ws).await["event"], "game started");
}

#[tokio::test]
async fn test_raise_raise_then_shoot_shoot() {
    let addr = start_server().await;
    let (mut alice, mut bob) = paired(&addr, "den").await;

    act(&mut alice, "den", "raise").await;
    assert_eq!(recv(&mut bob).await["event"], "opponent action");
    act(&mut bob, "den", "raise").await;

    for ws in [&mut alice, &mut bob] {
        let round = recv_until(ws, "round ended").await;
        let data = &round["data"];
        assert_eq!(data["ended"], false);
        assert_eq!(data["pot"], 30);
        assert_eq!(data["self"]["wallet"], 90);
        assert_eq!(data["opponent"]["wallet"], 90);
    }

    act(&mut alice, "den", "shoot").await;
    act(&mut bob, "den", "shoot").await;

    for ws in [&mut alice, &mut bob] {
        let round = recv_until(ws, "round ended").await;
        assert_eq!(round["data"], json!({ "ended": true, "winner": null }));
    }
}

#[tokio::test]
async fn test_raise_against_shoot_wins_for_raiser() {
    let addr = start_server().await;
    let (mut alice, mut bob) = paired(&addr, "den").await;

    act(&mut alice, "den", "raise").await;
    recv_until(&mut bob, "opponent action").await;
    act(&mut bob, "den", "shoot").await;

    let round = recv_until(&mut alice, "round ended").await;
    assert_eq!(round["data"]["ended"], true);
    assert_eq!(round["data"]["winner"]["name"], "alice");
    let round = recv_until(&mut bob, "round ended").await;
    assert_eq!(round["data"]["winner"]["name"], "alice");
}

#[tokio::test]
async fn test_actions_after_match_end_are_ignored() {
    let addr = start_server().await;
    let (mut alice, mut bob) = paired(&addr, "den").await;

    act(&mut alice, "den", "shoot").await;
    act(&mut bob, "den", "shoot").await;
    recv_until(&mut alice, "round ended").await;
    recv_until(&mut bob, "round ended").await;

    act(&mut alice, "den", "raise").await;
    assert_silent(&mut bob).await;
}

// =========================================================================
// Dropped and malformed events
// =========================================================================

#[tokio::test]
async fn test_unknown_room_events_are_dropped() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    send(&mut ws, "start game", json!({ "roomId": "nowhere" })).await;
    act(&mut ws, "nowhere", "raise").await;
    assert_silent(&mut ws).await;

    // The connection is still usable.
    join(&mut ws, "den", "alice").await;
}

#[tokio::test]
async fn test_malformed_frame_gets_error() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    send_raw(&mut ws, "not json").await;

    let event = recv(&mut ws).await;
    assert_eq!(event["event"], "error");
    assert_eq!(event["data"]["code"], 400);
}

#[tokio::test]
async fn test_unknown_action_gets_error() {
    let addr = start_server().await;
    let (mut alice, mut bob) = paired(&addr, "den").await;

    act(&mut alice, "den", "dance").await;

    let event = recv(&mut alice).await;
    assert_eq!(event["event"], "error");
    assert_eq!(event["data"]["code"], 400);
    assert_silent(&mut bob).await;
}

#[tokio::test]
async fn test_unknown_event_gets_error() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    send(&mut ws, "leave room", json!({ "roomId": "den" })).await;

    assert_eq!(recv(&mut ws).await["event"], "error");
}

#[tokio::test]
async fn test_disconnect_closes_socket_and_room_keeps_running() {
    let addr = start_server().await;
    let mut alice = connect(&addr).await;
    let mut bob = connect(&addr).await;
    join(&mut alice, "den", "alice").await;
    join(&mut bob, "den", "bob").await;

    alice.close(None).await.expect("close should succeed");
    let drained = tokio::time::timeout(Duration::from_secs(1), async {
        while let Some(Ok(_)) = alice.next().await {}
    })
    .await;
    assert!(drained.is_ok(), "server should finish the close handshake");

    // Alice's seat is still in the room; events for her are dropped.
    send(&mut bob, "start game", json!({ "roomId": "den" })).await;
    let started = recv_until(&mut bob, "game started").await;
    assert_eq!(started["data"]["matches"].as_object().unwrap().len(), 2);
}
