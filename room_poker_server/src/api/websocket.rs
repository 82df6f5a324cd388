//! WebSocket handler for the streaming operations (§6): `subscribe`/`unsubscribe`.
//!
//! Unlike a polling loop, every push here is event-driven: the room's
//! coordinator already calls `SubscriberBus::publish` on every state change
//! (`room_poker::coordinator`), so this handler only has to forward whatever
//! arrives on the `mpsc::Receiver` it gets back from `RoomHandle::subscribe`.
//! The first message sent is always the player's current redacted snapshot.
//!
//! # Connection flow
//!
//! 1. Client connects via `GET /ws/{room_id}?playerId=<id>`.
//! 2. The room registry is asked for the room's handle; unknown rooms close
//!    the socket immediately.
//! 3. The handler subscribes, forwards every `StateChangeNotification` as
//!    JSON until the socket closes or the sender lags, then unsubscribes.
//!
//! Incoming client frames are rate-limited the same way the teacher gates
//! inbound WebSocket traffic, and are limited to taking actions — room
//! creation/joining/leaving go through the HTTP control endpoints in
//! [`super::rooms`].

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use futures_util::{SinkExt, StreamExt};
use log::{info, warn};
use room_poker::ActionKind;
use serde::Deserialize;
use std::time::Duration;

use super::AppState;
use super::rate_limiter::RateLimiter;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    #[serde(rename = "playerId")]
    player_id: String,
}

/// Inbound client frames. `Act` is the only mutating message this channel
/// accepts; everything else goes through the HTTP control endpoints.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum ClientMessage {
    Act { action: ActionKind },
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Path(room_id): Path<i64>,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> Response {
    match state.registry.get(room_id).await {
        Ok(handle) => ws.on_upgrade(move |socket| handle_socket(socket, handle, query.player_id)),
        Err(_) => (axum::http::StatusCode::NOT_FOUND, "room not found").into_response(),
    }
}

async fn handle_socket(socket: WebSocket, handle: room_poker::RoomHandle, player_id: String) {
    let room_id = handle.room_id();
    info!("websocket connected: room={room_id}, player={player_id}");

    let Ok(mut updates) = handle.subscribe(player_id.clone()).await else {
        warn!("room {room_id} actor is gone, closing websocket for {player_id}");
        return;
    };
    handle.reconnect(player_id.clone()).await;

    let (mut sender, mut receiver) = socket.split();
    let mut limiter = RateLimiter::sustained();

    loop {
        tokio::select! {
            notification = updates.recv() => {
                let Some(notification) = notification else {
                    break;
                };
                let json = match serde_json::to_string(&notification.snapshot) {
                    Ok(json) => json,
                    Err(e) => {
                        warn!("room {room_id} snapshot failed to serialize: {e}");
                        continue;
                    }
                };
                if sender.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
            frame = receiver.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        if !limiter.check() {
                            warn!("player {player_id} exceeded websocket message rate, dropping frame");
                            continue;
                        }
                        handle_client_frame(&text, &handle, &player_id).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        warn!("websocket error for room {room_id}: {e}");
                        break;
                    }
                    _ => {}
                }
            }
            // A held connection with no activity for a while is assumed to
            // have gone stale on the network; let the coordinator's own
            // disconnect-grace timer (§4.D) handle the reconnection window.
            _ = tokio::time::sleep(Duration::from_secs(90)) => {
                handle.disconnect(player_id.clone()).await;
                break;
            }
        }
    }

    handle.unsubscribe(player_id.clone()).await;
    handle.disconnect(player_id.clone()).await;
    info!("websocket disconnected: room={room_id}, player={player_id}");
}

async fn handle_client_frame(text: &str, handle: &room_poker::RoomHandle, player_id: &str) {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::Act { action }) => {
            if let Err(e) = handle.act(player_id.to_string(), action).await {
                warn!("player {player_id} action rejected: {e}");
            }
        }
        Err(e) => {
            warn!("player {player_id} sent an unparseable websocket frame: {e}");
        }
    }
}
