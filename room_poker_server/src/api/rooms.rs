//! Room management API handlers (§6 control operations).
//!
//! Every operation here takes `playerId` explicitly in the request body or
//! path rather than through an `Authorization` header — callers are assumed
//! to arrive pre-authenticated, and this server does not issue or verify
//! credentials itself.
//!
//! # Examples
//!
//! Create a room:
//! ```bash
//! curl -X POST http://localhost:6969/rooms \
//!   -H "Content-Type: application/json" \
//!   -d '{"name": "table one", "creatorId": "alice", "seatLimit": 6, "minBet": 10}'
//! ```
//!
//! Join it:
//! ```bash
//! curl -X POST http://localhost:6969/rooms/1/join \
//!   -H "Content-Type: application/json" \
//!   -d '{"playerId": "bob", "username": "bob", "buyIn": 500}'
//! ```

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use room_poker::errors::{ClientError, CoordinatorError};
use room_poker::registry::RegistryError;
use room_poker::room::Chips;
use room_poker::view::{RoomSnapshot, RoomSummary};
use room_poker::ActionKind;
use serde::{Deserialize, Serialize};

use super::AppState;
use super::request_id::RequestId;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub name: String,
    pub creator_id: String,
    pub seat_limit: usize,
    pub min_bet: Chips,
    pub max_bet: Option<Chips>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomResponse {
    pub room_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomRequest {
    pub player_id: String,
    pub username: String,
    pub buy_in: Chips,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRequest {
    pub player_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActRequest {
    pub player_id: String,
    pub action: ActionKind,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn registry_error_status(err: &RegistryError) -> StatusCode {
    match err {
        RegistryError::NotFound => StatusCode::NOT_FOUND,
        RegistryError::EmptyName
        | RegistryError::InvalidSeatLimit
        | RegistryError::InvalidMinBet
        | RegistryError::InvalidMaxBet => StatusCode::BAD_REQUEST,
    }
}

fn client_error_status(err: &ClientError) -> StatusCode {
    match err {
        ClientError::RoomNotFound => StatusCode::NOT_FOUND,
        ClientError::NotTheCreator => StatusCode::FORBIDDEN,
        _ => StatusCode::BAD_REQUEST,
    }
}

fn coordinator_error_status(err: &CoordinatorError) -> StatusCode {
    match err {
        CoordinatorError::Client(e) => client_error_status(e),
        CoordinatorError::Degraded | CoordinatorError::Quarantined => StatusCode::SERVICE_UNAVAILABLE,
        CoordinatorError::Transient(_) | CoordinatorError::Invariant(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn registry_err(err: RegistryError) -> (StatusCode, Json<ErrorResponse>) {
    let status = registry_error_status(&err);
    (status, Json(ErrorResponse { error: err.to_string() }))
}

fn client_err(err: ClientError) -> (StatusCode, Json<ErrorResponse>) {
    let status = client_error_status(&err);
    (status, Json(ErrorResponse { error: err.to_string() }))
}

fn coordinator_err(err: CoordinatorError) -> (StatusCode, Json<ErrorResponse>) {
    let status = coordinator_error_status(&err);
    (status, Json(ErrorResponse { error: err.to_string() }))
}

/// `listRooms`: rooms still accepting players, newest first.
pub async fn list_rooms(State(state): State<AppState>) -> Json<Vec<RoomSummary>> {
    Json(state.registry.list_waiting().await)
}

/// `createRoom`.
pub async fn create_room(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    Json(request): Json<CreateRoomRequest>,
) -> Result<Json<CreateRoomResponse>, (StatusCode, Json<ErrorResponse>)> {
    let handle = state
        .registry
        .create_room(
            request.name,
            request.creator_id.clone(),
            request.seat_limit,
            request.min_bet,
            request.max_bet,
        )
        .await
        .map_err(registry_err)?;

    tracing::info!(
        request_id = %request_id,
        room_id = handle.room_id(),
        creator = %request.creator_id,
        "room created"
    );
    Ok(Json(CreateRoomResponse {
        room_id: handle.room_id(),
    }))
}

/// `GET /rooms/{id}`: the current redacted snapshot, unauthenticated (no
/// `playerId` means every hole card stays hidden).
pub async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<i64>,
) -> Result<Json<RoomSnapshot>, (StatusCode, Json<ErrorResponse>)> {
    let handle = state.registry.get(room_id).await.map_err(registry_err)?;
    let snapshot = handle.get_state(None).await.map_err(client_err)?;
    Ok(Json(snapshot))
}

/// `joinRoom`. Idempotent: re-joining with a seat already held is a no-op.
pub async fn join_room(
    State(state): State<AppState>,
    Path(room_id): Path<i64>,
    Json(request): Json<JoinRoomRequest>,
) -> Result<Json<RoomSnapshot>, (StatusCode, Json<ErrorResponse>)> {
    let handle = state.registry.get(room_id).await.map_err(registry_err)?;
    let snapshot = handle
        .join(request.player_id, request.username, request.buy_in)
        .await
        .map_err(client_err)?;
    Ok(Json(snapshot))
}

/// `leaveRoom`. Idempotent ack even if the player already left.
pub async fn leave_room(
    State(state): State<AppState>,
    Path(room_id): Path<i64>,
    Json(request): Json<PlayerRequest>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    let handle = state.registry.get(room_id).await.map_err(registry_err)?;
    handle.leave(request.player_id).await.map_err(client_err)?;
    Ok(StatusCode::OK)
}

/// `startHand`. Only the room's creator may call this.
pub async fn start_hand(
    State(state): State<AppState>,
    Path(room_id): Path<i64>,
    Json(request): Json<PlayerRequest>,
) -> Result<Json<RoomSnapshot>, (StatusCode, Json<ErrorResponse>)> {
    let handle = state.registry.get(room_id).await.map_err(registry_err)?;
    let snapshot = handle
        .start_hand(request.player_id)
        .await
        .map_err(coordinator_err)?;
    Ok(Json(snapshot))
}

/// `act`: take a poker action.
pub async fn act(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    Path(room_id): Path<i64>,
    Json(request): Json<ActRequest>,
) -> Result<Json<RoomSnapshot>, (StatusCode, Json<ErrorResponse>)> {
    let handle = state.registry.get(room_id).await.map_err(registry_err)?;
    let result = handle.act(request.player_id.clone(), request.action).await;
    match &result {
        Ok(_) => tracing::debug!(
            request_id = %request_id,
            room_id = room_id,
            player_id = %request.player_id,
            "action applied"
        ),
        Err(e) => tracing::warn!(
            request_id = %request_id,
            room_id = room_id,
            player_id = %request.player_id,
            error = %e,
            "action rejected"
        ),
    }
    let snapshot = result.map_err(coordinator_err)?;
    Ok(Json(snapshot))
}

/// `endRoom`: resolve any in-progress hand, then tear the room down. Only
/// the room's creator may call this.
pub async fn end_room(
    State(state): State<AppState>,
    Path(room_id): Path<i64>,
    Json(request): Json<PlayerRequest>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    state
        .registry
        .close_room(room_id, request.player_id)
        .await
        .map_err(registry_err)?;
    Ok(StatusCode::OK)
}
