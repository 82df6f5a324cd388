//! HTTP/WebSocket API for the poker server.
//!
//! The control operations (§6) are plain HTTP endpoints over `RoomRegistry`;
//! the streaming operations (`subscribe`/`unsubscribe`) are a single
//! WebSocket upgrade per subscriber, event-driven rather than polled.
//!
//! # Modules
//!
//! - [`rooms`]: room directory and control-operation handlers.
//! - [`websocket`]: the streaming connection.
//! - [`request_id`]: request-id generation/propagation middleware.
//! - [`rate_limiter`]: sliding-window rate limiting for inbound WebSocket frames.
//!
//! # Endpoints
//!
//! ```text
//! GET  /health                      - Health check
//! GET  /rooms                       - listRooms
//! POST /rooms                       - createRoom
//! GET  /rooms/{id}                  - room snapshot (unauthenticated view)
//! POST /rooms/{id}/join             - joinRoom
//! POST /rooms/{id}/leave            - leaveRoom
//! POST /rooms/{id}/start            - startHand
//! POST /rooms/{id}/act              - act
//! POST /rooms/{id}/end              - endRoom
//! GET  /ws/{id}?playerId=<id>       - subscribe (WebSocket upgrade)
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively for development. In production, configure
//! appropriate origins, methods, and headers.

pub mod rate_limiter;
pub mod request_id;
pub mod rooms;
pub mod websocket;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use room_poker::registry::RoomRegistry;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers and WebSocket connections.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<RoomRegistry>,
}

/// Create the complete API router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    let room_routes = Router::new()
        .route("/rooms", get(rooms::list_rooms).post(rooms::create_room))
        .route("/rooms/{room_id}", get(rooms::get_room))
        .route("/rooms/{room_id}/join", post(rooms::join_room))
        .route("/rooms/{room_id}/leave", post(rooms::leave_room))
        .route("/rooms/{room_id}/start", post(rooms::start_hand))
        .route("/rooms/{room_id}/act", post(rooms::act))
        .route("/rooms/{room_id}/end", post(rooms::end_room));

    Router::new()
        .route("/health", get(health_check))
        .route("/ws/{room_id}", get(websocket::websocket_handler))
        .merge(room_routes)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint for monitoring and load balancers. Reports the
/// number of currently active rooms as a lightweight liveness signal for
/// the registry (and, transitively, the actor tasks it spawned).
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let active_rooms = state.registry.active_room_count().await;
    let response = json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "activeRooms": active_rooms,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });
    (StatusCode::OK, Json(response))
}
