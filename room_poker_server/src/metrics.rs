//! Prometheus metrics for monitoring poker server health and performance.
//!
//! This module provides metrics collection and export via its own scrape
//! endpoint (opened by [`init_metrics`], separate from the main API router).
//!
//! # Metrics Categories
//!
//! - **HTTP Metrics**: Request counts, duration, status codes
//! - **WebSocket Metrics**: Active connections, messages sent/received
//! - **Room/Hand Metrics**: Active rooms, hands played, pot size distribution
//! - **Persistence Metrics**: Snapshot store write latency and retries
//! - **Rate Limiting Metrics**: Dropped WebSocket frames
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use room_poker_server::metrics;
//! use std::net::SocketAddr;
//!
//! // Initialize metrics exporter
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! // Record HTTP request
//! metrics::http_requests_total("POST", "/rooms", 200);
//!
//! // Record WebSocket connection
//! metrics::websocket_connections_active(10);
//! ```

#![allow(dead_code)] // Public API for future integration

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Sets up a Prometheus scrape endpoint on the specified address.
/// Metrics will be available at `http://<addr>/metrics`.
///
/// # Arguments
///
/// - `addr`: Address to bind the metrics server to (e.g., `0.0.0.0:9090`)
///
/// # Returns
///
/// Result indicating success or error message
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
///
/// Increments the total HTTP request counter with method, path, and status labels.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// WebSocket Metrics
// ============================================================================

/// Set current active WebSocket connections count.
pub fn websocket_connections_active(count: u64) {
    metrics::gauge!("websocket_connections_active").set(count as f64);
}

/// Increment total WebSocket connections counter.
pub fn websocket_connections_total() {
    metrics::counter!("websocket_connections_total").increment(1);
}

/// Increment WebSocket messages sent counter.
pub fn websocket_messages_sent() {
    metrics::counter!("websocket_messages_sent").increment(1);
}

/// Increment WebSocket messages received counter.
pub fn websocket_messages_received() {
    metrics::counter!("websocket_messages_received").increment(1);
}

// ============================================================================
// Room/Hand Metrics
// ============================================================================

/// Set current active room count (`RoomRegistry::active_room_count`).
pub fn active_rooms(count: usize) {
    metrics::gauge!("active_rooms").set(count as f64);
}

/// Set current seated-player count across all rooms.
pub fn active_players(count: usize) {
    metrics::gauge!("active_players").set(count as f64);
}

/// Increment hands played counter.
pub fn hands_played_total() {
    metrics::counter!("hands_played_total").increment(1);
}

/// Record pot size distribution, in chips.
pub fn pot_size_chips(size: u32) {
    metrics::histogram!("pot_size_chips").record(f64::from(size));
}

/// Increment turn-timeout auto-folds (§4.D).
pub fn turn_timeouts_total() {
    metrics::counter!("turn_timeouts_total").increment(1);
}

/// Increment disconnect-grace expirations that removed a seat (§4.D).
pub fn grace_expirations_total() {
    metrics::counter!("grace_expirations_total").increment(1);
}

// ============================================================================
// Persistence Metrics
// ============================================================================

/// Record a snapshot store write's duration in milliseconds.
pub fn store_write_duration_ms(duration_ms: f64) {
    metrics::histogram!("store_write_duration_ms").record(duration_ms);
}

/// Increment persistence write retries (`SnapshotStore::put` backoff).
pub fn store_write_retries_total() {
    metrics::counter!("store_write_retries_total").increment(1);
}

// ============================================================================
// Rate Limiting Metrics
// ============================================================================

/// Increment rate limit hits counter.
pub fn rate_limit_hits_total(endpoint: &str) {
    metrics::counter!("rate_limit_hits_total",
        "endpoint" => endpoint.to_string()
    )
    .increment(1);
}
