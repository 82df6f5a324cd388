//! HTTP/WebSocket front end for a multi-room poker engine.
//!
//! Rooms are created on demand via `createRoom`, each run by its own
//! single-writer actor (`room_poker::coordinator`); this binary only wires
//! the registry, the persistence backend, and the axum router around it.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Error;
use ctrlc::set_handler;
use log::info;
use pico_args::Arguments;
use room_poker::registry::{RoomLimits, RoomRegistry};
use room_poker::store::{InMemoryStore, PostgresStore, PostgresStoreConfig, SnapshotStore};
use room_poker_server::config::{PersistenceConfig, ServerConfig};
use room_poker_server::{api, logging};

const HELP: &str = "\
Run a multi-room poker server

USAGE:
  room_poker_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:6969]
  --db-url     URL         Database connection string  [default: env DATABASE_URL; omit for in-memory storage]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  DATABASE_URL             PostgreSQL connection string (optional; in-memory storage if unset)
  ROOM_MIN_SEATS           Minimum seats a room may be created with [default: 2]
  ROOM_MAX_SEATS           Maximum seats a room may be created with [default: 9]
  ROOM_DEFAULT_MIN_BET     Min bet used when createRoom omits one   [default: 10]
  (See .env file for all configuration options)
";

struct Args {
    bind: Option<SocketAddr>,
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        bind: pargs.value_from_str("--bind").ok(),
        database_url: pargs.value_from_str("--db-url").ok(),
    };

    set_handler(|| std::process::exit(0))?;

    logging::init();

    let config = ServerConfig::from_env(args.bind, args.database_url)?;
    config.validate()?;

    info!("starting poker server at {}", config.bind);

    let store: Arc<dyn SnapshotStore> = match &config.persistence {
        PersistenceConfig::InMemory => {
            info!("using in-memory snapshot storage (no durability across restarts)");
            Arc::new(InMemoryStore::new())
        }
        PersistenceConfig::Postgres {
            database_url,
            max_connections,
        } => {
            info!("connecting to snapshot store: {}", database_url);
            let store_config = PostgresStoreConfig {
                database_url: database_url.clone(),
                max_connections: *max_connections,
                min_connections: 1,
                connection_timeout_secs: 10,
                idle_timeout_secs: 600,
            };
            let store = PostgresStore::connect(&store_config)
                .await
                .map_err(|e| anyhow::anyhow!("failed to connect to snapshot store: {}", e))?;
            store
                .health_check()
                .await
                .map_err(|e| anyhow::anyhow!("snapshot store health check failed: {}", e))?;
            info!("snapshot store connected");
            Arc::new(store)
        }
    };

    let limits = RoomLimits {
        min_seats: config.room_defaults.min_seats,
        max_seats: config.room_defaults.max_seats,
    };
    let registry = Arc::new(RoomRegistry::with_limits(store, limits));

    let state = api::AppState { registry };
    let app = api::create_router(state);

    info!("starting HTTP/WebSocket server on {}", config.bind);
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind to {}: {}", config.bind, e))?;

    info!(
        "server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("server error: {}", e))?;

    info!("shutting down server");

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install CTRL+C signal handler");
}
