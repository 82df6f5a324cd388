//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use std::net::SocketAddr;

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Where room snapshots are persisted
    pub persistence: PersistenceConfig,
    /// Bounds applied to `createRoom` requests
    pub room_defaults: RoomDefaultsConfig,
}

/// Backing store for room snapshots (§4.G, §6 persistence contract).
#[derive(Debug, Clone)]
pub enum PersistenceConfig {
    /// No durability across restarts; used for local dev and tests.
    InMemory,
    Postgres {
        database_url: String,
        max_connections: u32,
    },
}

/// Defaults and bounds enforced on room creation.
#[derive(Debug, Clone)]
pub struct RoomDefaultsConfig {
    /// Minimum seats a room may be created with
    pub min_seats: usize,
    /// Maximum seats a room may be created with
    pub max_seats: usize,
    /// Minimum bet used when a `createRoom` request omits one
    pub default_min_bet: u32,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `database_url_override` - Optional database URL override (from CLI args);
    ///   presence of a URL selects the Postgres backend, absence selects in-memory.
    ///
    /// # Errors
    ///
    /// Returns error if a supplied value fails to parse or validate.
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
    ) -> Result<Self, ConfigError> {
        let bind = bind_override
            .or_else(|| {
                std::env::var("SERVER_BIND")
                    .ok()
                    .and_then(|s| s.parse().ok())
            })
            .unwrap_or_else(|| {
                "127.0.0.1:6969"
                    .parse()
                    .expect("default bind address is valid")
            });

        let database_url = database_url_override.or_else(|| std::env::var("DATABASE_URL").ok());
        let persistence = match database_url {
            Some(database_url) => PersistenceConfig::Postgres {
                database_url,
                max_connections: parse_env_or("DB_MAX_CONNECTIONS", 10),
            },
            None => PersistenceConfig::InMemory,
        };

        let room_defaults = RoomDefaultsConfig {
            min_seats: parse_env_or("ROOM_MIN_SEATS", 2),
            max_seats: parse_env_or("ROOM_MAX_SEATS", 9),
            default_min_bet: parse_env_or("ROOM_DEFAULT_MIN_BET", 10),
        };

        Ok(ServerConfig {
            bind,
            persistence,
            room_defaults,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.room_defaults.min_seats < 2 {
            return Err(ConfigError::Invalid {
                var: "ROOM_MIN_SEATS".to_string(),
                reason: "must be at least 2".to_string(),
            });
        }

        if self.room_defaults.max_seats > 9 {
            return Err(ConfigError::Invalid {
                var: "ROOM_MAX_SEATS".to_string(),
                reason: "must be at most 9 (one dealt hand, one deck)".to_string(),
            });
        }

        if self.room_defaults.max_seats < self.room_defaults.min_seats {
            return Err(ConfigError::Invalid {
                var: "ROOM_MAX_SEATS".to_string(),
                reason: format!(
                    "must be at least ROOM_MIN_SEATS ({})",
                    self.room_defaults.min_seats
                ),
            });
        }

        if self.room_defaults.default_min_bet == 0 {
            return Err(ConfigError::Invalid {
                var: "ROOM_DEFAULT_MIN_BET".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        if let PersistenceConfig::Postgres {
            database_url,
            max_connections,
        } = &self.persistence
        {
            if database_url.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    var: "DATABASE_URL".to_string(),
                    reason: "must not be empty".to_string(),
                });
            }
            if *max_connections == 0 {
                return Err(ConfigError::Invalid {
                    var: "DB_MAX_CONNECTIONS".to_string(),
                    reason: "must be greater than 0".to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> ServerConfig {
        ServerConfig {
            bind: "127.0.0.1:8080".parse().unwrap(),
            persistence: PersistenceConfig::InMemory,
            room_defaults: RoomDefaultsConfig {
                min_seats: 2,
                max_seats: 9,
                default_min_bet: 10,
            },
        }
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingRequired {
            var: "DATABASE_URL".to_string(),
            hint: "set DATABASE_URL or omit it for in-memory storage".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("DATABASE_URL"));
    }

    #[test]
    fn test_config_validation_passes_with_defaults() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_config_validation_min_seats_too_low() {
        let mut config = base_config();
        config.room_defaults.min_seats = 1;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_config_validation_max_seats_too_high() {
        let mut config = base_config();
        config.room_defaults.max_seats = 10;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_config_validation_max_below_min() {
        let mut config = base_config();
        config.room_defaults.min_seats = 6;
        config.room_defaults.max_seats = 4;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_config_validation_min_bet_zero() {
        let mut config = base_config();
        config.room_defaults.default_min_bet = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_config_validation_postgres_empty_url() {
        let mut config = base_config();
        config.persistence = PersistenceConfig::Postgres {
            database_url: "".to_string(),
            max_connections: 10,
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }
}
