//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::game::engine::EXTRA_JUMP_IMPULSE;
use crate::util::time::DEFAULT_TICK_RATE;

/// Host max-players constant; slot indices run 0..65
pub const DEFAULT_MAX_PLAYERS: usize = 65;

/// Shop category the catalog items are registered under
#[derive(Clone, Debug)]
pub struct CategoryConfig {
    pub unique_name: String,
    pub display_name: String,
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            unique_name: "Jumps".to_string(),
            display_name: "Extra jumps".to_string(),
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Admin HTTP binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Path of the JSON item catalog
    pub catalog_path: PathBuf,
    /// Shop category for catalog items
    pub category: CategoryConfig,

    /// Simulation ticks per second
    pub tick_rate: u32,
    /// Number of player slots
    pub max_players: usize,
    /// Vertical velocity written on an extra jump
    pub jump_impulse: f32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let server_addr = if let Ok(port) = env::var("PORT") {
            format!("0.0.0.0:{}", port)
        } else {
            env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string())
        };

        let defaults = CategoryConfig::default();

        let config = Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            catalog_path: env::var("JUMPS_CATALOG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("configs/plugins/Shop/Jumps.json")),
            category: CategoryConfig {
                unique_name: env::var("JUMPS_CATEGORY").unwrap_or(defaults.unique_name),
                display_name: env::var("JUMPS_CATEGORY_DISPLAY")
                    .unwrap_or(defaults.display_name),
            },

            tick_rate: parse_var("JUMPS_TICK_RATE", DEFAULT_TICK_RATE)?,
            max_players: parse_var("JUMPS_MAX_PLAYERS", DEFAULT_MAX_PLAYERS)?,
            jump_impulse: parse_var("JUMPS_IMPULSE", EXTRA_JUMP_IMPULSE)?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate == 0 {
            return Err(ConfigError::Invalid("JUMPS_TICK_RATE"));
        }
        if self.max_players == 0 {
            return Err(ConfigError::Invalid("JUMPS_MAX_PLAYERS"));
        }
        if !self.jump_impulse.is_finite() {
            return Err(ConfigError::Invalid("JUMPS_IMPULSE"));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            log_level: "info".to_string(),
            catalog_path: PathBuf::from("configs/plugins/Shop/Jumps.json"),
            category: CategoryConfig::default(),
            tick_rate: DEFAULT_TICK_RATE,
            max_players: DEFAULT_MAX_PLAYERS,
            jump_impulse: EXTRA_JUMP_IMPULSE,
        }
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Invalid server address format")]
    InvalidAddress,
}
