//! Application settings and configuration structures.

use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Root configuration structure containing all application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Server configuration (host, port)
    pub server: ServerSettings,

    /// Which persistence backend to use
    pub storage: StorageSettings,

    /// Database configuration (PostgreSQL)
    pub database: DatabaseSettings,

    /// JWT authentication settings
    pub jwt: JwtSettings,

    /// Snowflake ID generator settings
    pub snowflake: SnowflakeSettings,

    /// CORS configuration
    pub cors: CorsSettings,

    /// WebSocket hub configuration
    pub websocket: WebSocketSettings,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// Server binding configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to (e.g., "0.0.0.0")
    pub host: String,

    /// Port number to listen on
    pub port: u16,
}

/// Persistence backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub backend: StorageBackend,
}

/// PostgreSQL database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Database connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections to maintain
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    pub acquire_timeout: u64,

    /// Run embedded migrations at startup
    pub run_migrations: bool,
}

/// JWT authentication configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens
    pub secret: String,

    /// Access token expiry in minutes
    pub access_token_expiry_minutes: i64,
}

/// Snowflake ID generator configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SnowflakeSettings {
    /// Machine/worker ID (0-1023)
    pub machine_id: u16,

    /// Custom epoch timestamp in milliseconds
    pub epoch: u64,
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    /// Allowed origins (comma-separated in env)
    pub allowed_origins: Vec<String>,
}

/// WebSocket hub configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebSocketSettings {
    /// Maximum message size in bytes (default: 64KB)
    pub max_message_size: usize,

    /// Maximum frame size in bytes (default: 16KB)
    pub max_frame_size: usize,

    /// Maximum number of live sessions (default: 10000)
    pub max_connections: usize,

    /// Frames queued per session before deliveries to it fail (default: 256)
    pub outbound_buffer: usize,

    /// Close a session that sends nothing for this long (default: 120)
    pub read_timeout_secs: u64,

    /// Close a session whose socket accepts no frame for this long (default: 10)
    pub write_timeout_secs: u64,
}

impl WebSocketSettings {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }
}

impl Default for WebSocketSettings {
    fn default() -> Self {
        Self {
            max_message_size: 65536,
            max_frame_size: 16384,
            max_connections: 10_000,
            outbound_buffer: 256,
            read_timeout_secs: 120,
            write_timeout_secs: 10,
        }
    }
}

/// Minimum required length for JWT secret (256 bits = 32 bytes)
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. config/default.toml (base configuration)
    /// 2. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 3. Environment variables (highest priority)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed,
    /// or if JWT secret is too short.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());
        let ws = WebSocketSettings::default();

        Config::builder()
            .set_default("environment", environment.clone())?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("storage.backend", "postgres")?
            .set_default("database.url", "postgres://localhost:5432/chat_hub")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout", 30)?
            .set_default("database.run_migrations", true)?
            .set_default("jwt.access_token_expiry_minutes", 60 * 24)?
            .set_default("snowflake.machine_id", 1)?
            .set_default("snowflake.epoch", crate::shared::snowflake::DEFAULT_EPOCH)?
            .set_default("cors.allowed_origins", vec!["http://localhost:5173"])?
            .set_default("websocket.max_message_size", ws.max_message_size as i64)?
            .set_default("websocket.max_frame_size", ws.max_frame_size as i64)?
            .set_default("websocket.max_connections", ws.max_connections as i64)?
            .set_default("websocket.outbound_buffer", ws.outbound_buffer as i64)?
            .set_default("websocket.read_timeout_secs", ws.read_timeout_secs)?
            .set_default("websocket.write_timeout_secs", ws.write_timeout_secs)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // APP__SERVER__PORT=3000 -> server.port = 3000
            .add_source(
                Environment::default()
                    .prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("storage.backend", std::env::var("STORAGE_BACKEND").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("jwt.secret", std::env::var("JWT_SECRET").ok())?
            .set_override_option(
                "snowflake.machine_id",
                std::env::var("SNOWFLAKE_MACHINE_ID").ok(),
            )?
            .build()?
            .try_deserialize()
            .and_then(|settings: Self| settings.validate())
    }

    /// Reject settings the server cannot run safely with.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.jwt.secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(ConfigError::Message(format!(
                "JWT secret must be at least {} characters for security. Current length: {}",
                MIN_JWT_SECRET_LENGTH,
                self.jwt.secret.len()
            )));
        }
        if self.websocket.outbound_buffer == 0 {
            return Err(ConfigError::Message(
                "websocket.outbound_buffer must be greater than zero".into(),
            ));
        }
        if self.snowflake.machine_id > 1023 {
            return Err(ConfigError::Message(format!(
                "snowflake.machine_id must be in 0..=1023, got {}",
                self.snowflake.machine_id
            )));
        }
        Ok(self)
    }

    /// Get the full server address as a string.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with_secret(secret: &str) -> Settings {
        Settings {
            server: ServerSettings {
                host: "127.0.0.1".into(),
                port: 0,
            },
            storage: StorageSettings {
                backend: StorageBackend::Memory,
            },
            database: DatabaseSettings {
                url: String::new(),
                max_connections: 1,
                min_connections: 1,
                acquire_timeout: 1,
                run_migrations: false,
            },
            jwt: JwtSettings {
                secret: secret.into(),
                access_token_expiry_minutes: 5,
            },
            snowflake: SnowflakeSettings {
                machine_id: 1,
                epoch: crate::shared::snowflake::DEFAULT_EPOCH,
            },
            cors: CorsSettings {
                allowed_origins: vec![],
            },
            websocket: WebSocketSettings::default(),
            environment: "test".into(),
        }
    }

    #[test]
    fn test_short_jwt_secret_rejected() {
        assert!(settings_with_secret("short").validate().is_err());
    }

    #[test]
    fn test_valid_settings_accepted() {
        let settings = settings_with_secret(&"x".repeat(MIN_JWT_SECRET_LENGTH))
            .validate()
            .expect("settings should validate");
        assert_eq!(settings.server_addr(), "127.0.0.1:0");
    }

    #[test]
    fn test_zero_outbound_buffer_rejected() {
        let mut settings = settings_with_secret(&"x".repeat(MIN_JWT_SECRET_LENGTH));
        settings.websocket.outbound_buffer = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_storage_backend_deserializes_lowercase() {
        let backend: StorageBackend = serde_json::from_str("\"memory\"").unwrap();
        assert_eq!(backend, StorageBackend::Memory);
    }
}
