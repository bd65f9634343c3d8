use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};
use uuid::Uuid;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub mail: Option<MailConfig>,
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Public site URL. Acceptance and reset links are built from it.
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub session_duration_hours: i64,
    #[serde(default)]
    pub secure_cookies: bool,
    /// Club that open registrations (no invite) join as players.
    #[serde(default)]
    pub default_club_id: Option<Uuid>,
    pub password_reset_minutes: i64,
    pub magic_link_minutes: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
    pub from_name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub root_dir: String,
    pub public_url_prefix: String,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.base_url", "http://localhost:3000")?
            .set_default("database.url", "sqlite://clubgrid.db?mode=rwc")?
            .set_default("database.max_connections", 10)?
            .set_default("auth.session_duration_hours", 24 * 7)?
            .set_default("auth.secure_cookies", false)?
            .set_default("auth.password_reset_minutes", 60)?
            .set_default("auth.magic_link_minutes", 15)?
            .set_default("storage.root_dir", "storage")?
            .set_default("storage.public_url_prefix", "http://localhost:3000/storage")?

            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))

            // Add environment variables (with CLUBGRID__ prefix, double underscore separates levels)
            .add_source(Environment::with_prefix("CLUBGRID").separator("__"))

            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
                base_url: "http://localhost:3000".to_string(),
            },
            database: DatabaseConfig {
                url: "sqlite://clubgrid.db?mode=rwc".to_string(),
                max_connections: 10,
            },
            auth: AuthConfig {
                session_duration_hours: 24 * 7,
                secure_cookies: false,
                default_club_id: None,
                password_reset_minutes: 60,
                magic_link_minutes: 15,
            },
            mail: None,
            storage: StorageConfig {
                root_dir: "storage".to_string(),
                public_url_prefix: "http://localhost:3000/storage".to_string(),
            },
        }
    }
}
