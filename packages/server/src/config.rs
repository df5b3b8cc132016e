use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    /// Allowed origins. Empty allows any origin.
    #[serde(default)]
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory holding the state document.
    pub data_dir: PathBuf,
    /// Directory holding uploaded files.
    pub upload_dir: PathBuf,
    /// File name of the state document inside `data_dir`.
    pub state_file: String,
}

impl StorageConfig {
    pub fn state_path(&self) -> PathBuf {
        self.data_dir.join(&self.state_file)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Session signing key, used unless the settings carry their own secret.
    pub jwt_secret: String,
    pub session_ttl_days: i64,
}

/// Device presence tracking.
#[derive(Debug, Deserialize, Clone)]
pub struct PresenceConfig {
    /// Seconds of inactivity after which a device drops out of the snapshot.
    #[serde(default = "default_presence_ttl_secs")]
    pub ttl_secs: u64,
    /// Whether requests from loopback addresses are tracked.
    #[serde(default)]
    pub track_loopback: bool,
    /// Whether device info performs a reverse DNS lookup.
    #[serde(default = "default_resolve_hostnames")]
    pub resolve_hostnames: bool,
}

fn default_presence_ttl_secs() -> u64 {
    300
}
fn default_resolve_hostnames() -> bool {
    true
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_presence_ttl_secs(),
            track_loopback: false,
            resolve_hostnames: default_resolve_hostnames(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub presence: PresenceConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("storage.data_dir", "Base")?
            .set_default("storage.upload_dir", "uploads")?
            .set_default("storage.state_file", "state.json")?
            .set_default("auth.jwt_secret", "filechanger-development-secret")?
            .set_default("auth.session_ttl_days", 30)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., FILECHANGER__SERVER__PORT)
            .add_source(
                Environment::with_prefix("FILECHANGER")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.cors.allow_origins"),
            )
            .build()?;

        s.try_deserialize()
    }
}
