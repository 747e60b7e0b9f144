use anyhow::{Context, Result};
use backspin_core::schema::{Database, DEFAULT_BUSY_TIMEOUT};
use confyg::{env, Confygery};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_BUSY_TIMEOUT_MS: u64 = DEFAULT_BUSY_TIMEOUT.as_millis() as u64;

/// Configuration for backspin.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (BACKSPIN_* prefix)
/// 3. Config file (~/.config/backspin/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the SQLite database.
    ///
    /// Can be set via:
    /// - CLI: --db /path/to/db
    /// - ENV: BACKSPIN_DATABASE_PATH
    /// - Config: database_path = "/path/to/db"
    /// - Default: ~/.local/share/backspin/backspin.db
    #[serde(default = "default_db_path")]
    pub database_path: PathBuf,

    /// How long a writer waits on a locked database, in milliseconds.
    ///
    /// Can be set via:
    /// - ENV: BACKSPIN_BUSY_TIMEOUT_MS
    /// - Config: busy_timeout_ms = 5000
    #[serde(
        default = "default_busy_timeout_ms",
        deserialize_with = "deserialize_millis"
    )]
    pub busy_timeout_ms: u64,

    /// Log filter used when RUST_LOG is unset.
    ///
    /// Can be set via:
    /// - ENV: BACKSPIN_LOG_LEVEL
    /// - Config: log_level = "debug"
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_db_path(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/backspin/config.toml
    /// Reads environment variables with BACKSPIN_ prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("backspin");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder
            .build()
            .context("Failed to build configuration")?;

        Ok(config)
    }

    /// Load configuration with custom database path.
    ///
    /// This is used when the --db CLI flag is provided.
    pub fn load_with_db_path(db_path: PathBuf) -> Result<Self> {
        let mut config = Self::load()?;
        config.database_path = db_path;
        Ok(config)
    }

    pub const fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Open the configured database, creating its directory if needed.
    pub fn open_database(&self) -> Result<Database> {
        if let Some(parent) = self.database_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory {}", parent.display())
                })?;
            }
        }
        Database::open_with_timeout(&self.database_path, self.busy_timeout()).with_context(|| {
            format!(
                "Failed to open database at {}",
                self.database_path.display()
            )
        })
    }
}

/// Environment variables arrive as strings, config files as integers.
fn deserialize_millis<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Millis {
        Number(u64),
        Text(String),
    }

    match Millis::deserialize(deserializer)? {
        Millis::Number(ms) => Ok(ms),
        Millis::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Get the default database path.
///
/// Returns: ~/.local/share/backspin/backspin.db (or platform equivalent)
fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("backspin")
        .join("backspin.db")
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/backspin/config.toml
/// - macOS: ~/Library/Application Support/backspin/config.toml
/// - Windows: %APPDATA%\backspin\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("backspin")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Backspin Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (BACKSPIN_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Path to the SQLite database
#
# Holds users, the album/track catalog, reviews and likes
#
# Can also be set via:
# - CLI: backspin --db /custom/path.db status
# - Environment: BACKSPIN_DATABASE_PATH=/custom/path.db
#
# Default: Platform-specific data directory
#database_path = "/path/to/custom/backspin.db"

# How long a write waits for another writer to release the database, in ms
#
# Can also be set via:
# - Environment: BACKSPIN_BUSY_TIMEOUT_MS=10000
busy_timeout_ms = 5000

# Log filter used when RUST_LOG is not set (error, warn, info, debug, trace)
#
# Can also be set via:
# - Environment: BACKSPIN_LOG_LEVEL=debug
log_level = "info"
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(&config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}
