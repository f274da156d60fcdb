use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse TOML from config file at {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Connection string for the relational store. `None` runs against the in-memory store.
    #[serde(default)]
    pub database_url: Option<String>,

    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    #[serde(default = "default_auth_token")]
    pub auth_token: String,

    #[serde(default = "default_admin_username")]
    pub admin_username: String,

    #[serde(default = "default_admin_password")]
    pub admin_password: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
struct PartialServerConfig {
    listen_addr: Option<String>,
    database_url: Option<String>,
    db_max_connections: Option<u32>,
    auth_token: Option<String>,
    admin_username: Option<String>,
    admin_password: Option<String>,
    log_dir: Option<String>,
}

impl PartialServerConfig {
    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => Some(raw.trim().parse::<u32>().map_err(|_| {
                ConfigError::InvalidValue {
                    key: "DB_MAX_CONNECTIONS",
                    value: raw.clone(),
                }
            })?),
            None => None,
        };

        Ok(PartialServerConfig {
            listen_addr: lookup("LISTEN_ADDR"),
            // DB_DSN is accepted for deployments that predate DATABASE_URL
            database_url: lookup("DATABASE_URL").or_else(|| lookup("DB_DSN")),
            db_max_connections,
            auth_token: lookup("AUTH_TOKEN"),
            admin_username: lookup("ADMIN_USERNAME"),
            admin_password: lookup("ADMIN_PASSWORD"),
            log_dir: lookup("LOG_DIR"),
        })
    }
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_db_max_connections() -> u32 {
    10
}

fn default_auth_token() -> String {
    // Development placeholder. Override AUTH_TOKEN in any real deployment.
    "test-token".to_string()
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_admin_password() -> String {
    "password".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            listen_addr: default_listen_addr(),
            database_url: None,
            db_max_connections: default_db_max_connections(),
            auth_token: default_auth_token(),
            admin_username: default_admin_username(),
            admin_password: default_admin_password(),
            log_dir: default_log_dir(),
        }
    }
}

impl ServerConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::load_with(config_path, |key| {
            std::env::var(key).ok().filter(|v| !v.is_empty())
        })
    }

    /// Layers environment values (read through `lookup`) over the optional TOML file over defaults.
    pub fn load_with<F>(config_path: Option<&str>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // 1. Load from file (optional)
        let file_config: PartialServerConfig = match config_path {
            Some(path_str) if Path::new(path_str).exists() => {
                let contents = fs::read_to_string(path_str).map_err(|source| ConfigError::Read {
                    path: path_str.to_string(),
                    source,
                })?;
                toml::from_str(&contents).map_err(|source| ConfigError::Parse {
                    path: path_str.to_string(),
                    source,
                })?
            }
            _ => PartialServerConfig::default(),
        };

        // 2. Load from environment variables
        let env_config = PartialServerConfig::from_lookup(lookup)?;

        // 3. Merge: environment overrides file
        Ok(ServerConfig {
            listen_addr: env_config
                .listen_addr
                .or(file_config.listen_addr)
                .unwrap_or_else(default_listen_addr),
            database_url: env_config.database_url.or(file_config.database_url),
            db_max_connections: env_config
                .db_max_connections
                .or(file_config.db_max_connections)
                .unwrap_or_else(default_db_max_connections),
            auth_token: env_config
                .auth_token
                .or(file_config.auth_token)
                .unwrap_or_else(default_auth_token),
            admin_username: env_config
                .admin_username
                .or(file_config.admin_username)
                .unwrap_or_else(default_admin_username),
            admin_password: env_config
                .admin_password
                .or(file_config.admin_password)
                .unwrap_or_else(default_admin_password),
            log_dir: env_config
                .log_dir
                .or(file_config.log_dir)
                .unwrap_or_else(default_log_dir),
        })
    }
}
