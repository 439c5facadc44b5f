//! Service configuration.

use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

/// Default listen address.
const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

/// Default token lifetime (one day).
const DEFAULT_TOKEN_TTL_SECONDS: u64 = 24 * 60 * 60;

/// Configuration problems detected at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No JWT signing secret was configured.
    #[error("JWT_SECRET is not set and no .secrets/jwt.json was found")]
    MissingJwtSecret,

    /// The PostgreSQL backend was selected without connection details.
    #[error("DATABASE_URL (or DATABASE_ADDRESS/DATABASE_DB_NAME/DATABASE_USERNAME/DATABASE_PASSWORD) is not set")]
    MissingDatabaseUrl,

    /// Unrecognized storage backend name.
    #[error("unknown storage backend: {0} (expected \"postgres\" or \"memory\")")]
    UnknownBackend(String),
}

/// Where accounts, history and inventory are stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageBackend {
    /// PostgreSQL via a connection pool.
    #[default]
    Postgres,
    /// Process memory; everything is lost on restart.
    Memory,
}

impl StorageBackend {
    /// Canonical backend name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Memory => "memory",
        }
    }
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "memory" | "mem" => Ok(Self::Memory),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// Storage backend (default: postgres).
    pub storage_backend: StorageBackend,

    /// PostgreSQL connection URL.
    pub database_url: Option<String>,

    /// Maximum pooled database connections.
    pub database_max_connections: u32,

    /// HS256 signing secret for session tokens.
    pub jwt_secret: Option<String>,

    /// Session token lifetime in seconds.
    pub token_ttl_seconds: u64,

    /// JSON catalog file; the built-in merch list is used when unset.
    pub items_path: Option<String>,

    /// argon2 memory cost in KiB for new password hashes.
    pub password_hash_memory_kib: Option<u32>,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,
}

/// Database secrets file structure.
///
/// Either a full `url`, or the individual parts.
#[derive(Debug, Deserialize)]
struct DatabaseSecrets {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    db_name: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

impl DatabaseSecrets {
    fn into_url(self) -> Option<String> {
        self.url.or_else(|| {
            Some(build_database_url(
                self.address.as_deref()?,
                self.db_name.as_deref()?,
                self.username.as_deref()?,
                self.password.as_deref()?,
            ))
        })
    }
}

/// JWT secrets file structure.
#[derive(Debug, Deserialize)]
struct JwtSecrets {
    secret: String,
}

impl ServiceConfig {
    /// Load configuration from environment variables and secrets files.
    ///
    /// Unparsable numeric values fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownBackend` for an unrecognized
    /// `STORAGE_BACKEND`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::from_lookup(|key| std::env::var(key).ok())?;

        if let Some(url) = load_database_secrets() {
            config.database_url = Some(url);
        }
        if let Some(secret) = load_jwt_secret() {
            config.jwt_secret = Some(secret);
        }

        Ok(config)
    }

    /// Build configuration from an arbitrary variable source.
    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let storage_backend = var("STORAGE_BACKEND")
            .map(|s| s.parse::<StorageBackend>())
            .transpose()?
            .unwrap_or_default();

        let database_url = var("DATABASE_URL").or_else(|| {
            Some(build_database_url(
                &var("DATABASE_ADDRESS")?,
                &var("DATABASE_DB_NAME")?,
                &var("DATABASE_USERNAME")?,
                &var("DATABASE_PASSWORD")?,
            ))
        });

        Ok(Self {
            listen_addr: var("LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            storage_backend,
            database_url,
            database_max_connections: parse_var(&var, "DATABASE_MAX_CONNECTIONS")
                .unwrap_or(defaults.database_max_connections),
            jwt_secret: var("JWT_SECRET").filter(|s| !s.is_empty()),
            token_ttl_seconds: parse_var(&var, "TOKEN_TTL_SECONDS")
                .unwrap_or(defaults.token_ttl_seconds),
            items_path: var("ITEMS_PATH").filter(|s| !s.is_empty()),
            password_hash_memory_kib: parse_var(&var, "PASSWORD_HASH_MEMORY_KIB"),
            cors_origins: var("CORS_ORIGINS")
                .unwrap_or_else(|| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: parse_var(&var, "MAX_BODY_BYTES").unwrap_or(defaults.max_body_bytes),
            request_timeout_seconds: parse_var(&var, "REQUEST_TIMEOUT_SECONDS")
                .unwrap_or(defaults.request_timeout_seconds),
        })
    }

    /// The JWT signing secret.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingJwtSecret` if none is configured.
    pub fn jwt_secret(&self) -> Result<&str, ConfigError> {
        self.jwt_secret
            .as_deref()
            .ok_or(ConfigError::MissingJwtSecret)
    }

    /// The PostgreSQL connection URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingDatabaseUrl` if none is configured.
    pub fn database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or(ConfigError::MissingDatabaseUrl)
    }
}

/// Read and parse one variable; missing or malformed values yield `None`.
fn parse_var<T: FromStr>(var: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = var(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key = %key, value = %raw, "Ignoring malformed configuration value");
            None
        }
    }
}

fn build_database_url(address: &str, db_name: &str, username: &str, password: &str) -> String {
    format!("postgres://{username}:{password}@{address}/{db_name}")
}

/// Load the database URL from a secrets file, if one exists.
fn load_database_secrets() -> Option<String> {
    let secret_paths = [".secrets/database.json", "../.secrets/database.json"];

    for path in &secret_paths {
        if let Ok(secrets) = load_secrets_file::<DatabaseSecrets>(path) {
            tracing::info!(path = %path, "Loaded database secrets from file");
            return secrets.into_url();
        }
    }

    tracing::debug!("Database secrets file not found, using environment variables");
    None
}

/// Load the JWT secret from a secrets file, if one exists.
fn load_jwt_secret() -> Option<String> {
    let secret_paths = [".secrets/jwt.json", "../.secrets/jwt.json"];

    for path in &secret_paths {
        if let Ok(secrets) = load_secrets_file::<JwtSecrets>(path) {
            tracing::info!(path = %path, "Loaded JWT secret from file");
            return Some(secrets.secret);
        }
    }

    tracing::debug!("JWT secrets file not found, using environment variables");
    None
}

/// Load secrets from a JSON file.
fn load_secrets_file<T: serde::de::DeserializeOwned>(
    path: impl AsRef<Path>,
) -> Result<T, std::io::Error> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Secrets file not found",
        ));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.into(),
            storage_backend: StorageBackend::Postgres,
            database_url: None,
            database_max_connections: 50,
            jwt_secret: None,
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
            items_path: None,
            password_hash_memory_kib: None,
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
        }
    }
}
