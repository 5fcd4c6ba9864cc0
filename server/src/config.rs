// server/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

pub const DEFAULT_IDENTITY_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";
pub const DEFAULT_IDENTITY_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1/token";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KvBackend {
  Redis,
  Memory,
}

impl std::str::FromStr for KvBackend {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "redis" => Ok(KvBackend::Redis),
      "memory" => Ok(KvBackend::Memory),
      other => Err(AppError::Config(format!(
        "Invalid KV_BACKEND '{}': expected 'redis' or 'memory'",
        other
      ))),
    }
  }
}

#[derive(Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,

  pub database_url: String,
  pub database_max_connections: u32,
  pub run_migrations: bool,

  pub kv_backend: KvBackend,
  pub redis_url: String,
  pub redis_connect_timeout: Duration,
  pub redis_retries: usize,
  pub cart_lifetime: Duration,

  pub identity_api_key: String,
  pub identity_base_url: String,
  pub identity_token_url: String,

  pub cookie_secure: bool,
  pub access_token_max_age: Duration,
}

// Secrets stay out of logs.
impl std::fmt::Debug for AppConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AppConfig")
      .field("server_host", &self.server_host)
      .field("server_port", &self.server_port)
      .field("database_url", &"[REDACTED]")
      .field("database_max_connections", &self.database_max_connections)
      .field("run_migrations", &self.run_migrations)
      .field("kv_backend", &self.kv_backend)
      .field("redis_url", &"[REDACTED]")
      .field("cart_lifetime", &self.cart_lifetime)
      .field("identity_api_key", &"[REDACTED]")
      .field("identity_base_url", &self.identity_base_url)
      .field("cookie_secure", &self.cookie_secure)
      .finish()
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the config from any variable source; `from_env` passes the process environment.
  pub fn from_lookup<F>(lookup: F) -> Result<Self>
  where
    F: Fn(&str) -> Option<String>,
  {
    let get_env = |var_name: &str| {
      lookup(var_name).ok_or_else(|| AppError::Config(format!("Missing environment variable '{}'", var_name)))
    };
    let get_or = |var_name: &str, default: &str| lookup(var_name).unwrap_or_else(|| default.to_string());

    let server_host = get_or("SERVER_HOST", "127.0.0.1");
    let server_port = get_or("SERVER_PORT", "8080")
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;

    let database_url = get_env("DATABASE_URL")?;
    let database_max_connections = get_or("DATABASE_MAX_CONNECTIONS", "10")
      .parse::<u32>()
      .map_err(|e| AppError::Config(format!("Invalid DATABASE_MAX_CONNECTIONS: {}", e)))?;
    let run_migrations = get_or("RUN_MIGRATIONS", "false")
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid RUN_MIGRATIONS value: {}", e)))?;

    let kv_backend = get_or("KV_BACKEND", "redis").parse::<KvBackend>()?;
    let redis_url = match lookup("REDIS_URL") {
      Some(url) => url,
      None => format!(
        "redis://{}:{}/{}",
        get_or("REDIS_HOST", "127.0.0.1"),
        get_or("REDIS_PORT", "6379"),
        get_or("REDIS_DB", "0")
      ),
    };
    let redis_connect_timeout = get_or("REDIS_CONNECT_TIMEOUT_MS", "500")
      .parse::<u64>()
      .map(Duration::from_millis)
      .map_err(|e| AppError::Config(format!("Invalid REDIS_CONNECT_TIMEOUT_MS: {}", e)))?;
    let redis_retries = get_or("REDIS_RETRIES", "3")
      .parse::<usize>()
      .map_err(|e| AppError::Config(format!("Invalid REDIS_RETRIES: {}", e)))?;

    let cart_lifetime_secs = get_or("CART_TTL_SECS", "172800")
      .parse::<u64>()
      .map_err(|e| AppError::Config(format!("Invalid CART_TTL_SECS: {}", e)))?;
    if cart_lifetime_secs == 0 {
      return Err(AppError::Config("CART_TTL_SECS must be greater than zero".to_string()));
    }

    let identity_api_key = get_env("IDENTITY_API_KEY")?;
    let identity_base_url = get_or("IDENTITY_BASE_URL", DEFAULT_IDENTITY_BASE_URL);
    let identity_token_url = get_or("IDENTITY_TOKEN_URL", DEFAULT_IDENTITY_TOKEN_URL);

    let cookie_secure = get_or("COOKIE_SECURE", "true")
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid COOKIE_SECURE value: {}", e)))?;
    let access_token_max_age = get_or("ACCESS_TOKEN_MAX_AGE_SECS", "3600")
      .parse::<u64>()
      .map(Duration::from_secs)
      .map_err(|e| AppError::Config(format!("Invalid ACCESS_TOKEN_MAX_AGE_SECS: {}", e)))?;

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      database_url,
      database_max_connections,
      run_migrations,
      kv_backend,
      redis_url,
      redis_connect_timeout,
      redis_retries,
      cart_lifetime: Duration::from_secs(cart_lifetime_secs),
      identity_api_key,
      identity_base_url,
      identity_token_url,
      cookie_secure,
      access_token_max_age,
    })
  }
}
