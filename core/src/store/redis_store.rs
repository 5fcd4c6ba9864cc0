// cartstore/src/store/redis_store.rs

//! `KvStore` over a shared Redis `ConnectionManager`.
//!
//! The manager multiplexes one connection across all callers and reconnects
//! on failure; cloning it is cheap, so each command works on its own clone
//! and no lock is held in-process. Connection timeout and reconnect retries
//! are the only retry policy in the cart stack.

use crate::error::{StoreError, StoreResult};
use crate::store::{HashEntries, KeyTtl, KvStore};

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{AsyncCommands, Client, RedisError};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{event, instrument, Level};

/// Connection policy for `RedisStore::connect`.
#[derive(Debug, Clone, Copy)]
pub struct RedisSettings {
  pub connect_timeout: Duration,
  pub retries: usize,
}

impl Default for RedisSettings {
  fn default() -> Self {
    Self {
      connect_timeout: Duration::from_millis(500),
      retries: 3,
    }
  }
}

#[derive(Clone)]
pub struct RedisStore {
  connection: ConnectionManager,
}

impl RedisStore {
  #[instrument(name = "RedisStore::connect", skip(url), fields(timeout_ms = settings.connect_timeout.as_millis() as u64, retries = settings.retries), err(Display))]
  pub async fn connect(url: &str, settings: RedisSettings) -> StoreResult<Self> {
    let config = ConnectionManagerConfig::new()
      .set_number_of_retries(settings.retries)
      .set_connection_timeout(settings.connect_timeout);

    let client = Client::open(url)?;
    let connection = client.get_connection_manager_with_config(config).await?;
    event!(Level::INFO, "Connected to Redis.");
    Ok(Self { connection })
  }
}

/// Maps the server replies the engine cares about; everything else is a
/// backend failure.
fn classify(err: RedisError, key: &str, field: Option<&str>) -> StoreError {
  let code = err.code().map(str::to_owned);
  let detail = err.detail().unwrap_or_default().to_ascii_lowercase();

  if code.as_deref() == Some("WRONGTYPE") {
    return StoreError::WrongType { key: key.to_string() };
  }
  if let Some(field) = field {
    if detail.contains("not an integer") {
      return StoreError::NotAnInteger {
        key: key.to_string(),
        field: field.to_string(),
      };
    }
    if detail.contains("overflow") {
      return StoreError::Overflow {
        key: key.to_string(),
        field: field.to_string(),
      };
    }
  }
  StoreError::from(err)
}

#[async_trait]
impl KvStore for RedisStore {
  async fn hash_increment(&self, key: &str, field: &str, delta: i64) -> StoreResult<i64> {
    let mut conn = self.connection.clone();
    conn
      .hincr::<_, _, _, i64>(key, field, delta)
      .await
      .map_err(|e| classify(e, key, Some(field)))
  }

  async fn hash_set(&self, key: &str, field: &str, value: i64) -> StoreResult<()> {
    let mut conn = self.connection.clone();
    conn
      .hset::<_, _, _, i64>(key, field, value)
      .await
      .map(|_| ())
      .map_err(|e| classify(e, key, Some(field)))
  }

  async fn hash_delete(&self, key: &str, field: &str) -> StoreResult<bool> {
    let mut conn = self.connection.clone();
    let removed: i64 = conn.hdel(key, field).await.map_err(|e| classify(e, key, Some(field)))?;
    Ok(removed > 0)
  }

  async fn hash_get_all(&self, key: &str) -> StoreResult<HashEntries> {
    let mut conn = self.connection.clone();
    let fields: HashMap<String, String> = conn.hgetall(key).await.map_err(|e| classify(e, key, None))?;
    Ok(HashEntries::from_fields(fields))
  }

  async fn delete(&self, key: &str) -> StoreResult<bool> {
    let mut conn = self.connection.clone();
    let removed: i64 = conn.del(key).await.map_err(|e| classify(e, key, None))?;
    Ok(removed > 0)
  }

  async fn expire(&self, key: &str, ttl: Duration) -> StoreResult<bool> {
    let mut conn = self.connection.clone();
    let millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
    let applied: i64 = conn.pexpire(key, millis).await.map_err(|e| classify(e, key, None))?;
    Ok(applied == 1)
  }

  async fn time_to_live(&self, key: &str) -> StoreResult<KeyTtl> {
    let mut conn = self.connection.clone();
    let millis: i64 = conn.pttl(key).await.map_err(|e| classify(e, key, None))?;
    Ok(match millis {
      -2 => KeyTtl::Missing,
      -1 => KeyTtl::Persistent,
      ms => KeyTtl::Expires(Duration::from_millis(ms.max(0) as u64)),
    })
  }

  fn backend_name(&self) -> &'static str {
    "redis"
  }
}
