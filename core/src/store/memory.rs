// cartstore/src/store/memory.rs

//! In-process `KvStore` with Redis-compatible hash and expiry semantics.
//!
//! Expiry is lazy: an expired key is purged the next time any operation
//! touches it. Deadlines use `tokio::time::Instant`, so tests running on a
//! paused runtime can move the clock with `tokio::time::advance`.

use crate::error::{StoreError, StoreResult};
use crate::store::{HashEntries, KeyTtl, KvStore};

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{event, Level};

#[derive(Debug, Default)]
struct Entry {
  fields: HashMap<String, String>,
  expires_at: Option<Instant>,
}

impl Entry {
  fn is_expired(&self, now: Instant) -> bool {
    self.expires_at.is_some_and(|deadline| deadline <= now)
  }
}

/// IMPORTANT: the map guard is a blocking lock and is never held across an
/// `.await`; every trait method does its work synchronously under the lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
  entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Writes a raw field value, bypassing integer encoding.
  pub fn insert_raw(&self, key: &str, field: &str, value: &str) {
    let mut entries = self.entries.lock();
    purge_if_expired(&mut entries, key, Instant::now());
    entries
      .entry(key.to_string())
      .or_default()
      .fields
      .insert(field.to_string(), value.to_string());
  }

  pub fn contains_key(&self, key: &str) -> bool {
    let mut entries = self.entries.lock();
    purge_if_expired(&mut entries, key, Instant::now());
    entries.contains_key(key)
  }

  /// Number of live keys.
  pub fn len(&self) -> usize {
    let now = Instant::now();
    self.entries.lock().values().filter(|entry| !entry.is_expired(now)).count()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn flush(&self) {
    self.entries.lock().clear();
  }
}

fn purge_if_expired(entries: &mut HashMap<String, Entry>, key: &str, now: Instant) {
  if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
    event!(Level::TRACE, key, "Purging expired key.");
    entries.remove(key);
  }
}

#[async_trait]
impl KvStore for MemoryStore {
  async fn hash_increment(&self, key: &str, field: &str, delta: i64) -> StoreResult<i64> {
    let mut entries = self.entries.lock();
    purge_if_expired(&mut entries, key, Instant::now());

    let current = match entries.get(key).and_then(|entry| entry.fields.get(field)) {
      Some(raw) => raw.parse::<i64>().map_err(|_| StoreError::NotAnInteger {
        key: key.to_string(),
        field: field.to_string(),
      })?,
      None => 0,
    };
    let next = current.checked_add(delta).ok_or_else(|| StoreError::Overflow {
      key: key.to_string(),
      field: field.to_string(),
    })?;

    entries
      .entry(key.to_string())
      .or_default()
      .fields
      .insert(field.to_string(), next.to_string());
    Ok(next)
  }

  async fn hash_set(&self, key: &str, field: &str, value: i64) -> StoreResult<()> {
    let mut entries = self.entries.lock();
    purge_if_expired(&mut entries, key, Instant::now());
    entries
      .entry(key.to_string())
      .or_default()
      .fields
      .insert(field.to_string(), value.to_string());
    Ok(())
  }

  async fn hash_delete(&self, key: &str, field: &str) -> StoreResult<bool> {
    let mut entries = self.entries.lock();
    purge_if_expired(&mut entries, key, Instant::now());

    let Some(entry) = entries.get_mut(key) else {
      return Ok(false);
    };
    let removed = entry.fields.remove(field).is_some();
    // Redis drops a hash together with its last field.
    if entry.fields.is_empty() {
      entries.remove(key);
    }
    Ok(removed)
  }

  async fn hash_get_all(&self, key: &str) -> StoreResult<HashEntries> {
    let mut entries = self.entries.lock();
    purge_if_expired(&mut entries, key, Instant::now());
    Ok(match entries.get(key) {
      Some(entry) => HashEntries::from_fields(entry.fields.clone()),
      None => HashEntries::Missing,
    })
  }

  async fn delete(&self, key: &str) -> StoreResult<bool> {
    let mut entries = self.entries.lock();
    purge_if_expired(&mut entries, key, Instant::now());
    Ok(entries.remove(key).is_some())
  }

  async fn expire(&self, key: &str, ttl: Duration) -> StoreResult<bool> {
    let now = Instant::now();
    let mut entries = self.entries.lock();
    purge_if_expired(&mut entries, key, now);

    if ttl.is_zero() {
      return Ok(entries.remove(key).is_some());
    }
    match entries.get_mut(key) {
      Some(entry) => {
        entry.expires_at = Some(now + ttl);
        Ok(true)
      }
      None => Ok(false),
    }
  }

  async fn time_to_live(&self, key: &str) -> StoreResult<KeyTtl> {
    let now = Instant::now();
    let mut entries = self.entries.lock();
    purge_if_expired(&mut entries, key, now);
    Ok(match entries.get(key) {
      None => KeyTtl::Missing,
      Some(Entry { expires_at: None, .. }) => KeyTtl::Persistent,
      Some(Entry {
        expires_at: Some(deadline),
        ..
      }) => KeyTtl::Expires(deadline.saturating_duration_since(now)),
    })
  }

  fn backend_name(&self) -> &'static str {
    "memory"
  }
}
