// cartstore/src/store/mod.rs

//! The key-value primitives the cart engine is written against.
//!
//! The trait mirrors the subset of Redis hash and key commands the engine
//! needs (HINCRBY, HSET, HDEL, HGETALL, DEL, PEXPIRE, PTTL). Implementations
//! must keep Redis' semantics for the corner cases the engine relies on:
//!  - an increment on an absent field starts from zero;
//!  - deleting the last field of a hash removes the key;
//!  - reading, deleting or expiring an absent key is not an error.

pub mod memory;
pub mod redis_store;

use crate::error::StoreResult;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

/// Result of reading a whole hash. A missing key is a normal value, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashEntries {
  Missing,
  Present(HashMap<String, String>),
}

impl HashEntries {
  /// Backends that cannot tell "absent" from "empty" (Redis never stores an
  /// empty hash) report an empty field map as `Missing`.
  pub fn from_fields(fields: HashMap<String, String>) -> Self {
    if fields.is_empty() {
      HashEntries::Missing
    } else {
      HashEntries::Present(fields)
    }
  }

  pub fn is_missing(&self) -> bool {
    matches!(self, HashEntries::Missing)
  }
}

/// Remaining lifetime of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTtl {
  Missing,
  Persistent,
  Expires(Duration),
}

impl KeyTtl {
  pub fn remaining(&self) -> Option<Duration> {
    match self {
      KeyTtl::Expires(remaining) => Some(*remaining),
      _ => None,
    }
  }
}

#[async_trait]
pub trait KvStore: Send + Sync {
  /// Atomically adds `delta` to a hash field and returns the new value.
  async fn hash_increment(&self, key: &str, field: &str, delta: i64) -> StoreResult<i64>;

  /// Overwrites a hash field with `value`.
  async fn hash_set(&self, key: &str, field: &str, value: i64) -> StoreResult<()>;

  /// Removes a hash field. Returns whether the field existed.
  async fn hash_delete(&self, key: &str, field: &str) -> StoreResult<bool>;

  async fn hash_get_all(&self, key: &str) -> StoreResult<HashEntries>;

  /// Removes a whole key. Returns whether the key existed.
  async fn delete(&self, key: &str) -> StoreResult<bool>;

  /// Sets the key's time-to-live. Returns false when the key does not exist.
  async fn expire(&self, key: &str, ttl: Duration) -> StoreResult<bool>;

  async fn time_to_live(&self, key: &str) -> StoreResult<KeyTtl>;

  /// Short backend label for logs.
  fn backend_name(&self) -> &'static str;
}
