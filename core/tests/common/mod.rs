// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use async_trait::async_trait;
use cartstore::{CartEngine, HashEntries, KeyTtl, KvStore, MemoryStore, StoreError, StoreResult};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;

pub const USER: &str = "user123456";

// --- Engine builders ---
pub fn memory_engine() -> (Arc<MemoryStore>, CartEngine) {
  let store = Arc::new(MemoryStore::new());
  let engine = CartEngine::new(store.clone());
  (store, engine)
}

pub fn recording_engine() -> (Arc<RecordingStore>, CartEngine) {
  let store = Arc::new(RecordingStore::default());
  let engine = CartEngine::new(store.clone());
  (store, engine)
}

// --- A store that fails every call ---
#[derive(Debug, Default)]
pub struct FailingStore;

fn unavailable() -> StoreError {
  StoreError::backend(anyhow::anyhow!("connection refused"))
}

#[async_trait]
impl KvStore for FailingStore {
  async fn hash_increment(&self, _key: &str, _field: &str, _delta: i64) -> StoreResult<i64> {
    Err(unavailable())
  }
  async fn hash_set(&self, _key: &str, _field: &str, _value: i64) -> StoreResult<()> {
    Err(unavailable())
  }
  async fn hash_delete(&self, _key: &str, _field: &str) -> StoreResult<bool> {
    Err(unavailable())
  }
  async fn hash_get_all(&self, _key: &str) -> StoreResult<HashEntries> {
    Err(unavailable())
  }
  async fn delete(&self, _key: &str) -> StoreResult<bool> {
    Err(unavailable())
  }
  async fn expire(&self, _key: &str, _ttl: Duration) -> StoreResult<bool> {
    Err(unavailable())
  }
  async fn time_to_live(&self, _key: &str) -> StoreResult<KeyTtl> {
    Err(unavailable())
  }
  fn backend_name(&self) -> &'static str {
    "failing"
  }
}

// --- A MemoryStore that logs every command it receives ---
#[derive(Debug, Default)]
pub struct RecordingStore {
  pub inner: MemoryStore,
  calls: Mutex<Vec<String>>,
}

impl RecordingStore {
  pub fn calls(&self) -> Vec<String> {
    self.calls.lock().clone()
  }

  pub fn reset_calls(&self) {
    self.calls.lock().clear();
  }

  fn record(&self, call: String) {
    self.calls.lock().push(call);
  }
}

#[async_trait]
impl KvStore for RecordingStore {
  async fn hash_increment(&self, key: &str, field: &str, delta: i64) -> StoreResult<i64> {
    self.record(format!("HINCRBY {key} {field} {delta}"));
    self.inner.hash_increment(key, field, delta).await
  }
  async fn hash_set(&self, key: &str, field: &str, value: i64) -> StoreResult<()> {
    self.record(format!("HSET {key} {field} {value}"));
    self.inner.hash_set(key, field, value).await
  }
  async fn hash_delete(&self, key: &str, field: &str) -> StoreResult<bool> {
    self.record(format!("HDEL {key} {field}"));
    self.inner.hash_delete(key, field).await
  }
  async fn hash_get_all(&self, key: &str) -> StoreResult<HashEntries> {
    self.record(format!("HGETALL {key}"));
    self.inner.hash_get_all(key).await
  }
  async fn delete(&self, key: &str) -> StoreResult<bool> {
    self.record(format!("DEL {key}"));
    self.inner.delete(key).await
  }
  async fn expire(&self, key: &str, ttl: Duration) -> StoreResult<bool> {
    self.record(format!("EXPIRE {key} {}", ttl.as_secs()));
    self.inner.expire(key, ttl).await
  }
  async fn time_to_live(&self, key: &str) -> StoreResult<KeyTtl> {
    self.record(format!("PTTL {key}"));
    self.inner.time_to_live(key).await
  }
  fn backend_name(&self) -> &'static str {
    "recording"
  }
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
