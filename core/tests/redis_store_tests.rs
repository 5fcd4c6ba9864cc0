// tests/redis_store_tests.rs
//
// Needs a live Redis: `REDIS_URL=redis://127.0.0.1:6379/1 cargo test -- --ignored`.
// Each test flushes the selected database, so point it at a scratch db.
mod common;

use cartstore::{cart_key, Cart, CartEngine, CartError, KeyTtl, KvStore, RedisSettings, RedisStore, StoreError, DEFAULT_CART_LIFETIME};
use common::*;
use serial_test::serial;
use std::sync::Arc;
use std::time::Duration;

async fn redis_engine() -> (RedisStore, CartEngine) {
  let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379/1".to_string());
  let store = RedisStore::connect(&url, RedisSettings::default())
    .await
    .expect("Redis must be reachable for ignored tests");

  let client = redis::Client::open(url.as_str()).unwrap();
  let mut conn = client.get_multiplexed_async_connection().await.unwrap();
  redis::cmd("FLUSHDB").query_async::<()>(&mut conn).await.unwrap();

  let engine = CartEngine::new(Arc::new(store.clone()));
  (store, engine)
}

fn cart(items: &[(&str, i64)]) -> Cart {
  items.iter().map(|(p, q)| (*p, *q)).collect()
}

#[tokio::test]
#[serial]
#[ignore]
async fn test_redis_scenarios() {
  setup_tracing();
  let (_store, engine) = redis_engine().await;

  assert!(engine.get_cart(USER).await.unwrap().is_empty());

  engine.add(USER, "prod1", 1).await.unwrap();
  assert_eq!(engine.get_cart(USER).await.unwrap(), cart(&[("prod1", 1)]));

  engine.add(USER, "prod2", 2).await.unwrap();
  engine.add(USER, "prod1", -1).await.unwrap();
  engine.add(USER, "prod2", 1).await.unwrap();
  assert_eq!(engine.get_cart(USER).await.unwrap(), cart(&[("prod2", 3)]));

  engine.add(USER, "prod1", -1).await.unwrap();
  assert_eq!(engine.get_cart(USER).await.unwrap(), cart(&[("prod2", 3)]));

  engine.update(USER, "prod2", 0).await.unwrap();
  assert!(engine.get_cart(USER).await.unwrap().is_empty());

  engine.add(USER, "prod1", 2).await.unwrap();
  engine.clear_cart(USER).await.unwrap();
  engine.clear_cart(USER).await.unwrap();
  assert!(engine.get_cart(USER).await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
#[ignore]
async fn test_redis_mutations_reset_ttl() {
  setup_tracing();
  let (store, engine) = redis_engine().await;

  engine.add(USER, "prod1", 1).await.unwrap();
  // Shorten the TTL by hand, then check the next write restores it.
  store.expire(&cart_key(USER), Duration::from_secs(5)).await.unwrap();
  engine.update(USER, "prod1", 4).await.unwrap();

  let remaining = engine.time_to_live(USER).await.unwrap().remaining().unwrap();
  assert!(remaining > DEFAULT_CART_LIFETIME - Duration::from_secs(2), "remaining = {:?}", remaining);
  assert!(remaining <= DEFAULT_CART_LIFETIME);

  engine.get_cart(USER).await.unwrap();
  let after_read = engine.time_to_live(USER).await.unwrap().remaining().unwrap();
  assert!(after_read <= remaining);
}

#[tokio::test]
#[serial]
#[ignore]
async fn test_redis_emptied_cart_leaves_no_key() {
  setup_tracing();
  let (store, engine) = redis_engine().await;
  engine.add(USER, "prod1", 1).await.unwrap();
  engine.add(USER, "prod1", -1).await.unwrap();
  assert_eq!(store.time_to_live(&cart_key(USER)).await.unwrap(), KeyTtl::Missing);
}

#[tokio::test]
#[serial]
#[ignore]
async fn test_redis_corrupt_values_are_reported() {
  setup_tracing();
  let (store, engine) = redis_engine().await;

  let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379/1".to_string());
  let client = redis::Client::open(url.as_str()).unwrap();
  let mut conn = client.get_multiplexed_async_connection().await.unwrap();
  redis::cmd("HSET")
    .arg(cart_key(USER))
    .arg("prod1")
    .arg("lots")
    .query_async::<()>(&mut conn)
    .await
    .unwrap();

  assert!(matches!(
    engine.get_cart(USER).await,
    Err(CartError::CorruptQuantity { .. })
  ));
  assert!(matches!(
    store.hash_increment(&cart_key(USER), "prod1", 1).await,
    Err(StoreError::NotAnInteger { .. })
  ));
}

#[tokio::test]
async fn test_connect_to_unreachable_server_fails_within_timeout() {
  setup_tracing();
  let settings = RedisSettings {
    connect_timeout: Duration::from_millis(200),
    retries: 0,
  };
  let attempt = tokio::time::timeout(
    Duration::from_secs(5),
    RedisStore::connect("redis://127.0.0.1:1/0", settings),
  )
  .await
  .expect("connect should give up on its own");
  assert!(matches!(attempt, Err(StoreError::Backend { .. })));
}
