// server/src/startup.rs

//! Builds the long-lived pieces of `AppState` from `AppConfig`.

use std::sync::Arc;

use cartstore::{CartEngine, KvStore, MemoryStore, RedisSettings, RedisStore};
use tracing::{info, warn};

use crate::config::{AppConfig, KvBackend};
use crate::db;
use crate::errors::{AppError, Result};
use crate::services::{FirebaseIdentity, IdentityProvider};
use crate::state::AppState;

pub async fn build_kv_store(config: &AppConfig) -> Result<Arc<dyn KvStore>> {
  match config.kv_backend {
    KvBackend::Redis => {
      let settings = RedisSettings {
        connect_timeout: config.redis_connect_timeout,
        retries: config.redis_retries,
      };
      let store = RedisStore::connect(&config.redis_url, settings)
        .await
        .map_err(|e| AppError::Cart(e.into()))?;
      Ok(Arc::new(store))
    }
    KvBackend::Memory => {
      warn!("Using the in-process cart store; carts are lost on restart and not shared between instances.");
      Ok(Arc::new(MemoryStore::new()))
    }
  }
}

pub fn build_identity(config: &AppConfig) -> Result<Arc<dyn IdentityProvider>> {
  let client = reqwest::Client::builder()
    .timeout(std::time::Duration::from_secs(10))
    .build()
    .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;
  Ok(Arc::new(FirebaseIdentity::new(
    client,
    config.identity_api_key.clone(),
    config.identity_base_url.clone(),
    config.identity_token_url.clone(),
  )))
}

pub async fn build_app_state(config: Arc<AppConfig>) -> Result<AppState> {
  let db_pool = db::connect(&config.database_url, config.database_max_connections).await?;
  if config.run_migrations {
    db::run_migrations(&db_pool).await?;
  }

  let store = build_kv_store(&config).await?;
  let cart = CartEngine::with_lifetime(store, config.cart_lifetime);
  info!(backend = cart.store().backend_name(), lifetime_secs = cart.lifetime().as_secs(), "Cart engine ready.");

  let identity = build_identity(&config)?;

  Ok(AppState {
    db_pool,
    cart,
    identity,
    config,
  })
}
