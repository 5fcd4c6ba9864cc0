// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use actix_web::web;
use async_trait::async_trait;
use cartstore::{CartEngine, HashEntries, KeyTtl, KvStore, MemoryStore, StoreError, StoreResult};
use once_cell::sync::Lazy;
use sqlx::postgres::PgPoolOptions;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use storefront::config::AppConfig;
use storefront::services::{IdentityError, IdentityProvider, SessionTokens, VerifiedIdentity};
use storefront::state::AppState;
use tracing::Level;

pub const USER: &str = "user123456";
pub const EMAIL: &str = "dummy@example.com";
pub const PASSWORD: &str = "correct-horse";
pub const VALID_TOKEN: &str = "valid-token";
pub const OTHER_USER: &str = "user654321";
pub const OTHER_TOKEN: &str = "other-token";
pub const REFRESH_TOKEN: &str = "refresh-token";
pub const REGISTERED_EMAIL: &str = "taken@example.com";

// --- Identity provider with a fixed set of accounts ---
#[derive(Debug, Default)]
pub struct StaticIdentity;

fn session_for(user_id: &str, id_token: &str) -> SessionTokens {
  SessionTokens {
    user_id: user_id.to_string(),
    id_token: id_token.to_string(),
    refresh_token: REFRESH_TOKEN.to_string(),
    expires_in_secs: Some(3600),
  }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
  async fn verify_token(&self, id_token: &str) -> Result<VerifiedIdentity, IdentityError> {
    let user_id = match id_token {
      VALID_TOKEN => USER,
      OTHER_TOKEN => OTHER_USER,
      _ => return Err(IdentityError::InvalidToken("INVALID_ID_TOKEN".to_string())),
    };
    Ok(VerifiedIdentity {
      user_id: user_id.to_string(),
    })
  }

  async fn sign_up(&self, email: &str, _password: &str) -> Result<SessionTokens, IdentityError> {
    if email == REGISTERED_EMAIL {
      Err(IdentityError::EmailExists)
    } else {
      Err(IdentityError::Rejected("WEAK_PASSWORD".to_string()))
    }
  }

  async fn sign_in(&self, email: &str, password: &str) -> Result<SessionTokens, IdentityError> {
    if email == EMAIL && password == PASSWORD {
      Ok(session_for(USER, VALID_TOKEN))
    } else {
      Err(IdentityError::InvalidCredentials("INVALID_LOGIN_CREDENTIALS".to_string()))
    }
  }

  async fn refresh(&self, refresh_token: &str) -> Result<SessionTokens, IdentityError> {
    if refresh_token == REFRESH_TOKEN {
      Ok(session_for(USER, VALID_TOKEN))
    } else {
      Err(IdentityError::InvalidToken("INVALID_REFRESH_TOKEN".to_string()))
    }
  }

  async fn delete_account(&self, _id_token: &str) -> Result<(), IdentityError> {
    Ok(())
  }
}

// --- A cart store that fails every call ---
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

// --- App state ---
pub fn test_config() -> AppConfig {
  let vars: HashMap<&str, &str> = [
    ("DATABASE_URL", "postgres://localhost/storefront_test"),
    ("IDENTITY_API_KEY", "test-key"),
    ("KV_BACKEND", "memory"),
  ]
  .into_iter()
  .collect();
  AppConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string())).expect("test config")
}

/// State over the given cart store. The pool never connects; routes used
/// with it must not reach the database.
pub fn app_state_with(store: Arc<dyn KvStore>) -> web::Data<AppState> {
  let config = Arc::new(test_config());
  let db_pool = PgPoolOptions::new()
    .connect_lazy(&config.database_url)
    .expect("lazy pool");
  web::Data::new(AppState {
    db_pool,
    cart: CartEngine::with_lifetime(store, config.cart_lifetime),
    identity: Arc::new(StaticIdentity),
    config,
  })
}

pub fn memory_app_state() -> (Arc<MemoryStore>, web::Data<AppState>) {
  let store = Arc::new(MemoryStore::new());
  let state = app_state_with(store.clone());
  (store, state)
}

pub fn bearer(token: &str) -> (&'static str, String) {
  ("Authorization", format!("Bearer {}", token))
}

// --- Tracing Setup ---
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
