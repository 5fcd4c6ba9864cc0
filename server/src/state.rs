// server/src/state.rs
use crate::config::AppConfig;
use crate::services::identity::IdentityProvider;
use cartstore::CartEngine;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub db_pool: PgPool,
  pub cart: CartEngine,
  pub identity: Arc<dyn IdentityProvider>,
  pub config: Arc<AppConfig>, // Share loaded config
}
