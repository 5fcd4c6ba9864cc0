// server/src/db/mod.rs

//! PostgreSQL accessors for users, products and orders.
//!
//! All queries are runtime-checked (`sqlx::query_as` + `FromRow`), so the
//! crate builds without a database.

pub mod orders;
pub mod products;
pub mod users;

use crate::errors::Result;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

const FOREIGN_KEY_VIOLATION: &str = "23503";
const UNIQUE_VIOLATION: &str = "23505";

pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool> {
  let pool = PgPoolOptions::new()
    .max_connections(max_connections)
    .connect(database_url)
    .await?;
  info!(max_connections, "Connected to the database.");
  Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
  sqlx::migrate!("./migrations").run(pool).await?;
  info!("Database migrations applied.");
  Ok(())
}

pub(crate) fn is_violation(err: &sqlx::Error, code: &str) -> bool {
  err
    .as_database_error()
    .and_then(|db_err| db_err.code())
    .is_some_and(|c| c == code)
}

pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
  is_violation(err, FOREIGN_KEY_VIOLATION)
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
  is_violation(err, UNIQUE_VIOLATION)
}
