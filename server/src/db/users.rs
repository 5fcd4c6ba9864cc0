// server/src/db/users.rs

use sqlx::PgPool;
use tracing::{error, instrument};

use crate::db::is_unique_violation;
use crate::errors::{AppError, Result};
use crate::models::User;

#[instrument(name = "db::insert_user", skip(pool, email), err(Display))]
pub async fn insert_user(pool: &PgPool, user_id: &str, email: &str) -> Result<User> {
  sqlx::query_as::<_, User>("INSERT INTO users (id, email) VALUES ($1, $2) RETURNING id, email")
    .bind(user_id)
    .bind(email)
    .fetch_one(pool)
    .await
    .map_err(|e| {
      if is_unique_violation(&e) {
        AppError::Conflict(format!("User {} already exists", user_id))
      } else {
        error!("Failed to insert user {}: {}", user_id, e);
        AppError::Sqlx(e)
      }
    })
}

#[instrument(name = "db::find_user", skip(pool), err(Display))]
pub async fn find_user(pool: &PgPool, user_id: &str) -> Result<Option<User>> {
  let user = sqlx::query_as::<_, User>("SELECT id, email FROM users WHERE id = $1")
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
  Ok(user)
}

/// Removes the user; their orders and order items go with them (ON DELETE CASCADE).
#[instrument(name = "db::delete_user", skip(pool), err(Display))]
pub async fn delete_user(pool: &PgPool, user_id: &str) -> Result<bool> {
  let result = sqlx::query("DELETE FROM users WHERE id = $1")
    .bind(user_id)
    .execute(pool)
    .await?;
  Ok(result.rows_affected() > 0)
}
