// server/src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Local mirror of an identity-provider account. `id` is the provider's uid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
  pub id: String,
  pub email: String,
}
