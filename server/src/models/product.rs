// server/src/models/product.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Product {
  pub id: String,
  pub name: String,
  pub description: Option<String>, // Description can be optional
  pub price: f64,
  pub author: String,
  pub image_url: String,
}
